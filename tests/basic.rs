use ahash::AHashMap;
use bucketmap_rs::{KeySet, LockStrategy, Table, TableConfig, TableError};

const STRATEGIES: [LockStrategy; 3] = [
    LockStrategy::BucketLock,
    LockStrategy::LockFree,
    LockStrategy::CoarseLock,
];

#[test]
fn test_insert_then_lookup() {
    for s in STRATEGIES {
        let t = Table::new(TableConfig::new(5, 64, s)).unwrap();
        assert!(t.is_empty());

        t.insert(1, 10).unwrap();
        t.insert(6, 60).unwrap();
        t.insert(2, 20).unwrap();

        assert_eq!(t.len(), 3);
        assert_eq!(t.lookup(1), Some(10));
        assert_eq!(t.lookup(6), Some(60));
        assert_eq!(t.lookup(2), Some(20));
        assert_eq!(t.lookup(11), None);
        assert_eq!(t.bucket_len(1), 2);
        assert_eq!(t.bucket_len(2), 1);
        assert_eq!(t.bucket_len(3), 0);
    }
}

#[test]
fn test_generated_keys_round_trip() {
    for s in STRATEGIES {
        let keys = KeySet::generate(5_000, 0);
        let t = Table::new(TableConfig::new(5, 5_000, s)).unwrap();

        // expected value per key: the first insert wins the scan
        let mut expected: AHashMap<u32, u32> = AHashMap::new();
        for (i, &k) in keys.as_slice().iter().enumerate() {
            t.insert(k, i as u32).unwrap();
            expected.entry(k).or_insert(i as u32);
        }

        assert_eq!(t.len(), keys.len());
        for (&k, &v) in &expected {
            assert_eq!(t.lookup(k), Some(v), "key {} strategy {}", k, s);
        }
    }
}

#[test]
fn test_duplicates_occupy_distinct_slots() {
    let t = Table::new(TableConfig::new(2, 8, LockStrategy::BucketLock)).unwrap();
    t.insert(4, 1).unwrap();
    t.insert(4, 2).unwrap();
    t.insert(4, 3).unwrap();
    assert_eq!(t.occupied(0), vec![(4, 1), (4, 2), (4, 3)]);
    assert_eq!(t.lookup(4), Some(1));
}

#[test]
fn test_capacity_exhaustion_is_deterministic() {
    for s in STRATEGIES {
        let n = 16;
        let t = Table::new(TableConfig::new(5, n, s)).unwrap();
        // every key maps to bucket 3
        let keys: Vec<u32> = (0..=n as u32).map(|i| 3 + 5 * i).collect();

        for &k in &keys[..n] {
            t.insert(k, k * 2).unwrap();
        }
        let err = t.insert(keys[n], 0).unwrap_err();
        assert_eq!(
            err,
            TableError::CapacityExceeded {
                bucket: 3,
                capacity: n
            }
        );

        // nothing was overwritten
        let expected: Vec<(u32, u32)> = keys[..n].iter().map(|&k| (k, k * 2)).collect();
        assert_eq!(t.occupied(3), expected);
        assert_eq!(t.lookup(keys[n]), None);
    }
}

#[test]
fn test_debug_output() {
    let t = Table::new(TableConfig::new(3, 4, LockStrategy::LockFree)).unwrap();
    t.insert(1, 1).unwrap();
    let s = format!("{:?}", t);
    assert!(s.contains("len: 1"));
    assert!(s.contains("LockFree"));
}
