use bucketmap_rs::bench::{get_phase, put_phase};
use bucketmap_rs::{KeySet, LockStrategy, Table, TableConfig};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dashmap::DashMap;
use std::thread;

const KEYS: usize = 20_000;
const BUCKETS: usize = 5;

const STRATEGIES: [LockStrategy; 3] = [
    LockStrategy::BucketLock,
    LockStrategy::LockFree,
    LockStrategy::CoarseLock,
];

// thread counts that divide KEYS, capped at the core count
fn thread_counts() -> Vec<usize> {
    let cpus = num_cpus::get();
    [1usize, 2, 4, 8, 16, 32]
        .into_iter()
        .filter(|&t| t <= cpus.max(1) && KEYS % t == 0)
        .collect()
}

fn new_table(strategy: LockStrategy) -> Table {
    Table::new(TableConfig::new(BUCKETS, KEYS, strategy)).unwrap()
}

fn benchmark_put_phase(c: &mut Criterion) {
    let keys = KeySet::generate(KEYS, 0);
    let mut group = c.benchmark_group("put_phase");
    group.throughput(Throughput::Elements(KEYS as u64));
    group.sample_size(20);

    for threads in thread_counts() {
        let slices = keys.partition(threads).unwrap();
        for strategy in STRATEGIES {
            group.bench_with_input(
                BenchmarkId::new(strategy.to_string(), threads),
                &slices,
                |b, slices| {
                    b.iter(|| {
                        let table = new_table(strategy);
                        put_phase(&table, slices).unwrap();
                        black_box(table.len())
                    })
                },
            );
        }

        group.bench_with_input(BenchmarkId::new("dashmap", threads), &slices, |b, slices| {
            b.iter(|| {
                let map = DashMap::with_capacity(KEYS);
                thread::scope(|s| {
                    for (worker, slice) in slices.iter().enumerate() {
                        let map = &map;
                        s.spawn(move || {
                            for &k in slice.iter() {
                                black_box(map.insert(k, worker as u32));
                            }
                        });
                    }
                });
                black_box(map.len())
            })
        });
    }
    group.finish();
}

fn benchmark_get_phase(c: &mut Criterion) {
    let keys = KeySet::generate(KEYS, 0);
    let mut group = c.benchmark_group("get_phase");
    group.throughput(Throughput::Elements(KEYS as u64));
    group.sample_size(20);

    for threads in thread_counts() {
        let slices = keys.partition(threads).unwrap();
        for strategy in STRATEGIES {
            // pre-fill once; the get phase never mutates
            let table = new_table(strategy);
            put_phase(&table, &slices).unwrap();
            group.bench_with_input(
                BenchmarkId::new(strategy.to_string(), threads),
                &slices,
                |b, slices| b.iter(|| black_box(get_phase(&table, slices).unwrap())),
            );
        }

        let map = DashMap::with_capacity(KEYS);
        for &k in keys.as_slice() {
            map.insert(k, 0u32);
        }
        group.bench_with_input(BenchmarkId::new("dashmap", threads), &slices, |b, slices| {
            b.iter(|| {
                thread::scope(|s| {
                    for slice in slices.iter() {
                        let map = &map;
                        s.spawn(move || {
                            let misses = slice.iter().filter(|&k| map.get(k).is_none()).count();
                            black_box(misses)
                        });
                    }
                });
            })
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_put_phase, benchmark_get_phase);
criterion_main!(benches);
