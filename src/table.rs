//! Fixed-capacity bucketed hash table shared by concurrent inserters and readers.
//!
//! A key lives in bucket `key % buckets`. Each bucket is a fixed array of slots that are
//! claimed in index order and never released, so the claimed slots of a bucket always form a
//! prefix. Lookups rely on that to stop at the first empty slot.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, AtomicUsize, Ordering};
use std::thread;

use crate::config::{LockStrategy, TableConfig};
use crate::error::{ConfigError, TableError};

pub type Key = u32;
pub type Value = u32;

// ================================================================================================
// CONSTANTS
// ================================================================================================

/// Slot was never claimed
const EMPTY: u8 = 0;

/// Slot reserved by a lock-free inserter, payload not yet published
const CLAIMED: u8 = 1;

/// Slot holds a committed key/value pair
const READY: u8 = 2;

/// pure CPU hints before any yield
const SPIN_BEFORE_YIELD: i32 = 128;

// ================================================================================================
// INTERNAL DATA STRUCTURES
// ================================================================================================

/// One storage slot. Payload fields are only meaningful once `state` reads READY.
#[derive(Default)]
struct Entry {
    state: AtomicU8,
    key: AtomicU32,
    val: AtomicU32,
}

impl Entry {
    /// Write the payload and publish it. Caller must own the slot (lock held or CAS won).
    #[inline(always)]
    fn publish(&self, key: Key, val: Value) {
        self.key.store(key, Ordering::Relaxed);
        self.val.store(val, Ordering::Relaxed);
        self.state.store(READY, Ordering::Release);
    }
}

/// Test-and-test-and-set spin lock with bounded spinning before yielding.
#[derive(Default)]
struct SpinLock {
    locked: AtomicBool,
}

struct SpinGuard<'a> {
    lock: &'a SpinLock,
}

impl SpinLock {
    #[inline(always)]
    fn lock(&self) -> SpinGuard<'_> {
        let mut spins = 0;
        loop {
            if !self.locked.load(Ordering::Relaxed)
                && self
                    .locked
                    .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
                    .is_ok()
            {
                return SpinGuard { lock: self };
            }
            delay(&mut spins);
        }
    }
}

impl Drop for SpinGuard<'_> {
    #[inline(always)]
    fn drop(&mut self) {
        self.lock.locked.store(false, Ordering::Release);
    }
}

/// A bucket: its lock, a free-slot hint, and the slots themselves.
#[repr(align(64))]
struct Bucket {
    lock: SpinLock,
    // Every slot below `hint` is known to be claimed.
    hint: AtomicUsize,
    entries: Box<[Entry]>,
}

impl Bucket {
    fn new(capacity: usize) -> Self {
        Self {
            lock: SpinLock::default(),
            hint: AtomicUsize::new(0),
            entries: (0..capacity).map(|_| Entry::default()).collect(),
        }
    }

    /// Claim the first empty slot. Caller holds a lock covering this bucket.
    fn claim_locked(&self, key: Key, val: Value) -> bool {
        let start = self.hint.load(Ordering::Relaxed);
        for (i, e) in self.entries.iter().enumerate().skip(start) {
            if e.state.load(Ordering::Relaxed) == EMPTY {
                e.publish(key, val);
                self.hint.store(i + 1, Ordering::Relaxed);
                return true;
            }
        }
        false
    }

    /// Claim the first empty slot by CAS on its state. Losing a race moves on to the next slot.
    fn claim_cas(&self, key: Key, val: Value) -> bool {
        let start = self.hint.load(Ordering::Relaxed);
        for (i, e) in self.entries.iter().enumerate().skip(start) {
            if e.state.load(Ordering::Relaxed) != EMPTY {
                continue;
            }
            if e
                .state
                .compare_exchange(EMPTY, CLAIMED, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
            {
                e.publish(key, val);
                self.hint.fetch_max(i + 1, Ordering::Relaxed);
                return true;
            }
        }
        false
    }

    /// Value of the first committed entry for `key`, in slot order.
    fn find(&self, key: Key) -> Option<Value> {
        for e in self.entries.iter() {
            match e.state.load(Ordering::Acquire) {
                EMPTY => break,
                READY if e.key.load(Ordering::Relaxed) == key => {
                    return Some(e.val.load(Ordering::Relaxed));
                }
                _ => {}
            }
        }
        None
    }

    /// Committed entries in slot order.
    fn committed(&self) -> impl Iterator<Item = &Entry> {
        self.entries
            .iter()
            .map(|e| (e, e.state.load(Ordering::Acquire)))
            .take_while(|&(_, state)| state != EMPTY)
            .filter(|&(_, state)| state == READY)
            .map(|(e, _)| e)
    }
}

// ================================================================================================
// TABLE
// ================================================================================================

/// Fixed-size concurrent hash table of `u32` keys to `u32` values.
///
/// All methods take `&self`; share the table across threads by reference (scoped threads or
/// an `Arc`). The synchronization used depends on [`TableConfig::strategy`].
pub struct Table {
    config: TableConfig,
    buckets: Box<[Bucket]>,
    // Only used by LockStrategy::CoarseLock.
    table_lock: SpinLock,
}

impl Table {
    /// Allocate every bucket up front. Fails on zero buckets or zero capacity.
    pub fn new(config: TableConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let buckets = (0..config.buckets)
            .map(|_| Bucket::new(config.bucket_capacity))
            .collect();
        Ok(Self {
            config,
            buckets,
            table_lock: SpinLock::default(),
        })
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn strategy(&self) -> LockStrategy {
        self.config.strategy
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn bucket_capacity(&self) -> usize {
        self.config.bucket_capacity
    }

    /// Bucket index for `key`.
    #[inline(always)]
    pub fn bucket_of(&self, key: Key) -> usize {
        key as usize % self.buckets.len()
    }

    /// Store `(key, val)` in the first free slot of the key's bucket.
    ///
    /// Duplicate keys are not merged: each insert takes its own slot. Returns
    /// [`TableError::CapacityExceeded`] when the bucket has no free slot, leaving every
    /// existing entry untouched.
    pub fn insert(&self, key: Key, val: Value) -> Result<(), TableError> {
        let idx = self.bucket_of(key);
        let bucket = &self.buckets[idx];
        let claimed = match self.config.strategy {
            LockStrategy::BucketLock => {
                let _guard = bucket.lock.lock();
                bucket.claim_locked(key, val)
            }
            LockStrategy::CoarseLock => {
                let _guard = self.table_lock.lock();
                bucket.claim_locked(key, val)
            }
            LockStrategy::LockFree => bucket.claim_cas(key, val),
        };
        if claimed {
            Ok(())
        } else {
            Err(TableError::CapacityExceeded {
                bucket: idx,
                capacity: self.config.bucket_capacity,
            })
        }
    }

    /// Value of the first committed entry for `key` in slot order, or `None` if absent.
    pub fn lookup(&self, key: Key) -> Option<Value> {
        let bucket = &self.buckets[self.bucket_of(key)];
        match self.config.strategy {
            LockStrategy::BucketLock => {
                let _guard = bucket.lock.lock();
                bucket.find(key)
            }
            LockStrategy::CoarseLock => {
                let _guard = self.table_lock.lock();
                bucket.find(key)
            }
            LockStrategy::LockFree => bucket.find(key),
        }
    }

    /// Whether `key` has a committed entry.
    pub fn contains_key(&self, key: Key) -> bool {
        self.lookup(key).is_some()
    }

    /// Number of committed entries in bucket `bucket`.
    ///
    /// # Panics
    ///
    /// Panics if `bucket >= self.bucket_count()`.
    pub fn bucket_len(&self, bucket: usize) -> usize {
        self.buckets[bucket].committed().count()
    }

    /// Number of committed entries in the whole table.
    pub fn len(&self) -> usize {
        (0..self.buckets.len()).map(|b| self.bucket_len(b)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(|b| b.committed().next().is_none())
    }

    /// Snapshot of the committed `(key, value)` pairs of one bucket, in slot order.
    ///
    /// # Panics
    ///
    /// Panics if `bucket >= self.bucket_count()`.
    pub fn occupied(&self, bucket: usize) -> Vec<(Key, Value)> {
        self.buckets[bucket]
            .committed()
            .map(|e| (e.key.load(Ordering::Relaxed), e.val.load(Ordering::Relaxed)))
            .collect()
    }
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("config", &self.config)
            .field("len", &self.len())
            .finish()
    }
}

// ================================================================================================
// HELPERS
// ================================================================================================

#[inline(always)]
fn try_spin(spins: &mut i32) -> bool {
    if *spins < SPIN_BEFORE_YIELD {
        *spins += *spins + 1;
        std::hint::spin_loop();
        true
    } else {
        false
    }
}

#[inline(always)]
fn delay(spins: &mut i32) {
    if !try_spin(spins) {
        *spins = 0;
        thread::yield_now();
    }
}
