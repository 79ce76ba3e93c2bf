//! Table and benchmark configuration with the reference-run defaults.

use crate::error::ConfigError;

/// Number of buckets in the reference table.
pub const DEFAULT_BUCKETS: usize = 5;

/// Slots per bucket in the reference table.
pub const DEFAULT_BUCKET_CAPACITY: usize = 1_000_000;

/// Keys inserted and looked up in the reference run.
pub const DEFAULT_KEYS: usize = 100_000;

/// Seed for the key generator.
pub const DEFAULT_SEED: u64 = 0;

/// How concurrent access to buckets is synchronized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LockStrategy {
    /// One spin lock per bucket, taken by both insert and lookup.
    #[default]
    BucketLock,
    /// Per-entry compare-and-set claim; lookups take no lock.
    LockFree,
    /// One lock for the whole table. Baseline for comparison only.
    CoarseLock,
}

impl std::fmt::Display for LockStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LockStrategy::BucketLock => "bucket-lock",
            LockStrategy::LockFree => "lock-free",
            LockStrategy::CoarseLock => "coarse-lock",
        };
        f.write_str(name)
    }
}

/// Shape of a [`Table`](crate::Table). Fixed for the lifetime of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableConfig {
    pub buckets: usize,
    pub bucket_capacity: usize,
    pub strategy: LockStrategy,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            buckets: DEFAULT_BUCKETS,
            bucket_capacity: DEFAULT_BUCKET_CAPACITY,
            strategy: LockStrategy::default(),
        }
    }
}

impl TableConfig {
    pub fn new(buckets: usize, bucket_capacity: usize, strategy: LockStrategy) -> Self {
        Self {
            buckets,
            bucket_capacity,
            strategy,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buckets == 0 {
            return Err(ConfigError::NoBuckets);
        }
        if self.bucket_capacity == 0 {
            return Err(ConfigError::NoCapacity);
        }
        Ok(())
    }
}

/// Parameters of one put/get benchmark run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchConfig {
    pub keys: usize,
    pub threads: usize,
    pub seed: u64,
    pub table: TableConfig,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            keys: DEFAULT_KEYS,
            threads: 1,
            seed: DEFAULT_SEED,
            table: TableConfig::default(),
        }
    }
}

impl BenchConfig {
    /// Reference configuration with the given thread count.
    pub fn with_threads(threads: usize) -> Self {
        Self {
            threads,
            ..Self::default()
        }
    }

    /// Checks every precondition the harness relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threads == 0 {
            return Err(ConfigError::NoThreads);
        }
        if self.keys % self.threads != 0 {
            return Err(ConfigError::UnevenPartition {
                keys: self.keys,
                threads: self.threads,
            });
        }
        self.table.validate()
    }

    /// Keys handled by each worker.
    pub fn slice_len(&self) -> usize {
        self.keys / self.threads
    }
}
