//! Error types for the table, its configuration and the benchmark harness.

use std::io;

/// Rejected configuration, detected before any worker thread exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Thread count of zero.
    NoThreads,
    /// The key set cannot be split into equal slices.
    UnevenPartition { keys: usize, threads: usize },
    /// Table with no buckets.
    NoBuckets,
    /// Buckets with no slots.
    NoCapacity,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NoThreads => write!(f, "thread count must be positive"),
            ConfigError::UnevenPartition { keys, threads } => write!(
                f,
                "{} keys cannot be split evenly across {} threads",
                keys, threads
            ),
            ConfigError::NoBuckets => write!(f, "table must have at least one bucket"),
            ConfigError::NoCapacity => write!(f, "bucket capacity must be positive"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Table operation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// Every slot of the target bucket is already claimed.
    CapacityExceeded { bucket: usize, capacity: usize },
}

impl std::fmt::Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableError::CapacityExceeded { bucket, capacity } => write!(
                f,
                "bucket {} is full ({} entries); table is undersized for the key distribution",
                bucket, capacity
            ),
        }
    }
}

impl std::error::Error for TableError {}

/// Fatal harness errors. Any of these aborts the run without a report.
#[derive(Debug)]
pub enum BenchError {
    /// Invalid configuration.
    Config(ConfigError),
    /// A put worker hit a full bucket.
    Table { worker: usize, source: TableError },
    /// The OS refused to create a worker thread.
    Spawn { worker: usize, source: io::Error },
    /// A worker thread panicked before finishing its slice.
    WorkerPanicked { worker: usize },
}

impl std::fmt::Display for BenchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BenchError::Config(e) => write!(f, "invalid configuration: {}", e),
            BenchError::Table { worker, source } => {
                write!(f, "worker {} failed to insert: {}", worker, source)
            }
            BenchError::Spawn { worker, source } => {
                write!(f, "failed to spawn worker {}: {}", worker, source)
            }
            BenchError::WorkerPanicked { worker } => write!(f, "worker {} panicked", worker),
        }
    }
}

impl std::error::Error for BenchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BenchError::Config(e) => Some(e),
            BenchError::Table { source, .. } => Some(source),
            BenchError::Spawn { source, .. } => Some(source),
            BenchError::WorkerPanicked { .. } => None,
        }
    }
}

impl From<ConfigError> for BenchError {
    fn from(e: ConfigError) -> Self {
        BenchError::Config(e)
    }
}
