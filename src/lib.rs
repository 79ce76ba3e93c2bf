//! bucketmap: a fixed-capacity bucketed hash table for concurrent inserters and readers,
//! plus the two-phase put/get benchmark that drives it.
//!
//! The table never resizes and never deletes. Bucket access is synchronized by a per-bucket
//! spin lock, a per-entry CAS claim, or (as a baseline) one table-wide lock; see
//! [`LockStrategy`].

pub mod bench;
pub mod config;
pub mod error;
pub mod keys;
pub mod table;

pub use bench::{run, run_with, BenchReport, WorkerMisses};
pub use config::{BenchConfig, LockStrategy, TableConfig};
pub use error::{BenchError, ConfigError, TableError};
pub use keys::KeySet;
pub use table::{Key, Table, Value};
