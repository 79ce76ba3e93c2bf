use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use bucketmap_rs::config::{DEFAULT_BUCKETS, DEFAULT_BUCKET_CAPACITY, DEFAULT_KEYS, DEFAULT_SEED};
use bucketmap_rs::{BenchConfig, LockStrategy, TableConfig};

#[derive(Parser, Debug)]
#[command(name = "bucketmap")]
#[command(about = "Concurrent put/get benchmark over a fixed-capacity bucketed hash table")]
struct Cli {
    /// Number of worker threads per phase (must divide the key count)
    nthread: usize,

    /// Number of keys to insert and look up
    #[arg(long, default_value_t = DEFAULT_KEYS)]
    keys: usize,

    /// Number of buckets
    #[arg(long, default_value_t = DEFAULT_BUCKETS)]
    buckets: usize,

    /// Entries per bucket
    #[arg(long, default_value_t = DEFAULT_BUCKET_CAPACITY)]
    capacity: usize,

    /// Key generator seed
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Bucket synchronization strategy
    #[arg(long, value_enum, default_value_t = LockStrategy::BucketLock)]
    strategy: LockStrategy,
}

impl Cli {
    fn bench_config(&self) -> BenchConfig {
        BenchConfig {
            keys: self.keys,
            threads: self.nthread,
            seed: self.seed,
            table: TableConfig::new(self.buckets, self.capacity, self.strategy),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let report = match bucketmap_rs::run(&cli.bench_config()) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = report.write_to(&mut out).and_then(|_| out.flush()) {
        eprintln!("error: failed to write report: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
