//! Two-phase put/get benchmark: every worker inserts its key slice, then every worker looks
//! its slice back up and counts misses.

use std::io::{self, Write};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, error, warn};

use crate::config::BenchConfig;
use crate::error::{BenchError, TableError};
use crate::keys::KeySet;
use crate::table::{Key, Table, Value};

/// Miss count of one get-phase worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerMisses {
    pub worker: usize,
    pub missing: usize,
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchReport {
    pub put_elapsed: Duration,
    pub get_elapsed: Duration,
    /// One entry per worker, in worker-index order.
    pub misses: Vec<WorkerMisses>,
}

impl BenchReport {
    pub fn total_missing(&self) -> usize {
        self.misses.iter().map(|m| m.missing).sum()
    }

    /// Write the timing lines followed by one miss line per worker.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(
            out,
            "completion time for put phase = {:.6}",
            self.put_elapsed.as_secs_f64()
        )?;
        writeln!(
            out,
            "completion time for get phase = {:.6}",
            self.get_elapsed.as_secs_f64()
        )?;
        for m in &self.misses {
            writeln!(out, "{}: {} keys missing", m.worker, m.missing)?;
        }
        Ok(())
    }
}

/// Generate keys, build the table and run both phases.
pub fn run(config: &BenchConfig) -> Result<BenchReport, BenchError> {
    config.validate()?;

    let cpus = thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    if config.threads > cpus {
        warn!(
            threads = config.threads,
            cpus, "more workers than available cores; timings include oversubscription"
        );
    }

    let keys = KeySet::generate(config.keys, config.seed);
    let table = Table::new(config.table)?;
    run_with(&table, &keys, config.threads)
}

/// Run both phases against a caller-provided table and key set.
pub fn run_with(table: &Table, keys: &KeySet, threads: usize) -> Result<BenchReport, BenchError> {
    let slices = keys.partition(threads)?;

    debug!(
        threads,
        keys = keys.len(),
        strategy = %table.strategy(),
        "starting put phase"
    );
    let start = Instant::now();
    put_phase(table, &slices)?;
    let put_elapsed = start.elapsed();
    debug!(elapsed = ?put_elapsed, entries = table.len(), "put phase done");
    for b in 0..table.bucket_count() {
        debug!(bucket = b, occupied = table.bucket_len(b), "bucket occupancy");
    }

    let start = Instant::now();
    let counts = get_phase(table, &slices)?;
    let get_elapsed = start.elapsed();
    debug!(elapsed = ?get_elapsed, "get phase done");

    let misses = counts
        .into_iter()
        .enumerate()
        .map(|(worker, missing)| WorkerMisses { worker, missing })
        .collect();
    Ok(BenchReport {
        put_elapsed,
        get_elapsed,
        misses,
    })
}

/// Worker `i` inserts each key of `slices[i]` with value `i`.
pub fn put_phase(table: &Table, slices: &[&[Key]]) -> Result<(), BenchError> {
    run_phase(slices, "put", |worker, slice| {
        let value = worker as Value;
        for &k in slice {
            table.insert(k, value)?;
        }
        Ok::<(), TableError>(())
    })?
    .into_iter()
    .enumerate()
    .try_for_each(|(worker, res)| {
        res.map_err(|source| {
            error!(worker, %source, "put worker failed");
            BenchError::Table { worker, source }
        })
    })
}

/// Worker `i` looks up each key of `slices[i]`; returns per-worker miss counts.
pub fn get_phase(table: &Table, slices: &[&[Key]]) -> Result<Vec<usize>, BenchError> {
    run_phase(slices, "get", |_, slice| {
        slice.iter().filter(|&&k| table.lookup(k).is_none()).count()
    })
}

/// Spawn one scoped thread per slice, join them all, and collect results in worker order.
fn run_phase<'a, T, F>(slices: &[&'a [Key]], phase: &str, work: F) -> Result<Vec<T>, BenchError>
where
    T: Send,
    F: Fn(usize, &'a [Key]) -> T + Sync,
{
    let work = &work;
    thread::scope(|s| {
        let mut handles = Vec::with_capacity(slices.len());
        let mut spawn_err = None;
        for (worker, &slice) in slices.iter().enumerate() {
            let spawned = thread::Builder::new()
                .name(format!("{}-{}", phase, worker))
                .spawn_scoped(s, move || work(worker, slice));
            match spawned {
                Ok(h) => handles.push(h),
                Err(source) => {
                    error!(worker, phase, %source, "failed to spawn worker");
                    spawn_err = Some(BenchError::Spawn { worker, source });
                    break;
                }
            }
        }

        // join everything already started even when a spawn failed
        let mut results = Vec::with_capacity(handles.len());
        let mut join_err = None;
        for (worker, h) in handles.into_iter().enumerate() {
            match h.join() {
                Ok(r) => results.push(r),
                Err(_) => {
                    error!(worker, phase, "worker panicked");
                    if join_err.is_none() {
                        join_err = Some(BenchError::WorkerPanicked { worker });
                    }
                }
            }
        }

        match spawn_err.or(join_err) {
            Some(e) => Err(e),
            None => Ok(results),
        }
    })
}
