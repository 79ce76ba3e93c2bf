//! Deterministic key generation and per-worker partitioning.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::ConfigError;
use crate::table::Key;

/// Largest generated key; keys fall in `1..=MAX_KEY`.
pub const MAX_KEY: Key = i32::MAX as Key;

/// Ordered, seed-reproducible set of strictly positive keys.
///
/// Keys are not unique; duplicates are expected and harmless.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySet {
    keys: Vec<Key>,
}

impl KeySet {
    /// Generate `count` keys from a `StdRng` seeded with `seed`.
    pub fn generate(count: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let keys = (0..count).map(|_| rng.gen_range(1..=MAX_KEY)).collect();
        Self { keys }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn as_slice(&self) -> &[Key] {
        &self.keys
    }

    /// Split into `parts` equal contiguous slices in generation order; slice `i` belongs to
    /// worker `i`.
    pub fn partition(&self, parts: usize) -> Result<Vec<&[Key]>, ConfigError> {
        if parts == 0 {
            return Err(ConfigError::NoThreads);
        }
        if self.keys.len() % parts != 0 {
            return Err(ConfigError::UnevenPartition {
                keys: self.keys.len(),
                threads: parts,
            });
        }
        let chunk = self.keys.len() / parts;
        if chunk == 0 {
            // empty key set: every worker gets an empty slice
            return Ok(vec![&self.keys[..]; parts]);
        }
        Ok(self.keys.chunks_exact(chunk).collect())
    }
}

impl From<Vec<Key>> for KeySet {
    fn from(keys: Vec<Key>) -> Self {
        Self { keys }
    }
}
