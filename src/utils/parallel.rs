//! Parallel processing utilities

use crate::error::{InterpretError, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Configuration for parallel processing across features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelConfig {
    /// Whether per-feature work runs on the rayon pool
    pub enabled: bool,
    /// Number of threads (None = rayon's global pool)
    pub n_threads: Option<usize>,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            n_threads: None,
        }
    }
}

impl ParallelConfig {
    /// Create a new parallel configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Run everything on the calling thread
    pub fn sequential() -> Self {
        Self {
            enabled: false,
            n_threads: None,
        }
    }

    /// Set number of threads
    pub fn with_threads(mut self, n: usize) -> Self {
        self.n_threads = Some(n);
        self
    }

    /// Get the number of threads to use
    pub fn num_threads(&self) -> usize {
        if !self.enabled {
            return 1;
        }
        self.n_threads.unwrap_or_else(rayon::current_num_threads)
    }
}

/// Fallible map over `items`, preserving input order
///
/// The first error (in input order) is returned when any call fails.
pub fn try_parallel_map<T, U, F>(items: &[T], config: &ParallelConfig, f: F) -> Result<Vec<U>>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> Result<U> + Send + Sync,
{
    if !config.enabled || items.len() < 2 {
        return items.iter().map(f).collect();
    }

    let results: Vec<Result<U>> = match config.n_threads {
        None => items.par_iter().map(f).collect(),
        Some(n) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| InterpretError::ThreadPoolError(e.to_string()))?;
            pool.install(|| items.par_iter().map(&f).collect())
        }
    };
    results.into_iter().collect()
}
