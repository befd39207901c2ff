//! Utility functions and types

pub(crate) mod non_finite;
mod parallel;

pub use parallel::{try_parallel_map, ParallelConfig};
