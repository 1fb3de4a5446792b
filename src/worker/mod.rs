//! Key search workers.
//!
//! This module provides:
//! - A lazy, unbounded stream of candidate keys and addresses
//! - The per-worker match loop with heartbeat, budget and cancellation
//! - A pool that races several workers for the first primary match

mod cpu;
mod pool;
mod stream;

pub use cpu::{Budget, CpuWorker, SearchOutcome, WorkerStats, HEARTBEAT_INTERVAL};
pub use pool::{PoolSummary, SearchResult, WorkerPool};
pub use stream::{Candidate, KeyStream};
