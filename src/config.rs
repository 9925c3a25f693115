//! Run configuration with documented defaults.
//!
//! Everything the entry point needs is an explicit input: total event count
//! (default 100), worker count (host CPUs minus a two-CPU reservation,
//! floored at two), seed policy (shared seed 42) and the output base path
//! (current working directory).

use std::path::PathBuf;
use std::thread;

use serde::{Deserialize, Serialize};

use crate::sim::SeedPolicy;

/// Events processed when no count is given.
pub const DEFAULT_TOTAL_EVENTS: usize = 100;
/// Host CPUs withheld from the worker pool for overhead and host processes.
pub const DEFAULT_CPU_RESERVATION: usize = 2;
/// Base seed when none is given.
pub const DEFAULT_SEED: u64 = 42;
/// The pool never shrinks below this, whatever the host reports.
pub const MIN_WORKER_COUNT: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub total_events: usize,
    /// Pool size; also the input to the chunk-length divisor.
    pub worker_count: usize,
    pub seed_policy: SeedPolicy,
    /// Chunk directories are created beneath this path.
    pub output_dir: PathBuf,
}

impl RunConfig {
    /// Defaults sized to this host: `max(cpus - reservation, 2)` workers,
    /// writing beneath the current working directory.
    pub fn for_host() -> Self {
        Self {
            total_events: DEFAULT_TOTAL_EVENTS,
            worker_count: host_worker_count(DEFAULT_CPU_RESERVATION),
            seed_policy: SeedPolicy::Shared(DEFAULT_SEED),
            output_dir: PathBuf::from("."),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::for_host()
    }
}

/// Worker count for this host: available CPUs minus `reservation`, floored
/// at [MIN_WORKER_COUNT].
pub fn host_worker_count(reservation: usize) -> usize {
    let cpus = thread::available_parallelism()
        .map(|count| count.get())
        .unwrap_or(MIN_WORKER_COUNT);
    cpus.saturating_sub(reservation).max(MIN_WORKER_COUNT)
}
