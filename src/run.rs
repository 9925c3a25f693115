//! Orchestration: resolve a configuration into ranges, a pool, and a runner,
//! then dispatch.

use std::fmt;

use crate::config::RunConfig;
use crate::dispatch::{dispatch_ranges, DispatchError, FixedPool, RunReport};
use crate::partition::{chunk_events, PartitionError};
use crate::sim::ParticleGunRunner;

#[derive(Debug)]
pub enum RunError {
    /// Invalid configuration, rejected before anything was dispatched.
    Partition(PartitionError),
    Dispatch(DispatchError),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Partition(err) => write!(f, "invalid configuration: {err}"),
            Self::Dispatch(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Partition(err) => Some(err),
            Self::Dispatch(err) => Some(err),
        }
    }
}

impl From<PartitionError> for RunError {
    fn from(err: PartitionError) -> Self {
        Self::Partition(err)
    }
}

impl From<DispatchError> for RunError {
    fn from(err: DispatchError) -> Self {
        Self::Dispatch(err)
    }
}

/// Run the configured workload to completion with the built-in particle gun.
pub fn execute(config: &RunConfig) -> Result<RunReport, RunError> {
    let ranges = chunk_events(config.total_events, config.worker_count)?;
    let pool = FixedPool::new(config.worker_count);
    let runner = ParticleGunRunner::new(config.seed_policy);
    Ok(dispatch_ranges(&ranges, &config.output_dir, &pool, &runner)?)
}
