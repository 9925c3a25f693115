//! Parallel driver for a detector-simulation workload.
//!
//! Partitions a fixed number of events into contiguous half-open chunks,
//! dispatches one simulation invocation per chunk across a bounded worker
//! pool, writes each chunk's output into its own `process_<begin>_<end>`
//! subdirectory, and reports total wall-clock time. The simulation itself
//! sits behind [sim::SimulationRunner]; the concurrency backend sits behind
//! [dispatch::WorkerPool].

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod partition;
pub mod run;
pub mod sim;

pub use config::RunConfig;
pub use dispatch::{dispatch_ranges, FixedPool, RunReport, WorkerPool};
pub use partition::{chunk_events, EventRange, PartitionError, PartitionRequest};
pub use run::{execute, RunError};
pub use sim::{ParticleGunRunner, SeedPolicy, SimulationError, SimulationRunner};
