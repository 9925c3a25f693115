//! The simulation-runner seam.
//!
//! The dispatcher drives anything implementing [SimulationRunner]; the crate
//! ships the particle gun in [particle_gun] as its concrete runner. Seed
//! handling is an explicit [SeedPolicy] value rather than a constant buried
//! in the runner, so callers choose between the reproducible-but-correlated
//! shared stream and independent per-chunk streams.

pub mod particle_gun;
pub mod rng;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_SEED;
use crate::partition::EventRange;

pub use particle_gun::ParticleGunRunner;
pub use rng::Rng;

/// One simulation invocation over one event chunk.
///
/// Implementations write their output under `output_dir` (already created by
/// the dispatcher) and report failure by returning an error; everything else
/// about them is opaque to the dispatch layer. `Sync` because one runner
/// instance is shared by all workers of a run.
pub trait SimulationRunner: Sync {
    fn run(&self, range: EventRange, output_dir: &Path) -> Result<(), SimulationError>;
}

#[derive(Debug)]
pub enum SimulationError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Csv(csv::Error),
    /// Failure internal to a runner implementation.
    Runner(String),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "i/o error at {}: {source}", path.display())
            }
            Self::Csv(err) => write!(f, "failed to write simulation output: {err}"),
            Self::Runner(message) => write!(f, "simulation failed: {message}"),
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv(err) => Some(err),
            Self::Runner(_) => None,
        }
    }
}

/// How each chunk's random stream seed is derived.
///
/// `Shared` hands every chunk the same base seed: output is reproducible and
/// independent of which worker runs the chunk, at the cost of correlated
/// streams between chunks. `PerRange` mixes the chunk bounds into the base
/// seed so each chunk draws from its own stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", content = "seed", rename_all = "snake_case")]
pub enum SeedPolicy {
    Shared(u64),
    PerRange(u64),
}

impl SeedPolicy {
    /// Stream seed for one chunk. Deterministic in the policy and the range.
    pub fn seed_for(&self, range: EventRange) -> u64 {
        match *self {
            Self::Shared(seed) => seed,
            Self::PerRange(seed) => rng::mix64(
                seed ^ rng::mix64(range.begin as u64).rotate_left(17)
                    ^ rng::mix64(range.end as u64),
            ),
        }
    }
}

impl Default for SeedPolicy {
    fn default() -> Self {
        Self::Shared(DEFAULT_SEED)
    }
}
