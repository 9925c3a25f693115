//! Built-in particle-gun event source.
//!
//! Stands in for the external detector simulation: each event gets primary
//! particles drawn from a deterministic generator, written as one
//! `particles.csv` per chunk directory. Event content depends only on the
//! generator seed and the event index, never on the chunk bounds, so
//! re-partitioning a run does not change what any event contains.

use std::f64::consts::PI;
use std::path::Path;

use tracing::debug;

use crate::partition::EventRange;
use crate::sim::rng::{mix64, Rng};
use crate::sim::{SeedPolicy, SimulationError, SimulationRunner};

/// Output file written into each chunk directory.
pub const PARTICLES_FILE: &str = "particles.csv";

/// Pseudorapidity window for generated particles.
pub const ETA_RANGE: (f64, f64) = (-2.0, 2.0);
/// Transverse momentum window, GeV.
pub const PT_RANGE_GEV: (f64, f64) = (1.0, 10.0);

#[derive(Debug, Clone, Copy)]
pub struct ParticleGunRunner {
    seed_policy: SeedPolicy,
    particles_per_event: usize,
}

impl ParticleGunRunner {
    pub fn new(seed_policy: SeedPolicy) -> Self {
        Self {
            seed_policy,
            particles_per_event: 1,
        }
    }

    /// Emit `count` particles per event instead of one.
    pub fn with_particles_per_event(mut self, count: usize) -> Self {
        self.particles_per_event = count.max(1);
        self
    }
}

impl SimulationRunner for ParticleGunRunner {
    fn run(&self, range: EventRange, output_dir: &Path) -> Result<(), SimulationError> {
        let path = output_dir.join(PARTICLES_FILE);
        let mut writer = csv::Writer::from_path(&path).map_err(SimulationError::Csv)?;
        writer
            .write_record(["event_id", "particle_id", "eta", "phi", "pt_gev", "charge"])
            .map_err(SimulationError::Csv)?;

        let stream_seed = self.seed_policy.seed_for(range);
        for event_id in range.begin..range.end {
            // Each event branches off (stream seed, event index), not the
            // chunk bounds: under a shared seed, event 7 reads the same
            // whether its chunk was [0, 10) or [5, 10).
            let mut rng = Rng::new(mix64(stream_seed ^ mix64(event_id as u64)));
            for particle_id in 0..self.particles_per_event {
                let eta = rng.uniform(ETA_RANGE.0, ETA_RANGE.1);
                let phi = rng.uniform(-PI, PI);
                let pt = rng.uniform(PT_RANGE_GEV.0, PT_RANGE_GEV.1);
                let charge = if rng.next_u64() & 1 == 0 { 1 } else { -1 };
                writer
                    .write_record([
                        event_id.to_string(),
                        particle_id.to_string(),
                        format!("{eta:.6}"),
                        format!("{phi:.6}"),
                        format!("{pt:.6}"),
                        charge.to_string(),
                    ])
                    .map_err(SimulationError::Csv)?;
            }
        }

        writer.flush().map_err(|source| SimulationError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(
            begin = range.begin,
            end = range.end,
            path = %path.display(),
            "particle gun chunk written"
        );
        Ok(())
    }
}
