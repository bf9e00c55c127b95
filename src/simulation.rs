//! Interface shared by both simulators.

use anyhow::{Context, Result};
use rand::TryRngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Available simulation models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Model {
    /// Foxes hunting rabbits.
    Foxes,
    /// Disease spreading through a crowd.
    Pandemic,
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Model::Foxes => f.write_str("foxes"),
            Model::Pandemic => f.write_str("pandemic"),
        }
    }
}

/// Commands and queries an external driver issues to a simulator.
pub trait Simulation {
    /// Seed of the simulator's random number generator.
    fn seed(&self) -> u64;

    /// Current step (zero right after a reset).
    fn step(&self) -> usize;

    /// Clear the field and populate it from scratch.
    fn reset(&mut self);

    /// Advance the simulation by one step and return the new step.
    fn simulate_one_step(&mut self) -> usize;

    /// Whether the driver should keep stepping after `step`.
    fn is_viable(&mut self, step: usize) -> bool;

    /// Count of every population, in a stable order.
    fn population_counts(&mut self) -> Vec<(String, usize)>;

    /// Human-readable summary of every population.
    fn population_details(&mut self) -> String;
}

/// Use `seed` if given, or draw a fresh one from the OS.
///
/// Drawn seeds fit in a TOML integer.
pub fn resolve_seed(seed: Option<u64>) -> Result<u64> {
    match seed {
        Some(seed) => Ok(seed),
        None => {
            let seed = OsRng.try_next_u64().context("failed to draw seed from the OS")?;
            Ok(seed >> 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_seed_is_kept() {
        assert_eq!(resolve_seed(Some(u64::MAX)).expect("failed to resolve seed"), u64::MAX);
    }

    #[test]
    fn drawn_seed_fits_in_i64() {
        for _ in 0..16 {
            let seed = resolve_seed(None).expect("failed to resolve seed");
            assert!(i64::try_from(seed).is_ok());
        }
    }
}
