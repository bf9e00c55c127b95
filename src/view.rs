//! Observers of a running simulation.

use crate::field_stats::{Census, FieldStats};
use std::fmt::Display;
use std::hash::Hash;

/// Collaborator notified by a simulator on reset and after every step.
///
/// Views only get read access to the field. The first view attached to a
/// simulator decides whether the field is still viable.
pub trait View<K> {
    /// Prepare for a new run.
    fn reset(&mut self) {}

    /// Show the state of the field at `step`.
    fn show_status(&mut self, step: usize, census: &dyn Census<Key = K>);

    /// Whether the simulation should keep going.
    fn is_viable(&mut self, _census: &dyn Census<Key = K>) -> bool {
        true
    }
}

/// Headless view that counts the field after every step and logs the
/// population details.
pub struct StatsView<K> {
    stats: FieldStats<K>,
    details: String,
}

impl<K> StatsView<K>
where
    K: Copy + Eq + Hash + Display,
{
    pub fn new(stats: FieldStats<K>) -> Self {
        Self {
            stats,
            details: String::new(),
        }
    }

    pub fn stats(&self) -> &FieldStats<K> {
        &self.stats
    }

    /// Population details of the last status shown.
    pub fn details(&self) -> &str {
        &self.details
    }
}

impl<K> View<K> for StatsView<K>
where
    K: Copy + Eq + Hash + Display,
{
    fn reset(&mut self) {
        self.details.clear();
    }

    fn show_status(&mut self, step: usize, census: &dyn Census<Key = K>) {
        self.stats.generate_counts(census);
        self.details = self.stats.population_details(census);
        log::debug!("step {step}: {}", self.details);
    }

    fn is_viable(&mut self, census: &dyn Census<Key = K>) -> bool {
        self.stats.is_viable(census)
    }
}
