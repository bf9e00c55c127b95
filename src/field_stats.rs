//! Population counting over a field snapshot.

use crate::location::Location;
use indexmap::IndexMap;
use std::fmt::{Display, Write};
use std::hash::Hash;

/// Read-only view of a field, classified by population key.
///
/// Simulators hand out a census so that observers can count and render
/// the field without touching the agents.
pub trait Census {
    type Key;

    fn depth(&self) -> usize;

    fn width(&self) -> usize;

    /// Population key of the occupant at `location`, if the cell is occupied.
    fn key_at(&self, location: Location) -> Option<Self::Key>;
}

/// Named running count of one kind of participant.
#[derive(Debug, Clone)]
pub struct Counter {
    name: String,
    count: usize,
}

impl Counter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            count: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn increment(&mut self) {
        self.count += 1;
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }
}

/// Per-step population counts.
///
/// A counting cycle is `reset`, any number of `increment_count`, then
/// `count_finished`. Keys are reported in registration order.
#[derive(Debug, Clone)]
pub struct FieldStats<K> {
    counters: IndexMap<K, Counter>,
    required: Option<K>,
    counting: bool,
    counts_valid: bool,
}

impl<K> FieldStats<K>
where
    K: Copy + Eq + Hash + Display,
{
    /// Create stats tracking `keys`, in that order.
    pub fn new(keys: impl IntoIterator<Item = K>) -> Self {
        let counters = keys
            .into_iter()
            .map(|key| (key, Counter::new(key.to_string())))
            .collect();
        Self {
            counters,
            required: None,
            counting: false,
            counts_valid: false,
        }
    }

    /// Additionally require a nonzero count of `key` for viability.
    pub fn requiring(mut self, key: K) -> Self {
        self.required = Some(key);
        self
    }

    /// Zero every counter and open a counting cycle.
    pub fn reset(&mut self) {
        self.counters.values_mut().for_each(Counter::reset);
        self.counting = true;
        self.counts_valid = false;
    }

    /// Count one more participant of kind `key`.
    ///
    /// # Panics
    /// Panics if no counting cycle is open.
    pub fn increment_count(&mut self, key: K) {
        assert!(
            self.counting,
            "increment_count called outside a reset/count_finished cycle"
        );
        self.counters
            .entry(key)
            .or_insert_with(|| Counter::new(key.to_string()))
            .increment();
    }

    /// Close the current counting cycle.
    pub fn count_finished(&mut self) {
        self.counting = false;
        self.counts_valid = true;
    }

    pub fn counts_valid(&self) -> bool {
        self.counts_valid
    }

    /// Count of `key` from the last finished cycle.
    pub fn count(&self, key: K) -> usize {
        self.counters.get(&key).map_or(0, Counter::count)
    }

    /// Counters in registration order.
    pub fn counters(&self) -> impl Iterator<Item = (K, &Counter)> {
        self.counters.iter().map(|(&key, counter)| (key, counter))
    }

    /// Recount the whole field.
    pub fn generate_counts<C: Census<Key = K> + ?Sized>(&mut self, census: &C) {
        self.reset();
        for row in 0..census.depth() {
            for col in 0..census.width() {
                if let Some(key) = census.key_at(Location::new(row, col)) {
                    self.increment_count(key);
                }
            }
        }
        self.count_finished();
    }

    /// Number of `key` participants currently in the field.
    pub fn population_count<C: Census<Key = K> + ?Sized>(&mut self, census: &C, key: K) -> usize {
        self.generate_counts(census);
        self.count(key)
    }

    /// Human-readable summary of every counter.
    pub fn population_details<C: Census<Key = K> + ?Sized>(&mut self, census: &C) -> String {
        if !self.counts_valid {
            self.generate_counts(census);
        }
        let mut details = String::new();
        for counter in self.counters.values() {
            // Writing to a String cannot fail.
            let _ = write!(details, "{}: {} ", counter.name(), counter.count());
        }
        details
    }

    /// Whether the counted populations still make an interesting run.
    ///
    /// At least two kinds must be present and, if a required key was set,
    /// that kind must be present too.
    pub fn is_viable<C: Census<Key = K> + ?Sized>(&mut self, census: &C) -> bool {
        if !self.counts_valid {
            self.generate_counts(census);
        }
        let non_zero = self
            .counters
            .values()
            .filter(|counter| counter.count() > 0)
            .count();
        let required_present = self.required.is_none_or(|key| self.count(key) > 0);
        non_zero > 1 && required_present
    }
}
