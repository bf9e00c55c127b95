//! Resolution of meetings between neighbouring animals.

use crate::foxes::Species;
use anyhow::{Context, Result};
use std::collections::HashMap;

/// Unordered pair of species.
///
/// The pair is stored sorted, so the order of construction does not matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncounterKey(Species, Species);

impl EncounterKey {
    pub fn new(a: Species, b: Species) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }
}

/// What happens when two species meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The predator eats the prey.
    Predation { predator: Species, prey: Species },
}

impl Outcome {
    pub fn description(&self) -> String {
        match self {
            Outcome::Predation { predator, prey } => format!(
                "{predator} meets {prey}.\nDoesn't end well for {}",
                prey.to_string().to_lowercase()
            ),
        }
    }

    /// Prey of `species` in this outcome, if `species` is the predator.
    pub fn prey_of(&self, species: Species) -> Option<Species> {
        match *self {
            Outcome::Predation { predator, prey } if predator == species => Some(prey),
            Outcome::Predation { .. } => None,
        }
    }
}

/// Symmetric table of encounter outcomes.
#[derive(Debug, Clone)]
pub struct EncounterTable {
    outcomes: HashMap<EncounterKey, Outcome>,
}

impl Default for EncounterTable {
    /// Foxes eat rabbits.
    fn default() -> Self {
        let mut table = Self::empty();
        table.register(
            Species::Fox,
            Species::Rabbit,
            Outcome::Predation {
                predator: Species::Fox,
                prey: Species::Rabbit,
            },
        );
        table
    }
}

impl EncounterTable {
    pub fn empty() -> Self {
        Self {
            outcomes: HashMap::new(),
        }
    }

    pub fn register(&mut self, a: Species, b: Species, outcome: Outcome) {
        self.outcomes.insert(EncounterKey::new(a, b), outcome);
    }

    /// Whether the two species have a registered encounter.
    pub fn interacts(&self, a: Species, b: Species) -> bool {
        self.outcomes.contains_key(&EncounterKey::new(a, b))
    }

    pub fn get(&self, a: Species, b: Species) -> Option<&Outcome> {
        self.outcomes.get(&EncounterKey::new(a, b))
    }

    /// Outcome of a meeting between `a` and `b`.
    ///
    /// # Errors
    /// Returns an error if the pair has no registered encounter.
    pub fn outcome(&self, a: Species, b: Species) -> Result<&Outcome> {
        self.get(a, b)
            .with_context(|| format!("unhandled encounter between {a} and {b}"))
    }
}
