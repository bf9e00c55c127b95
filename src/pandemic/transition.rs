//! Probabilistic state machine of the epidemic model.

use crate::config::{MortalityEvent, PandemicConfig};
use crate::pandemic::{Event, State};
use rand::Rng;
use std::collections::HashMap;

/// Binary outcome of a registered `(state, event)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    /// State reached when the event happens.
    pub happens: State,
    /// State reached otherwise.
    pub otherwise: State,
}

/// Table mapping `(state, event)` to a probabilistic [`Rule`].
///
/// Pairs without an entry leave the state unchanged.
#[derive(Debug, Clone)]
pub struct TransitionTable {
    rules: HashMap<(State, Event), Rule>,
}

impl TransitionTable {
    /// Build the table of the epidemic model.
    ///
    /// A healthy human exposed to the infection rate may become infected,
    /// and an infected human at the end of its infection either dies or
    /// recovers, weighed by `mortality_event`.
    pub fn new(mortality_event: MortalityEvent) -> Self {
        let mut table = Self::empty();
        table.register(
            State::Healthy,
            Event::InfectionRate,
            Rule {
                happens: State::Infected,
                otherwise: State::Healthy,
            },
        );
        table.register(
            State::Infected,
            mortality_event.event(),
            Rule {
                happens: State::Dead,
                otherwise: State::Recovered,
            },
        );
        table
    }

    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Add or replace the rule of a `(state, event)` pair.
    pub fn register(&mut self, state: State, event: Event, rule: Rule) {
        self.rules.insert((state, event), rule);
    }

    pub fn rule(&self, state: State, event: Event) -> Option<&Rule> {
        self.rules.get(&(state, event))
    }

    /// Next state of a human in `state` exposed to `event`.
    ///
    /// Draws a uniform value in `[0, 1)` and takes the `happens` branch when
    /// it is below the event probability, so probabilities of 0 and 1 are
    /// deterministic. Unregistered pairs return `state` without drawing.
    pub fn next_state<R: Rng>(
        &self,
        state: State,
        event: Event,
        config: &PandemicConfig,
        rng: &mut R,
    ) -> State {
        match self.rule(state, event) {
            Some(rule) => {
                if rng.random::<f64>() < config.probability(event) {
                    rule.happens
                } else {
                    rule.otherwise
                }
            }
            None => state,
        }
    }
}
