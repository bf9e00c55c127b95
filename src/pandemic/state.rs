use serde::{Deserialize, Serialize};
use std::fmt;

/// Health category of a human.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum State {
    Healthy,
    Infected,
    Recovered,
    Dead,
}

impl State {
    pub const ALL: [State; 4] = [State::Healthy, State::Infected, State::Recovered, State::Dead];

    /// Stable display label.
    pub fn label(self) -> &'static str {
        match self {
            State::Healthy => "healthy (h)",
            State::Infected => "infected (i)",
            State::Recovered => "recovered (r)",
            State::Dead => "dead (rip)",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Named probabilistic trigger that may change a human's state.
///
/// The probability attached to each event lives in
/// [`PandemicConfig`](crate::config::PandemicConfig).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Event {
    InfectionRate,
    MortalityRate,
    InfectionDuration,
}
