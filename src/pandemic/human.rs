use crate::config::PandemicConfig;
use crate::field::Field;
use crate::location::Location;
use crate::pandemic::transition::TransitionTable;
use crate::pandemic::{Event, State};
use rand::Rng;
use rand::seq::IndexedRandom;

/// Handle of a human in the simulator's population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HumanId(pub usize);

/// Person living in the epidemic field.
#[derive(Debug, Clone)]
pub struct Human {
    state: State,
    location: Location,
    contamination: u32,
}

impl Human {
    /// Create a human in `state` at `location`.
    ///
    /// Infected humans start with a contamination of one.
    pub fn new(state: State, location: Location) -> Self {
        let contamination = if state == State::Infected { 1 } else { 0 };
        Self {
            state,
            location,
            contamination,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn contamination(&self) -> u32 {
        self.contamination
    }

    /// Step to a random free neighbouring cell, or stay if there is none.
    pub fn move_on<R: Rng>(&mut self, id: HumanId, field: &mut Field<HumanId>, rng: &mut R) {
        let free = field.free_adjacent_locations(self.location);
        if let Some(&new_location) = free.choose(rng) {
            field.clear_location(self.location);
            self.location = new_location;
            field.place(id, new_location);
        }
    }

    /// Exposure of a non-infected human to its neighbours.
    ///
    /// Every infected neighbour is one draw on the infection rate, taken in
    /// neighbour order against the state left by the previous draw.
    pub fn act<R: Rng>(
        &mut self,
        neighbours: &[State],
        table: &TransitionTable,
        config: &PandemicConfig,
        rng: &mut R,
    ) {
        for &neighbour in neighbours {
            if neighbour != State::Infected {
                continue;
            }
            if matches!(self.state, State::Healthy | State::Recovered) {
                self.state = table.next_state(self.state, Event::InfectionRate, config, rng);
            }
        }
    }

    /// Course of the disease for an infected human.
    ///
    /// Once the contamination exceeds its maximum the human dies or
    /// recovers according to the configured mortality event.
    pub fn infected_behaviour<R: Rng>(
        &mut self,
        table: &TransitionTable,
        config: &PandemicConfig,
        rng: &mut R,
    ) {
        self.contamination += 1;
        if self.contamination > config.max_contamination {
            let event = config.mortality_event.event();
            self.state = table.next_state(self.state, event, config, rng);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MortalityEvent;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    fn rng() -> ChaCha12Rng {
        ChaCha12Rng::seed_from_u64(7)
    }

    #[test]
    fn infected_start_contaminated() {
        assert_eq!(Human::new(State::Infected, Location::new(0, 0)).contamination(), 1);
        assert_eq!(Human::new(State::Healthy, Location::new(0, 0)).contamination(), 0);
    }

    #[test]
    fn healthy_catches_disease_from_infected_neighbour() {
        let config = PandemicConfig {
            infection_rate: 1.0,
            ..PandemicConfig::default()
        };
        let table = TransitionTable::new(config.mortality_event);
        let mut human = Human::new(State::Healthy, Location::new(1, 1));
        human.act(&[State::Healthy, State::Infected], &table, &config, &mut rng());
        assert_eq!(human.state(), State::Infected);
    }

    #[test]
    fn healthy_neighbours_are_harmless() {
        let config = PandemicConfig {
            infection_rate: 1.0,
            ..PandemicConfig::default()
        };
        let table = TransitionTable::new(config.mortality_event);
        let mut human = Human::new(State::Healthy, Location::new(1, 1));
        human.act(&[State::Healthy, State::Recovered, State::Dead], &table, &config, &mut rng());
        assert_eq!(human.state(), State::Healthy);
    }

    #[test]
    fn recovered_stay_immune() {
        let config = PandemicConfig {
            infection_rate: 1.0,
            ..PandemicConfig::default()
        };
        let table = TransitionTable::new(config.mortality_event);
        let mut human = Human::new(State::Recovered, Location::new(1, 1));
        human.act(&[State::Infected; 8], &table, &config, &mut rng());
        assert_eq!(human.state(), State::Recovered);
    }

    #[test]
    fn infection_ends_after_max_contamination() {
        let config = PandemicConfig {
            max_contamination: 3,
            infection_duration: 0.0,
            ..PandemicConfig::default()
        };
        let table = TransitionTable::new(config.mortality_event);
        let mut human = Human::new(State::Infected, Location::new(0, 0));
        let mut rng = rng();

        human.infected_behaviour(&table, &config, &mut rng);
        human.infected_behaviour(&table, &config, &mut rng);
        assert_eq!(human.state(), State::Infected);

        human.infected_behaviour(&table, &config, &mut rng);
        assert_eq!(human.contamination(), 4);
        assert_eq!(human.state(), State::Recovered);
    }

    #[test]
    fn mortality_rate_flag_changes_outcome() {
        let config = PandemicConfig {
            max_contamination: 0,
            infection_duration: 1.0,
            mortality_rate: 0.0,
            mortality_event: MortalityEvent::MortalityRate,
            ..PandemicConfig::default()
        };
        let table = TransitionTable::new(config.mortality_event);
        let mut human = Human::new(State::Infected, Location::new(0, 0));
        human.infected_behaviour(&table, &config, &mut rng());
        assert_eq!(human.state(), State::Recovered);
    }

    #[test]
    fn moves_to_free_neighbour() {
        let mut field = Field::new(3, 3);
        let start = Location::new(1, 1);
        let id = HumanId(0);
        field.place(id, start);
        let mut human = Human::new(State::Healthy, start);
        human.move_on(id, &mut field, &mut rng());
        assert_ne!(human.location(), start);
        assert!(field.is_free(start));
        assert_eq!(field.occupant_at(human.location()), Some(id));
    }

    #[test]
    fn stays_put_when_surrounded() {
        let mut field = Field::new(3, 3);
        for (i, loc) in field.locations().collect::<Vec<_>>().into_iter().enumerate() {
            field.place(HumanId(i), loc);
        }
        let start = Location::new(1, 1);
        let id = HumanId(4);
        let mut human = Human::new(State::Healthy, start);
        human.move_on(id, &mut field, &mut rng());
        assert_eq!(human.location(), start);
        assert_eq!(field.occupant_at(start), Some(id));
    }
}
