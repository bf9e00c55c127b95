//! Epidemic model: humans wandering a field and passing a disease on.

mod human;
mod state;
mod transition;

pub use human::{Human, HumanId};
pub use state::{Event, State};
pub use transition::{Rule, TransitionTable};

use crate::config::Config;
use crate::field::Field;
use crate::field_stats::{Census, FieldStats};
use crate::location::Location;
use crate::simulation::{Simulation, resolve_seed};
use crate::view::View;
use anyhow::{Result, bail};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use smallvec::SmallVec;

/// Read-only view of the epidemic field, keyed by health state.
pub struct Crowd<'a> {
    field: &'a Field<HumanId>,
    humans: &'a [Human],
}

impl Census for Crowd<'_> {
    type Key = State;

    fn depth(&self) -> usize {
        self.field.depth()
    }

    fn width(&self) -> usize {
        self.field.width()
    }

    fn key_at(&self, location: Location) -> Option<State> {
        self.field
            .occupant_at(location)
            .map(|id| self.humans[id.0].state())
    }
}

/// Field statistics of the epidemic model.
///
/// A run is only viable while someone is infected.
pub fn pandemic_stats() -> FieldStats<State> {
    FieldStats::new(State::ALL).requiring(State::Infected)
}

/// Epidemic simulator.
///
/// Holds the configuration, the field and its humans, the attached views
/// and the random number generator.
pub struct Simulator {
    config: Config,
    table: TransitionTable,
    field: Field<HumanId>,
    humans: Vec<Human>,
    step: usize,
    infected_count: usize,
    stats: FieldStats<State>,
    views: Vec<Box<dyn View<State>>>,
    seed: u64,
    rng: ChaCha12Rng,
}

impl Simulator {
    /// Create a simulator seeded from the configuration, or from the OS if
    /// the configuration has no seed.
    pub fn new(config: Config) -> Result<Self> {
        let seed = resolve_seed(config.run.seed)?;
        Self::with_seed(config, seed)
    }

    /// Create a simulator with an explicit seed and populate its field.
    ///
    /// Zero field dimensions are replaced by the default ones.
    pub fn with_seed(mut config: Config, seed: u64) -> Result<Self> {
        config.validate()?;

        let defaults = crate::config::PandemicConfig::default();
        if config.pandemic.depth == 0 || config.pandemic.width == 0 {
            log::warn!(
                "field dimensions must be greater than zero, using {}x{}",
                defaults.depth,
                defaults.width
            );
            config.pandemic.depth = defaults.depth;
            config.pandemic.width = defaults.width;
        }

        let mut simulator = Self {
            table: TransitionTable::new(config.pandemic.mortality_event),
            field: Field::new(config.pandemic.depth, config.pandemic.width),
            humans: Vec::new(),
            step: 0,
            infected_count: 0,
            stats: pandemic_stats(),
            views: Vec::new(),
            seed,
            rng: ChaCha12Rng::seed_from_u64(seed),
            config,
        };
        simulator.reset();
        Ok(simulator)
    }

    /// Attach a view; the first attached view decides viability.
    pub fn attach(&mut self, mut view: Box<dyn View<State>>) {
        view.reset();
        let crowd = Crowd {
            field: &self.field,
            humans: &self.humans,
        };
        view.show_status(self.step, &crowd);
        self.views.push(view);
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replace the tunable parameters; they apply from the next step on.
    ///
    /// The field dimensions cannot change during a run and are kept.
    pub fn set_config(&mut self, mut config: Config) -> Result<()> {
        config.validate()?;
        config.pandemic.depth = self.field.depth();
        config.pandemic.width = self.field.width();
        self.table = TransitionTable::new(config.pandemic.mortality_event);
        self.config = config;
        Ok(())
    }

    pub fn field(&self) -> &Field<HumanId> {
        &self.field
    }

    pub fn humans(&self) -> &[Human] {
        &self.humans
    }

    pub fn census(&self) -> Crowd<'_> {
        Crowd {
            field: &self.field,
            humans: &self.humans,
        }
    }

    /// Number of infected humans seen during the last step, or placed since
    /// the last clear.
    pub fn infected_count(&self) -> usize {
        self.infected_count
    }

    /// State of the human at the given cell, if any.
    pub fn occupant_at(&self, row: usize, col: usize) -> Option<State> {
        self.census().key_at(Location::new(row, col))
    }

    pub fn population_count(&mut self, state: State) -> usize {
        let crowd = Crowd {
            field: &self.field,
            humans: &self.humans,
        };
        self.stats.population_count(&crowd, state)
    }

    /// Remove every human and rewind to step zero without repopulating.
    pub fn clear(&mut self) {
        self.step = 0;
        self.infected_count = 0;
        self.humans.clear();
        self.field.clear();
    }

    /// Put a new human on a free cell.
    pub fn add_human(&mut self, state: State, location: Location) -> Result<HumanId> {
        if !self.field.is_free(location) {
            bail!("location {location} is already occupied");
        }
        let id = HumanId(self.humans.len());
        self.field.place(id, location);
        self.humans.push(Human::new(state, location));
        if state == State::Infected {
            self.infected_count += 1;
        }
        Ok(id)
    }

    /// Fill the field cell by cell.
    ///
    /// Each cell first draws against the infected creation probability and,
    /// failing that, draws again against the healthy creation probability.
    fn populate(&mut self) {
        let infected_prob = self.config.pandemic.infected_creation_probability;
        let healthy_prob = self.config.pandemic.healthy_creation_probability;
        self.field.clear();
        for location in self.field.locations() {
            let state = if self.rng.random::<f64>() <= infected_prob {
                State::Infected
            } else if self.rng.random::<f64>() <= healthy_prob {
                State::Healthy
            } else {
                continue;
            };
            if state == State::Infected {
                self.infected_count += 1;
            }
            let id = HumanId(self.humans.len());
            self.field.place(id, location);
            self.humans.push(Human::new(state, location));
        }
    }

    fn neighbour_states(&self, location: Location) -> SmallVec<[State; 8]> {
        self.field
            .adjacent_locations(location)
            .into_iter()
            .filter_map(|loc| self.field.occupant_at(loc))
            .map(|id| self.humans[id.0].state())
            .collect()
    }

    fn update_views(&mut self) {
        let crowd = Crowd {
            field: &self.field,
            humans: &self.humans,
        };
        for view in &mut self.views {
            view.show_status(self.step, &crowd);
        }
    }
}

impl Simulation for Simulator {
    fn seed(&self) -> u64 {
        self.seed
    }

    fn step(&self) -> usize {
        self.step
    }

    fn reset(&mut self) {
        self.clear();
        self.views.iter_mut().for_each(|view| view.reset());
        self.populate();
        self.update_views();
        log::debug!("populated field with {} humans", self.humans.len());
    }

    /// Every living human moves; infected humans then go through the
    /// course of the disease while the others are exposed to their
    /// infected neighbours.
    fn simulate_one_step(&mut self) -> usize {
        self.step += 1;
        self.infected_count = 0;

        let pandemic = &self.config.pandemic;
        for idx in 0..self.humans.len() {
            let id = HumanId(idx);

            if self.humans[idx].state() != State::Dead {
                self.humans[idx].move_on(id, &mut self.field, &mut self.rng);
            }

            match self.humans[idx].state() {
                State::Infected => {
                    self.humans[idx].infected_behaviour(&self.table, pandemic, &mut self.rng);
                    self.infected_count += 1;
                }
                State::Dead => {}
                State::Healthy | State::Recovered => {
                    let neighbours = self.neighbour_states(self.humans[idx].location());
                    self.humans[idx].act(&neighbours, &self.table, pandemic, &mut self.rng);
                }
            }
        }

        self.update_views();
        self.step
    }

    fn is_viable(&mut self, step: usize) -> bool {
        if step > self.config.run.max_steps || self.infected_count == 0 {
            return false;
        }
        let crowd = Crowd {
            field: &self.field,
            humans: &self.humans,
        };
        match self.views.first_mut() {
            Some(view) => view.is_viable(&crowd),
            None => {
                self.stats.reset();
                self.stats.is_viable(&crowd)
            }
        }
    }

    fn population_counts(&mut self) -> Vec<(String, usize)> {
        self.stats.generate_counts(&Crowd {
            field: &self.field,
            humans: &self.humans,
        });
        self.stats
            .counters()
            .map(|(_, counter)| (counter.name().to_string(), counter.count()))
            .collect()
    }

    fn population_details(&mut self) -> String {
        let crowd = Crowd {
            field: &self.field,
            humans: &self.humans,
        };
        self.stats.reset();
        self.stats.population_details(&crowd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::StatsView;

    fn empty_config() -> Config {
        let mut config = Config::default();
        config.pandemic.depth = 5;
        config.pandemic.width = 5;
        config.pandemic.infected_creation_probability = 0.0;
        config.pandemic.healthy_creation_probability = 0.0;
        config
    }

    #[test]
    fn zero_dimensions_fall_back_to_defaults() {
        let mut config = Config::default();
        config.pandemic.depth = 0;
        let simulator = Simulator::with_seed(config, 1).expect("failed to build simulator");
        assert_eq!(simulator.field().depth(), 100);
        assert_eq!(simulator.field().width(), 100);
    }

    #[test]
    fn populate_respects_one_human_per_cell() {
        let mut config = Config::default();
        config.pandemic.depth = 20;
        config.pandemic.width = 30;
        let simulator = Simulator::with_seed(config, 2).expect("failed to build simulator");
        for (idx, human) in simulator.humans().iter().enumerate() {
            assert_eq!(simulator.field().occupant_at(human.location()), Some(HumanId(idx)));
        }
        let occupied = simulator
            .field()
            .locations()
            .filter(|&loc| !simulator.field().is_free(loc))
            .count();
        assert_eq!(occupied, simulator.humans().len());
    }

    #[test]
    fn lone_infected_dies_and_run_ends() {
        let mut config = empty_config();
        config.pandemic.max_contamination = 1;
        config.pandemic.infection_duration = 1.0;
        let mut simulator = Simulator::with_seed(config, 3).expect("failed to build simulator");
        simulator.attach(Box::new(StatsView::new(pandemic_stats())));
        simulator.clear();
        simulator
            .add_human(State::Infected, Location::new(2, 2))
            .expect("failed to add human");

        let step = simulator.simulate_one_step();
        assert_eq!(step, 1);
        assert_eq!(simulator.humans()[0].state(), State::Dead);
        assert_eq!(simulator.infected_count(), 1);
        assert!(!simulator.is_viable(step));

        let step = simulator.simulate_one_step();
        assert_eq!(step, 2);
        assert_eq!(simulator.infected_count(), 0);
        assert_eq!(simulator.population_count(State::Dead), 1);
        assert!(!simulator.is_viable(step));
    }

    #[test]
    fn dead_humans_stay_in_place() {
        let mut simulator =
            Simulator::with_seed(empty_config(), 4).expect("failed to build simulator");
        simulator.clear();
        let location = Location::new(1, 3);
        simulator.add_human(State::Dead, location).expect("failed to add human");
        for _ in 0..5 {
            simulator.simulate_one_step();
        }
        assert_eq!(simulator.occupant_at(1, 3), Some(State::Dead));
    }

    #[test]
    fn certain_infection_reaches_neighbour() {
        let mut config = empty_config();
        config.pandemic.depth = 1;
        config.pandemic.width = 2;
        config.pandemic.infection_rate = 1.0;
        config.pandemic.max_contamination = 100;
        let mut simulator = Simulator::with_seed(config, 5).expect("failed to build simulator");
        simulator.clear();
        // Both cells are taken, so nobody can move away.
        simulator
            .add_human(State::Infected, Location::new(0, 0))
            .expect("failed to add human");
        simulator
            .add_human(State::Healthy, Location::new(0, 1))
            .expect("failed to add human");

        simulator.simulate_one_step();
        assert_eq!(simulator.population_count(State::Infected), 2);
        assert_eq!(simulator.infected_count(), 1);
        // Everyone is infected: a single population is left.
        assert!(!simulator.is_viable(1));
    }

    #[test]
    fn populated_field_is_viable_before_first_step() {
        let mut config = Config::default();
        config.pandemic.depth = 10;
        config.pandemic.width = 10;
        let mut simulator = Simulator::with_seed(config, 9).expect("failed to build simulator");
        assert!(simulator.infected_count() > 0);
        assert!(simulator.is_viable(1));
    }

    #[test]
    fn occupied_cell_is_rejected() {
        let mut simulator =
            Simulator::with_seed(empty_config(), 6).expect("failed to build simulator");
        simulator.clear();
        simulator.add_human(State::Healthy, Location::new(0, 0)).expect("failed to add human");
        assert!(simulator.add_human(State::Healthy, Location::new(0, 0)).is_err());
    }

    #[test]
    fn reset_rewinds_step_counter() {
        let mut simulator =
            Simulator::with_seed(Config::default(), 7).expect("failed to build simulator");
        simulator.simulate_one_step();
        simulator.simulate_one_step();
        simulator.reset();
        assert_eq!(simulator.step(), 0);
        simulator.reset();
        assert_eq!(simulator.step(), 0);
        assert!(!simulator.humans().is_empty());
    }

    #[test]
    fn details_list_every_state() {
        let mut simulator =
            Simulator::with_seed(empty_config(), 8).expect("failed to build simulator");
        simulator.clear();
        simulator.add_human(State::Healthy, Location::new(0, 0)).expect("failed to add human");
        simulator.add_human(State::Infected, Location::new(4, 4)).expect("failed to add human");
        assert_eq!(
            simulator.population_details(),
            "healthy (h): 1 infected (i): 1 recovered (r): 0 dead (rip): 0 "
        );
    }
}
