//! Predator/prey model: foxes hunting rabbits.

mod animal;
mod encounter;

pub use animal::{Animal, AnimalId, Biology, Lifecycle, Species, Surroundings};
pub use encounter::{EncounterKey, EncounterTable, Outcome};

use crate::config::{Config, FoxesConfig};
use crate::field::Field;
use crate::field_stats::{Census, FieldStats};
use crate::location::Location;
use crate::simulation::{Simulation, resolve_seed};
use crate::view::View;
use anyhow::{Context, Result, bail};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;

/// Read-only view of the predator/prey field, keyed by species.
pub struct Habitat<'a> {
    field: &'a Field<AnimalId>,
    animals: &'a [Animal],
}

impl Census for Habitat<'_> {
    type Key = Species;

    fn depth(&self) -> usize {
        self.field.depth()
    }

    fn width(&self) -> usize {
        self.field.width()
    }

    fn key_at(&self, location: Location) -> Option<Species> {
        self.field
            .occupant_at(location)
            .map(|id| self.animals[id.0].species())
    }
}

/// Field statistics of the predator/prey model.
pub fn foxes_stats() -> FieldStats<Species> {
    FieldStats::new(Species::ALL)
}

/// Predator/prey simulator.
///
/// Holds the configuration, the field and its animals, the attached views
/// and the random number generator.
pub struct Simulator {
    config: Config,
    biology: Biology,
    encounters: EncounterTable,
    field: Field<AnimalId>,
    animals: Vec<Animal>,
    step: usize,
    stats: FieldStats<Species>,
    views: Vec<Box<dyn View<Species>>>,
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

        let defaults = FoxesConfig::default();
        if config.foxes.depth == 0 || config.foxes.width == 0 {
            log::warn!(
                "field dimensions must be greater than zero, using {}x{}",
                defaults.depth,
                defaults.width
            );
            config.foxes.depth = defaults.depth;
            config.foxes.width = defaults.width;
        }

        let mut simulator = Self {
            biology: Biology::new(&config.foxes).context("failed to construct biology")?,
            encounters: EncounterTable::default(),
            field: Field::new(config.foxes.depth, config.foxes.width),
            animals: Vec::new(),
            step: 0,
            stats: foxes_stats(),
            views: Vec::new(),
            seed,
            rng: ChaCha12Rng::seed_from_u64(seed),
            config,
        };
        simulator.reset();
        Ok(simulator)
    }

    /// Attach a view; the first attached view decides viability.
    pub fn attach(&mut self, mut view: Box<dyn View<Species>>) {
        view.reset();
        let habitat = Habitat {
            field: &self.field,
            animals: &self.animals,
        };
        view.show_status(self.step, &habitat);
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
        config.foxes.depth = self.field.depth();
        config.foxes.width = self.field.width();
        self.biology = Biology::new(&config.foxes).context("failed to construct biology")?;
        self.config = config;
        Ok(())
    }

    pub fn field(&self) -> &Field<AnimalId> {
        &self.field
    }

    pub fn animals(&self) -> &[Animal] {
        &self.animals
    }

    pub fn census(&self) -> Habitat<'_> {
        Habitat {
            field: &self.field,
            animals: &self.animals,
        }
    }

    /// Species of the animal at the given cell, if any.
    pub fn occupant_at(&self, row: usize, col: usize) -> Option<Species> {
        self.census().key_at(Location::new(row, col))
    }

    pub fn population_count(&mut self, species: Species) -> usize {
        let habitat = Habitat {
            field: &self.field,
            animals: &self.animals,
        };
        self.stats.population_count(&habitat, species)
    }

    /// Remove every animal and rewind to step zero without repopulating.
    pub fn clear(&mut self) {
        self.step = 0;
        self.animals.clear();
        self.field.clear();
    }

    /// Put a newborn animal on a free cell.
    pub fn add_animal(&mut self, species: Species, location: Location) -> Result<AnimalId> {
        if !self.field.is_free(location) {
            bail!("location {location} is already occupied");
        }
        let id = AnimalId(self.animals.len());
        self.field.place(id, location);
        self.animals
            .push(Animal::newborn(species, location, &self.biology));
        Ok(id)
    }

    /// Fill the field cell by cell.
    ///
    /// Each cell first draws against the fox creation probability and,
    /// failing that, draws again against the rabbit creation probability.
    fn populate(&mut self) {
        let fox_prob = self.config.foxes.fox_creation_probability;
        let rabbit_prob = self.config.foxes.rabbit_creation_probability;
        self.field.clear();
        for location in self.field.locations() {
            let species = if self.rng.random::<f64>() <= fox_prob {
                Species::Fox
            } else if self.rng.random::<f64>() <= rabbit_prob {
                Species::Rabbit
            } else {
                continue;
            };
            let animal =
                Animal::with_random_age(species, location, &self.biology, &mut self.rng);
            self.field.place(AnimalId(self.animals.len()), location);
            self.animals.push(animal);
        }
    }

    /// Rebuild the field handles after the population was compacted.
    fn reindex(&mut self) {
        self.field.clear();
        for (idx, animal) in self.animals.iter().enumerate() {
            self.field.place(AnimalId(idx), animal.location());
        }
    }

    fn update_views(&mut self) {
        let habitat = Habitat {
            field: &self.field,
            animals: &self.animals,
        };
        for view in &mut self.views {
            view.show_status(self.step, &habitat);
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
        log::debug!("populated field with {} animals", self.animals.len());
    }

    /// Every animal alive at the start of the step acts once, in insertion
    /// order. Dead animals are then dropped and the newborns join the
    /// population for the next step.
    fn simulate_one_step(&mut self) -> usize {
        self.step += 1;

        let n_live = self.animals.len();
        let mut offspring = Vec::new();
        for idx in 0..n_live {
            // Acts on a copy so that the rest of the population stays reachable.
            let mut animal = self.animals[idx];
            if !animal.is_alive() {
                continue;
            }
            let mut env = Surroundings {
                field: &mut self.field,
                animals: &mut self.animals,
                offspring: &mut offspring,
                biology: &self.biology,
                encounters: &self.encounters,
                rng: &mut self.rng,
            };
            animal.act(AnimalId(idx), &mut env);
            self.animals[idx] = animal;
        }

        let n_born = offspring.len();
        self.animals.retain(Animal::is_alive);
        self.animals
            .extend(offspring.into_iter().filter(Animal::is_alive));
        self.reindex();
        log::trace!("step {}: {n_born} born, {} alive", self.step, self.animals.len());

        self.update_views();
        self.step
    }

    fn is_viable(&mut self, step: usize) -> bool {
        if step > self.config.run.max_steps {
            return false;
        }
        let habitat = Habitat {
            field: &self.field,
            animals: &self.animals,
        };
        match self.views.first_mut() {
            Some(view) => view.is_viable(&habitat),
            None => {
                self.stats.reset();
                self.stats.is_viable(&habitat)
            }
        }
    }

    fn population_counts(&mut self) -> Vec<(String, usize)> {
        self.stats.generate_counts(&Habitat {
            field: &self.field,
            animals: &self.animals,
        });
        self.stats
            .counters()
            .map(|(_, counter)| (counter.name().to_string(), counter.count()))
            .collect()
    }

    fn population_details(&mut self) -> String {
        let habitat = Habitat {
            field: &self.field,
            animals: &self.animals,
        };
        self.stats.reset();
        self.stats.population_details(&habitat)
    }
}
