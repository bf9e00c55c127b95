use crate::config::{FoxesConfig, SpeciesConfig};
use crate::field::Field;
use crate::foxes::encounter::EncounterTable;
use crate::location::Location;
use anyhow::{Context, Result};
use rand::prelude::*;
use rand_distr::{Bernoulli, Uniform};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of animal living in the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    Fox,
    Rabbit,
}

impl Species {
    pub const ALL: [Species; 2] = [Species::Fox, Species::Rabbit];
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Species::Fox => f.write_str("Fox"),
            Species::Rabbit => f.write_str("Rabbit"),
        }
    }
}

/// Handle of an animal in the simulator's population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimalId(pub usize);

/// Ageing and breeding rules of one species.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    max_age: u32,
    breeding_age: u32,
    breeding: Bernoulli,
    litter: Uniform<u32>,
}

impl Lifecycle {
    pub fn new(cfg: &SpeciesConfig) -> Result<Self> {
        Ok(Self {
            max_age: cfg.max_age,
            breeding_age: cfg.breeding_age,
            breeding: Bernoulli::new(cfg.breeding_probability)
                .context("invalid breeding probability")?,
            litter: Uniform::new_inclusive(1, cfg.max_litter_size)
                .context("invalid maximum litter size")?,
        })
    }

    /// Number of births for an animal of age `age` this step.
    fn births<R: Rng>(&self, age: u32, rng: &mut R) -> u32 {
        if age >= self.breeding_age && self.breeding.sample(rng) {
            self.litter.sample(rng)
        } else {
            0
        }
    }
}

/// Life-history rules of every species.
#[derive(Debug, Clone)]
pub struct Biology {
    fox: Lifecycle,
    rabbit: Lifecycle,
    rabbit_food_value: u32,
}

impl Biology {
    pub fn new(cfg: &FoxesConfig) -> Result<Self> {
        Ok(Self {
            fox: Lifecycle::new(&cfg.fox).context("invalid fox lifecycle")?,
            rabbit: Lifecycle::new(&cfg.rabbit).context("invalid rabbit lifecycle")?,
            rabbit_food_value: cfg.rabbit_food_value,
        })
    }

    pub fn lifecycle(&self, species: Species) -> &Lifecycle {
        match species {
            Species::Fox => &self.fox,
            Species::Rabbit => &self.rabbit,
        }
    }

    /// Food level gained by eating an animal of species `prey`.
    pub fn food_value(&self, prey: Species) -> u32 {
        match prey {
            Species::Rabbit => self.rabbit_food_value,
            Species::Fox => 0,
        }
    }
}

/// Everything an animal can see and change while acting.
///
/// Animals born during the step are appended to `offspring` and take the
/// ids following the live population.
pub struct Surroundings<'a, R> {
    pub field: &'a mut Field<AnimalId>,
    pub animals: &'a mut [Animal],
    pub offspring: &'a mut Vec<Animal>,
    pub biology: &'a Biology,
    pub encounters: &'a EncounterTable,
    pub rng: &'a mut R,
}

impl<R: Rng> Surroundings<'_, R> {
    pub fn animal(&self, id: AnimalId) -> &Animal {
        let n_live = self.animals.len();
        if id.0 < n_live {
            &self.animals[id.0]
        } else {
            &self.offspring[id.0 - n_live]
        }
    }

    fn animal_mut(&mut self, id: AnimalId) -> &mut Animal {
        let n_live = self.animals.len();
        if id.0 < n_live {
            &mut self.animals[id.0]
        } else {
            &mut self.offspring[id.0 - n_live]
        }
    }

    fn kill(&mut self, id: AnimalId) {
        let animal = self.animal_mut(id);
        animal.alive = false;
        let location = animal.location;
        self.field.clear_location(location);
    }

    fn give_birth(&mut self, species: Species, location: Location) {
        let id = AnimalId(self.animals.len() + self.offspring.len());
        self.field.place(id, location);
        self.offspring
            .push(Animal::newborn(species, location, self.biology));
    }
}

/// Fox or rabbit occupying one cell of the field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animal {
    species: Species,
    location: Location,
    age: u32,
    food_level: u32,
    alive: bool,
}

impl Animal {
    /// Create an animal of age zero; foxes start with a full stomach.
    pub fn newborn(species: Species, location: Location, biology: &Biology) -> Self {
        Self {
            species,
            location,
            age: 0,
            food_level: biology.food_value(Species::Rabbit),
            alive: true,
        }
    }

    /// Create an animal with a random age and, for foxes, a random food level.
    pub fn with_random_age<R: Rng>(
        species: Species,
        location: Location,
        biology: &Biology,
        rng: &mut R,
    ) -> Self {
        let max_age = biology.lifecycle(species).max_age;
        let food_value = biology.food_value(Species::Rabbit);
        Self {
            species,
            location,
            age: rng.random_range(0..max_age),
            food_level: rng.random_range(0..food_value),
            alive: true,
        }
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn food_level(&self) -> u32 {
        self.food_level
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// One step in the life of the animal.
    ///
    /// The animal ages (and foxes get hungrier), may die of it, then eats a
    /// neighbouring prey if it can or else wanders to a random free cell.
    /// Finally an animal old enough may breed into free neighbouring cells.
    pub fn act<R: Rng>(&mut self, id: AnimalId, env: &mut Surroundings<'_, R>) {
        self.increment_age(env.biology);
        if self.species == Species::Fox {
            self.increment_hunger();
        }
        if !self.alive {
            env.field.clear_location(self.location);
            return;
        }

        let target = match self.hunt(env) {
            Some(prey_location) => Some(prey_location),
            None => env
                .field
                .free_adjacent_locations(self.location)
                .choose(env.rng)
                .copied(),
        };
        if let Some(target) = target {
            self.set_location(id, target, env.field);
        }

        self.breed(env);
    }

    fn increment_age(&mut self, biology: &Biology) {
        self.age += 1;
        if self.age > biology.lifecycle(self.species).max_age {
            self.alive = false;
        }
    }

    fn increment_hunger(&mut self) {
        self.food_level = self.food_level.saturating_sub(1);
        if self.food_level == 0 {
            self.alive = false;
        }
    }

    /// Eat the first neighbour this animal preys on and return its cell.
    fn hunt<R: Rng>(&mut self, env: &mut Surroundings<'_, R>) -> Option<Location> {
        for location in env.field.adjacent_locations(self.location) {
            let Some(other_id) = env.field.occupant_at(location) else {
                continue;
            };
            let other = env.animal(other_id).species();
            let Some(outcome) = env.encounters.get(self.species, other) else {
                continue;
            };
            if outcome.prey_of(self.species) == Some(other) {
                log::trace!("{}", outcome.description());
                env.kill(other_id);
                self.food_level = env.biology.food_value(other);
                return Some(location);
            }
        }
        None
    }

    fn breed<R: Rng>(&self, env: &mut Surroundings<'_, R>) {
        let births = env
            .biology
            .lifecycle(self.species)
            .births(self.age, env.rng);
        if births == 0 {
            return;
        }
        let mut free = env.field.free_adjacent_locations(self.location);
        free.shuffle(env.rng);
        for location in free.into_iter().take(births as usize) {
            env.give_birth(self.species, location);
        }
    }

    fn set_location(&mut self, id: AnimalId, location: Location, field: &mut Field<AnimalId>) {
        field.clear_location(self.location);
        self.location = location;
        field.place(id, location);
    }
}
