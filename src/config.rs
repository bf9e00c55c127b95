use crate::pandemic::Event;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Simulation configuration parameters.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Run-level parameters shared by both models.
    #[serde(default)]
    pub run: RunConfig,
    /// Predator/prey model parameters.
    #[serde(default)]
    pub foxes: FoxesConfig,
    /// Epidemic model parameters.
    #[serde(default)]
    pub pandemic: PandemicConfig,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Step ceiling after which a run stops being viable.
    pub max_steps: usize,
    /// Seed of the random number generator (drawn from the OS if absent).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Number of steps between progress messages.
    pub log_interval: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_steps: 5000,
            seed: None,
            log_interval: 500,
        }
    }
}

/// Life-history constants of one animal species.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpeciesConfig {
    /// Age at which an animal can start to breed.
    pub breeding_age: u32,
    /// Age beyond which an animal dies.
    pub max_age: u32,
    /// Probability of breeding at each step once old enough.
    pub breeding_probability: f64,
    /// Maximum number of births per breeding.
    pub max_litter_size: u32,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FoxesConfig {
    pub depth: usize,
    pub width: usize,

    /// Probability that a fox is created in any given cell.
    pub fox_creation_probability: f64,
    /// Probability that a rabbit is created in a cell left without a fox.
    pub rabbit_creation_probability: f64,

    pub fox: SpeciesConfig,
    pub rabbit: SpeciesConfig,

    /// Number of steps a fox can go on after eating a single rabbit.
    pub rabbit_food_value: u32,
}

impl Default for FoxesConfig {
    fn default() -> Self {
        Self {
            depth: 80,
            width: 120,
            fox_creation_probability: 0.02,
            rabbit_creation_probability: 0.08,
            fox: SpeciesConfig {
                breeding_age: 15,
                max_age: 150,
                breeding_probability: 0.08,
                max_litter_size: 2,
            },
            rabbit: SpeciesConfig {
                breeding_age: 5,
                max_age: 40,
                breeding_probability: 0.12,
                max_litter_size: 4,
            },
            rabbit_food_value: 9,
        }
    }
}

/// Event used to decide between recovery and death once an infection ends.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MortalityEvent {
    /// Weigh death by the infection duration probability.
    #[default]
    InfectionDuration,
    /// Weigh death by the mortality rate probability.
    MortalityRate,
}

impl MortalityEvent {
    pub fn event(self) -> Event {
        match self {
            MortalityEvent::InfectionDuration => Event::InfectionDuration,
            MortalityEvent::MortalityRate => Event::MortalityRate,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PandemicConfig {
    pub depth: usize,
    pub width: usize,

    /// Probability that an infected human is created in any given cell.
    pub infected_creation_probability: f64,
    /// Probability that a healthy human is created in a cell left empty.
    pub healthy_creation_probability: f64,

    /// Probability of catching the disease from one infected neighbour.
    pub infection_rate: f64,
    /// Probability of dying of the disease.
    pub mortality_rate: f64,
    /// Probability attached to the end of the infection.
    pub infection_duration: f64,

    /// Number of steps an infected human stays contagious.
    pub max_contamination: u32,

    /// Which event decides death once contamination exceeds its maximum.
    pub mortality_event: MortalityEvent,
}

impl Default for PandemicConfig {
    fn default() -> Self {
        Self {
            depth: 100,
            width: 100,
            infected_creation_probability: 0.4,
            healthy_creation_probability: 0.6,
            infection_rate: 0.33,
            mortality_rate: 0.1,
            infection_duration: 0.4,
            max_contamination: 10,
            mortality_event: MortalityEvent::default(),
        }
    }
}

impl PandemicConfig {
    /// Current probability attached to `event`.
    pub fn probability(&self, event: Event) -> f64 {
        match event {
            Event::InfectionRate => self.infection_rate,
            Event::MortalityRate => self.mortality_rate,
            Event::InfectionDuration => self.infection_duration,
        }
    }
}

impl Config {
    /// Load a [`Config`] from a file.
    ///
    /// The file must be TOML-encoded; missing sections and fields take
    /// their default values. Performs validation on all parameters before
    /// returning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;

        let config: Config = toml::from_str(&contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    /// Write the configuration to a TOML file.
    pub fn to_file<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        let file = file.as_ref();
        let contents = toml::to_string(self).context("failed to serialize config")?;
        fs::write(file, contents).with_context(|| format!("failed to write {file:?}"))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        check_num(self.run.max_steps, 1..).context("invalid maximum number of steps")?;
        check_num(self.run.log_interval, 1..).context("invalid log interval")?;
        if let Some(seed) = self.run.seed {
            check_num(seed, 0..=i64::MAX as u64).context("invalid seed")?;
        }

        let foxes = &self.foxes;
        check_field(foxes.depth, foxes.width).context("invalid fox field dimensions")?;
        check_prob(foxes.fox_creation_probability).context("invalid fox creation probability")?;
        check_prob(foxes.rabbit_creation_probability)
            .context("invalid rabbit creation probability")?;
        check_species(&foxes.fox).context("invalid fox parameters")?;
        check_species(&foxes.rabbit).context("invalid rabbit parameters")?;
        check_num(foxes.rabbit_food_value, 1..).context("invalid rabbit food value")?;

        let pandemic = &self.pandemic;
        check_field(pandemic.depth, pandemic.width)
            .context("invalid pandemic field dimensions")?;
        check_prob(pandemic.infected_creation_probability)
            .context("invalid infected creation probability")?;
        check_prob(pandemic.healthy_creation_probability)
            .context("invalid healthy creation probability")?;
        check_prob(pandemic.infection_rate).context("invalid infection rate")?;
        check_prob(pandemic.mortality_rate).context("invalid mortality rate")?;
        check_prob(pandemic.infection_duration).context("invalid infection duration")?;

        Ok(())
    }
}

/// Largest field depth or width. Zero is allowed and stands for the default.
const MAX_FIELD_SIDE: usize = 10_000;

fn check_field(depth: usize, width: usize) -> Result<()> {
    check_num(depth, 0..=MAX_FIELD_SIDE).context("invalid depth")?;
    check_num(width, 0..=MAX_FIELD_SIDE).context("invalid width")?;
    Ok(())
}

fn check_species(species: &SpeciesConfig) -> Result<()> {
    check_num(species.max_age, 1..).context("invalid maximum age")?;
    check_num(species.breeding_age, 0..=species.max_age).context("invalid breeding age")?;
    check_prob(species.breeding_probability).context("invalid breeding probability")?;
    check_num(species.max_litter_size, 1..).context("invalid maximum litter size")?;
    Ok(())
}

fn check_prob(prob: f64) -> Result<()> {
    check_num(prob, 0.0..=1.0)
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}
