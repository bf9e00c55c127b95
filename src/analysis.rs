use crate::stats::{Accumulator, AccumulatorReport};
use crate::trajectory::{Record, RunInfo, read_trajectory};
use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Summary of one population over a run.
#[derive(Debug, Serialize, Deserialize)]
pub struct PopulationReport {
    pub name: String,
    #[serde(flatten)]
    pub stats: AccumulatorReport,
    pub min: usize,
    pub max: usize,
}

/// Summary of one run.
#[derive(Debug, Serialize, Deserialize)]
pub struct Results {
    #[serde(flatten)]
    pub info: RunInfo,
    pub final_step: usize,
    pub populations: Vec<PopulationReport>,
}

struct Population {
    acc: Accumulator,
    min: usize,
    max: usize,
}

impl Population {
    fn new() -> Self {
        Self {
            acc: Accumulator::new(),
            min: usize::MAX,
            max: 0,
        }
    }

    fn add(&mut self, count: usize) {
        self.acc.add(count as f64);
        self.min = self.min.min(count);
        self.max = self.max.max(count);
    }
}

pub struct Analyzer {
    info: RunInfo,
    final_step: usize,
    populations: IndexMap<String, Population>,
}

impl Analyzer {
    pub fn new(info: RunInfo) -> Self {
        Self {
            info,
            final_step: 0,
            populations: IndexMap::new(),
        }
    }

    pub fn add_record(&mut self, record: &Record) {
        self.final_step = self.final_step.max(record.step);
        for (name, count) in &record.counts {
            self.populations
                .entry(name.clone())
                .or_insert_with(Population::new)
                .add(*count);
        }
    }

    pub fn add_file<P: AsRef<Path>>(&mut self, file: P) -> Result<()> {
        let records = read_trajectory(file).context("failed to read trajectory")?;
        for record in &records {
            self.add_record(record);
        }
        Ok(())
    }

    pub fn results(&self) -> Results {
        let populations = self
            .populations
            .iter()
            .map(|(name, pop)| PopulationReport {
                name: name.clone(),
                stats: pop.acc.report(),
                min: if pop.acc.n_vals() > 0 { pop.min } else { 0 },
                max: pop.max,
            })
            .collect();
        Results {
            info: self.info.clone(),
            final_step: self.final_step,
            populations,
        }
    }

    pub fn save_results<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        let file = file.as_ref();
        let contents = toml::to_string(&self.results()).context("failed to serialize results")?;
        fs::write(file, contents).with_context(|| format!("failed to write {file:?}"))?;
        Ok(())
    }
}
