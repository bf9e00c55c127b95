//! Per-step population records written during a run.

use crate::simulation::{Model, Simulation};
use anyhow::{Context, Result};
use rmp_serde::{decode, encode};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

/// Populations of the field after one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub step: usize,
    pub counts: Vec<(String, usize)>,
    /// Whether the run went on after this step.
    pub viable: bool,
}

impl Record {
    pub fn capture<S: Simulation + ?Sized>(sim: &mut S, viable: bool) -> Self {
        Self {
            step: sim.step(),
            counts: sim.population_counts(),
            viable,
        }
    }
}

/// Identity of a run, saved next to its trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunInfo {
    pub model: Model,
    pub seed: u64,
}

impl RunInfo {
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;
        toml::from_str(&contents).context("failed to deserialize run info")
    }

    pub fn to_file<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        let file = file.as_ref();
        let contents = toml::to_string(self).context("failed to serialize run info")?;
        fs::write(file, contents).with_context(|| format!("failed to write {file:?}"))
    }
}

/// Streaming writer of records.
pub struct TrajectoryWriter {
    writer: BufWriter<File>,
}

impl TrajectoryWriter {
    pub fn create<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    pub fn write(&mut self, record: &Record) -> Result<()> {
        encode::write(&mut self.writer, record).context("failed to write record")
    }

    pub fn finish(mut self) -> Result<()> {
        self.writer.flush().context("failed to flush trajectory")
    }
}

/// Read every record of a trajectory file.
pub fn read_trajectory<P: AsRef<Path>>(file: P) -> Result<Vec<Record>> {
    let file = file.as_ref();
    let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
    let mut reader = BufReader::new(file);

    let mut records = Vec::new();
    while !reader.fill_buf().context("failed to fill buffer")?.is_empty() {
        let record = decode::from_read(&mut reader).context("failed to read record")?;
        records.push(record);
    }
    Ok(records)
}
