use crate::analysis::Analyzer;
use crate::config::Config;
use crate::simulation::{Model, Simulation};
use crate::trajectory::{Record, RunInfo, TrajectoryWriter};
use crate::view::StatsView;
use crate::{foxes, pandemic};
use anyhow::{Context, Result, bail};
use glob::glob;
use std::{
    fs,
    path::{Path, PathBuf},
};

pub struct Manager {
    sim_dir: PathBuf,
    cfg: Config,
}

impl Manager {
    /// Write the default configuration into `sim_dir`.
    pub fn init<P: AsRef<Path>>(sim_dir: P) -> Result<()> {
        let sim_dir = sim_dir.as_ref();
        fs::create_dir_all(sim_dir).with_context(|| format!("failed to create {sim_dir:?}"))?;

        let config_file = config_file(sim_dir);
        if config_file.exists() {
            bail!("{config_file:?} already exists");
        }
        Config::default()
            .to_file(&config_file)
            .context("failed to write default config")?;
        log::info!("wrote {config_file:?}");

        Ok(())
    }

    pub fn new<P: AsRef<Path>>(sim_dir: P) -> Result<Self> {
        let sim_dir = sim_dir.as_ref().to_path_buf();

        let cfg = Config::from_file(config_file(&sim_dir)).context("failed to construct cfg")?;
        log::info!("{cfg:#?}");

        Ok(Self { sim_dir, cfg })
    }

    /// Run a new simulation of `model` in its own run dir and return the dir.
    pub fn run_simulation(&self, model: Model, seed: Option<u64>) -> Result<PathBuf> {
        let mut cfg = self.cfg.clone();
        if seed.is_some() {
            cfg.run.seed = seed;
        }

        let run_idx = self.count_run_dirs().context("failed to count run dirs")?;
        let run_dir = self.run_dir(run_idx);
        fs::create_dir_all(&run_dir).with_context(|| format!("failed to create {run_dir:?}"))?;
        log::info!("created {run_dir:?}");

        let log_interval = cfg.run.log_interval;
        let trajectory_file = run_dir.join("trajectory.msgpack");
        let seed = match model {
            Model::Foxes => {
                let mut sim =
                    foxes::Simulator::new(cfg).context("failed to construct simulator")?;
                sim.attach(Box::new(StatsView::new(foxes::foxes_stats())));
                drive(&mut sim, &trajectory_file, log_interval)?
            }
            Model::Pandemic => {
                let mut sim =
                    pandemic::Simulator::new(cfg).context("failed to construct simulator")?;
                sim.attach(Box::new(StatsView::new(pandemic::pandemic_stats())));
                drive(&mut sim, &trajectory_file, log_interval)?
            }
        };

        RunInfo { model, seed }
            .to_file(run_dir.join("run.toml"))
            .context("failed to save run info")?;

        Ok(run_dir)
    }

    pub fn run_analysis(&self) -> Result<()> {
        let n_runs = self.count_run_dirs().context("failed to count run dirs")?;
        for run_idx in 0..n_runs {
            let run_dir = self.run_dir(run_idx);
            let info = RunInfo::from_file(run_dir.join("run.toml"))
                .context("failed to load run info")?;

            let mut analyzer = Analyzer::new(info);
            analyzer
                .add_file(run_dir.join("trajectory.msgpack"))
                .context("failed to add file")?;
            analyzer
                .save_results(run_dir.join("results.toml"))
                .context("failed to save results")?;
            log::info!("analyzed {run_dir:?}");
        }

        Ok(())
    }

    pub fn clean_sim(&self) -> Result<()> {
        let n_runs = self.count_run_dirs().context("failed to count run dirs")?;
        for run_idx in 0..n_runs {
            let run_dir = self.run_dir(run_idx);
            fs::remove_dir_all(&run_dir)
                .with_context(|| format!("failed to remove {run_dir:?}"))?;
            log::info!("removed {run_dir:?}");
        }

        Ok(())
    }

    fn count_run_dirs(&self) -> Result<usize> {
        let pattern = self.sim_dir.join("run-*");
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        let count = glob(pattern)
            .context("failed to glob run dirs")?
            .filter_map(Result::ok)
            .filter(|p| p.is_dir())
            .count();
        Ok(count)
    }

    fn run_dir(&self, run_idx: usize) -> PathBuf {
        self.sim_dir.join(format!("run-{run_idx:04}"))
    }
}

fn config_file(sim_dir: &Path) -> PathBuf {
    sim_dir.join("config.toml")
}

/// Step `sim` until it stops being viable, writing one record per step.
///
/// The initial field is recorded first and at least one step is always
/// simulated.
///
/// Returns the seed of the run.
pub fn drive<S: Simulation + ?Sized>(
    sim: &mut S,
    trajectory_file: &Path,
    log_interval: usize,
) -> Result<u64> {
    let mut writer =
        TrajectoryWriter::create(trajectory_file).context("failed to create trajectory")?;
    log::info!("running with seed {}", sim.seed());

    writer
        .write(&Record::capture(sim, true))
        .context("failed to save record")?;

    loop {
        let step = sim.simulate_one_step();
        let viable = sim.is_viable(step);
        writer
            .write(&Record::capture(sim, viable))
            .context("failed to save record")?;
        if !viable {
            break;
        }

        if step % log_interval == 0 {
            log::info!("step {step}: {}", sim.population_details());
        }
    }

    writer.finish().context("failed to finish trajectory")?;
    log::info!("finished at step {}: {}", sim.step(), sim.population_details());

    Ok(sim.seed())
}
