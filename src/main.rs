use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use wildfield::manager::Manager;
use wildfield::simulation::Model;

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    #[arg(long)]
    sim_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Init,

    Run {
        #[arg(long, value_enum)]
        model: Model,

        #[arg(long)]
        seed: Option<u64>,
    },

    Analyze,

    Clean,
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    let load_mgr = || Manager::new(&args.sim_dir).context("failed to construct mgr");

    match args.command {
        Command::Init => Manager::init(&args.sim_dir).context("failed to init sim dir")?,
        Command::Run { model, seed } => {
            load_mgr()?.run_simulation(model, seed)?;
        }
        Command::Analyze => load_mgr()?.run_analysis()?,
        Command::Clean => load_mgr()?.clean_sim()?,
    }

    Ok(())
}
