use std::{env, fs, path::PathBuf};
use wildfield::config::Config;
use wildfield::foxes::{self, Species};
use wildfield::location::Location;
use wildfield::manager::drive;
use wildfield::pandemic::{self, State};
use wildfield::simulation::Simulation;
use wildfield::trajectory::read_trajectory;
use wildfield::view::StatsView;

#[test]
fn fox_clears_the_only_rabbit() {
    let mut config = Config::default();
    config.foxes.depth = 5;
    config.foxes.width = 5;
    config.foxes.fox_creation_probability = 0.0;
    config.foxes.rabbit_creation_probability = 0.0;

    let mut sim = foxes::Simulator::with_seed(config, 17).expect("failed to build simulator");
    sim.attach(Box::new(StatsView::new(foxes::foxes_stats())));
    sim.clear();
    // The fox is added first so it acts before the rabbit can move away.
    sim.add_animal(Species::Fox, Location::new(2, 3))
        .expect("failed to add fox");
    sim.add_animal(Species::Rabbit, Location::new(2, 2))
        .expect("failed to add rabbit");

    let step = sim.simulate_one_step();

    assert_eq!(sim.population_count(Species::Rabbit), 0);
    assert!(!sim.is_viable(step));
}

#[test]
fn lone_infected_human_dies() {
    let mut config = Config::default();
    config.pandemic.depth = 3;
    config.pandemic.width = 3;
    config.pandemic.infected_creation_probability = 0.0;
    config.pandemic.healthy_creation_probability = 0.0;
    config.pandemic.max_contamination = 1;
    config.pandemic.infection_duration = 1.0;

    let mut sim = pandemic::Simulator::with_seed(config, 23).expect("failed to build simulator");
    sim.attach(Box::new(StatsView::new(pandemic::pandemic_stats())));
    sim.clear();
    sim.add_human(State::Infected, Location::new(1, 1))
        .expect("failed to add human");

    let step = sim.simulate_one_step();

    assert_eq!(sim.population_count(State::Dead), 1);
    assert_eq!(sim.population_count(State::Infected), 0);
    assert!(!sim.is_viable(step));
}

#[test]
fn repeated_reset_returns_to_step_zero() {
    let mut foxes = foxes::Simulator::with_seed(Config::default(), 1).expect("failed to build");
    let mut pandemic =
        pandemic::Simulator::with_seed(Config::default(), 1).expect("failed to build");
    for _ in 0..3 {
        foxes.simulate_one_step();
        pandemic.simulate_one_step();
        foxes.reset();
        pandemic.reset();
        assert_eq!(foxes.step(), 0);
        assert_eq!(pandemic.step(), 0);
    }
}

#[test]
fn driven_run_stops_at_step_ceiling() {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("driven_run");
    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir(&test_dir).expect("failed to create test directory");
    let trajectory_file = test_dir.join("trajectory.msgpack");

    let mut config = Config::default();
    config.run.max_steps = 12;
    config.foxes.depth = 40;
    config.foxes.width = 40;
    // Foxes stay fed well past the ceiling.
    config.foxes.rabbit_food_value = 1000;
    let mut sim = foxes::Simulator::with_seed(config, 99).expect("failed to build simulator");

    let seed = drive(&mut sim, &trajectory_file, 5).expect("failed to drive simulation");
    assert_eq!(seed, 99);

    let records = read_trajectory(&trajectory_file).expect("failed to read trajectory");
    let last = records.last().expect("trajectory is empty");
    assert!(!last.viable);
    assert_eq!(last.step, 13);
    assert_eq!(sim.step(), 13);
    assert!(records.iter().rev().skip(1).all(|record| record.viable));
    for (idx, record) in records.iter().enumerate() {
        assert_eq!(record.step, idx);
        let names: Vec<_> = record.counts.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["Fox", "Rabbit"]);
    }

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn driven_run_always_takes_one_step() {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("driven_single_step");
    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir(&test_dir).expect("failed to create test directory");
    let trajectory_file = test_dir.join("trajectory.msgpack");

    // Only rabbits: not viable from the start.
    let mut config = Config::default();
    config.foxes.depth = 10;
    config.foxes.width = 10;
    config.foxes.fox_creation_probability = 0.0;
    config.foxes.rabbit_creation_probability = 0.5;
    let mut sim = foxes::Simulator::with_seed(config, 5).expect("failed to build simulator");

    drive(&mut sim, &trajectory_file, 100).expect("failed to drive simulation");

    let records = read_trajectory(&trajectory_file).expect("failed to read trajectory");
    let steps: Vec<_> = records.iter().map(|record| record.step).collect();
    assert_eq!(steps, [0, 1]);
    assert!(records[0].viable);
    assert!(!records[1].viable);

    fs::remove_dir_all(&test_dir).ok();
}
