//! Grid-based agent simulations: foxes hunting rabbits, and a disease
//! spreading through a crowd.

pub mod analysis;
pub mod config;
pub mod field;
pub mod field_stats;
pub mod foxes;
pub mod location;
pub mod manager;
pub mod pandemic;
pub mod simulation;
pub mod stats;
pub mod trajectory;
pub mod view;
