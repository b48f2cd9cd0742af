//! Configuration module
//!
//! Combines the engine's simulation settings with the CLI flags.

use anyhow::{Context, Result};
use conduit_engine::SimulationConfig;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Timings and seeding for the engine
    pub simulation: SimulationConfig,

    /// Print command results as JSON instead of text
    pub json: bool,
}

impl Config {
    /// Reads the simulation settings from the environment, then applies
    /// the command-line overrides
    pub fn load(speed: u32, no_seed: bool, json: bool) -> Result<Self> {
        let mut simulation = SimulationConfig::from_env()
            .context("Invalid simulation settings in environment")?
            .scaled(speed);

        if no_seed {
            simulation = simulation.without_seed();
        }

        simulation
            .validate()
            .context("Invalid simulation settings after applying --speed")?;

        Ok(Self { simulation, json })
    }
}
