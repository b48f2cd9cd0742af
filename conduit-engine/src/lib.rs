//! Conduit Engine
//!
//! Command interpretation and simulated execution for the Conduit control panel.
//!
//! Architecture:
//! - Store: in-memory collections of pipelines, logs, command history and releases
//! - Interpreter: maps free text to a typed [`interpreter::Intent`]
//! - Services: the dispatcher plus manual pipeline actions and log queries
//! - Scheduler: delayed completions and the progress driver behind dialog flows
//! - Dialogs: the canary, hotfix and terraform multi-step flows
//!
//! Nothing here talks to real infrastructure: every deploy, rollback and
//! terraform apply is a state transition on the store after a fixed delay.

pub mod config;
pub mod dialog;
mod engine;
pub mod error;
pub mod interpreter;
pub mod notify;
pub mod scheduler;
pub mod seed;
pub mod service;
pub mod store;

pub use config::SimulationConfig;
pub use engine::Engine;
pub use error::{EngineError, Result};
