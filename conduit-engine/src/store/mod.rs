//! Store Module
//!
//! In-memory entity store shared by every component of the engine.
//! Each collection sits behind its own lock and is kept newest-first:
//! additions are prepended, identifiers are `max existing + 1`.
//!
//! The store is volatile. Nothing is persisted and a new process starts
//! from an empty (or seeded) state.

mod command;
mod log;
mod pipeline;
mod release;

pub use log::LOG_TIMESTAMP_FORMAT;

use conduit_core::domain::command::CommandRecord;
use conduit_core::domain::log::LogEntry;
use conduit_core::domain::pipeline::Pipeline;
use conduit_core::domain::release::Release;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// In-memory store for pipelines, logs, command history and releases
///
/// Shared as `Arc<Store>`; every mutation replaces the affected collection
/// under its lock, so concurrent completions never interleave within a
/// single update.
#[derive(Debug, Default)]
pub struct Store {
    pipelines: Mutex<Vec<Pipeline>>,
    logs: Mutex<Vec<LogEntry>>,
    commands: Mutex<Vec<CommandRecord>>,
    releases: Mutex<Vec<Release>>,
}

impl Store {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the given pipelines and logs, kept in the
    /// order given (newest first)
    pub fn with_entities(pipelines: Vec<Pipeline>, logs: Vec<LogEntry>) -> Self {
        Self {
            pipelines: Mutex::new(pipelines),
            logs: Mutex::new(logs),
            ..Self::default()
        }
    }
}

/// Locks a collection, recovering the data if a previous holder panicked
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Next identifier for a collection: one past the largest in use, or 1
fn next_id(ids: impl Iterator<Item = u64>) -> u64 {
    ids.max().unwrap_or(0) + 1
}
