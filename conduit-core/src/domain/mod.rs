//! Core domain types
//!
//! This module contains the entities tracked by the Conduit store.
//! They are plain data: every mutation goes through the store, which
//! owns identifier assignment and timestamps.

pub mod command;
pub mod log;
pub mod pipeline;
pub mod release;
