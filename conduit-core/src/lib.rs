//! Conduit Core
//!
//! Core types for the Conduit CI/CD control panel.
//!
//! This crate contains:
//! - Domain types: the entities held by the store (Pipeline, LogEntry, etc.)
//! - DTOs: creation requests, partial updates and command results exchanged
//!   between the interpreter, the dispatcher and the shell

pub mod domain;
pub mod dto;
