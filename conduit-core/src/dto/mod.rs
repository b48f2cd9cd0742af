//! Data Transfer Objects
//!
//! Lightweight request and result types passed between the interpreter,
//! the dispatcher, the dialog flows and the shell.

pub mod command;
pub mod log;
pub mod pipeline;
