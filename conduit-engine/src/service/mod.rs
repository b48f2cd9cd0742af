//! Service Module
//!
//! Business logic layer of the engine.
//! Services act on the store through an [`Engine`](crate::Engine) handle.

pub mod dispatch;
pub mod log;
pub mod pipeline;
pub mod report;
pub mod status;

// Re-export for convenience
pub use log as log_service;
pub use pipeline as pipeline_service;
