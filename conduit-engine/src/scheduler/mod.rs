//! Scheduler layer
//!
//! Simulated asynchronous work. Two primitives:
//! - [`CompletionScheduler`]: fire-once delayed pipeline completions
//! - [`ProgressDriver`]: a percentage counter stepped on a fixed interval,
//!   shared by every dialog progress bar

pub mod completion;
pub mod progress;

pub use completion::{Completion, CompletionHandle, CompletionScheduler};
pub use progress::ProgressDriver;
