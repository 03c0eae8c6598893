//! Background worker that drives queued jobs to a terminal state.

mod config;
mod runner;
mod types;

pub use config::*;
pub use runner::*;
pub use types::*;
