//! Resolution of raw studio settings into concrete render parameters.

mod plan;
mod resolver;

pub use plan::*;
pub use resolver::*;
