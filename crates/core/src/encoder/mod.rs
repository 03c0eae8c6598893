//! Video encoding via an external ffmpeg process.

mod config;
mod error;
mod ffmpeg;
mod traits;
mod types;

pub use config::*;
pub use error::*;
pub use ffmpeg::*;
pub use traits::*;
pub use types::*;
