//! Test doubles for the encoder and uploader seams.

mod mock_encoder;
mod mock_uploader;

pub use mock_encoder::*;
pub use mock_uploader::*;
