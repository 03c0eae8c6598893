//! Typed ffmpeg filter graphs.
//!
//! Render plans are expressed as a list of typed stages wired together by
//! stream labels. The textual `-filter_complex` syntax only exists at the
//! encoder boundary, produced by [`GraphSpec::serialize`].

mod builder;
mod types;

pub use builder::*;
pub use types::*;
