//! Job and result types for the encoder module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::filtergraph::GraphSpec;

/// A single encode invocation: one input video, one filter graph, one
/// output file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodeJob {
    pub job_id: String,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub graph: GraphSpec,
}

/// Result of a successful encode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodeResult {
    pub job_id: String,
    pub output_path: PathBuf,
    pub output_size_bytes: u64,
    pub duration_ms: u64,
}
