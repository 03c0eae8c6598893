//! Configuration for the job worker.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the embedded worker runs at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Maximum jobs processed concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Queue poll interval in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Directory for encoded outputs before delivery.
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
}

fn default_enabled() -> bool {
    true
}

fn default_concurrency() -> usize {
    2
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_work_dir() -> PathBuf {
    std::env::temp_dir().join("clipbox-work")
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            concurrency: default_concurrency(),
            poll_interval_ms: default_poll_interval_ms(),
            work_dir: default_work_dir(),
        }
    }
}
