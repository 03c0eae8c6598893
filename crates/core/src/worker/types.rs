//! Worker status types.

use serde::Serialize;

/// Snapshot of the worker and queue state.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerStatus {
    pub running: bool,
    pub queued: i64,
    pub active: i64,
    pub completed: i64,
    pub failed: i64,
}
