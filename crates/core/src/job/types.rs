//! Core job data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::settings::StudioSettings;

/// Lifecycle state of an encode job.
///
/// Transitions are strictly `Queued -> Active -> Completed | Failed`.
/// Terminal states never change once recorded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobState {
    /// Waiting to be claimed by a worker.
    Queued,

    /// Claimed and being processed.
    Active { claimed_at: DateTime<Utc> },

    /// Finished successfully, result published.
    Completed {
        url: String,
        completed_at: DateTime<Utc>,
    },

    /// Finished unsuccessfully.
    Failed {
        reason: String,
        failed_at: DateTime<Utc>,
    },
}

impl JobState {
    /// Whether this state is terminal (no further transitions).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Failed { .. })
    }

    /// State discriminant as stored in the database.
    pub fn state_type(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Active { .. } => "active",
            Self::Completed { .. } => "completed",
            Self::Failed { .. } => "failed",
        }
    }
}

/// A persisted encode job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    pub id: String,
    pub created_at: DateTime<Utc>,
    /// User that enqueued the job.
    pub created_by: String,
    /// Path of the uploaded input video.
    pub input_path: PathBuf,
    pub settings: StudioSettings,
    pub state: JobState,
    pub updated_at: DateTime<Utc>,
}
