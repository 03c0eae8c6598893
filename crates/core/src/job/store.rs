//! Job storage trait and request types.

use std::fmt;
use std::path::PathBuf;

use crate::job::Job;
use crate::settings::StudioSettings;

/// Error type for job store operations.
#[derive(Debug)]
pub enum JobError {
    /// Job not found.
    NotFound(String),
    /// Cannot perform operation due to current state.
    InvalidState {
        job_id: String,
        current_state: String,
        operation: String,
    },
    /// Database error.
    Database(String),
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobError::NotFound(id) => write!(f, "Job not found: {}", id),
            JobError::InvalidState {
                job_id,
                current_state,
                operation,
            } => write!(
                f,
                "Cannot {} job {}: current state is {}",
                operation, job_id, current_state
            ),
            JobError::Database(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for JobError {}

/// Request to enqueue a new job.
#[derive(Debug, Clone)]
pub struct EnqueueRequest {
    /// User enqueueing the job.
    pub created_by: String,
    /// Path of the uploaded input video.
    pub input_path: PathBuf,
    /// Styling settings for the encode.
    pub settings: StudioSettings,
}

/// Trait for job storage backends.
///
/// Implementations must make `claim_next` atomic: under concurrent
/// workers, each queued job is handed out exactly once.
pub trait JobStore: Send + Sync {
    /// Enqueue a new job in the `queued` state.
    fn enqueue(&self, request: EnqueueRequest) -> Result<Job, JobError>;

    /// Get a job by ID.
    fn get(&self, id: &str) -> Result<Option<Job>, JobError>;

    /// Atomically claim the oldest queued job, moving it to `active`.
    /// Returns None when the queue is empty.
    fn claim_next(&self) -> Result<Option<Job>, JobError>;

    /// Transition an active job to `completed` with its result URL.
    ///
    /// Calling this on an already-completed job is a no-op returning the
    /// stored job; the recorded URL is never overwritten.
    fn complete(&self, id: &str, url: &str) -> Result<Job, JobError>;

    /// Transition an active job to `failed` with a reason.
    ///
    /// Calling this on an already-failed job is a no-op returning the
    /// stored job.
    fn fail(&self, id: &str, reason: &str) -> Result<Job, JobError>;

    /// Count jobs, optionally restricted to one state type.
    fn count(&self, state: Option<&str>) -> Result<i64, JobError>;

    /// Fail every job stuck in `active`. Used at worker startup to clear
    /// jobs orphaned by a crash. Returns the number of jobs failed.
    fn fail_orphaned_active(&self, reason: &str) -> Result<u64, JobError>;
}
