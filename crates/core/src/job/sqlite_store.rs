//! SQLite-backed job store implementation.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::{EnqueueRequest, Job, JobError, JobState, JobStore};
use crate::settings::{AspectRatio, Background, Position, StudioSettings};

const JOB_COLUMNS: &str = "id, created_at, created_by, input_path, settings, state, updated_at";

/// SQLite-backed job store.
///
/// A single connection behind a mutex keeps every operation atomic
/// in-process, which is what makes `claim_next` a safe single-claim.
pub struct SqliteJobStore {
    conn: Mutex<Connection>,
}

impl SqliteJobStore {
    /// Create a new SQLite job store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, JobError> {
        let conn = Connection::open(path).map_err(|e| JobError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite job store (useful for testing).
    pub fn in_memory() -> Result<Self, JobError> {
        let conn = Connection::open_in_memory().map_err(|e| JobError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), JobError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS jobs (
                id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL,
                created_by TEXT NOT NULL,
                input_path TEXT NOT NULL,
                settings TEXT NOT NULL,
                state TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_jobs_created_at ON jobs(created_at);
            CREATE INDEX IF NOT EXISTS idx_jobs_state_type
                ON jobs(json_extract(state, '$.type'));
            "#,
        )
        .map_err(|e| JobError::Database(e.to_string()))?;

        Ok(())
    }

    fn row_to_job(row: &rusqlite::Row) -> rusqlite::Result<Job> {
        let id: String = row.get(0)?;
        let created_at_str: String = row.get(1)?;
        let created_by: String = row.get(2)?;
        let input_path: String = row.get(3)?;
        let settings_json: String = row.get(4)?;
        let state_json: String = row.get(5)?;
        let updated_at_str: String = row.get(6)?;

        // Parse timestamps - use now if parsing fails (shouldn't happen with valid data)
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        let updated_at = DateTime::parse_from_rfc3339(&updated_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        let state: JobState = serde_json::from_str(&state_json).unwrap_or(JobState::Queued);

        let settings: StudioSettings =
            serde_json::from_str(&settings_json).unwrap_or_else(|_| StudioSettings {
                background: Background::Solid("black".to_string()),
                aspect_ratio: AspectRatio::Square,
                border_radius: 0,
                zoom: 100,
                position: Position::default(),
            });

        Ok(Job {
            id,
            created_at,
            created_by,
            input_path: PathBuf::from(input_path),
            settings,
            state,
            updated_at,
        })
    }

    /// Fetch a job while already holding the connection lock.
    fn fetch(conn: &Connection, id: &str) -> Result<Option<Job>, JobError> {
        let result = conn.query_row(
            &format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?"),
            params![id],
            Self::row_to_job,
        );

        match result {
            Ok(job) => Ok(Some(job)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(JobError::Database(e.to_string())),
        }
    }

    /// Write a new state for a job while holding the connection lock.
    fn write_state(conn: &Connection, id: &str, state: &JobState) -> Result<(), JobError> {
        let state_json =
            serde_json::to_string(state).map_err(|e| JobError::Database(e.to_string()))?;
        conn.execute(
            "UPDATE jobs SET state = ?, updated_at = ? WHERE id = ?",
            params![state_json, Utc::now().to_rfc3339(), id],
        )
        .map_err(|e| JobError::Database(e.to_string()))?;
        Ok(())
    }
}

impl JobStore for SqliteJobStore {
    fn enqueue(&self, request: EnqueueRequest) -> Result<Job, JobError> {
        let conn = self.conn.lock().unwrap();

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        let state = JobState::Queued;

        let state_json =
            serde_json::to_string(&state).map_err(|e| JobError::Database(e.to_string()))?;
        let settings_json = serde_json::to_string(&request.settings)
            .map_err(|e| JobError::Database(e.to_string()))?;

        conn.execute(
            "INSERT INTO jobs (id, created_at, created_by, input_path, settings, state, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                id,
                now.to_rfc3339(),
                request.created_by,
                request.input_path.to_string_lossy(),
                settings_json,
                state_json,
                now.to_rfc3339(),
            ],
        )
        .map_err(|e| JobError::Database(e.to_string()))?;

        Ok(Job {
            id,
            created_at: now,
            created_by: request.created_by,
            input_path: request.input_path,
            settings: request.settings,
            state,
            updated_at: now,
        })
    }

    fn get(&self, id: &str) -> Result<Option<Job>, JobError> {
        let conn = self.conn.lock().unwrap();
        Self::fetch(&conn, id)
    }

    fn claim_next(&self) -> Result<Option<Job>, JobError> {
        let conn = self.conn.lock().unwrap();

        let candidate = conn.query_row(
            "SELECT id FROM jobs WHERE json_extract(state, '$.type') = 'queued' ORDER BY created_at ASC LIMIT 1",
            [],
            |row| row.get::<_, String>(0),
        );

        let id = match candidate {
            Ok(id) => id,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(JobError::Database(e.to_string())),
        };

        let state = JobState::Active {
            claimed_at: Utc::now(),
        };
        Self::write_state(&conn, &id, &state)?;

        Self::fetch(&conn, &id)
    }

    fn complete(&self, id: &str, url: &str) -> Result<Job, JobError> {
        let conn = self.conn.lock().unwrap();

        let job = Self::fetch(&conn, id)?.ok_or_else(|| JobError::NotFound(id.to_string()))?;

        match &job.state {
            JobState::Active { .. } => {
                let state = JobState::Completed {
                    url: url.to_string(),
                    completed_at: Utc::now(),
                };
                Self::write_state(&conn, id, &state)?;
                Self::fetch(&conn, id)?.ok_or_else(|| JobError::NotFound(id.to_string()))
            }
            // Already completed: keep the recorded result untouched.
            JobState::Completed { .. } => Ok(job),
            other => Err(JobError::InvalidState {
                job_id: id.to_string(),
                current_state: other.state_type().to_string(),
                operation: "complete".to_string(),
            }),
        }
    }

    fn fail(&self, id: &str, reason: &str) -> Result<Job, JobError> {
        let conn = self.conn.lock().unwrap();

        let job = Self::fetch(&conn, id)?.ok_or_else(|| JobError::NotFound(id.to_string()))?;

        match &job.state {
            JobState::Active { .. } => {
                let state = JobState::Failed {
                    reason: reason.to_string(),
                    failed_at: Utc::now(),
                };
                Self::write_state(&conn, id, &state)?;
                Self::fetch(&conn, id)?.ok_or_else(|| JobError::NotFound(id.to_string()))
            }
            JobState::Failed { .. } => Ok(job),
            other => Err(JobError::InvalidState {
                job_id: id.to_string(),
                current_state: other.state_type().to_string(),
                operation: "fail".to_string(),
            }),
        }
    }

    fn count(&self, state: Option<&str>) -> Result<i64, JobError> {
        let conn = self.conn.lock().unwrap();

        let result = match state {
            Some(state) => conn.query_row(
                "SELECT COUNT(*) FROM jobs WHERE json_extract(state, '$.type') = ?",
                params![state],
                |row| row.get(0),
            ),
            None => conn.query_row("SELECT COUNT(*) FROM jobs", [], |row| row.get(0)),
        };

        result.map_err(|e| JobError::Database(e.to_string()))
    }

    fn fail_orphaned_active(&self, reason: &str) -> Result<u64, JobError> {
        let conn = self.conn.lock().unwrap();

        let state = JobState::Failed {
            reason: reason.to_string(),
            failed_at: Utc::now(),
        };
        let state_json =
            serde_json::to_string(&state).map_err(|e| JobError::Database(e.to_string()))?;

        let updated = conn
            .execute(
                "UPDATE jobs SET state = ?, updated_at = ? WHERE json_extract(state, '$.type') = 'active'",
                params![state_json, Utc::now().to_rfc3339()],
            )
            .map_err(|e| JobError::Database(e.to_string()))?;

        Ok(updated as u64)
    }
}
