//! Job API handlers: video submission, status polling, image upload.

use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use clipbox_core::{
    credits::{ChargePoint, CreditError},
    job::EnqueueRequest,
    metrics::JOBS_ENQUEUED,
    settings::StudioSettings,
    JobState,
};

use super::middleware::AuthUser;
use crate::metrics::UPLOADS_REJECTED_TOTAL;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Response for accepted encode jobs.
#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    #[serde(rename = "jobId")]
    pub job_id: String,
}

/// Response for the status endpoint. Field presence depends on state:
/// `url` only for completed jobs, `message` only for failed ones.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StatusResponse {
    fn bare(status: &str) -> Self {
        Self {
            status: status.to_string(),
            url: None,
            message: None,
        }
    }
}

/// Response for image uploads.
#[derive(Debug, Serialize)]
pub struct UploadImageResponse {
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn bad_request(message: impl Into<String>) -> ApiError {
    error_response(StatusCode::BAD_REQUEST, message)
}

// ============================================================================
// Handlers
// ============================================================================

/// Accept a video upload plus styling settings and enqueue an encode job.
///
/// Multipart fields (any order):
/// - `video`: the file, content type must be `video/*`
/// - `settings`: JSON-encoded styling payload
pub async fn process_video(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    mut multipart: Multipart,
) -> Result<Json<ProcessResponse>, ApiError> {
    let mut video: Option<(String, Bytes)> = None;
    let mut settings_raw: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("malformed multipart body: {e}")))?
    {
        match field.name() {
            Some("video") => {
                let content_type = field.content_type().unwrap_or("").to_string();
                if !content_type.starts_with("video/") {
                    UPLOADS_REJECTED_TOTAL
                        .with_label_values(&["content_type"])
                        .inc();
                    return Err(bad_request(format!(
                        "expected a video/* upload, got '{content_type}'"
                    )));
                }
                let file_name = field.file_name().unwrap_or("upload.mp4").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(format!("failed to read video field: {e}")))?;
                video = Some((file_name, bytes));
            }
            Some("settings") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| bad_request(format!("failed to read settings field: {e}")))?;
                settings_raw = Some(text);
            }
            _ => {}
        }
    }

    let Some((file_name, bytes)) = video else {
        UPLOADS_REJECTED_TOTAL
            .with_label_values(&["missing_video"])
            .inc();
        return Err(bad_request("missing 'video' field"));
    };

    if bytes.len() as u64 > state.config().storage.max_video_bytes {
        UPLOADS_REJECTED_TOTAL.with_label_values(&["too_large"]).inc();
        return Err(error_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            "video exceeds the size limit",
        ));
    }

    let Some(settings_raw) = settings_raw else {
        UPLOADS_REJECTED_TOTAL
            .with_label_values(&["missing_settings"])
            .inc();
        return Err(bad_request("missing 'settings' field"));
    };

    let settings: StudioSettings = serde_json::from_str(&settings_raw).map_err(|e| {
        UPLOADS_REJECTED_TOTAL
            .with_label_values(&["bad_settings"])
            .inc();
        bad_request(format!("invalid settings: {e}"))
    })?;
    settings.validate().map_err(|e| {
        UPLOADS_REJECTED_TOTAL
            .with_label_values(&["bad_settings"])
            .inc();
        bad_request(format!("invalid settings: {e}"))
    })?;

    // Charge the credit up front when configured so; completion charging
    // happens in the worker.
    let charged = if state.charge_on() == ChargePoint::Enqueue {
        match state.credit_gate().try_charge(&user_id).await {
            Ok(()) => true,
            Err(CreditError::Exhausted { .. }) => {
                return Err(error_response(
                    StatusCode::TOO_MANY_REQUESTS,
                    "encode quota exhausted",
                ));
            }
            Err(e) => {
                return Err(error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    e.to_string(),
                ));
            }
        }
    } else {
        false
    };

    let input_path = match store_upload(&state, &file_name, &bytes).await {
        Ok(path) => path,
        Err(e) => {
            warn!(error = %e, "Failed to store uploaded video");
            if charged {
                state.credit_gate().refund(&user_id).await;
            }
            return Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to store upload",
            ));
        }
    };

    let request = EnqueueRequest {
        created_by: user_id.clone(),
        input_path,
        settings,
    };

    match state.job_store().enqueue(request) {
        Ok(job) => {
            JOBS_ENQUEUED.inc();
            info!(job_id = %job.id, created_by = %user_id, "Job enqueued");
            Ok(Json(ProcessResponse { job_id: job.id }))
        }
        Err(e) => {
            if charged {
                state.credit_gate().refund(&user_id).await;
            }
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                e.to_string(),
            ))
        }
    }
}

/// Poll the state of a previously submitted job.
pub async fn job_status(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<(StatusCode, Json<StatusResponse>), ApiError> {
    if Uuid::parse_str(&job_id).is_err() {
        return Err(bad_request("invalid job id"));
    }

    match state.job_store().get(&job_id) {
        Ok(Some(job)) => {
            let response = match job.state {
                JobState::Queued => StatusResponse::bare("queued"),
                JobState::Active { .. } => StatusResponse::bare("processing"),
                JobState::Completed { url, .. } => StatusResponse {
                    status: "completed".to_string(),
                    url: Some(url),
                    message: None,
                },
                JobState::Failed { reason, .. } => StatusResponse {
                    status: "failed".to_string(),
                    url: None,
                    message: Some(reason),
                },
            };
            Ok((StatusCode::OK, Json(response)))
        }
        Ok(None) => Ok((
            StatusCode::NOT_FOUND,
            Json(StatusResponse::bare("not-found")),
        )),
        Err(e) => Err(error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            e.to_string(),
        )),
    }
}

/// Accept an image upload (used by the studio for background pickers) and
/// return the URL it is served under.
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadImageResponse>, ApiError> {
    let mut image: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("malformed multipart body: {e}")))?
    {
        if field.name() == Some("image") {
            let content_type = field.content_type().unwrap_or("").to_string();
            if !content_type.starts_with("image/") {
                UPLOADS_REJECTED_TOTAL
                    .with_label_values(&["content_type"])
                    .inc();
                return Err(bad_request(format!(
                    "expected an image/* upload, got '{content_type}'"
                )));
            }
            let file_name = field.file_name().unwrap_or("image.png").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| bad_request(format!("failed to read image field: {e}")))?;
            image = Some((file_name, bytes));
        }
    }

    let Some((file_name, bytes)) = image else {
        UPLOADS_REJECTED_TOTAL
            .with_label_values(&["missing_image"])
            .inc();
        return Err(bad_request("missing 'image' field"));
    };

    if bytes.len() as u64 > state.config().storage.max_image_bytes {
        UPLOADS_REJECTED_TOTAL.with_label_values(&["too_large"]).inc();
        return Err(error_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            "image exceeds the size limit",
        ));
    }

    let stored_path = store_upload(&state, &file_name, &bytes).await.map_err(|e| {
        warn!(error = %e, "Failed to store uploaded image");
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to store upload")
    })?;

    // The uploads dir is served under /uploads
    let stored_name = stored_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    Ok(Json(UploadImageResponse {
        image_url: format!("/uploads/{stored_name}"),
    }))
}

// ============================================================================
// Helpers
// ============================================================================

/// Write an upload into the configured uploads dir under a
/// timestamp-prefixed, sanitized name. Returns the full path.
async fn store_upload(
    state: &AppState,
    file_name: &str,
    bytes: &Bytes,
) -> std::io::Result<PathBuf> {
    let uploads_dir = &state.config().storage.uploads_dir;
    tokio::fs::create_dir_all(uploads_dir).await?;

    let stored_name = format!(
        "{}-{}",
        Utc::now().timestamp_millis(),
        sanitize_filename(file_name)
    );
    let path = uploads_dir.join(stored_name);
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}

/// Make a client-supplied filename safe to place in the uploads dir.
/// Whitespace and parentheses become '-'; path separators must not
/// survive into the stored name.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            c if c.is_whitespace() => '-',
            '(' | ')' => '-',
            '/' | '\\' | ':' => '-',
            c => c,
        })
        .collect()
}
