//! Common test utilities for API testing with mocks.
//!
//! Provides an in-process server over mock encoder and uploader
//! implementations, so the full upload -> queue -> status flow can be
//! exercised without ffmpeg or external hosts.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use clipbox_core::{
    config::{AuthConfig, Config},
    credits::CreditsConfig,
    testing::{MockEncoder, MockUploader},
    worker::WorkerConfig,
    create_authenticator, create_credit_gate, CreditGate, JobStore, JobWorker, SqliteJobStore,
};

use clipbox_server::api::create_router;
use clipbox_server::state::AppState;

/// Multipart boundary used by the request builders.
const BOUNDARY: &str = "test-boundary-1d8f0a42";

/// A valid settings payload for submissions.
pub const VALID_SETTINGS: &str = r##"{
    "background": {"type": "solid", "value": "#112233"},
    "aspectRatio": "1:1",
    "borderRadius": 24,
    "zoom": 80,
    "position": {"x": 0, "y": 0}
}"##;

/// Test fixture with an in-process router and controllable mocks.
pub struct TestFixture {
    pub router: Router,
    pub store: Arc<SqliteJobStore>,
    pub encoder: Arc<MockEncoder>,
    pub uploader: Arc<MockUploader>,
    pub worker: JobWorker,
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Configuration for test fixture.
#[derive(Debug, Clone, Default)]
pub struct TestConfig {
    /// Authentication section (defaults to method "none").
    pub auth: AuthConfig,
    /// Credits section (defaults to unlimited).
    pub credits: CreditsConfig,
    /// Override for the video size limit.
    pub max_video_bytes: Option<u64>,
}

impl TestFixture {
    /// Create a new test fixture with default config.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration. The worker is
    /// created but not started; call `fixture.worker.start()` in tests
    /// that need jobs processed.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let mut config = Config::default();
        config.auth = test_config.auth;
        config.credits = test_config.credits;
        config.database.path = db_path.clone();
        config.storage.uploads_dir = temp_dir.path().join("uploads");
        if let Some(max) = test_config.max_video_bytes {
            config.storage.max_video_bytes = max;
        }
        config.worker = WorkerConfig {
            enabled: true,
            concurrency: 2,
            poll_interval_ms: 50,
            work_dir: temp_dir.path().join("work"),
        };
        if let Some(local) = config.delivery.local.as_mut() {
            local.public_dir = temp_dir.path().join("public");
        }

        let store = Arc::new(SqliteJobStore::new(&db_path).expect("Failed to create job store"));
        let encoder = Arc::new(MockEncoder::new());
        let uploader = Arc::new(MockUploader::new());
        encoder.set_encode_duration_ms(10).await;

        let authenticator = Arc::from(
            create_authenticator(&config.auth).expect("Failed to create authenticator"),
        );
        let credit_gate: Arc<dyn CreditGate> = Arc::from(create_credit_gate(&config.credits));

        let worker = JobWorker::new(
            config.worker.clone(),
            Arc::clone(&store) as Arc<dyn JobStore>,
            Arc::clone(&encoder) as Arc<dyn clipbox_core::Encoder>,
            Arc::clone(&uploader) as Arc<dyn clipbox_core::Uploader>,
        )
        .with_credit_gate(Arc::clone(&credit_gate), config.credits.charge_on);

        let state = Arc::new(AppState::new(
            config,
            authenticator,
            Arc::clone(&store) as Arc<dyn JobStore>,
            credit_gate,
        ));

        let router = create_router(state);

        Self {
            router,
            store,
            encoder,
            uploader,
            worker,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Send a GET request with an extra header.
    pub async fn get_with_header(&self, path: &str, name: &str, value: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .header(name, value)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Submit a video plus settings to /api/process.
    pub async fn submit_video(&self, settings: &str) -> TestResponse {
        let parts = vec![
            Part::file("video", "clip.mp4", "video/mp4", b"fake video bytes".to_vec()),
            Part::text("settings", settings),
        ];
        self.post_multipart("/api/process", parts, &[]).await
    }

    /// Submit a video with an extra header (e.g. an API key).
    pub async fn submit_video_with_header(
        &self,
        settings: &str,
        name: &str,
        value: &str,
    ) -> TestResponse {
        let parts = vec![
            Part::file("video", "clip.mp4", "video/mp4", b"fake video bytes".to_vec()),
            Part::text("settings", settings),
        ];
        self.post_multipart("/api/process", parts, &[(name, value)])
            .await
    }

    /// Send a multipart POST built from the given parts.
    pub async fn post_multipart(
        &self,
        path: &str,
        parts: Vec<Part>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let body = build_multipart_body(&parts);
        let mut builder = Request::builder().method("POST").uri(path).header(
            "Content-Type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = builder.body(Body::from(body)).unwrap();
        self.send(request).await
    }

    /// Poll the status endpoint until the job reaches a terminal state.
    pub async fn wait_for_terminal_status(&self, job_id: &str, timeout: Duration) -> TestResponse {
        let start = std::time::Instant::now();
        loop {
            let response = self.get(&format!("/api/status/{job_id}")).await;
            let status = response.body["status"].as_str().unwrap_or("").to_string();
            if status == "completed" || status == "failed" || start.elapsed() > timeout {
                return response;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// One part of a multipart request body.
pub struct Part {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl Part {
    pub fn text(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            file_name: None,
            content_type: None,
            data: value.as_bytes().to_vec(),
        }
    }

    pub fn file(name: &str, file_name: &str, content_type: &str, data: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            file_name: Some(file_name.to_string()),
            content_type: Some(content_type.to_string()),
            data,
        }
    }
}

fn build_multipart_body(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
        if let Some(file_name) = &part.file_name {
            disposition.push_str(&format!("; filename=\"{file_name}\""));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");
        if let Some(content_type) = &part.content_type {
            body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(&part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}
