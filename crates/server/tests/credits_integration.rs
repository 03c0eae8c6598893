//! Credit gate behavior over the full router.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use clipbox_core::credits::{ChargePoint, CreditMode, CreditsConfig};
use clipbox_core::JobStore;
use common::{TestConfig, TestFixture, VALID_SETTINGS};

fn quota_config(quota: u32, charge_on: ChargePoint) -> TestConfig {
    TestConfig {
        credits: CreditsConfig {
            mode: CreditMode::FixedQuota,
            quota,
            charge_on,
        },
        ..Default::default()
    }
}

#[tokio::test]
async fn test_enqueue_charging_rejects_over_quota() {
    let fixture = TestFixture::with_config(quota_config(2, ChargePoint::Enqueue)).await;

    assert_eq!(
        fixture.submit_video(VALID_SETTINGS).await.status,
        StatusCode::OK
    );
    assert_eq!(
        fixture.submit_video(VALID_SETTINGS).await.status,
        StatusCode::OK
    );

    let response = fixture.submit_video(VALID_SETTINGS).await;
    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.body["error"], "encode quota exhausted");
}

#[tokio::test]
async fn test_enqueue_charging_rejects_before_storing_upload() {
    let fixture = TestFixture::with_config(quota_config(0, ChargePoint::Enqueue)).await;

    let response = fixture.submit_video(VALID_SETTINGS).await;
    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);

    // Nothing reached the queue or the uploads dir
    assert_eq!(fixture.store.count(Some("queued")).unwrap(), 0);
    let uploads_dir = fixture.temp_dir.path().join("uploads");
    let stored = std::fs::read_dir(&uploads_dir)
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(stored, 0);
}

#[tokio::test]
async fn test_completion_charging_accepts_submissions_over_quota() {
    let fixture = TestFixture::with_config(quota_config(1, ChargePoint::Completion)).await;

    // Both accepted up front: credits are only consumed on success
    assert_eq!(
        fixture.submit_video(VALID_SETTINGS).await.status,
        StatusCode::OK
    );
    assert_eq!(
        fixture.submit_video(VALID_SETTINGS).await.status,
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_completion_charging_consumes_on_success() {
    let fixture = TestFixture::with_config(quota_config(1, ChargePoint::Completion)).await;
    fixture.worker.start().await;

    let response = fixture.submit_video(VALID_SETTINGS).await;
    let job_id = response.body["jobId"].as_str().unwrap().to_string();

    let status = fixture
        .wait_for_terminal_status(&job_id, Duration::from_secs(5))
        .await;
    assert_eq!(status.body["status"], "completed");

    fixture.worker.stop().await;
}
