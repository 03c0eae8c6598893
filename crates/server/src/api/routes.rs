use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use clipbox_core::uploader::DeliveryBackend;

use super::{handlers, jobs, middleware::auth_middleware, middleware::metrics_middleware};
use crate::state::AppState;

/// Slack on top of the configured payload limits for multipart framing
/// and the settings field.
const BODY_LIMIT_OVERHEAD: usize = 64 * 1024;

pub fn create_router(state: Arc<AppState>) -> Router {
    let max_video_body =
        state.config().storage.max_video_bytes as usize + BODY_LIMIT_OVERHEAD;
    let max_image_body =
        state.config().storage.max_image_bytes as usize + BODY_LIMIT_OVERHEAD;

    let video_routes = Router::new()
        .route("/process", post(jobs::process_video))
        .layer(DefaultBodyLimit::max(max_video_body));

    let image_routes = Router::new()
        .route("/upload-image", post(jobs::upload_image))
        .layer(DefaultBodyLimit::max(max_image_body));

    let protected_routes = Router::new()
        .route("/config", get(handlers::get_config))
        .route("/status/{job_id}", get(jobs::job_status))
        .merge(video_routes)
        .merge(image_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Health stays reachable without credentials
    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected_routes)
        .with_state(state.clone());

    let mut router = Router::new()
        .nest("/api", api_routes)
        .route(
            "/metrics",
            get(handlers::metrics).with_state(state.clone()),
        )
        .nest_service(
            "/uploads",
            ServeDir::new(&state.config().storage.uploads_dir),
        );

    // Encoded results are only served from here with the local backend;
    // the media host serves its own URLs.
    if state.config().delivery.backend == DeliveryBackend::Local {
        let local = state.config().delivery.local.clone().unwrap_or_default();
        router = router.nest_service("/outputs", ServeDir::new(&local.public_dir));
    }

    router
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
