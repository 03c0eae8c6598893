use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clipbox_core::{
    create_authenticator, create_credit_gate, create_uploader, load_config, load_config_from_env,
    validate_config, Authenticator, CreditGate, Encoder, FfmpegEncoder, JobStore, JobWorker,
    SqliteJobStore, Uploader,
};

use clipbox_server::api::create_router;
use clipbox_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration. Without a config file everything runs on
    // defaults plus CLIPBOX_ env overrides.
    let config_path = std::env::var("CLIPBOX_CONFIG").map(PathBuf::from).ok();
    let config = match config_path {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            load_config(&path).with_context(|| format!("Failed to load config from {:?}", path))?
        }
        None => {
            info!("No config file set, using defaults with CLIPBOX_ env overrides");
            load_config_from_env().context("Failed to load config from environment")?
        }
    };

    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Auth method: {:?}", config.auth.method);
    info!("Database path: {:?}", config.database.path);
    info!("Delivery backend: {}", config.delivery.backend.as_str());

    tokio::fs::create_dir_all(&config.storage.uploads_dir)
        .await
        .context("Failed to create uploads directory")?;

    // Create authenticator
    let authenticator: Arc<dyn Authenticator> = Arc::from(
        create_authenticator(&config.auth).context("Failed to create authenticator")?,
    );
    info!("Using authenticator: {}", authenticator.method_name());

    // Create SQLite job store
    let job_store: Arc<dyn JobStore> = Arc::new(
        SqliteJobStore::new(&config.database.path).context("Failed to create job store")?,
    );
    info!("Job store initialized");

    // Create encoder and probe the ffmpeg binary up front
    let encoder: Arc<dyn Encoder> = Arc::new(FfmpegEncoder::new(config.encoder.clone()));
    if let Err(e) = encoder.validate().await {
        warn!(error = %e, "FFmpeg probe failed, encodes will fail until it is available");
    }

    // Create result uploader
    let uploader: Arc<dyn Uploader> =
        Arc::from(create_uploader(&config.delivery).context("Failed to create uploader")?);
    info!("Using uploader: {}", uploader.name());

    // Create credit gate
    let credit_gate: Arc<dyn CreditGate> = Arc::from(create_credit_gate(&config.credits));
    info!("Using credit gate: {}", credit_gate.name());

    // Create and start the job worker
    let worker = JobWorker::new(
        config.worker.clone(),
        Arc::clone(&job_store),
        encoder,
        uploader,
    )
    .with_credit_gate(Arc::clone(&credit_gate), config.credits.charge_on);

    if config.worker.enabled {
        worker.start().await;
    } else {
        info!("Worker disabled in config, jobs will queue without processing");
    }

    // Create app state and router
    let state = Arc::new(AppState::new(
        config.clone(),
        authenticator,
        job_store,
        credit_gate,
    ));
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    if config.worker.enabled {
        worker.stop().await;
    }

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
