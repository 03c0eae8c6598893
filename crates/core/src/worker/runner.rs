//! The job worker - claims queued jobs and drives them to a terminal state.
//!
//! Each claimed job runs resolve -> build graph -> encode -> publish. A
//! semaphore bounds how many encodes run at once; a broadcast channel
//! signals shutdown to the claim loop.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{broadcast, OwnedSemaphorePermit, Semaphore};
use tracing::{debug, error, info, warn};

use crate::credits::{ChargePoint, CreditGate};
use crate::encoder::{EncodeJob, Encoder, EncoderError};
use crate::filtergraph::build_graph;
use crate::job::{Job, JobStore};
use crate::metrics;
use crate::transform::resolve;
use crate::uploader::Uploader;

use super::config::WorkerConfig;
use super::types::WorkerStatus;

/// Reason recorded on jobs found active at startup: their worker died
/// mid-encode and the result is gone.
const ORPHAN_REASON: &str = "processing was interrupted by a restart";

/// The job worker.
pub struct JobWorker {
    config: WorkerConfig,
    store: Arc<dyn JobStore>,
    encoder: Arc<dyn Encoder>,
    uploader: Arc<dyn Uploader>,
    credit_gate: Option<Arc<dyn CreditGate>>,
    charge_on: ChargePoint,

    // Runtime state
    running: Arc<AtomicBool>,
    semaphore: Arc<Semaphore>,
    shutdown_tx: broadcast::Sender<()>,
}

impl JobWorker {
    /// Create a new worker over injected capabilities.
    pub fn new(
        config: WorkerConfig,
        store: Arc<dyn JobStore>,
        encoder: Arc<dyn Encoder>,
        uploader: Arc<dyn Uploader>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        let concurrency = config.concurrency.max(1);

        Self {
            config,
            store,
            encoder,
            uploader,
            credit_gate: None,
            charge_on: ChargePoint::Enqueue,
            running: Arc::new(AtomicBool::new(false)),
            semaphore: Arc::new(Semaphore::new(concurrency)),
            shutdown_tx,
        }
    }

    /// Attach a credit gate. Only relevant for the completion charge
    /// point; enqueue-time charging happens before jobs reach the worker.
    pub fn with_credit_gate(mut self, gate: Arc<dyn CreditGate>, charge_on: ChargePoint) -> Self {
        self.credit_gate = Some(gate);
        self.charge_on = charge_on;
        self
    }

    /// Start the worker (spawns the claim loop).
    pub async fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Worker already running");
            return;
        }

        info!(concurrency = self.config.concurrency, "Starting job worker");

        if let Err(e) = tokio::fs::create_dir_all(&self.config.work_dir).await {
            error!(error = %e, "Failed to create work directory");
        }

        self.recover_orphaned_jobs();
        self.spawn_claim_loop();

        info!("Job worker started");
    }

    /// Stop the worker gracefully. In-flight encodes are left to finish.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Worker not running");
            return;
        }

        info!("Stopping job worker");
        let _ = self.shutdown_tx.send(());
        tokio::time::sleep(Duration::from_millis(100)).await;
        info!("Job worker stopped");
    }

    /// Get current worker and queue status.
    pub fn status(&self) -> WorkerStatus {
        WorkerStatus {
            running: self.running.load(Ordering::Relaxed),
            queued: self.store.count(Some("queued")).unwrap_or(0),
            active: self.store.count(Some("active")).unwrap_or(0),
            completed: self.store.count(Some("completed")).unwrap_or(0),
            failed: self.store.count(Some("failed")).unwrap_or(0),
        }
    }

    /// Fail jobs left active by a previous crash. Their encode output is
    /// gone, so the only honest state is failed.
    fn recover_orphaned_jobs(&self) {
        match self.store.fail_orphaned_active(ORPHAN_REASON) {
            Ok(0) => {}
            Ok(count) => {
                warn!(count, "Failed orphaned active jobs from previous run");
                metrics::JOBS_FAILED
                    .with_label_values(&["recovery"])
                    .inc_by(count);
            }
            Err(e) => {
                error!(error = %e, "Failed to sweep orphaned jobs");
            }
        }
    }

    /// Spawn the claim loop task.
    fn spawn_claim_loop(&self) {
        let running = Arc::clone(&self.running);
        let store = Arc::clone(&self.store);
        let encoder = Arc::clone(&self.encoder);
        let uploader = Arc::clone(&self.uploader);
        let credit_gate = self.credit_gate.clone();
        let charge_on = self.charge_on;
        let semaphore = Arc::clone(&self.semaphore);
        let work_dir = self.config.work_dir.clone();
        let poll_interval = Duration::from_millis(self.config.poll_interval_ms);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            info!("Claim loop started");
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Claim loop received shutdown signal");
                        break;
                    }
                    _ = tokio::time::sleep(poll_interval) => {
                        if !running.load(Ordering::Relaxed) {
                            break;
                        }
                        Self::claim_available(
                            &store,
                            &encoder,
                            &uploader,
                            &credit_gate,
                            charge_on,
                            &semaphore,
                            &work_dir,
                        ).await;
                    }
                }
            }
            info!("Claim loop stopped");
        });
    }

    /// Claim and spawn as many queued jobs as free permits allow.
    #[allow(clippy::too_many_arguments)]
    async fn claim_available(
        store: &Arc<dyn JobStore>,
        encoder: &Arc<dyn Encoder>,
        uploader: &Arc<dyn Uploader>,
        credit_gate: &Option<Arc<dyn CreditGate>>,
        charge_on: ChargePoint,
        semaphore: &Arc<Semaphore>,
        work_dir: &Path,
    ) {
        loop {
            let Ok(permit) = Arc::clone(semaphore).try_acquire_owned() else {
                return; // All workers busy
            };

            let job = match store.claim_next() {
                Ok(Some(job)) => job,
                Ok(None) => return,
                Err(e) => {
                    warn!(error = %e, "Failed to claim next job");
                    return;
                }
            };

            debug!(job_id = %job.id, "Claimed job");

            let store = Arc::clone(store);
            let encoder = Arc::clone(encoder);
            let uploader = Arc::clone(uploader);
            let credit_gate = credit_gate.clone();
            let work_dir = work_dir.to_path_buf();
            tokio::spawn(async move {
                Self::process_job(
                    &store,
                    &encoder,
                    &uploader,
                    &credit_gate,
                    charge_on,
                    &work_dir,
                    job,
                    permit,
                )
                .await;
            });
        }
    }

    /// Drive one claimed job to a terminal state.
    #[allow(clippy::too_many_arguments)]
    async fn process_job(
        store: &Arc<dyn JobStore>,
        encoder: &Arc<dyn Encoder>,
        uploader: &Arc<dyn Uploader>,
        credit_gate: &Option<Arc<dyn CreditGate>>,
        charge_on: ChargePoint,
        work_dir: &Path,
        job: Job,
        _permit: OwnedSemaphorePermit,
    ) {
        metrics::JOBS_ACTIVE.inc();
        let start = Instant::now();

        let plan = resolve(&job.settings);
        let graph = build_graph(&plan);
        let output_path = work_dir.join(format!("output-{}.mp4", job.id));

        info!(
            job_id = %job.id,
            canvas = format!("{}x{}", plan.canvas_width, plan.canvas_height),
            scaled = format!("{}x{}", plan.scaled_width, plan.scaled_height),
            radius = plan.corner_radius,
            "Processing job"
        );

        let encode_job = EncodeJob {
            job_id: job.id.clone(),
            input_path: job.input_path.clone(),
            output_path: output_path.clone(),
            graph,
        };

        match encoder.encode(encode_job).await {
            Ok(result) => {
                metrics::ENCODE_DURATION
                    .with_label_values(&["success"])
                    .observe(result.duration_ms as f64 / 1000.0);

                match uploader.publish(&job.id, &result.output_path).await {
                    Ok(url) => {
                        metrics::UPLOADS_TOTAL
                            .with_label_values(&[uploader.name(), "success"])
                            .inc();
                        Self::mark_completed(store, &job.id, &url);
                        if charge_on == ChargePoint::Completion {
                            if let Some(gate) = credit_gate {
                                gate.charge(&job.created_by).await;
                            }
                        }
                        info!(
                            job_id = %job.id,
                            url = %url,
                            elapsed_ms = start.elapsed().as_millis() as u64,
                            "Job completed"
                        );
                    }
                    Err(e) => {
                        error!(job_id = %job.id, error = %e, "Upload failed");
                        metrics::UPLOADS_TOTAL
                            .with_label_values(&[uploader.name(), "failed"])
                            .inc();
                        metrics::JOBS_FAILED.with_label_values(&["upload"]).inc();
                        Self::mark_failed(store, &job.id, &e.public_reason());
                        Self::remove_file(&output_path).await;
                    }
                }
            }
            Err(e) => {
                let result_label = match &e {
                    EncoderError::Timeout { .. } => {
                        metrics::ENCODE_TIMEOUTS.inc();
                        "timeout"
                    }
                    _ => "failed",
                };
                metrics::ENCODE_DURATION
                    .with_label_values(&[result_label])
                    .observe(start.elapsed().as_secs_f64());
                metrics::JOBS_FAILED.with_label_values(&["encode"]).inc();

                // Keep the stderr tail in operator logs only.
                if let EncoderError::EncodeFailed { stderr_tail, .. } = &e {
                    error!(job_id = %job.id, error = %e, stderr = %stderr_tail, "Encode failed");
                } else {
                    error!(job_id = %job.id, error = %e, "Encode failed");
                }

                Self::mark_failed(store, &job.id, &e.public_reason());
                Self::remove_file(&output_path).await;
            }
        }

        // The input upload is consumed once the job is terminal.
        Self::remove_file(&job.input_path).await;
        metrics::JOBS_ACTIVE.dec();
    }

    fn mark_completed(store: &Arc<dyn JobStore>, job_id: &str, url: &str) {
        match store.complete(job_id, url) {
            Ok(_) => {
                metrics::JOBS_COMPLETED.inc();
            }
            Err(e) => {
                error!(job_id = %job_id, error = %e, "Failed to record completion");
            }
        }
    }

    fn mark_failed(store: &Arc<dyn JobStore>, job_id: &str, reason: &str) {
        if let Err(e) = store.fail(job_id, reason) {
            error!(job_id = %job_id, error = %e, "Failed to record failure");
        }
    }

    async fn remove_file(path: &Path) {
        if let Err(e) = tokio::fs::remove_file(path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "Failed to delete file");
            }
        }
    }
}
