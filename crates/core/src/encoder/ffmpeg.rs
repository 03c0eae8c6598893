//! FFmpeg-based encoder implementation.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::time::{timeout, Duration};

use super::config::EncoderConfig;
use super::error::EncoderError;
use super::traits::Encoder;
use super::types::{EncodeJob, EncodeResult};

/// How much process stderr to keep for diagnostics.
const STDERR_TAIL_BYTES: usize = 2000;

/// FFmpeg-based encoder implementation.
pub struct FfmpegEncoder {
    config: EncoderConfig,
}

impl FfmpegEncoder {
    /// Creates a new FFmpeg encoder with the given configuration.
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    /// Creates an encoder with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(EncoderConfig::default())
    }

    /// Builds the full ffmpeg argument vector for one job.
    fn build_args(&self, job: &EncodeJob) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(), // Overwrite output
            "-i".to_string(),
            job.input_path.to_string_lossy().to_string(),
        ];

        // Auxiliary graph inputs become additional -i arguments, in order.
        for aux in &job.graph.aux_inputs {
            args.extend(["-i".to_string(), aux.to_string_lossy().to_string()]);
        }

        args.extend([
            "-filter_complex".to_string(),
            job.graph.serialize(),
            "-map".to_string(),
            job.graph.output_map(),
            // Audio is optional: the ? keeps ffmpeg from failing on
            // silent inputs.
            "-map".to_string(),
            "0:a?".to_string(),
            "-c:v".to_string(),
            self.config.video_codec.clone(),
            "-preset".to_string(),
            self.config.preset.clone(),
            "-crf".to_string(),
            self.config.crf.to_string(),
            "-pix_fmt".to_string(),
            self.config.pixel_format.clone(),
            "-c:a".to_string(),
            "copy".to_string(),
            "-movflags".to_string(),
            "+faststart".to_string(),
            "-t".to_string(),
            self.config.max_duration_secs.to_string(),
            "-max_muxing_queue_size".to_string(),
            self.config.max_muxing_queue_size.to_string(),
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
        ]);

        args.extend(self.config.extra_ffmpeg_args.iter().cloned());

        args.push(job.output_path.to_string_lossy().to_string());

        args
    }

    async fn run_encode(&self, job: &EncodeJob) -> Result<EncodeResult, EncoderError> {
        let start = Instant::now();

        if !job.input_path.exists() {
            return Err(EncoderError::InputNotFound {
                path: job.input_path.clone(),
            });
        }

        if let Some(parent) = job.output_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let args = self.build_args(job);
        tracing::debug!(job_id = %job.job_id, ?args, "spawning ffmpeg");

        let mut child = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    EncoderError::FfmpegNotFound {
                        path: self.config.ffmpeg_path.clone(),
                    }
                } else {
                    EncoderError::Io(e)
                }
            })?;

        let stderr = child.stderr.take();

        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        let result = timeout(timeout_duration, async {
            let mut stderr_tail = String::new();

            if let Some(stderr) = stderr {
                let mut reader = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = reader.next_line().await {
                    stderr_tail.push_str(&line);
                    stderr_tail.push('\n');
                    if stderr_tail.len() > STDERR_TAIL_BYTES {
                        let cut = stderr_tail.len() - STDERR_TAIL_BYTES;
                        // Trim from the front, keeping the most recent output.
                        stderr_tail = stderr_tail
                            .char_indices()
                            .find(|(i, _)| *i >= cut)
                            .map(|(i, _)| stderr_tail[i..].to_string())
                            .unwrap_or_default();
                    }
                }
            }

            let status = child.wait().await?;
            Ok::<(std::process::ExitStatus, String), std::io::Error>((status, stderr_tail))
        })
        .await;

        match result {
            Ok(Ok((status, stderr_tail))) => {
                if !status.success() {
                    return Err(EncoderError::encode_failed(status.code(), stderr_tail));
                }
            }
            Ok(Err(e)) => return Err(EncoderError::Io(e)),
            Err(_) => {
                // Kill the process on timeout
                let _ = child.kill().await;
                return Err(EncoderError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                });
            }
        }

        let output_meta = tokio::fs::metadata(&job.output_path).await.map_err(|_| {
            EncoderError::OutputMissing {
                path: job.output_path.clone(),
            }
        })?;

        Ok(EncodeResult {
            job_id: job.job_id.clone(),
            output_path: job.output_path.clone(),
            output_size_bytes: output_meta.len(),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Deletes the graph's auxiliary input files. Runs on every exit path.
    async fn cleanup_aux_inputs(&self, job: &EncodeJob) {
        for aux in &job.graph.aux_inputs {
            if let Err(e) = tokio::fs::remove_file(aux).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(
                        job_id = %job.job_id,
                        path = %aux.display(),
                        error = %e,
                        "failed to delete auxiliary input"
                    );
                }
            }
        }
    }
}

#[async_trait]
impl Encoder for FfmpegEncoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn encode(&self, job: EncodeJob) -> Result<EncodeResult, EncoderError> {
        let result = self.run_encode(&job).await;
        self.cleanup_aux_inputs(&job).await;
        result
    }

    async fn validate(&self) -> Result<(), EncoderError> {
        let result = Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .output()
            .await;

        if let Err(e) = result {
            if e.kind() == std::io::ErrorKind::NotFound {
                return Err(EncoderError::FfmpegNotFound {
                    path: self.config.ffmpeg_path.clone(),
                });
            }
            return Err(EncoderError::Io(e));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filtergraph::build_graph;
    use crate::settings::{AspectRatio, Background, Position, StudioSettings};
    use crate::transform::resolve;
    use std::path::PathBuf;

    fn encode_job(border_radius: u32) -> EncodeJob {
        let settings = StudioSettings {
            background: Background::Solid("#FF0000".to_string()),
            aspect_ratio: AspectRatio::Square,
            border_radius,
            zoom: 80,
            position: Position { x: 10, y: -5 },
        };
        let graph = build_graph(&resolve(&settings));
        EncodeJob {
            job_id: "job-1".to_string(),
            input_path: PathBuf::from("/uploads/in.mp4"),
            output_path: PathBuf::from("/work/output-job-1.mp4"),
            graph,
        }
    }

    fn args_for(job: &EncodeJob) -> Vec<String> {
        FfmpegEncoder::with_defaults().build_args(job)
    }

    fn arg_after(args: &[String], flag: &str) -> String {
        let idx = args.iter().position(|a| a == flag).unwrap();
        args[idx + 1].clone()
    }

    #[test]
    fn test_build_args_basic_shape() {
        let job = encode_job(0);
        let args = args_for(&job);

        assert_eq!(args[0], "-y");
        assert_eq!(arg_after(&args, "-i"), "/uploads/in.mp4");
        assert_eq!(arg_after(&args, "-c:v"), "libx264");
        assert_eq!(arg_after(&args, "-preset"), "ultrafast");
        assert_eq!(arg_after(&args, "-crf"), "28");
        assert_eq!(arg_after(&args, "-pix_fmt"), "yuv420p");
        assert_eq!(arg_after(&args, "-c:a"), "copy");
        assert_eq!(arg_after(&args, "-movflags"), "+faststart");
        assert_eq!(arg_after(&args, "-t"), "30");
        assert_eq!(arg_after(&args, "-max_muxing_queue_size"), "1024");
        assert_eq!(args.last().unwrap(), "/work/output-job-1.mp4");
    }

    #[test]
    fn test_build_args_maps_graph_output_and_optional_audio() {
        let job = encode_job(0);
        let args = args_for(&job);

        let maps: Vec<&String> = args
            .iter()
            .enumerate()
            .filter(|(_, a)| *a == "-map")
            .map(|(i, _)| &args[i + 1])
            .collect();
        assert_eq!(maps, vec!["[composite]", "0:a?"]);
    }

    #[test]
    fn test_build_args_filter_complex_matches_graph() {
        let job = encode_job(20);
        let args = args_for(&job);

        assert_eq!(arg_after(&args, "-filter_complex"), job.graph.serialize());
    }

    #[test]
    fn test_build_args_includes_aux_inputs_in_order() {
        let mut job = encode_job(0);
        job.graph.aux_inputs = vec![PathBuf::from("/work/mask.png")];
        let args = args_for(&job);

        let inputs: Vec<&String> = args
            .iter()
            .enumerate()
            .filter(|(_, a)| *a == "-i")
            .map(|(i, _)| &args[i + 1])
            .collect();
        assert_eq!(inputs, vec!["/uploads/in.mp4", "/work/mask.png"]);
    }

    #[test]
    fn test_build_args_respects_config_overrides() {
        let config = EncoderConfig {
            crf: 20,
            preset: "veryfast".to_string(),
            max_duration_secs: 12,
            extra_ffmpeg_args: vec!["-threads".to_string(), "2".to_string()],
            ..Default::default()
        };
        let encoder = FfmpegEncoder::new(config);
        let args = encoder.build_args(&encode_job(0));

        assert_eq!(arg_after(&args, "-crf"), "20");
        assert_eq!(arg_after(&args, "-preset"), "veryfast");
        assert_eq!(arg_after(&args, "-t"), "12");
        assert_eq!(arg_after(&args, "-threads"), "2");
    }

    #[tokio::test]
    async fn test_encode_missing_input_fails_fast() {
        let encoder = FfmpegEncoder::with_defaults();
        let mut job = encode_job(0);
        job.input_path = PathBuf::from("/nonexistent/input.mp4");

        let result = encoder.encode(job).await;
        assert!(matches!(result, Err(EncoderError::InputNotFound { .. })));
    }

    #[tokio::test]
    async fn test_encode_cleans_aux_inputs_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let aux = dir.path().join("mask.png");
        tokio::fs::write(&aux, b"png").await.unwrap();

        let encoder = FfmpegEncoder::with_defaults();
        let mut job = encode_job(0);
        job.input_path = PathBuf::from("/nonexistent/input.mp4");
        job.graph.aux_inputs = vec![aux.clone()];

        let result = encoder.encode(job).await;
        assert!(result.is_err());
        assert!(!aux.exists());
    }

    #[test]
    fn test_encoder_name() {
        assert_eq!(FfmpegEncoder::with_defaults().name(), "ffmpeg");
    }
}
