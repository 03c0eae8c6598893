//! Configuration for the encoder module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the FFmpeg-based encoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Path to ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Video codec for the output.
    #[serde(default = "default_video_codec")]
    pub video_codec: String,

    /// Encoder preset (speed/size tradeoff).
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Constant rate factor (0-51, lower is better quality).
    #[serde(default = "default_crf")]
    pub crf: u8,

    /// Output pixel format.
    #[serde(default = "default_pixel_format")]
    pub pixel_format: String,

    /// Output duration cap in seconds. Longer inputs are truncated.
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: u32,

    /// Muxer queue limit, keeps memory bounded on pathological inputs.
    #[serde(default = "default_max_muxing_queue_size")]
    pub max_muxing_queue_size: u32,

    /// Wall-clock timeout for one encode in seconds. The process is
    /// killed when it is exceeded.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[serde(default = "default_log_level")]
    pub ffmpeg_log_level: String,

    /// Additional global ffmpeg arguments.
    #[serde(default)]
    pub extra_ffmpeg_args: Vec<String>,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_video_codec() -> String {
    "libx264".to_string()
}

fn default_preset() -> String {
    "ultrafast".to_string()
}

fn default_crf() -> u8 {
    28
}

fn default_pixel_format() -> String {
    "yuv420p".to_string()
}

fn default_max_duration() -> u32 {
    30
}

fn default_max_muxing_queue_size() -> u32 {
    1024
}

fn default_timeout() -> u64 {
    300
}

fn default_log_level() -> String {
    "warning".to_string()
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            video_codec: default_video_codec(),
            preset: default_preset(),
            crf: default_crf(),
            pixel_format: default_pixel_format(),
            max_duration_secs: default_max_duration(),
            max_muxing_queue_size: default_max_muxing_queue_size(),
            timeout_secs: default_timeout(),
            ffmpeg_log_level: default_log_level(),
            extra_ffmpeg_args: Vec::new(),
        }
    }
}

impl EncoderConfig {
    /// Creates a config with a custom ffmpeg path.
    pub fn with_ffmpeg_path(ffmpeg_path: PathBuf) -> Self {
        Self {
            ffmpeg_path,
            ..Default::default()
        }
    }

    /// Sets the wall-clock timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Sets the output duration cap in seconds.
    pub fn with_max_duration(mut self, max_duration_secs: u32) -> Self {
        self.max_duration_secs = max_duration_secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EncoderConfig::default();
        assert_eq!(config.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert_eq!(config.video_codec, "libx264");
        assert_eq!(config.preset, "ultrafast");
        assert_eq!(config.crf, 28);
        assert_eq!(config.max_duration_secs, 30);
        assert_eq!(config.timeout_secs, 300);
    }

    #[test]
    fn test_config_builder() {
        let config = EncoderConfig::with_ffmpeg_path(PathBuf::from("/usr/local/bin/ffmpeg"))
            .with_timeout(60)
            .with_max_duration(10);

        assert_eq!(config.ffmpeg_path, PathBuf::from("/usr/local/bin/ffmpeg"));
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.max_duration_secs, 10);
    }

    #[test]
    fn test_config_serialization() {
        let config = EncoderConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: EncoderConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.crf, config.crf);
        assert_eq!(parsed.preset, config.preset);
    }
}
