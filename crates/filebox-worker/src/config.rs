//! Worker configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// How long a single pop blocks on an empty queue
    pub pop_timeout: Duration,
    /// Pause after a queue transport error before polling again
    pub idle_backoff: Duration,
    /// Directory for scratch files
    pub scratch_dir: PathBuf,
    /// FFmpeg executable name or path
    pub ffmpeg_path: PathBuf,
    /// Port for the Prometheus exporter, if enabled
    pub metrics_port: Option<u16>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            pop_timeout: Duration::from_secs(5),
            idle_backoff: Duration::from_secs(5),
            scratch_dir: std::env::temp_dir(),
            ffmpeg_path: PathBuf::from("ffmpeg"),
            metrics_port: None,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            pop_timeout: Duration::from_secs(
                std::env::var("WORKER_POP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            idle_backoff: Duration::from_secs(
                std::env::var("WORKER_IDLE_BACKOFF_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            scratch_dir: std::env::var("WORKER_SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| std::env::temp_dir()),
            ffmpeg_path: std::env::var("FFMPEG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("ffmpeg")),
            metrics_port: std::env::var("METRICS_PORT")
                .ok()
                .and_then(|s| s.parse().ok()),
        }
    }
}
