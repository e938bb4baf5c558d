//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur during media processing.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found: {0}")]
    FfmpegNotFound(PathBuf),

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        /// Stdout followed by stderr
        output: String,
        exit_code: Option<i32>,
    },

    #[error("FFmpeg produced no output file: {0}")]
    OutputMissing(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        output: impl Into<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            output: output.into(),
            exit_code,
        }
    }

    /// Captured process output, if the process ran.
    pub fn process_output(&self) -> Option<&str> {
        match self {
            MediaError::FfmpegFailed { output, .. } => Some(output),
            _ => None,
        }
    }
}
