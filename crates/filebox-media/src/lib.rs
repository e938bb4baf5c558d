//! FFmpeg CLI wrapper for thumbnail extraction.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building
//! - A runner that captures stdout and stderr for diagnostics
//! - The [`Transcoder`] port and its FFmpeg implementation
//! - Scratch files that remove themselves when dropped

pub mod command;
pub mod error;
pub mod scratch;
pub mod thumbnail;

pub use command::{check_ffmpeg, FfmpegCommand, FfmpegOutput, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use scratch::{remove_scratch, ScratchFile};
pub use thumbnail::{thumbnail_command, FfmpegTranscoder, Transcoder};
