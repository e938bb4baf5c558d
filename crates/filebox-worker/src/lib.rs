//! Thumbnail derivation worker.
//!
//! This crate provides:
//! - The derivation pipeline (fetch, materialize, transcode, upload, persist)
//! - The single sequential worker loop with transport backoff and panic containment
//! - Structured task logging and metrics

pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod metrics;
pub mod pipeline;

pub use config::WorkerConfig;
pub use error::{ErrorKind, WorkerError, WorkerResult};
pub use executor::{LoopStep, ThumbnailWorker};
pub use logging::TaskLogger;
pub use pipeline::{PipelineStage, TaskOutcome, ThumbnailPipeline};
