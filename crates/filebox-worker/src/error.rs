//! Worker error types.
//!
//! Every error raised while processing a task is final for that task only.
//! [`ErrorKind`] groups them for logging and metrics.

use thiserror::Error;

use filebox_db::DbError;
use filebox_media::MediaError;
use filebox_models::MaterialId;
use filebox_queue::QueueError;
use filebox_storage::StorageError;

pub type WorkerResult<T> = Result<T, WorkerError>;

/// Coarse classification of a task failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Queue, object store or database unreachable
    Transport,
    /// Source object or owning record missing
    NotFound,
    /// Transcoder failed, produced nothing, or is absent
    ExternalProcess,
    /// Task payload could not be decoded
    Serialization,
    /// Local filesystem failure
    Io,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Transport => "transport",
            ErrorKind::NotFound => "not_found",
            ErrorKind::ExternalProcess => "external_process",
            ErrorKind::Serialization => "serialization",
            ErrorKind::Io => "io",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Material not found: {0}")]
    MaterialNotFound(MaterialId),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkerError::MaterialNotFound(_) => ErrorKind::NotFound,
            WorkerError::Storage(e) if e.is_not_found() => ErrorKind::NotFound,
            WorkerError::Storage(StorageError::Io(_)) => ErrorKind::Io,
            WorkerError::Storage(_) => ErrorKind::Transport,
            WorkerError::Database(e) if e.is_not_found() => ErrorKind::NotFound,
            WorkerError::Database(_) => ErrorKind::Transport,
            WorkerError::Media(_) => ErrorKind::ExternalProcess,
            WorkerError::Queue(e) if e.is_transport() => ErrorKind::Transport,
            WorkerError::Queue(_) => ErrorKind::Serialization,
            WorkerError::Io(_) => ErrorKind::Io,
        }
    }

    /// Captured transcoder output, for diagnostics.
    pub fn process_output(&self) -> Option<&str> {
        match self {
            WorkerError::Media(e) => e.process_output(),
            _ => None,
        }
    }
}
