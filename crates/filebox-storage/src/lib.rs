//! S3-compatible object storage client.
//!
//! This crate provides:
//! - The [`ObjectStore`] port (streamed get, sized put)
//! - An S3 adapter that also speaks to MinIO
//! - An in-memory store with upload fault injection

pub mod error;
pub mod memory;
pub mod s3;
pub mod store;

pub use error::{StorageError, StorageResult};
pub use memory::{MemoryObjectStore, StoredObject};
pub use s3::{S3Config, S3ObjectStore};
pub use store::{ObjectReader, ObjectStore};
