//! Shared data models for the filebox backend.
//!
//! This crate provides Serde-serializable types for:
//! - Thumbnail derivation tasks (the queue payload)
//! - Material records and partial updates
//! - Media classification and fixed thumbnail encoding settings

pub mod encoding;
pub mod material;
pub mod media;
pub mod task;

// Re-export common types
pub use encoding::{THUMBNAIL_CONTENT_TYPE, THUMBNAIL_SUFFIX};
pub use material::{Material, MaterialId, MaterialPatch};
pub use media::MediaKind;
pub use task::{TaskValidationError, ThumbnailTask};
