//! Thumbnail encoding settings.
//!
//! These are fixed and intentionally not configurable: every derived
//! artifact in the object store is produced with the same parameters.

/// Output width in pixels; height follows the source aspect ratio.
pub const THUMBNAIL_SCALE_WIDTH: u32 = 640;

/// Seek offset used to pick the frame for video sources.
pub const THUMBNAIL_TIMESTAMP: &str = "00:00:01";

/// JPEG quality passed to `-q:v` (2 is near-lossless).
pub const THUMBNAIL_QUALITY: u8 = 2;

/// Suffix appended to the source key to form the derived key.
pub const THUMBNAIL_SUFFIX: &str = ".thumb.jpg";

/// Content type of the derived artifact.
pub const THUMBNAIL_CONTENT_TYPE: &str = "image/jpeg";

/// Build the object key of the thumbnail derived from `key`.
pub fn thumbnail_key(key: &str) -> String {
    format!("{}{}", key, THUMBNAIL_SUFFIX)
}
