//! Media classification for thumbnail extraction.

use serde::{Deserialize, Serialize};

/// How a source object is turned into a thumbnail.
///
/// Classification is binary: anything that is not `image/*` is handled as a
/// video, including an empty or unknown content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// Scale a single frame.
    Image,
    /// Seek into the stream and extract one frame.
    Video,
}

impl MediaKind {
    /// Classify a source by its MIME type.
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type.starts_with("image/") {
            Self::Image
        } else {
            Self::Video
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
