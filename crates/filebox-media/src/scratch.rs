//! Scratch files for staging data between network I/O and FFmpeg.
//!
//! A [`ScratchFile`] owns a path and removes it when dropped, so every exit
//! path of the code holding it (early return, `?`, panic unwind) cleans up.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::MediaResult;

/// A local file that is deleted when this guard goes out of scope.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    /// Create a new empty file with a unique name inside `dir`.
    pub fn create_in(dir: impl AsRef<Path>, prefix: &str) -> MediaResult<Self> {
        let path = tempfile::Builder::new()
            .prefix(prefix)
            .tempfile_in(dir)?
            .into_temp_path()
            .keep()
            .map_err(|e| e.error)?;
        debug!("Created scratch file {}", path.display());
        Ok(Self { path })
    }

    /// Guard a sibling path `<this path><suffix>` without creating it.
    ///
    /// Used for files another process writes, so partial output is removed
    /// even if that process fails.
    pub fn sibling(&self, suffix: &str) -> Self {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(suffix);
        Self {
            path: PathBuf::from(name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if let Err(e) = remove_scratch(&self.path) {
            warn!("Failed to remove scratch file {}: {}", self.path.display(), e);
        }
    }
}

/// Remove a scratch file. Removing a file that is already gone succeeds.
pub fn remove_scratch(path: impl AsRef<Path>) -> io::Result<()> {
    match std::fs::remove_file(path.as_ref()) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
