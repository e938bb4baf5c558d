//! Thumbnail generation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use filebox_models::encoding::{THUMBNAIL_QUALITY, THUMBNAIL_SCALE_WIDTH, THUMBNAIL_TIMESTAMP};
use filebox_models::MediaKind;

use crate::command::{check_ffmpeg, FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Produces a single-frame thumbnail from a local source file.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Write a thumbnail of `input` to `output`.
    ///
    /// Succeeds only if the process exits cleanly and `output` exists.
    async fn transcode(&self, kind: MediaKind, input: &Path, output: &Path) -> MediaResult<()>;
}

/// Build the fixed FFmpeg invocation for a media kind.
///
/// - image: scale to a fixed width keeping aspect ratio, one frame
/// - video: seek to a fixed offset, one frame
pub fn thumbnail_command(kind: MediaKind, input: &Path, output: &Path) -> FfmpegCommand {
    let cmd = FfmpegCommand::new(input, output);
    let cmd = match kind {
        MediaKind::Image => cmd.video_filter(format!("scale={}:-1", THUMBNAIL_SCALE_WIDTH)),
        MediaKind::Video => cmd.output_seek(THUMBNAIL_TIMESTAMP),
    };
    cmd.single_frame().quality(THUMBNAIL_QUALITY)
}

/// [`Transcoder`] backed by the `ffmpeg` executable.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    program: PathBuf,
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FfmpegTranscoder {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Check that the executable can be found.
    pub fn check(&self) -> MediaResult<PathBuf> {
        check_ffmpeg(&self.program)
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode(&self, kind: MediaKind, input: &Path, output: &Path) -> MediaResult<()> {
        let program = self.check()?;
        let cmd = thumbnail_command(kind, input, output);

        let result = FfmpegRunner::new(program).run(&cmd).await?;
        debug!("FFmpeg output: {}", result.output.trim());

        if !tokio::fs::try_exists(output).await.unwrap_or(false) {
            return Err(MediaError::OutputMissing(output.to_path_buf()));
        }
        Ok(())
    }
}
