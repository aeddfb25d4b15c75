//! Frame extraction with placeholder fallback.

use crate::command::ToolCommand;
use crate::placeholder::write_placeholder;
use crate::probe::{probe_metadata, VideoMetadata};
use crate::tools::{ToolInfo, Transcoder};
use crate::Result;
use futures::future::try_join_all;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Options for a single thumbnail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThumbnailOptions {
    pub width: u32,
    pub height: u32,
    /// Seconds into the video to grab the frame from.
    pub time_offset_secs: f64,
    /// ffmpeg `-q:v` scale, 1 (best) to 31.
    pub quality: u8,
}

impl Default for ThumbnailOptions {
    fn default() -> Self {
        Self {
            width: 320,
            height: 180,
            time_offset_secs: 10.0,
            quality: 2,
        }
    }
}

/// Options for [`ThumbnailGenerator::generate_multiple`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultiThumbnailOptions {
    pub count: usize,
    pub width: u32,
    pub height: u32,
    pub quality: u8,
}

impl Default for MultiThumbnailOptions {
    fn default() -> Self {
        Self {
            count: 3,
            width: 320,
            height: 180,
            quality: 2,
        }
    }
}

/// What [`ThumbnailGenerator::generate`] produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ThumbnailOutcome {
    /// A frame extracted by ffmpeg.
    Generated(PathBuf),
    /// A stand-in image, with the reason extraction did not happen.
    Placeholder { path: PathBuf, reason: String },
}

impl ThumbnailOutcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::Generated(path) | Self::Placeholder { path, .. } => path,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder { .. })
    }
}

/// Seek offsets spreading `count` frames evenly inside `duration`:
/// `i * duration / (count + 1)` for `i` in `1..=count`.
pub fn evenly_spaced_offsets(duration: f64, count: usize) -> Vec<f64> {
    let interval = duration.max(0.0) / (count as f64 + 1.0);
    (1..=count).map(|i| interval * i as f64).collect()
}

/// Produces thumbnails and metadata through the external transcoder.
#[derive(Debug, Clone)]
pub struct ThumbnailGenerator {
    transcoder: Transcoder,
}

impl ThumbnailGenerator {
    pub fn new(transcoder: Transcoder) -> Self {
        Self { transcoder }
    }

    pub fn transcoder(&self) -> &Transcoder {
        &self.transcoder
    }

    /// Extract one frame of `video` into `output`.
    ///
    /// If ffmpeg is missing, fails, or times out, a placeholder is written to
    /// `output` instead and reported as such.
    ///
    /// # Errors
    ///
    /// Only when the placeholder itself cannot be written.
    pub async fn generate(
        &self,
        video: &Path,
        output: &Path,
        options: &ThumbnailOptions,
    ) -> Result<ThumbnailOutcome> {
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let reason = match self.extract_frame(video, output, options).await {
            Ok(()) => {
                info!("Thumbnail generated: {}", output.display());
                return Ok(ThumbnailOutcome::Generated(output.to_path_buf()));
            }
            Err(e) => e.to_string(),
        };

        warn!(
            "Falling back to placeholder for {}: {}",
            video.display(),
            reason
        );
        let path = output.to_path_buf();
        let (width, height) = (options.width, options.height);
        let target = path.clone();
        tokio::task::spawn_blocking(move || write_placeholder(&target, width, height))
            .await
            .map_err(|e| std::io::Error::other(e.to_string()))??;

        Ok(ThumbnailOutcome::Placeholder { path, reason })
    }

    async fn extract_frame(
        &self,
        video: &Path,
        output: &Path,
        options: &ThumbnailOptions,
    ) -> Result<()> {
        let ffmpeg = self.transcoder.require_ffmpeg()?;

        ToolCommand::new(ffmpeg.to_path_buf())
            .args(["-hide_banner", "-loglevel", "error", "-y"])
            .arg("-ss")
            .arg(format!("{:.3}", options.time_offset_secs.max(0.0)))
            .arg("-i")
            .arg(video.to_string_lossy())
            .args(["-frames:v", "1"])
            .arg("-s")
            .arg(format!("{}x{}", options.width, options.height))
            .arg("-q:v")
            .arg(options.quality.clamp(1, 31).to_string())
            .args(["-f", "image2"])
            .arg(output.to_string_lossy())
            .timeout(self.transcoder.timeout())
            .execute()
            .await?;

        // ffmpeg exits 0 without writing anything when the seek is past the end
        if tokio::fs::metadata(output).await.map(|m| m.len()).unwrap_or(0) == 0 {
            return Err(crate::Error::tool_failed("ffmpeg", "no frame written"));
        }
        Ok(())
    }

    /// Extract `count` frames spread across the video into
    /// `<out_dir>/<stem>_thumb_<i>.jpg`, concurrently.
    ///
    /// Succeeds only if every frame (or its placeholder) was written.
    pub async fn generate_multiple(
        &self,
        video: &Path,
        out_dir: &Path,
        stem: &str,
        options: &MultiThumbnailOptions,
    ) -> Result<Vec<PathBuf>> {
        tokio::fs::create_dir_all(out_dir).await?;

        let duration = self.get_metadata(video).await.duration;
        let offsets = evenly_spaced_offsets(duration, options.count);
        debug!(
            "Generating {} previews of {} at {:?}",
            options.count,
            video.display(),
            offsets
        );

        let jobs = offsets.into_iter().enumerate().map(|(i, offset)| {
            let output = out_dir.join(format!("{stem}_thumb_{}.jpg", i + 1));
            let single = ThumbnailOptions {
                width: options.width,
                height: options.height,
                time_offset_secs: offset,
                quality: options.quality,
            };
            async move {
                self.generate(video, &output, &single)
                    .await
                    .map(|outcome| outcome.path().to_path_buf())
            }
        });

        try_join_all(jobs).await
    }

    /// Probe `video`, returning [`VideoMetadata::default`] when it cannot be probed.
    pub async fn get_metadata(&self, video: &Path) -> VideoMetadata {
        match probe_metadata(&self.transcoder, video).await {
            Ok(meta) => meta,
            Err(e) => {
                warn!(
                    "Using default metadata for {}: {}",
                    video.display(),
                    e
                );
                VideoMetadata::default()
            }
        }
    }

    /// Availability of the underlying tools.
    pub fn check_tools(&self) -> Vec<ToolInfo> {
        self.transcoder.check_tools()
    }
}
