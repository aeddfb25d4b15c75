//! The video library service.
//!
//! [`VideoLibrary`] sits between the HTTP handlers and the catalog store. It
//! owns the on-disk artifacts that go with a record (the video file in the
//! videos directory and its thumbnail in the thumbnails directory) and keeps
//! them consistent with the catalog.

mod upload;

pub use upload::{resolve_title, upload_file_name};

use reelvault_av::{MultiThumbnailOptions, ThumbnailGenerator, ThumbnailOptions, ThumbnailOutcome};
use reelvault_common::paths::file_stem;
use reelvault_common::{Error, NewVideo, Result, VideoId, VideoPatch, VideoRecord};
use reelvault_store::{SyncReport, VideoStore};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Summary of a bulk thumbnail run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkThumbnailReport {
    /// Records that had no usable thumbnail.
    pub processed: usize,
    /// Real frames extracted.
    pub generated: usize,
    /// Placeholders written instead.
    pub placeholders: usize,
    /// Records whose thumbnail could not be written at all.
    pub failed: usize,
}

/// Result of generating one thumbnail for a record.
#[derive(Debug, Clone)]
pub struct ThumbnailResult {
    pub video: VideoRecord,
    pub thumbnail: String,
    pub placeholder: bool,
}

/// Name of the primary thumbnail for a video filename.
pub fn thumbnail_file_name(video_filename: &str) -> String {
    format!("{}_thumb.jpg", file_stem(video_filename))
}

pub struct VideoLibrary {
    store: Arc<dyn VideoStore>,
    thumbnails: ThumbnailGenerator,
    videos_dir: PathBuf,
    thumbnails_dir: PathBuf,
}

impl VideoLibrary {
    pub fn new(
        store: Arc<dyn VideoStore>,
        thumbnails: ThumbnailGenerator,
        videos_dir: impl Into<PathBuf>,
        thumbnails_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            thumbnails,
            videos_dir: videos_dir.into(),
            thumbnails_dir: thumbnails_dir.into(),
        }
    }

    /// Create the media directories and load the catalog.
    pub async fn initialize(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.videos_dir).await?;
        tokio::fs::create_dir_all(&self.thumbnails_dir).await?;
        self.store.initialize().await?;

        tracing::info!(
            "Library ready: {} videos in {} (backend: {})",
            self.store.count().await?,
            self.videos_dir.display(),
            self.store.backend()
        );
        Ok(())
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.store.shutdown().await
    }

    pub fn store(&self) -> &Arc<dyn VideoStore> {
        &self.store
    }

    pub fn generator(&self) -> &ThumbnailGenerator {
        &self.thumbnails
    }

    pub fn videos_dir(&self) -> &Path {
        &self.videos_dir
    }

    pub fn thumbnails_dir(&self) -> &Path {
        &self.thumbnails_dir
    }

    pub async fn count(&self) -> Result<usize> {
        self.store.count().await
    }

    /// Every record, with dangling thumbnail references shown as `None`.
    pub async fn list(&self) -> Result<Vec<VideoRecord>> {
        let mut videos = self.store.get_all().await?;
        for video in &mut videos {
            self.hide_missing_thumbnail(video).await;
        }
        Ok(videos)
    }

    /// One record, with a dangling thumbnail reference shown as `None`.
    pub async fn get(&self, id: VideoId) -> Result<VideoRecord> {
        let mut video = self.require(id).await?;
        self.hide_missing_thumbnail(&mut video).await;
        Ok(video)
    }

    async fn require(&self, id: VideoId) -> Result<VideoRecord> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found("video", id))
    }

    async fn hide_missing_thumbnail(&self, video: &mut VideoRecord) {
        if let Some(name) = &video.thumbnail {
            if tokio::fs::metadata(self.thumbnails_dir.join(name)).await.is_err() {
                video.thumbnail = None;
            }
        }
    }

    /// Catalog a file that was just written into the videos directory and try
    /// to give it a thumbnail. Thumbnail problems never fail the upload.
    pub async fn register_upload(
        &self,
        stored_filename: &str,
        size: u64,
        title: String,
    ) -> Result<VideoRecord> {
        let record = self
            .store
            .add(NewVideo::from_filename(stored_filename, size).with_title(title))
            .await?;
        tracing::info!(
            "Registered upload {} as video {} ({} bytes)",
            stored_filename,
            record.id,
            size
        );

        match self.generate_thumbnail(record.id).await {
            Ok(result) => Ok(result.video),
            Err(e) => {
                tracing::warn!("Thumbnail for uploaded video {} failed: {}", record.id, e);
                Ok(record)
            }
        }
    }

    /// Remove the catalog entry, then the video file, its thumbnail and any
    /// preview frames.
    ///
    /// Once the entry is gone the delete has succeeded; artifacts that cannot
    /// be removed are logged and left for the operator.
    pub async fn delete(&self, id: VideoId) -> Result<VideoRecord> {
        let video = self.require(id).await?;

        if !self.store.delete(id).await? {
            return Err(Error::not_found("video", id));
        }

        let mut artifacts = vec![self.videos_dir.join(&video.filename)];
        let thumbnail = video
            .thumbnail
            .clone()
            .unwrap_or_else(|| thumbnail_file_name(&video.filename));
        artifacts.push(self.thumbnails_dir.join(thumbnail));
        artifacts.extend(self.preview_files(&video.filename).await);

        for path in &artifacts {
            if let Err(e) = remove_if_present(path).await {
                tracing::warn!("Video {} deleted but {} remains: {}", id, path.display(), e);
            }
        }

        tracing::info!("Deleted video {} ({})", id, video.filename);
        Ok(video)
    }

    /// Preview frames written by [`generate_previews`](Self::generate_previews)
    /// for `video_filename`.
    async fn preview_files(&self, video_filename: &str) -> Vec<PathBuf> {
        let mut found = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.thumbnails_dir).await {
            Ok(entries) => entries,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Cannot list {}: {}", self.thumbnails_dir.display(), e);
                }
                return found;
            }
        };

        let stem = file_stem(video_filename);
        while let Ok(Some(entry)) = entries.next_entry().await {
            if let Some(name) = entry.file_name().to_str() {
                if is_preview_of(name, &stem) {
                    found.push(entry.path());
                }
            }
        }
        found
    }

    /// Generate (or regenerate) the primary thumbnail for a record.
    pub async fn generate_thumbnail(&self, id: VideoId) -> Result<ThumbnailResult> {
        let video = self.require(id).await?;
        let name = thumbnail_file_name(&video.filename);
        let output = self.thumbnails_dir.join(&name);

        let outcome = self
            .thumbnails
            .generate(
                &self.videos_dir.join(&video.filename),
                &output,
                &ThumbnailOptions::default(),
            )
            .await
            .map_err(av_error)?;

        let video = self
            .store
            .update(id, VideoPatch::thumbnail(&name))
            .await?
            .ok_or_else(|| Error::not_found("video", id))?;

        Ok(ThumbnailResult {
            video,
            thumbnail: name,
            placeholder: matches!(outcome, ThumbnailOutcome::Placeholder { .. }),
        })
    }

    /// Spread `count` preview frames across the video. Returns their filenames.
    pub async fn generate_previews(&self, id: VideoId, count: usize) -> Result<Vec<String>> {
        let video = self.require(id).await?;
        let options = MultiThumbnailOptions {
            count,
            ..Default::default()
        };

        let paths = self
            .thumbnails
            .generate_multiple(
                &self.videos_dir.join(&video.filename),
                &self.thumbnails_dir,
                &file_stem(&video.filename),
                &options,
            )
            .await
            .map_err(av_error)?;

        Ok(paths
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect())
    }

    /// Generate a thumbnail for every record that lacks a usable one.
    /// A failure on one record does not stop the others.
    pub async fn generate_missing_thumbnails(&self) -> Result<BulkThumbnailReport> {
        let mut report = BulkThumbnailReport::default();

        for video in self.list().await? {
            if video.thumbnail.is_some() {
                continue;
            }
            report.processed += 1;

            match self.generate_thumbnail(video.id).await {
                Ok(result) if result.placeholder => report.placeholders += 1,
                Ok(_) => report.generated += 1,
                Err(e) => {
                    tracing::error!("Thumbnail for video {} failed: {}", video.id, e);
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            "Bulk thumbnails: {} processed, {} generated, {} placeholders, {} failed",
            report.processed,
            report.generated,
            report.placeholders,
            report.failed
        );
        Ok(report)
    }

    /// Re-probe the file and store its duration.
    pub async fn refresh_metadata(&self, id: VideoId) -> Result<VideoRecord> {
        let video = self.require(id).await?;
        let metadata = self
            .thumbnails
            .get_metadata(&self.videos_dir.join(&video.filename))
            .await;

        let mut updated = self
            .store
            .update(id, VideoPatch::duration(metadata.duration))
            .await?
            .ok_or_else(|| Error::not_found("video", id))?;
        self.hide_missing_thumbnail(&mut updated).await;
        Ok(updated)
    }

    /// Reconcile the catalog with the videos directory.
    pub async fn rescan(&self) -> Result<SyncReport> {
        self.store.sync_with_files().await
    }
}

/// Whether `name` is `<stem>_thumb_<n>.jpg`.
fn is_preview_of(name: &str, stem: &str) -> bool {
    name.strip_prefix(stem)
        .and_then(|rest| rest.strip_prefix("_thumb_"))
        .and_then(|rest| rest.strip_suffix(".jpg"))
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

async fn remove_if_present(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Io(e)),
    }
}

fn av_error(err: reelvault_av::Error) -> Error {
    match err {
        reelvault_av::Error::Io(e) => Error::Io(e),
        other => Error::internal(other.to_string()),
    }
}
