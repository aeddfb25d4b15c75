//! Volatile in-process catalog.

use async_trait::async_trait;
use parking_lot::RwLock;
use reelvault_common::{Error, NewVideo, Result, VideoId, VideoPatch, VideoRecord};
use std::path::PathBuf;
use tokio::sync::OnceCell;
use tracing::info;

use crate::factory::StorageType;
use crate::id::IdPolicy;
use crate::reconcile::{reconcile, seed};
use crate::scan::scan_directory_blocking;
use crate::store::{SyncReport, VideoStore};

/// Catalog held in memory, seeded from the videos directory on first use.
/// Nothing survives a restart.
pub struct MemoryStore {
    videos_dir: PathBuf,
    videos: RwLock<Vec<VideoRecord>>,
    initialized: OnceCell<()>,
}

impl MemoryStore {
    pub fn new(videos_dir: impl Into<PathBuf>) -> Self {
        Self {
            videos_dir: videos_dir.into(),
            videos: RwLock::new(Vec::new()),
            initialized: OnceCell::new(),
        }
    }

    async fn ensure_initialized(&self) -> Result<()> {
        self.initialized
            .get_or_try_init(|| async {
                let scanned = scan_directory_blocking(&self.videos_dir).await;
                let seeded = seed(scanned, self.id_policy());
                info!(
                    "Memory catalog initialized with {} videos from {}",
                    seeded.len(),
                    self.videos_dir.display()
                );
                *self.videos.write() = seeded;
                Ok::<(), Error>(())
            })
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl VideoStore for MemoryStore {
    fn backend(&self) -> StorageType {
        StorageType::Memory
    }

    fn id_policy(&self) -> IdPolicy {
        IdPolicy::Sequential
    }

    async fn initialize(&self) -> Result<()> {
        self.ensure_initialized().await
    }

    async fn get_all(&self) -> Result<Vec<VideoRecord>> {
        self.ensure_initialized().await?;
        Ok(self.videos.read().clone())
    }

    async fn get_by_id(&self, id: VideoId) -> Result<Option<VideoRecord>> {
        self.ensure_initialized().await?;
        Ok(self.videos.read().iter().find(|v| v.id == id).cloned())
    }

    async fn add(&self, video: NewVideo) -> Result<VideoRecord> {
        self.ensure_initialized().await?;
        let mut videos = self.videos.write();
        let record = VideoRecord::from_new(self.id_policy().next_id(&videos), video);
        videos.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: VideoId, patch: VideoPatch) -> Result<Option<VideoRecord>> {
        self.ensure_initialized().await?;
        let mut videos = self.videos.write();
        Ok(videos.iter_mut().find(|v| v.id == id).map(|record| {
            record.apply(patch);
            record.clone()
        }))
    }

    async fn delete(&self, id: VideoId) -> Result<bool> {
        self.ensure_initialized().await?;
        let mut videos = self.videos.write();
        let before = videos.len();
        videos.retain(|v| v.id != id);
        Ok(videos.len() != before)
    }

    async fn count(&self) -> Result<usize> {
        self.ensure_initialized().await?;
        Ok(self.videos.read().len())
    }

    async fn sync_with_files(&self) -> Result<SyncReport> {
        self.ensure_initialized().await?;
        let scanned = scan_directory_blocking(&self.videos_dir).await;
        let mut videos = self.videos.write();
        let report = reconcile(&mut videos, scanned, &self.videos_dir, self.id_policy());
        info!(
            "Memory catalog synced: {} added, {} removed, {} total",
            report.added, report.removed, report.total
        );
        Ok(report)
    }

    async fn shutdown(&self) -> Result<()> {
        info!(
            "Memory catalog shut down, discarding {} records",
            self.videos.read().len()
        );
        Ok(())
    }
}
