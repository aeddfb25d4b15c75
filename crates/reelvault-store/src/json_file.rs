//! Durable catalog stored as a single JSON document.
//!
//! The document has the shape `{ "videos": [...], "lastUpdated": "<ISO-8601>" }`.
//! Every mutation rewrites the whole file through a temp file in the same
//! directory followed by an atomic rename, so readers never observe a
//! half-written catalog. Mutations are serialized by an async mutex.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reelvault_common::{Error, NewVideo, Result, VideoId, VideoPatch, VideoRecord};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, info};

use crate::factory::StorageType;
use crate::id::IdPolicy;
use crate::reconcile::{reconcile, seed};
use crate::scan::scan_directory_blocking;
use crate::store::{SyncReport, VideoStore};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogDocument {
    #[serde(default)]
    videos: Vec<VideoRecord>,
    #[serde(default)]
    last_updated: Option<DateTime<Utc>>,
}

/// Catalog persisted to a JSON file.
pub struct JsonFileStore {
    data_file: PathBuf,
    videos_dir: PathBuf,
    videos: Mutex<Vec<VideoRecord>>,
    initialized: OnceCell<()>,
}

impl JsonFileStore {
    pub fn new(data_file: impl Into<PathBuf>, videos_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_file: data_file.into(),
            videos_dir: videos_dir.into(),
            videos: Mutex::new(Vec::new()),
            initialized: OnceCell::new(),
        }
    }

    /// Path of the backing document.
    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    async fn ensure_initialized(&self) -> Result<()> {
        self.initialized
            .get_or_try_init(|| self.load_or_seed())
            .await
            .map(|_| ())
    }

    async fn load_or_seed(&self) -> Result<()> {
        let mut videos = self.videos.lock().await;

        match tokio::fs::read(&self.data_file).await {
            Ok(bytes) => {
                let doc: CatalogDocument = serde_json::from_slice(&bytes).map_err(|e| {
                    Error::storage(&self.data_file, format!("corrupt catalog: {e}"))
                })?;
                info!(
                    "Loaded {} videos from {}",
                    doc.videos.len(),
                    self.data_file.display()
                );
                *videos = doc.videos;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let scanned = scan_directory_blocking(&self.videos_dir).await;
                let seeded = seed(scanned, self.id_policy());
                self.persist(&seeded).await?;
                info!(
                    "Created {} with {} videos scanned from {}",
                    self.data_file.display(),
                    seeded.len(),
                    self.videos_dir.display()
                );
                *videos = seeded;
            }
            Err(e) => return Err(Error::storage(&self.data_file, e.to_string())),
        }

        Ok(())
    }

    /// Write `videos` to a sibling temp file, fsync it, then rename it over the
    /// data file.
    async fn persist(&self, videos: &[VideoRecord]) -> Result<()> {
        let doc = CatalogDocument {
            videos: videos.to_vec(),
            last_updated: Some(Utc::now()),
        };
        let json = serde_json::to_vec_pretty(&doc)
            .map_err(|e| Error::storage(&self.data_file, e.to_string()))?;

        let path = self.data_file.clone();
        tokio::task::spawn_blocking(move || write_atomically(&path, &json))
            .await
            .map_err(|e| Error::internal(format!("catalog write task failed: {e}")))?
            .map_err(|e| Error::storage(&self.data_file, e.to_string()))?;

        debug!("Persisted {} videos to {}", videos.len(), self.data_file.display());
        Ok(())
    }

    /// Run `mutate` on a copy of the catalog and commit it only once it is on disk.
    async fn mutate<T>(&self, mutate: impl FnOnce(&mut Vec<VideoRecord>) -> T) -> Result<T> {
        self.ensure_initialized().await?;
        let mut videos = self.videos.lock().await;
        let mut next = videos.clone();
        let out = mutate(&mut next);
        self.persist(&next).await?;
        *videos = next;
        Ok(out)
    }
}

fn write_atomically(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[async_trait]
impl VideoStore for JsonFileStore {
    fn backend(&self) -> StorageType {
        StorageType::JsonFile
    }

    fn id_policy(&self) -> IdPolicy {
        IdPolicy::MaxPlusOne
    }

    async fn initialize(&self) -> Result<()> {
        self.ensure_initialized().await
    }

    async fn get_all(&self) -> Result<Vec<VideoRecord>> {
        self.ensure_initialized().await?;
        Ok(self.videos.lock().await.clone())
    }

    async fn get_by_id(&self, id: VideoId) -> Result<Option<VideoRecord>> {
        self.ensure_initialized().await?;
        Ok(self.videos.lock().await.iter().find(|v| v.id == id).cloned())
    }

    async fn add(&self, video: NewVideo) -> Result<VideoRecord> {
        let policy = self.id_policy();
        self.mutate(|videos| {
            let record = VideoRecord::from_new(policy.next_id(videos), video);
            videos.push(record.clone());
            record
        })
        .await
    }

    async fn update(&self, id: VideoId, patch: VideoPatch) -> Result<Option<VideoRecord>> {
        self.ensure_initialized().await?;
        if self.get_by_id(id).await?.is_none() {
            return Ok(None);
        }
        self.mutate(|videos| {
            videos.iter_mut().find(|v| v.id == id).map(|record| {
                record.apply(patch);
                record.clone()
            })
        })
        .await
    }

    async fn delete(&self, id: VideoId) -> Result<bool> {
        self.ensure_initialized().await?;
        if self.get_by_id(id).await?.is_none() {
            return Ok(false);
        }
        self.mutate(|videos| {
            let before = videos.len();
            videos.retain(|v| v.id != id);
            videos.len() != before
        })
        .await
    }

    async fn count(&self) -> Result<usize> {
        self.ensure_initialized().await?;
        Ok(self.videos.lock().await.len())
    }

    async fn sync_with_files(&self) -> Result<SyncReport> {
        self.ensure_initialized().await?;
        let scanned = scan_directory_blocking(&self.videos_dir).await;
        let policy = self.id_policy();
        let videos_dir = self.videos_dir.clone();
        let report = self
            .mutate(move |videos| reconcile(videos, scanned, &videos_dir, policy))
            .await?;
        info!(
            "Catalog {} synced: {} added, {} removed, {} total",
            self.data_file.display(),
            report.added,
            report.removed,
            report.total
        );
        Ok(report)
    }

    async fn shutdown(&self) -> Result<()> {
        // Writes complete before each mutation returns; wait out any in flight.
        let videos = self.videos.lock().await;
        info!(
            "Catalog {} closed with {} videos",
            self.data_file.display(),
            videos.len()
        );
        Ok(())
    }
}
