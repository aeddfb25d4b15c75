//! The catalog storage trait.

use async_trait::async_trait;
use reelvault_common::{NewVideo, Result, VideoId, VideoPatch, VideoRecord};
use serde::Serialize;

use crate::factory::StorageType;
use crate::id::IdPolicy;

/// Outcome of reconciling the catalog against the videos directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Files found on disk that were not cataloged.
    pub added: usize,
    /// Entries dropped because their file is gone or they duplicated a filename.
    pub removed: usize,
    /// Catalog size after the sync.
    pub total: usize,
}

/// A catalog backend.
///
/// Every operation initializes the store on first use, so calling
/// [`VideoStore::initialize`] up front is only needed to surface load
/// errors early.
#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Which backend this is.
    fn backend(&self) -> StorageType;

    /// How this backend assigns ids.
    fn id_policy(&self) -> IdPolicy;

    /// Load or seed the catalog. Idempotent.
    async fn initialize(&self) -> Result<()>;

    /// All records, in catalog order.
    async fn get_all(&self) -> Result<Vec<VideoRecord>>;

    async fn get_by_id(&self, id: VideoId) -> Result<Option<VideoRecord>>;

    /// Assign an id, append, and return the stored record.
    async fn add(&self, video: NewVideo) -> Result<VideoRecord>;

    /// Merge `patch` into the record. `None` if no record has this id.
    async fn update(&self, id: VideoId, patch: VideoPatch) -> Result<Option<VideoRecord>>;

    /// Remove the catalog entry. Files on disk are left alone.
    async fn delete(&self, id: VideoId) -> Result<bool>;

    async fn count(&self) -> Result<usize>;

    /// Catalog files missing from the store, then drop entries whose file is gone.
    async fn sync_with_files(&self) -> Result<SyncReport>;

    /// End the store's lifecycle.
    async fn shutdown(&self) -> Result<()>;
}
