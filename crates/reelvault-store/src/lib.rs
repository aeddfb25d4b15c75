//! Reelvault-Store: catalog persistence for reelvault.
//!
//! This crate owns the list of cataloged videos:
//!
//! - [`VideoStore`]: the async storage trait every backend implements
//! - [`MemoryStore`]: volatile backend seeded from a directory scan
//! - [`JsonFileStore`]: durable backend that rewrites a JSON document on every mutation
//! - [`create_store`]: builds a backend from a [`StorageConfig`]
//! - [`scan_directory`]: proposes records for the video files found on disk
//!
//! # Example
//!
//! ```no_run
//! use reelvault_store::{create_store, StorageConfig, StorageType};
//!
//! # async fn example() -> reelvault_common::Result<()> {
//! let config = StorageConfig::new(StorageType::JsonFile, "./videos")
//!     .with_data_file("./data/videos.json");
//! let store = create_store(&config)?;
//! store.initialize().await?;
//!
//! for video in store.get_all().await? {
//!     println!("{} {}", video.id, video.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod factory;
pub mod id;
pub mod json_file;
pub mod memory;
mod reconcile;
pub mod scan;
pub mod store;

pub use factory::{create_store, StorageConfig, StorageType};
pub use id::IdPolicy;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use scan::{scan_directory, scan_directory_blocking, ScannedVideo};
pub use store::{SyncReport, VideoStore};
