//! Storage backend selection.

use reelvault_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use crate::json_file::JsonFileStore;
use crate::memory::MemoryStore;
use crate::store::VideoStore;

/// Default location of the JSON catalog.
pub const DEFAULT_DATA_FILE: &str = "./data/videos.json";

/// Known storage backends. Only `Memory` and `JsonFile` are implemented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageType {
    #[default]
    Memory,
    JsonFile,
    Sqlite,
    Mongodb,
    Postgresql,
}

impl StorageType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::JsonFile => "json_file",
            Self::Sqlite => "sqlite",
            Self::Mongodb => "mongodb",
            Self::Postgresql => "postgresql",
        }
    }

    pub fn is_implemented(self) -> bool {
        matches!(self, Self::Memory | Self::JsonFile)
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "json_file" => Ok(Self::JsonFile),
            "sqlite" => Ok(Self::Sqlite),
            "mongodb" => Ok(Self::Mongodb),
            "postgresql" => Ok(Self::Postgresql),
            other => Err(Error::UnsupportedBackend(other.to_string())),
        }
    }
}

/// Parameters for [`create_store`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub storage_type: StorageType,
    /// Backing document for `json_file`.
    pub data_file: PathBuf,
    /// Directory scanned to seed and reconcile the catalog.
    pub videos_dir: PathBuf,
    /// Reserved for database backends.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_string: Option<String>,
}

impl StorageConfig {
    pub fn new(storage_type: StorageType, videos_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage_type,
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            videos_dir: videos_dir.into(),
            connection_string: None,
        }
    }

    pub fn with_data_file(mut self, data_file: impl Into<PathBuf>) -> Self {
        self.data_file = data_file.into();
        self
    }
}

/// Build the backend named by `config`. Performs no I/O; call
/// [`VideoStore::initialize`] on the result to load the catalog.
pub fn create_store(config: &StorageConfig) -> Result<Arc<dyn VideoStore>> {
    match config.storage_type {
        StorageType::Memory => Ok(Arc::new(MemoryStore::new(&config.videos_dir))),
        StorageType::JsonFile => Ok(Arc::new(JsonFileStore::new(
            &config.data_file,
            &config.videos_dir,
        ))),
        unsupported => Err(Error::UnsupportedBackend(unsupported.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::IdPolicy;

    #[test]
    fn test_parse_storage_type() {
        assert_eq!("memory".parse::<StorageType>().unwrap(), StorageType::Memory);
        assert_eq!(
            "JSON_FILE".parse::<StorageType>().unwrap(),
            StorageType::JsonFile
        );
        assert_eq!(
            "postgresql".parse::<StorageType>().unwrap(),
            StorageType::Postgresql
        );

        let err = "redis".parse::<StorageType>().unwrap_err();
        assert!(matches!(err, Error::UnsupportedBackend(name) if name == "redis"));
    }

    #[test]
    fn test_create_implemented_backends() {
        let dir = tempfile::tempdir().unwrap();

        let memory = create_store(&StorageConfig::new(StorageType::Memory, dir.path())).unwrap();
        assert_eq!(memory.backend(), StorageType::Memory);
        assert_eq!(memory.id_policy(), IdPolicy::Sequential);

        let json = create_store(
            &StorageConfig::new(StorageType::JsonFile, dir.path())
                .with_data_file(dir.path().join("catalog.json")),
        )
        .unwrap();
        assert_eq!(json.backend(), StorageType::JsonFile);
        assert_eq!(json.id_policy(), IdPolicy::MaxPlusOne);

        // construction touches nothing on disk
        assert!(!dir.path().join("catalog.json").exists());
    }

    #[test]
    fn test_unsupported_backends() {
        for storage_type in [
            StorageType::Sqlite,
            StorageType::Mongodb,
            StorageType::Postgresql,
        ] {
            let result = create_store(&StorageConfig::new(storage_type, "./videos"));
            match result {
                Err(Error::UnsupportedBackend(name)) => assert_eq!(name, storage_type.as_str()),
                _ => panic!("{storage_type} should be unsupported"),
            }
            assert!(!storage_type.is_implemented());
        }
    }
}
