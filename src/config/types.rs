use reelvault_store::{StorageConfig, StorageType};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub library: LibraryConfig,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

impl Config {
    /// Parameters for the catalog backend.
    pub fn storage_config(&self) -> StorageConfig {
        StorageConfig::new(self.storage.storage_type, &self.library.videos_dir)
            .with_data_file(&self.storage.data_file)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed browser origin, `*` for any.
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,

    /// Built client served for unmatched routes.
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
            static_dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibraryConfig {
    #[serde(default = "default_videos_dir")]
    pub videos_dir: PathBuf,

    #[serde(default = "default_thumbnails_dir")]
    pub thumbnails_dir: PathBuf,

    /// Upload limit in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    #[serde(default = "default_allowed_mime_types")]
    pub allowed_mime_types: Vec<String>,
}

fn default_videos_dir() -> PathBuf {
    PathBuf::from("./videos")
}

fn default_thumbnails_dir() -> PathBuf {
    PathBuf::from("./thumbnails")
}

fn default_max_file_size() -> u64 {
    2 * 1024 * 1024 * 1024
}

pub fn default_allowed_mime_types() -> Vec<String> {
    [
        "video/mp4",
        "video/avi",
        "video/x-msvideo",
        "video/mov",
        "video/quicktime",
        "video/mkv",
        "video/x-matroska",
        "video/webm",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            videos_dir: default_videos_dir(),
            thumbnails_dir: default_thumbnails_dir(),
            max_file_size: default_max_file_size(),
            allowed_mime_types: default_allowed_mime_types(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default, rename = "type")]
    pub storage_type: StorageType,

    /// Catalog document used by the `json_file` backend.
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
}

fn default_data_file() -> PathBuf {
    PathBuf::from(reelvault_store::factory::DEFAULT_DATA_FILE)
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            storage_type: StorageType::default(),
            data_file: default_data_file(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// Requests allowed within one window.
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
}

fn default_window_ms() -> u64 {
    60_000
}

fn default_max_requests() -> u32 {
    100
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_ms: default_window_ms(),
            max_requests: default_max_requests(),
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    #[serde(default)]
    pub ffprobe_path: Option<PathBuf>,

    /// Limit for a single ffmpeg/ffprobe run.
    #[serde(default = "default_tool_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_tool_timeout_secs() -> u64 {
    30
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            ffprobe_path: None,
            timeout_secs: default_tool_timeout_secs(),
        }
    }
}
