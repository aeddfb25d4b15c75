mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./reelvault.toml",
        "./config.toml",
        "~/.config/reelvault/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Full startup layering: file (or defaults), then the process environment.
pub fn load_layered(custom_path: Option<&Path>) -> Result<Config> {
    let mut config = load_config_or_default(custom_path)?;
    apply_env_overrides(&mut config)?;
    validate_config(&config)?;
    Ok(config)
}

/// Override config values from the process environment.
pub fn apply_env_overrides(config: &mut Config) -> Result<()> {
    apply_env_overrides_from(config, |key| std::env::var(key).ok())
}

/// Override config values from `lookup`, which maps an environment key to its value.
pub fn apply_env_overrides_from(
    config: &mut Config,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(host) = get("HOST") {
        config.server.host = host;
    }
    if let Some(port) = get("PORT") {
        config.server.port = parse_env("PORT", &port)?;
    }
    if let Some(origin) = get("CORS_ORIGIN") {
        config.server.cors_origin = origin;
    }

    if let Some(dir) = get("VIDEOS_DIR") {
        config.library.videos_dir = expand_path(&dir);
    }
    if let Some(dir) = get("THUMBNAILS_DIR") {
        config.library.thumbnails_dir = expand_path(&dir);
    }
    if let Some(size) = get("MAX_FILE_SIZE") {
        config.library.max_file_size = parse_env("MAX_FILE_SIZE", &size)?;
    }
    if let Some(types) = get("ALLOWED_MIME_TYPES") {
        config.library.allowed_mime_types = types
            .split(',')
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
    }

    if let Some(storage_type) = get("STORAGE_TYPE") {
        config.storage.storage_type = reelvault_store::StorageType::from_str(&storage_type)
            .context("Invalid STORAGE_TYPE")?;
    }
    if let Some(file) = get("DATA_FILE") {
        config.storage.data_file = expand_path(&file);
    }

    if let Some(window) = get("RATE_LIMIT_WINDOW_MS") {
        config.rate_limit.window_ms = parse_env("RATE_LIMIT_WINDOW_MS", &window)?;
    }
    if let Some(max) = get("RATE_LIMIT_MAX_REQUESTS") {
        config.rate_limit.max_requests = parse_env("RATE_LIMIT_MAX_REQUESTS", &max)?;
    }

    if let Some(path) = get("FFMPEG_PATH") {
        config.tools.ffmpeg_path = Some(expand_path(&path));
    }
    if let Some(path) = get("FFPROBE_PATH") {
        config.tools.ffprobe_path = Some(expand_path(&path));
    }
    if let Some(secs) = get("THUMBNAIL_TIMEOUT_SECS") {
        config.tools.timeout_secs = parse_env("THUMBNAIL_TIMEOUT_SECS", &secs)?;
    }

    Ok(())
}

fn parse_env<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("Invalid value for {key}: {value:?}"))
}

fn expand_path(value: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(value.trim()).as_ref())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.rate_limit.window_ms == 0 || config.rate_limit.max_requests == 0 {
        anyhow::bail!("Rate limit window and request budget must be positive");
    }

    if config.library.max_file_size == 0 {
        anyhow::bail!("max_file_size must be positive");
    }

    if config.tools.timeout_secs == 0 {
        anyhow::bail!("Tool timeout must be positive");
    }

    if !config.library.videos_dir.exists() {
        tracing::warn!(
            "Videos directory does not exist yet: {:?}",
            config.library.videos_dir
        );
    }

    Ok(())
}
