//! External tool detection and the resolved transcoder toolchain.

use crate::{Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

/// Default per-invocation limit for ffmpeg/ffprobe.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// Information about an external tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    /// Name of the tool.
    pub name: String,
    /// Whether the tool is available.
    pub available: bool,
    /// Version string if available.
    pub version: Option<String>,
    /// Path to the tool executable.
    pub path: Option<PathBuf>,
}

/// Check if a tool is available using a custom version argument.
///
/// # Example
///
/// ```no_run
/// use reelvault_av::check_tool_with_arg;
///
/// let info = check_tool_with_arg("ffprobe", "-version");
/// if info.available {
///     println!("ffprobe version: {:?}", info.version);
/// }
/// ```
pub fn check_tool_with_arg(program: impl AsRef<Path>, version_arg: &str) -> ToolInfo {
    let program = program.as_ref();
    let name = program
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| program.to_string_lossy().to_string());

    match Command::new(program).arg(version_arg).output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .map(|s| s.to_string());

            ToolInfo {
                name,
                available: true,
                version,
                path: which::which(program).ok(),
            }
        }
        _ => ToolInfo {
            name,
            available: false,
            version: None,
            path: None,
        },
    }
}

/// Require that a tool is available, returning its path.
///
/// # Errors
///
/// Returns an error if the tool is not found.
pub fn require_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::tool_not_found(name))
}

/// Get the path to a tool, preferring a configured path over PATH lookup.
pub fn get_tool_path(name: &str, config_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = config_path {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        if let Ok(found) = which::which(path) {
            return Ok(found);
        }
    }

    require_tool(name)
}

/// The ffmpeg/ffprobe pair used for thumbnails and metadata.
///
/// A missing tool is recorded as `None`; callers fall back to placeholders
/// and default metadata instead of failing.
#[derive(Debug, Clone)]
pub struct Transcoder {
    ffmpeg: Option<PathBuf>,
    ffprobe: Option<PathBuf>,
    timeout: Duration,
}

impl Transcoder {
    /// Resolve both tools, honoring configured paths before `PATH`.
    pub fn detect(ffmpeg: Option<&Path>, ffprobe: Option<&Path>) -> Self {
        let ffmpeg = get_tool_path("ffmpeg", ffmpeg).ok();
        let ffprobe = get_tool_path("ffprobe", ffprobe).ok();

        match (&ffmpeg, &ffprobe) {
            (Some(mpeg), Some(probe)) => tracing::info!(
                "Using ffmpeg at {} and ffprobe at {}",
                mpeg.display(),
                probe.display()
            ),
            _ => tracing::warn!(
                "ffmpeg/ffprobe not fully available (ffmpeg: {}, ffprobe: {}); thumbnails will be placeholders",
                ffmpeg.is_some(),
                ffprobe.is_some()
            ),
        }

        Self {
            ffmpeg,
            ffprobe,
            timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }

    /// Use exactly these executables without probing `PATH`.
    pub fn with_paths(ffmpeg: Option<PathBuf>, ffprobe: Option<PathBuf>) -> Self {
        Self {
            ffmpeg,
            ffprobe,
            timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }

    /// A toolchain with nothing installed.
    pub fn disabled() -> Self {
        Self::with_paths(None, None)
    }

    /// Set the per-invocation time limit.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn ffmpeg(&self) -> Option<&Path> {
        self.ffmpeg.as_deref()
    }

    pub fn ffprobe(&self) -> Option<&Path> {
        self.ffprobe.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// ffmpeg path or [`Error::ToolNotFound`].
    pub fn require_ffmpeg(&self) -> Result<&Path> {
        self.ffmpeg().ok_or_else(|| Error::tool_not_found("ffmpeg"))
    }

    /// ffprobe path or [`Error::ToolNotFound`].
    pub fn require_ffprobe(&self) -> Result<&Path> {
        self.ffprobe().ok_or_else(|| Error::tool_not_found("ffprobe"))
    }

    /// Availability and version of both tools.
    pub fn check_tools(&self) -> Vec<ToolInfo> {
        [("ffmpeg", self.ffmpeg()), ("ffprobe", self.ffprobe())]
            .into_iter()
            .map(|(name, path)| match path {
                Some(path) => check_tool_with_arg(path, "-version"),
                None => ToolInfo {
                    name: name.to_string(),
                    available: false,
                    version: None,
                    path: None,
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_tool_not_found() {
        let info = check_tool_with_arg("nonexistent_tool_12345", "-version");
        assert!(!info.available);
        assert!(info.version.is_none());
        assert!(info.path.is_none());
    }

    #[test]
    fn test_require_tool_missing() {
        let err = require_tool("nonexistent_tool_12345").unwrap_err();
        assert!(matches!(err, Error::ToolNotFound { .. }));
    }

    #[test]
    fn test_disabled_transcoder() {
        let transcoder = Transcoder::disabled();
        assert!(transcoder.ffmpeg().is_none());
        assert!(transcoder.require_ffprobe().is_err());

        let report = transcoder.check_tools();
        assert_eq!(report.len(), 2);
        assert!(report.iter().all(|t| !t.available));
        assert_eq!(report[0].name, "ffmpeg");
        assert_eq!(report[1].name, "ffprobe");
    }

    #[test]
    fn test_with_timeout() {
        let transcoder = Transcoder::disabled().with_timeout(Duration::from_secs(5));
        assert_eq!(transcoder.timeout(), Duration::from_secs(5));
    }
}
