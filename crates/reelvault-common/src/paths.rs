//! Path utilities for detecting video files and picking content types.
//!
//! These are used by the scanner, the upload handler, and the stream server,
//! so the extension allow-list lives in exactly one place.

use std::path::{Component, Path};

/// Video file extensions the catalog recognizes.
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "webm"];

/// Content type used when the extension is unknown.
pub const DEFAULT_VIDEO_MIME: &str = "video/mp4";

/// Check if a path has a recognized video file extension (case-insensitive).
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use reelvault_common::paths::is_video_file;
///
/// assert!(is_video_file(Path::new("movie.mkv")));
/// assert!(is_video_file(Path::new("/path/to/video.WEBM")));
/// assert!(!is_video_file(Path::new("subtitle.srt")));
/// ```
pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Get the list of video file extensions.
#[must_use]
pub fn video_extensions() -> &'static [&'static str] {
    VIDEO_EXTENSIONS
}

/// Content type for a video filename, defaulting to `video/mp4`.
pub fn video_mime_type(filename: &str) -> &'static str {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match ext.as_deref() {
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mkv") => "video/x-matroska",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        _ => DEFAULT_VIDEO_MIME,
    }
}

/// Content type for a thumbnail filename.
pub fn image_mime_type(filename: &str) -> &'static str {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}

/// File extension (without dot) to use for an upload with the given MIME type.
///
/// Accepts both the short `video/<ext>` forms browsers sometimes send and the
/// registered types.
pub fn extension_for_mime(mime: &str) -> Option<&'static str> {
    match mime.to_lowercase().as_str() {
        "video/mp4" => Some("mp4"),
        "video/webm" => Some("webm"),
        "video/mkv" | "video/x-matroska" => Some("mkv"),
        "video/mov" | "video/quicktime" => Some("mov"),
        "video/avi" | "video/x-msvideo" | "video/msvideo" => Some("avi"),
        _ => None,
    }
}

/// Filename without its final extension.
///
/// ```
/// use reelvault_common::paths::file_stem;
///
/// assert_eq!(file_stem("clip.mov"), "clip");
/// assert_eq!(file_stem("my.holiday.mp4"), "my.holiday");
/// assert_eq!(file_stem("noext"), "noext");
/// ```
pub fn file_stem(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string())
}

/// Whether `name` is a single plain file name that is safe to join onto a
/// served directory (no separators, no `..`, not absolute).
pub fn is_safe_file_name(name: &str) -> bool {
    if name.is_empty() || name.contains('\\') {
        return false;
    }

    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
