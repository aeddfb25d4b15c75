use reelvault_common::paths::{extension_for_mime, file_stem, is_video_file};
use reelvault_common::UNTITLED;
use std::path::Path;

/// Collision-resistant name for a stored upload: `video-<millis>-<random>.<ext>`.
///
/// The extension comes from the client's filename when it is a recognized
/// video extension, otherwise from the MIME type, otherwise `mp4`.
pub fn upload_file_name(original: Option<&str>, mime: Option<&str>) -> String {
    let ext = original
        .map(Path::new)
        .filter(|p| is_video_file(p))
        .and_then(|p| p.extension())
        .map(|e| e.to_string_lossy().to_lowercase())
        .or_else(|| mime.and_then(extension_for_mime).map(String::from))
        .unwrap_or_else(|| "mp4".to_string());

    let millis = chrono::Utc::now().timestamp_millis();
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!("video-{millis}-{}.{ext}", &random[..12])
}

/// Title for an upload: the submitted title, else the client's filename
/// without extension, else a fixed fallback.
pub fn resolve_title(title: Option<&str>, original: Option<&str>) -> String {
    if let Some(title) = title.map(str::trim).filter(|t| !t.is_empty()) {
        return title.to_string();
    }

    original
        .map(|name| {
            // Browsers may send a full path on some platforms
            let leaf = name.rsplit(['/', '\\']).next().unwrap_or(name);
            file_stem(leaf)
        })
        .map(|stem| stem.trim().to_string())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_file_name_extension() {
        let name = upload_file_name(Some("Clip.MOV"), Some("video/quicktime"));
        assert!(name.starts_with("video-"));
        assert!(name.ends_with(".mov"));

        let name = upload_file_name(Some("weird.bin"), Some("video/x-matroska"));
        assert!(name.ends_with(".mkv"));

        let name = upload_file_name(None, None);
        assert!(name.ends_with(".mp4"));
    }

    #[test]
    fn test_upload_file_names_are_unique() {
        let a = upload_file_name(Some("a.mp4"), None);
        let b = upload_file_name(Some("a.mp4"), None);
        assert_ne!(a, b);
    }

    #[test]
    fn test_resolve_title() {
        assert_eq!(resolve_title(Some(" My trip "), Some("x.mp4")), "My trip");
        assert_eq!(resolve_title(None, Some("clip.mov")), "clip");
        assert_eq!(resolve_title(Some("   "), Some("C:\\Users\\me\\clip.mov")), "clip");
        assert_eq!(resolve_title(None, None), UNTITLED);
        assert_eq!(resolve_title(None, Some(".mp4")), ".mp4");
    }
}
