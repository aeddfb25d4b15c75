//! Directory scanner proposing catalog records for video files on disk.

use chrono::{DateTime, Utc};
use reelvault_common::paths::is_video_file;
use reelvault_common::{NewVideo, VideoId};
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// A video file found by [`scan_directory`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScannedVideo {
    /// 1-based position among the accepted files. Stores assign their own ids.
    pub provisional_id: VideoId,
    pub video: NewVideo,
}

/// Lazily scan the top level of `dir` for video files.
///
/// Entries are visited in filename order. Subdirectories are not descended
/// into and files outside the extension allow-list are skipped. A directory
/// that cannot be read is logged and yields nothing.
pub fn scan_directory(dir: &Path) -> impl Iterator<Item = ScannedVideo> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry while scanning: {}", e);
                None
            }
        })
        .filter_map(scanned_file)
        .enumerate()
        .map(|(index, video)| ScannedVideo {
            provisional_id: index as VideoId + 1,
            video,
        })
}

/// Run [`scan_directory`] to completion on the blocking thread pool.
pub async fn scan_directory_blocking(dir: impl Into<PathBuf>) -> Vec<ScannedVideo> {
    let dir = dir.into();
    let shown = dir.display().to_string();

    match tokio::task::spawn_blocking(move || scan_directory(&dir).collect::<Vec<_>>()).await {
        Ok(found) => {
            debug!("Scanned {}: {} video files", shown, found.len());
            found
        }
        Err(e) => {
            warn!("Directory scan of {} aborted: {}", shown, e);
            Vec::new()
        }
    }
}

fn scanned_file(entry: DirEntry) -> Option<NewVideo> {
    if !entry.file_type().is_file() || !is_video_file(entry.path()) {
        return None;
    }

    let filename = entry.file_name().to_str()?.to_string();
    let metadata = match entry.metadata() {
        Ok(m) => m,
        Err(e) => {
            warn!("Cannot stat {}: {}", entry.path().display(), e);
            return None;
        }
    };

    Some(NewVideo::from_filename(filename, metadata.len()).with_upload_date(birth_time(&metadata)))
}

/// Creation time where the filesystem records it, else modification time.
fn birth_time(metadata: &Metadata) -> DateTime<Utc> {
    metadata
        .created()
        .or_else(|_| metadata.modified())
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_scan_filters_and_orders() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.MKV"), vec![0u8; 20]).unwrap();
        fs::write(dir.path().join("a.mp4"), vec![0u8; 10]).unwrap();
        fs::write(dir.path().join("notes.txt"), b"hello").unwrap();
        fs::create_dir(dir.path().join("nested.mp4")).unwrap();
        fs::write(dir.path().join("nested.mp4").join("inner.mp4"), b"x").unwrap();

        let found: Vec<_> = scan_directory(dir.path()).collect();
        assert_eq!(found.len(), 2);

        assert_eq!(found[0].provisional_id, 1);
        assert_eq!(found[0].video.filename, "a.mp4");
        assert_eq!(found[0].video.title, "a");
        assert_eq!(found[0].video.size, 10);
        assert_eq!(found[0].video.path, "/videos/a.mp4");

        assert_eq!(found[1].provisional_id, 2);
        assert_eq!(found[1].video.filename, "b.MKV");
        assert_eq!(found[1].video.size, 20);
    }

    #[test]
    fn test_scan_missing_directory_is_empty() {
        let dir = tempdir().unwrap();
        let found: Vec<_> = scan_directory(&dir.path().join("does-not-exist")).collect();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_scan_blocking() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("clip.webm"), b"data").unwrap();

        let found = scan_directory_blocking(dir.path()).await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].video.filename, "clip.webm");
    }
}
