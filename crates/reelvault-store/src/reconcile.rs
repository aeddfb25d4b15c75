//! Catalog/filesystem reconciliation shared by the backends.

use reelvault_common::VideoRecord;
use std::collections::HashSet;
use std::path::Path;

use crate::id::IdPolicy;
use crate::scan::ScannedVideo;
use crate::store::SyncReport;

/// Append scanned files that are not cataloged, then drop records whose file
/// no longer exists in `videos_dir` and later duplicates of a filename.
pub(crate) fn reconcile(
    records: &mut Vec<VideoRecord>,
    scanned: Vec<ScannedVideo>,
    videos_dir: &Path,
    policy: IdPolicy,
) -> SyncReport {
    let mut known: HashSet<String> = records.iter().map(|r| r.filename.clone()).collect();
    let mut added = 0;

    for found in scanned {
        if known.insert(found.video.filename.clone()) {
            let id = policy.next_id(records);
            records.push(VideoRecord::from_new(id, found.video));
            added += 1;
        }
    }

    let before = records.len();
    let mut seen = HashSet::new();
    records.retain(|r| seen.insert(r.filename.clone()) && videos_dir.join(&r.filename).is_file());

    SyncReport {
        added,
        removed: before - records.len(),
        total: records.len(),
    }
}

/// Assign ids to a fresh scan.
pub(crate) fn seed(scanned: Vec<ScannedVideo>, policy: IdPolicy) -> Vec<VideoRecord> {
    let mut records = Vec::with_capacity(scanned.len());
    for found in scanned {
        let id = policy.next_id(&records);
        records.push(VideoRecord::from_new(id, found.video));
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::scan_directory;
    use reelvault_common::NewVideo;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_reconcile_adds_and_removes() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("kept.mp4"), b"1").unwrap();
        fs::write(dir.path().join("new.mov"), b"22").unwrap();

        let mut records = vec![
            VideoRecord::from_new(1, NewVideo::from_filename("kept.mp4", 1)),
            VideoRecord::from_new(2, NewVideo::from_filename("gone.mp4", 1)),
            VideoRecord::from_new(3, NewVideo::from_filename("kept.mp4", 1)),
        ];

        let scanned = scan_directory(dir.path()).collect();
        let report = reconcile(&mut records, scanned, dir.path(), IdPolicy::MaxPlusOne);

        assert_eq!(report.added, 1);
        assert_eq!(report.removed, 2);
        assert_eq!(report.total, 2);

        let names: Vec<_> = records.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, ["kept.mp4", "new.mov"]);
        assert_eq!(records[0].id, 1);
        assert_eq!(records[1].id, 4);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.mp4"), b"1").unwrap();
        fs::write(dir.path().join("b.avi"), b"1").unwrap();

        let mut records = Vec::new();
        reconcile(
            &mut records,
            scan_directory(dir.path()).collect(),
            dir.path(),
            IdPolicy::Sequential,
        );
        let first = records.clone();

        let report = reconcile(
            &mut records,
            scan_directory(dir.path()).collect(),
            dir.path(),
            IdPolicy::Sequential,
        );
        assert_eq!(report, SyncReport { added: 0, removed: 0, total: 2 });
        assert_eq!(records, first);
    }
}
