//! Id assignment policies.

use reelvault_common::{VideoId, VideoRecord};
use serde::Serialize;

/// How a backend assigns ids to newly added records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdPolicy {
    /// `max(existing ids, 0) + 1`. A deleted id is never handed out again
    /// unless it was the highest one.
    MaxPlusOne,
    /// `count + 1`, moved forward past any id still in use.
    Sequential,
}

impl IdPolicy {
    /// Pick the id for the next record appended to `records`.
    pub fn next_id(self, records: &[VideoRecord]) -> VideoId {
        match self {
            Self::MaxPlusOne => records.iter().map(|r| r.id).max().unwrap_or(0) + 1,
            Self::Sequential => {
                let mut id = records.len() as VideoId + 1;
                while records.iter().any(|r| r.id == id) {
                    id += 1;
                }
                id
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelvault_common::NewVideo;

    fn records(ids: &[VideoId]) -> Vec<VideoRecord> {
        ids.iter()
            .map(|&id| VideoRecord::from_new(id, NewVideo::from_filename(format!("{id}.mp4"), 1)))
            .collect()
    }

    #[test]
    fn test_max_plus_one() {
        assert_eq!(IdPolicy::MaxPlusOne.next_id(&[]), 1);
        assert_eq!(IdPolicy::MaxPlusOne.next_id(&records(&[1, 2, 4, 5])), 6);
        assert_eq!(IdPolicy::MaxPlusOne.next_id(&records(&[7])), 8);
    }

    #[test]
    fn test_sequential() {
        assert_eq!(IdPolicy::Sequential.next_id(&[]), 1);
        assert_eq!(IdPolicy::Sequential.next_id(&records(&[1, 2, 3])), 4);
        // 1 was deleted from [1, 2, 3]; len + 1 = 3 is still taken
        assert_eq!(IdPolicy::Sequential.next_id(&records(&[2, 3])), 4);
        assert_eq!(IdPolicy::Sequential.next_id(&records(&[1, 3])), 4);
        assert_eq!(IdPolicy::Sequential.next_id(&records(&[1, 4])), 3);
    }
}
