//! Catalog record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::paths::file_stem;

/// Identifier of a cataloged video, unique within one store instance.
pub type VideoId = u64;

/// Title used when neither a title field nor a usable filename is available.
pub const UNTITLED: &str = "Untitled video";

/// Public URL path a video record advertises for a filename.
pub fn public_path(filename: &str) -> String {
    format!("/videos/{filename}")
}

/// Title derived from a filename: the stem, or [`UNTITLED`] when empty.
pub fn title_from_filename(filename: &str) -> String {
    let stem = file_stem(filename);
    let stem = stem.trim();
    if stem.is_empty() {
        UNTITLED.to_string()
    } else {
        stem.to_string()
    }
}

/// A cataloged video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub id: VideoId,
    pub title: String,
    pub filename: String,
    pub size: u64,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub thumbnail: Option<String>,
    pub upload_date: DateTime<Utc>,
    pub path: String,
}

impl VideoRecord {
    /// Build a record from an insert form and an assigned id.
    pub fn from_new(id: VideoId, video: NewVideo) -> Self {
        Self {
            id,
            title: video.title,
            filename: video.filename,
            size: video.size,
            duration: video.duration,
            thumbnail: video.thumbnail,
            upload_date: video.upload_date,
            path: video.path,
        }
    }

    /// Merge a patch into this record. `filename` and `path` never change.
    pub fn apply(&mut self, patch: VideoPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(size) = patch.size {
            self.size = size;
        }
        if let Some(duration) = patch.duration {
            self.duration = duration;
        }
        if let Some(thumbnail) = patch.thumbnail {
            self.thumbnail = thumbnail;
        }
        if let Some(upload_date) = patch.upload_date {
            self.upload_date = upload_date;
        }
    }
}

/// A record that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVideo {
    pub title: String,
    pub filename: String,
    pub size: u64,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub thumbnail: Option<String>,
    pub upload_date: DateTime<Utc>,
    pub path: String,
}

impl NewVideo {
    /// Insert form for a file in the videos directory, stamped with the current time.
    pub fn from_filename(filename: impl Into<String>, size: u64) -> Self {
        let filename = filename.into();
        Self {
            title: title_from_filename(&filename),
            path: public_path(&filename),
            filename,
            size,
            duration: 0.0,
            thumbnail: None,
            upload_date: Utc::now(),
        }
    }

    /// Override the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Override the upload date.
    pub fn with_upload_date(mut self, upload_date: DateTime<Utc>) -> Self {
        self.upload_date = upload_date;
        self
    }
}

/// Partial update for a record. `None` leaves a field untouched;
/// `thumbnail: Some(None)` clears the thumbnail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_date: Option<DateTime<Utc>>,
}

impl VideoPatch {
    pub fn thumbnail(name: impl Into<String>) -> Self {
        Self {
            thumbnail: Some(Some(name.into())),
            ..Default::default()
        }
    }

    pub fn duration(seconds: f64) -> Self {
        Self {
            duration: Some(seconds),
            ..Default::default()
        }
    }
}
