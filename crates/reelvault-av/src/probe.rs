//! FFprobe-based metadata probing.

use crate::command::ToolCommand;
use crate::tools::Transcoder;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Technical metadata of a video file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    /// Seconds.
    pub duration: f64,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// Bits per second.
    pub bitrate: u64,
}

impl Default for VideoMetadata {
    /// What callers assume when the file cannot be probed.
    fn default() -> Self {
        Self {
            duration: 0.0,
            width: 1920,
            height: 1080,
            fps: 30.0,
            bitrate: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
    bit_rate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
}

/// Probe `path` with ffprobe.
///
/// # Errors
///
/// Fails if ffprobe is unavailable, exits unsuccessfully, times out, or
/// prints something that is not ffprobe JSON.
pub async fn probe_metadata(transcoder: &Transcoder, path: &Path) -> Result<VideoMetadata> {
    let ffprobe = transcoder.require_ffprobe()?;

    let output = ToolCommand::new(ffprobe.to_path_buf())
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path.to_string_lossy())
        .timeout(transcoder.timeout())
        .execute()
        .await?;

    parse_ffprobe_json(&output.stdout)
}

/// Turn ffprobe's JSON into [`VideoMetadata`], filling gaps with defaults.
pub fn parse_ffprobe_json(json: &str) -> Result<VideoMetadata> {
    let output: FfprobeOutput = serde_json::from_str(json)
        .map_err(|e| Error::parse_error("ffprobe", e.to_string()))?;

    let defaults = VideoMetadata::default();
    let video = output
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"));

    Ok(VideoMetadata {
        duration: output
            .format
            .duration
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|d| d.is_finite() && *d >= 0.0)
            .unwrap_or(defaults.duration),
        width: video
            .and_then(|s| s.width)
            .filter(|w| *w > 0)
            .unwrap_or(defaults.width),
        height: video
            .and_then(|s| s.height)
            .filter(|h| *h > 0)
            .unwrap_or(defaults.height),
        fps: video
            .and_then(|s| s.r_frame_rate.as_deref())
            .and_then(parse_frame_rate)
            .filter(|f| *f > 0.0)
            .unwrap_or(defaults.fps),
        bitrate: output
            .format
            .bit_rate
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.bitrate),
    })
}

/// Parse `"30000/1001"` or `"25"` style frame rates.
pub fn parse_frame_rate(rate_str: &str) -> Option<f64> {
    let parts: Vec<&str> = rate_str.split('/').collect();
    if parts.len() == 2 {
        let num: f64 = parts[0].parse().ok()?;
        let den: f64 = parts[1].parse().ok()?;
        if den != 0.0 {
            return Some(num / den);
        }
        return None;
    }
    rate_str.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_rate() {
        assert_eq!(parse_frame_rate("24/1"), Some(24.0));
        assert_eq!(parse_frame_rate("25"), Some(25.0));
        let ntsc = parse_frame_rate("30000/1001").unwrap();
        assert!((ntsc - 29.97).abs() < 0.01);
        assert_eq!(parse_frame_rate("0/0"), None);
        assert_eq!(parse_frame_rate("abc"), None);
    }

    #[test]
    fn test_parse_ffprobe_json() {
        let json = r#"{
            "streams": [
                {"codec_type": "audio", "sample_rate": "48000"},
                {"codec_type": "video", "width": 1280, "height": 720, "r_frame_rate": "24000/1001"}
            ],
            "format": {"duration": "62.500000", "bit_rate": "2500000"}
        }"#;

        let meta = parse_ffprobe_json(json).unwrap();
        assert_eq!(meta.duration, 62.5);
        assert_eq!(meta.width, 1280);
        assert_eq!(meta.height, 720);
        assert!((meta.fps - 23.976).abs() < 0.01);
        assert_eq!(meta.bitrate, 2_500_000);
    }

    #[test]
    fn test_parse_ffprobe_json_missing_fields() {
        let meta = parse_ffprobe_json(r#"{"format": {}, "streams": []}"#).unwrap();
        assert_eq!(meta, VideoMetadata::default());
    }

    #[test]
    fn test_parse_ffprobe_json_garbage() {
        let err = parse_ffprobe_json("not json").unwrap_err();
        assert!(matches!(err, Error::ParseError { .. }));
    }

    #[tokio::test]
    async fn test_probe_without_ffprobe() {
        let err = probe_metadata(&Transcoder::disabled(), Path::new("a.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ToolNotFound { .. }));
    }
}
