//! # reelvault-av
//!
//! Adapter around the external `ffmpeg`/`ffprobe` executables.
//!
//! This crate provides functionality for:
//! - Locating the tools and reporting their versions
//! - Running them as time-limited child processes
//! - Extracting thumbnail frames, with a placeholder image when extraction
//!   is impossible
//! - Probing duration, resolution, frame rate, and bitrate
//!
//! ## Example
//!
//! ```no_run
//! use reelvault_av::{ThumbnailGenerator, ThumbnailOptions, Transcoder};
//! use std::path::Path;
//!
//! # async fn example() -> reelvault_av::Result<()> {
//! let generator = ThumbnailGenerator::new(Transcoder::detect(None, None));
//! let outcome = generator
//!     .generate(
//!         Path::new("videos/clip.mp4"),
//!         Path::new("thumbnails/clip_thumb.jpg"),
//!         &ThumbnailOptions::default(),
//!     )
//!     .await?;
//! if outcome.is_placeholder() {
//!     println!("wrote a placeholder to {}", outcome.path().display());
//! }
//! # Ok(())
//! # }
//! ```

pub mod command;
mod error;
pub mod placeholder;
pub mod probe;
pub mod thumbnail;
pub mod tools;

// Re-exports
pub use command::{ToolCommand, ToolOutput};
pub use error::{Error, Result};
pub use probe::{parse_frame_rate, probe_metadata, VideoMetadata};
pub use thumbnail::{
    evenly_spaced_offsets, MultiThumbnailOptions, ThumbnailGenerator, ThumbnailOptions,
    ThumbnailOutcome,
};
pub use tools::{check_tool_with_arg, require_tool, ToolInfo, Transcoder};
