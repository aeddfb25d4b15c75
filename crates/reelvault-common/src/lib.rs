//! Reelvault-Common: Shared types, constants, and utilities.
//!
//! This crate provides common functionality used across reelvault:
//!
//! - **Video records**: The cataloged [`VideoRecord`] and its insert/patch forms
//! - **Path Utilities**: Extension allow-lists, MIME lookup, filename safety
//! - **Error Handling**: Common error types and result aliases
//!
//! # Examples
//!
//! ```
//! use reelvault_common::{Error, NewVideo, Result};
//! use reelvault_common::paths::is_video_file;
//! use std::path::Path;
//!
//! assert!(is_video_file(Path::new("clip.MOV")));
//!
//! let video = NewVideo::from_filename("clip.mov", 1024);
//! assert_eq!(video.title, "clip");
//! assert_eq!(video.path, "/videos/clip.mov");
//!
//! fn example() -> Result<()> {
//!     Err(Error::not_found("video", 7))
//! }
//! assert!(example().is_err());
//! ```

pub mod error;
pub mod paths;
pub mod video;

pub use error::{Error, Result};
pub use video::*;
