//! Media streaming module.
//!
//! # Routes
//!
//! - `GET /videos/stream/{filename}` - Video with range support
//! - `GET /videos/{filename}` - Same, at the path stored on each record
//! - `GET /videos/thumbnails/{filename}` - Thumbnail image
//! - `GET /thumbnails/{filename}` - Same, short form
//!
//! The stream and thumbnail routes are also mounted under `/api/videos`.

mod direct;
mod range;

pub use direct::{serve_file, serve_thumbnail, stream_video};
pub use range::RangeRequest;

use axum::{routing::get, Router};

use crate::server::AppContext;

/// Stream and thumbnail routes, relative to their mount point.
pub fn stream_router() -> Router<AppContext> {
    Router::new()
        .route("/stream/:filename", get(stream_video))
        .route("/thumbnails/:filename", get(serve_thumbnail))
}

/// `/videos/...`: [`stream_router`] plus the bare `/{filename}` form.
pub fn video_router() -> Router<AppContext> {
    stream_router().route("/:filename", get(stream_video))
}

/// Routes for `/thumbnails/...`.
pub fn thumbnail_router() -> Router<AppContext> {
    Router::new().route("/:filename", get(serve_thumbnail))
}
