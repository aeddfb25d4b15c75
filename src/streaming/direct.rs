//! Direct streaming with HTTP range requests.
//!
//! Serves files from the videos and thumbnails directories. Bodies are read
//! incrementally from a seeked, length-limited file handle, so a dropped
//! connection simply drops the handle.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
};
use reelvault_common::paths::{image_mime_type, is_safe_file_name, video_mime_type};
use reelvault_common::Error;
use std::io::{ErrorKind, SeekFrom};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use super::range::RangeRequest;
use crate::server::{ApiError, AppContext};

/// Stream a video with range request support.
pub async fn stream_video(
    State(ctx): State<AppContext>,
    Path(filename): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let range = headers.get(header::RANGE).and_then(|h| h.to_str().ok());
    serve_file(
        ctx.library.videos_dir(),
        &filename,
        range,
        video_mime_type(&filename),
    )
    .await
}

/// Serve a thumbnail image.
pub async fn serve_thumbnail(
    State(ctx): State<AppContext>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    serve_file(
        ctx.library.thumbnails_dir(),
        &filename,
        None,
        image_mime_type(&filename),
    )
    .await
}

/// Answer a GET for `dir/filename`, honoring a single byte range.
pub async fn serve_file(
    dir: &std::path::Path,
    filename: &str,
    range: Option<&str>,
    content_type: &str,
) -> Result<Response, ApiError> {
    if !is_safe_file_name(filename) {
        return Err(ApiError::bad_request("Invalid filename"));
    }

    let file_path = dir.join(filename);
    let metadata = tokio::fs::metadata(&file_path)
        .await
        .map_err(|e| open_error(e, filename))?;
    if !metadata.is_file() {
        return Err(Error::not_found("file", filename).into());
    }
    let file_size = metadata.len();

    match RangeRequest::parse(range, file_size) {
        RangeRequest::Partial { start, end } => {
            let length = end - start + 1;

            let mut file = File::open(&file_path)
                .await
                .map_err(|e| open_error(e, filename))?;
            file.seek(SeekFrom::Start(start))
                .await
                .map_err(Error::Stream)?;

            let body = Body::from_stream(ReaderStream::new(file.take(length)));

            Response::builder()
                .status(StatusCode::PARTIAL_CONTENT)
                .header(header::CONTENT_TYPE, content_type)
                .header(header::CONTENT_LENGTH, length.to_string())
                .header(
                    header::CONTENT_RANGE,
                    format!("bytes {}-{}/{}", start, end, file_size),
                )
                .header(header::ACCEPT_RANGES, "bytes")
                .body(body)
                .map_err(|e| Error::internal(e.to_string()).into())
        }
        RangeRequest::Unsatisfiable => Response::builder()
            .status(StatusCode::RANGE_NOT_SATISFIABLE)
            .header(header::CONTENT_RANGE, format!("bytes */{}", file_size))
            .header(header::ACCEPT_RANGES, "bytes")
            .body(Body::empty())
            .map_err(|e| Error::internal(e.to_string()).into()),
        RangeRequest::Full => {
            let file = File::open(&file_path)
                .await
                .map_err(|e| open_error(e, filename))?;

            let body = Body::from_stream(ReaderStream::new(file));

            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, content_type)
                .header(header::CONTENT_LENGTH, file_size.to_string())
                .header(header::ACCEPT_RANGES, "bytes")
                .body(body)
                .map_err(|e| Error::internal(e.to_string()).into())
        }
    }
}

fn open_error(e: std::io::Error, filename: &str) -> ApiError {
    if e.kind() == ErrorKind::NotFound {
        Error::not_found("file", filename).into()
    } else {
        ApiError::new(Error::Stream(e)).with_operation("stream")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use tempfile::tempdir;

    async fn body_bytes(response: Response) -> Vec<u8> {
        response
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec()
    }

    #[tokio::test]
    async fn test_partial_response() {
        let dir = tempdir().unwrap();
        let data: Vec<u8> = (0..100u8).collect();
        std::fs::write(dir.path().join("a.mp4"), &data).unwrap();

        let response = serve_file(dir.path(), "a.mp4", Some("bytes=10-19"), "video/mp4")
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(response.headers()[header::CONTENT_RANGE], "bytes 10-19/100");
        assert_eq!(body_bytes(response).await, &data[10..20]);
    }

    #[tokio::test]
    async fn test_rejects_traversal() {
        let dir = tempdir().unwrap();
        let err = serve_file(dir.path(), "../etc/passwd", None, "video/mp4")
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_directory_is_not_found() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub.mp4")).unwrap();
        let err = serve_file(dir.path(), "sub.mp4", None, "video/mp4")
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
