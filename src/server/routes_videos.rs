//! Catalog API: `/api/videos` and `/api/test`.
//!
//! Media files under `/api/videos/stream` and `/api/videos/thumbnails` are
//! mounted separately in [`super::create_router`], outside the rate limit.

use axum::{
    extract::{multipart::Field, DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Router,
};
use reelvault_common::paths::{is_video_file, video_mime_type};
use reelvault_common::{Error, VideoId, VideoRecord};
use reelvault_store::SyncReport;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

use super::error::ApiError;
use super::response::ApiResponse;
use super::AppContext;
use crate::library::{resolve_title, upload_file_name, BulkThumbnailReport};

/// Upper bound for `?count=` on preview generation.
const MAX_PREVIEWS: usize = 20;

/// Multipart framing allowance on top of the file size limit.
const MULTIPART_OVERHEAD: u64 = 1024 * 1024;

pub fn video_routes(ctx: &AppContext) -> Router<AppContext> {
    let body_limit = ctx
        .config
        .library
        .max_file_size
        .saturating_add(MULTIPART_OVERHEAD)
        .min(usize::MAX as u64) as usize;

    Router::new()
        .route("/test", get(server_status))
        .route("/videos", get(list_videos))
        .route(
            "/videos/upload",
            post(upload_video).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/videos/rescan", post(rescan_videos))
        .route("/videos/thumbnails/generate-all", post(generate_all_thumbnails))
        .route("/videos/:id", get(get_video).delete(delete_video))
        .route("/videos/:id/thumbnail", post(generate_thumbnail))
        .route("/videos/:id/previews", post(generate_previews))
        .route("/videos/:id/metadata", put(update_metadata))
}

fn parse_id(raw: &str) -> Result<VideoId, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::bad_request("Invalid video id"))
}

async fn list_videos(
    State(ctx): State<AppContext>,
) -> Result<ApiResponse<Vec<VideoRecord>>, ApiError> {
    let videos = ctx
        .library
        .list()
        .await
        .map_err(|e| ApiError::new(e).with_operation("list videos"))?;
    Ok(ApiResponse::ok(videos))
}

async fn get_video(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<ApiResponse<VideoRecord>, ApiError> {
    let id = parse_id(&id)?;
    let video = ctx
        .library
        .get(id)
        .await
        .map_err(|e| ApiError::new(e).with_operation("get video"))?;
    Ok(ApiResponse::ok(video))
}

/// POST /api/videos/upload
///
/// Multipart form with a required `video` file field and an optional `title`.
/// The file is streamed to disk under a generated name; nothing is cataloged
/// unless the whole file arrived and passed validation.
async fn upload_video(
    State(ctx): State<AppContext>,
    mut multipart: Multipart,
) -> Result<ApiResponse<VideoRecord>, ApiError> {
    let mut title: Option<String> = None;
    let mut stored: Option<(PathBuf, String, u64, Option<String>)> = None;

    let result = async {
        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                "video" if stored.is_none() => {
                    let original = field.file_name().map(str::to_owned);
                    let mime = field
                        .content_type()
                        .map(str::to_lowercase)
                        .or_else(|| {
                            original
                                .as_deref()
                                .filter(|n| is_video_file(std::path::Path::new(n)))
                                .map(|n| video_mime_type(n).to_string())
                        })
                        .unwrap_or_default();

                    if !ctx.config.library.allowed_mime_types.contains(&mime) {
                        return Err(ApiError::bad_request(format!(
                            "Unsupported file type '{mime}'. Only video files are allowed"
                        )));
                    }

                    let filename = upload_file_name(original.as_deref(), Some(&mime));
                    let path = ctx.library.videos_dir().join(&filename);
                    stored = Some((path.clone(), filename, 0, original));

                    let size =
                        write_field(field, &path, ctx.config.library.max_file_size).await?;
                    if let Some(entry) = stored.as_mut() {
                        entry.2 = size;
                    }
                }
                "title" => {
                    title = Some(field.text().await.map_err(multipart_error)?);
                }
                _ => {}
            }
        }
        Ok::<(), ApiError>(())
    }
    .await;

    if let Err(e) = result {
        if let Some((path, ..)) = &stored {
            let _ = tokio::fs::remove_file(path).await;
        }
        return Err(e);
    }

    let Some((path, filename, size, original)) = stored else {
        return Err(ApiError::bad_request("No video file was uploaded"));
    };

    let title = resolve_title(title.as_deref(), original.as_deref());
    match ctx.library.register_upload(&filename, size, title).await {
        Ok(video) => Ok(ApiResponse::ok(video).with_message("Video uploaded successfully")),
        Err(e) => {
            let _ = tokio::fs::remove_file(&path).await;
            Err(ApiError::new(e).with_operation("upload"))
        }
    }
}

/// Stream one multipart field into `path`, enforcing `max_size`.
async fn write_field(
    mut field: Field<'_>,
    path: &std::path::Path,
    max_size: u64,
) -> Result<u64, ApiError> {
    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|e| ApiError::from(e).with_operation("upload"))?;
    let mut written: u64 = 0;

    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        written += chunk.len() as u64;
        if written > max_size {
            return Err(Error::PayloadTooLarge(format!(
                "File exceeds the maximum size of {max_size} bytes"
            ))
            .into());
        }
        file.write_all(&chunk)
            .await
            .map_err(|e| ApiError::from(e).with_operation("upload"))?;
    }

    file.flush()
        .await
        .map_err(|e| ApiError::from(e).with_operation("upload"))?;
    Ok(written)
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::PayloadTooLarge(e.body_text()).into()
    } else {
        ApiError::bad_request(e.body_text())
    }
}

async fn delete_video(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, ApiError> {
    let id = parse_id(&id)?;
    ctx.library
        .delete(id)
        .await
        .map_err(|e| ApiError::new(e).with_operation("delete video"))?;
    Ok(ApiResponse::message("Video deleted successfully"))
}

#[derive(Debug, Serialize)]
struct ThumbnailBody {
    thumbnail: String,
    placeholder: bool,
}

async fn generate_thumbnail(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<ApiResponse<ThumbnailBody>, ApiError> {
    let id = parse_id(&id)?;
    let result = ctx
        .library
        .generate_thumbnail(id)
        .await
        .map_err(|e| ApiError::new(e).with_operation("generate thumbnail"))?;

    Ok(ApiResponse::ok(ThumbnailBody {
        thumbnail: result.thumbnail,
        placeholder: result.placeholder,
    })
    .with_message("Thumbnail generated"))
}

#[derive(Debug, Deserialize)]
struct PreviewQuery {
    count: Option<usize>,
}

async fn generate_previews(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Query(query): Query<PreviewQuery>,
) -> Result<ApiResponse<Vec<String>>, ApiError> {
    let id = parse_id(&id)?;
    let count = query.count.unwrap_or(3);
    if count == 0 || count > MAX_PREVIEWS {
        return Err(ApiError::bad_request(format!(
            "count must be between 1 and {MAX_PREVIEWS}"
        )));
    }

    let previews = ctx
        .library
        .generate_previews(id, count)
        .await
        .map_err(|e| ApiError::new(e).with_operation("generate previews"))?;
    Ok(ApiResponse::ok(previews))
}

async fn generate_all_thumbnails(
    State(ctx): State<AppContext>,
) -> Result<ApiResponse<BulkThumbnailReport>, ApiError> {
    let report = ctx
        .library
        .generate_missing_thumbnails()
        .await
        .map_err(|e| ApiError::new(e).with_operation("generate all thumbnails"))?;
    Ok(ApiResponse::ok(report).with_message("Thumbnails generated for all videos"))
}

async fn update_metadata(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<ApiResponse<VideoRecord>, ApiError> {
    let id = parse_id(&id)?;
    let video = ctx
        .library
        .refresh_metadata(id)
        .await
        .map_err(|e| ApiError::new(e).with_operation("update metadata"))?;
    Ok(ApiResponse::ok(video).with_message("Metadata updated"))
}

async fn rescan_videos(
    State(ctx): State<AppContext>,
) -> Result<ApiResponse<SyncReport>, ApiError> {
    let report = ctx
        .library
        .rescan()
        .await
        .map_err(|e| ApiError::new(e).with_operation("rescan"))?;
    Ok(ApiResponse::ok(report).with_message("Videos rescanned"))
}

/// GET /api/test
async fn server_status(State(ctx): State<AppContext>) -> Result<ApiResponse<Value>, ApiError> {
    let count = ctx
        .library
        .count()
        .await
        .map_err(|e| ApiError::new(e).with_operation("status"))?;
    let library = &ctx.config.library;

    Ok(ApiResponse::ok(json!({
        "message": "Backend is running",
        "videosCount": count,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "config": {
            "videosDir": library.videos_dir,
            "thumbnailsDir": library.thumbnails_dir,
            "maxFileSize": library.max_file_size,
            "allowedMimeTypes": library.allowed_mime_types,
            "storageType": ctx.library.store().backend(),
        }
    })))
}
