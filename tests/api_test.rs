//! API integration tests.
//!
//! Requests go through the full router with `oneshot`, against a
//! [`TestHarness`] library backed by the in-memory store.

mod common;

use axum::http::StatusCode;
use common::{list_dir, MultipartBody, TestHarness};

// ---------------------------------------------------------------------------
// Health and status
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_returns_200() {
    let harness = TestHarness::new().await;

    let resp = harness.get("/health").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["status"], "ok");
}

#[tokio::test]
async fn banner_lists_endpoints() {
    let harness = TestHarness::new().await;

    let json = harness.get("/").await.json();
    assert_eq!(json["name"], "reelvault");
    assert_eq!(json["endpoints"]["videos"], "/api/videos");
}

#[tokio::test]
async fn status_reports_count_and_config() {
    let harness = TestHarness::with_files(&[("a.mp4", b"aaaa"), ("b.webm", b"bb")]).await;

    let resp = harness.get("/api/test").await;
    assert_eq!(resp.status, StatusCode::OK);

    let json = resp.json();
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["videosCount"], 2);
    assert_eq!(json["data"]["config"]["storageType"], "memory");
    assert_eq!(
        json["data"]["config"]["maxFileSize"],
        2u64 * 1024 * 1024 * 1024
    );
    assert!(json["data"]["timestamp"].is_string());
}

// ---------------------------------------------------------------------------
// Listing and lookup
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_seeds_from_videos_directory() {
    let harness = TestHarness::with_files(&[
        ("b.mkv", b"bbbbbb"),
        ("a.mp4", b"aaaa"),
        ("notes.txt", b"not a video"),
    ])
    .await;

    let resp = harness.get("/api/videos").await;
    assert_eq!(resp.status, StatusCode::OK);

    let json = resp.json();
    assert_eq!(json["success"], true);
    let videos = json["data"].as_array().unwrap();
    assert_eq!(videos.len(), 2);

    assert_eq!(videos[0]["id"], 1);
    assert_eq!(videos[0]["filename"], "a.mp4");
    assert_eq!(videos[0]["title"], "a");
    assert_eq!(videos[0]["size"], 4);
    assert_eq!(videos[0]["path"], "/videos/a.mp4");
    assert!(videos[0]["thumbnail"].is_null());
    assert!(videos[0]["uploadDate"].is_string());

    assert_eq!(videos[1]["id"], 2);
    assert_eq!(videos[1]["filename"], "b.mkv");
}

#[tokio::test]
async fn get_video_by_id() {
    let harness = TestHarness::with_files(&[("a.mp4", b"aaaa")]).await;

    let resp = harness.get("/api/videos/1").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["data"]["filename"], "a.mp4");
}

#[tokio::test]
async fn get_unknown_video_is_404() {
    let harness = TestHarness::new().await;

    let resp = harness.get("/api/videos/99").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let json = resp.json();
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Video not found");
}

#[tokio::test]
async fn non_numeric_id_is_400() {
    let harness = TestHarness::new().await;

    let resp = harness.get("/api/videos/abc").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.json()["error"], "Invalid video id");
}

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upload_stores_file_and_catalogs_it() {
    let harness = TestHarness::new().await;
    let data = vec![7u8; 2048];

    let body = MultipartBody::new()
        .file("video", "clip.mov", "video/quicktime", &data)
        .finish();
    let resp = harness.upload(body).await;
    assert_eq!(resp.status, StatusCode::OK);

    let json = resp.json();
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Video uploaded successfully");

    let video = &json["data"];
    assert_eq!(video["id"], 1);
    assert_eq!(video["title"], "clip");
    assert_eq!(video["size"], 2048);

    let filename = video["filename"].as_str().unwrap();
    assert!(filename.starts_with("video-"));
    assert!(filename.ends_with(".mov"));
    assert_eq!(video["path"], format!("/videos/{filename}"));

    let stored = std::fs::read(harness.videos_dir().join(filename)).unwrap();
    assert_eq!(stored, data);

    // No ffmpeg in tests: the thumbnail is a placeholder, but it exists
    let thumbnail = video["thumbnail"].as_str().unwrap();
    assert!(thumbnail.ends_with("_thumb.jpg"));
    assert!(harness.thumbnails_dir().join(thumbnail).is_file());

    let list = harness.get("/api/videos").await.json();
    assert_eq!(list["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn upload_uses_title_field() {
    let harness = TestHarness::new().await;

    let body = MultipartBody::new()
        .text("title", "  Holiday 2024  ")
        .file("video", "raw.mp4", "video/mp4", b"data")
        .finish();
    let resp = harness.upload(body).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["data"]["title"], "Holiday 2024");
}

#[tokio::test]
async fn upload_rejects_disallowed_type() {
    let harness = TestHarness::new().await;

    let body = MultipartBody::new()
        .file("video", "notes.txt", "text/plain", b"hello")
        .finish();
    let resp = harness.upload(body).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.json()["success"], false);
    assert!(list_dir(&harness.videos_dir()).is_empty());
}

#[tokio::test]
async fn upload_without_file_is_400() {
    let harness = TestHarness::new().await;

    let body = MultipartBody::new().text("title", "nothing").finish();
    let resp = harness.upload(body).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.json()["error"], "No video file was uploaded");
}

#[tokio::test]
async fn oversized_upload_is_413_and_leaves_nothing_behind() {
    let harness = TestHarness::build(&[], |config| config.library.max_file_size = 16).await;

    let body = MultipartBody::new()
        .file("video", "big.mp4", "video/mp4", &[1u8; 64])
        .finish();
    let resp = harness.upload(body).await;
    assert_eq!(resp.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(resp.json()["success"], false);

    assert!(list_dir(&harness.videos_dir()).is_empty());
    let list = harness.get("/api/videos").await.json();
    assert!(list["data"].as_array().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_removes_record_and_files() {
    let harness = TestHarness::with_files(&[("a.mp4", b"aaaa"), ("b.mp4", b"bbbb")]).await;
    std::fs::write(harness.thumbnails_dir().join("a_thumb.jpg"), b"jpg").unwrap();

    let resp = harness.delete("/api/videos/1").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["message"], "Video deleted successfully");

    assert_eq!(list_dir(&harness.videos_dir()), vec!["b.mp4"]);
    assert!(list_dir(&harness.thumbnails_dir()).is_empty());

    let resp = harness.get("/api/videos/1").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let resp = harness.delete("/api/videos/1").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_tolerates_missing_file() {
    let harness = TestHarness::with_files(&[("a.mp4", b"aaaa")]).await;
    std::fs::remove_file(harness.videos_dir().join("a.mp4")).unwrap();

    let resp = harness.delete("/api/videos/1").await;
    assert_eq!(resp.status, StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Thumbnails, metadata, rescan
// ---------------------------------------------------------------------------

#[tokio::test]
async fn generate_thumbnail_reports_placeholder() {
    let harness = TestHarness::with_files(&[("a.mp4", b"aaaa")]).await;

    let resp = harness.post("/api/videos/1/thumbnail").await;
    assert_eq!(resp.status, StatusCode::OK);

    let json = resp.json();
    assert_eq!(json["data"]["thumbnail"], "a_thumb.jpg");
    assert_eq!(json["data"]["placeholder"], true);

    let video = harness.get("/api/videos/1").await.json();
    assert_eq!(video["data"]["thumbnail"], "a_thumb.jpg");

    let image = harness.get("/api/videos/thumbnails/a_thumb.jpg").await;
    assert_eq!(image.status, StatusCode::OK);
    assert_eq!(image.headers["content-type"], "image/jpeg");
}

#[tokio::test]
async fn generate_thumbnail_for_unknown_video_is_404() {
    let harness = TestHarness::new().await;

    let resp = harness.post("/api/videos/5/thumbnail").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn generate_all_thumbnails_skips_existing() {
    let harness = TestHarness::with_files(&[("a.mp4", b"a"), ("b.mp4", b"b")]).await;

    let json = harness.post("/api/videos/thumbnails/generate-all").await.json();
    assert_eq!(json["data"]["processed"], 2);
    assert_eq!(json["data"]["placeholders"], 2);
    assert_eq!(json["data"]["failed"], 0);

    let json = harness.post("/api/videos/thumbnails/generate-all").await.json();
    assert_eq!(json["data"]["processed"], 0);
}

#[tokio::test]
async fn previews_default_to_three() {
    let harness = TestHarness::with_files(&[("a.mp4", b"aaaa")]).await;

    let resp = harness.post("/api/videos/1/previews").await;
    assert_eq!(resp.status, StatusCode::OK);
    let names: Vec<String> = serde_json::from_value(resp.json()["data"].clone()).unwrap();
    assert_eq!(names, vec!["a_thumb_1.jpg", "a_thumb_2.jpg", "a_thumb_3.jpg"]);

    let resp = harness.post("/api/videos/1/previews?count=0").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn metadata_refresh_without_ffprobe_keeps_zero_duration() {
    let harness = TestHarness::with_files(&[("a.mp4", b"aaaa")]).await;

    let resp = harness
        .send(
            axum::http::Request::put("/api/videos/1/metadata")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["data"]["duration"], 0.0);
}

#[tokio::test]
async fn rescan_picks_up_added_and_removed_files() {
    let harness = TestHarness::with_files(&[("a.mp4", b"aaaa")]).await;

    std::fs::write(harness.videos_dir().join("new.webm"), b"new").unwrap();
    std::fs::remove_file(harness.videos_dir().join("a.mp4")).unwrap();

    let json = harness.post("/api/videos/rescan").await.json();
    assert_eq!(json["data"]["added"], 1);
    assert_eq!(json["data"]["removed"], 1);
    assert_eq!(json["data"]["total"], 1);

    let list = harness.get("/api/videos").await.json();
    let videos = list["data"].as_array().unwrap();
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0]["filename"], "new.webm");
    assert_eq!(videos[0]["title"], "new");
}

// ---------------------------------------------------------------------------
// Rate limiting
// ---------------------------------------------------------------------------

#[tokio::test]
async fn api_is_rate_limited() {
    let harness = TestHarness::build(&[], |config| config.rate_limit.max_requests = 2).await;

    assert_eq!(harness.get("/api/videos").await.status, StatusCode::OK);
    assert_eq!(harness.get("/api/videos").await.status, StatusCode::OK);

    let resp = harness.get("/api/videos").await;
    assert_eq!(resp.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(resp.json()["success"], false);

    // Only /api is limited
    assert_eq!(harness.get("/health").await.status, StatusCode::OK);
}

#[tokio::test]
async fn media_routes_are_not_rate_limited() {
    let harness = TestHarness::build(&[("a.mp4", &[0u8; 200][..])], |config| {
        config.rate_limit.max_requests = 2
    })
    .await;
    std::fs::write(harness.thumbnails_dir().join("a_thumb.jpg"), b"jpg").unwrap();

    for _ in 0..5 {
        let resp = harness
            .get_range("/api/videos/stream/a.mp4", "bytes=0-99")
            .await;
        assert_eq!(resp.status, StatusCode::PARTIAL_CONTENT);

        let resp = harness.get("/api/videos/thumbnails/a_thumb.jpg").await;
        assert_eq!(resp.status, StatusCode::OK);
    }

    // The catalog API still has its budget
    assert_eq!(harness.get("/api/videos").await.status, StatusCode::OK);
    assert_eq!(harness.get("/api/videos").await.status, StatusCode::OK);
    assert_eq!(
        harness.get("/api/videos").await.status,
        StatusCode::TOO_MANY_REQUESTS
    );
}
