//! Shared test harness for integration tests.
//!
//! [`TestHarness`] owns a temporary media root with `videos/` and
//! `thumbnails/`, an in-memory catalog and a library whose transcoder is
//! disabled, so thumbnails always come out as placeholders.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use reelvault::config::Config;
use reelvault::library::VideoLibrary;
use reelvault::server::{create_router, AppContext};
use reelvault_av::{ThumbnailGenerator, Transcoder};
use reelvault_store::{create_store, StorageConfig, StorageType};

pub const BOUNDARY: &str = "reelvault-test-boundary";

pub struct TestHarness {
    pub ctx: AppContext,
    pub root: TempDir,
}

/// A buffered response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("response body is not JSON")
    }
}

impl TestHarness {
    /// Harness over an empty videos directory.
    pub async fn new() -> Self {
        Self::with_files(&[]).await
    }

    /// Harness whose videos directory holds `files` before the catalog loads.
    pub async fn with_files(files: &[(&str, &[u8])]) -> Self {
        Self::build(files, |_| {}).await
    }

    /// Like [`with_files`](Self::with_files), with a chance to adjust config.
    pub async fn build(files: &[(&str, &[u8])], tweak: impl FnOnce(&mut Config)) -> Self {
        let root = tempfile::tempdir().expect("failed to create temp dir");
        let videos_dir = root.path().join("videos");
        let thumbnails_dir = root.path().join("thumbnails");
        std::fs::create_dir_all(&videos_dir).unwrap();
        std::fs::create_dir_all(&thumbnails_dir).unwrap();

        for (name, data) in files {
            std::fs::write(videos_dir.join(name), data).unwrap();
        }

        let mut config = Config::default();
        config.library.videos_dir = videos_dir.clone();
        config.library.thumbnails_dir = thumbnails_dir.clone();
        config.storage.storage_type = StorageType::Memory;
        tweak(&mut config);

        let store = create_store(&StorageConfig::new(
            config.storage.storage_type,
            videos_dir.clone(),
        ))
        .expect("failed to create store");
        let library = VideoLibrary::new(
            store,
            ThumbnailGenerator::new(Transcoder::disabled()),
            videos_dir,
            thumbnails_dir,
        );
        library.initialize().await.expect("failed to initialize library");

        let ctx = AppContext::new(Arc::new(library), Arc::new(config));
        Self { ctx, root }
    }

    pub fn router(&self) -> Router {
        create_router(self.ctx.clone())
    }

    pub fn videos_dir(&self) -> PathBuf {
        self.root.path().join("videos")
    }

    pub fn thumbnails_dir(&self) -> PathBuf {
        self.root.path().join("thumbnails")
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn get_range(&self, uri: &str, range: &str) -> TestResponse {
        self.send(
            Request::get(uri)
                .header("range", range)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn post(&self, uri: &str) -> TestResponse {
        self.send(Request::post(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(Request::delete(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn upload(&self, body: Vec<u8>) -> TestResponse {
        self.send(
            Request::post("/api/videos/upload")
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }
}

/// Builder for a `multipart/form-data` body using [`BOUNDARY`].
#[derive(Default)]
pub struct MultipartBody {
    bytes: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.bytes.extend_from_slice(data);
        self.bytes.extend_from_slice(b"\r\n");
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.bytes
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.bytes
    }
}

/// Names of the entries in `dir`, sorted.
pub fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
