use crate::config::Config;
use crate::library::VideoLibrary;
use crate::streaming;
use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use reelvault_av::{ThumbnailGenerator, Transcoder};
use reelvault_store::create_store;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

mod error;
pub mod rate_limit;
pub mod response;
pub mod routes_videos;

pub use error::ApiError;
pub use rate_limit::{create_limiter, SharedLimiter};
pub use response::ApiResponse;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub library: Arc<VideoLibrary>,
    pub config: Arc<Config>,
    /// Request budget for `/api`, shared by all clients
    pub limiter: SharedLimiter,
}

impl AppContext {
    pub fn new(library: Arc<VideoLibrary>, config: Arc<Config>) -> Self {
        let limiter = create_limiter(config.rate_limit.window(), config.rate_limit.max_requests);
        Self {
            library,
            config,
            limiter,
        }
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let cors = cors_layer(&ctx.config.server.cors_origin);
    let static_dir = ctx.config.server.static_dir.clone();

    let api = routes_videos::video_routes(&ctx).layer(middleware::from_fn_with_state(
        ctx.clone(),
        rate_limit::rate_limit_middleware,
    ));

    let mut app = Router::new()
        .route("/", get(banner))
        .route("/health", get(health_check))
        .nest("/api", api)
        .nest("/api/videos", streaming::stream_router())
        .nest("/videos", streaming::video_router())
        .nest("/thumbnails", streaming::thumbnail_router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx);

    // Serve static files if directory is provided
    if let Some(dir) = static_dir {
        if dir.exists() {
            tracing::info!("Serving static files from {:?}", dir);
            let index_path = dir.join("index.html");
            app = app.fallback_service(
                ServeDir::new(&dir)
                    .append_index_html_on_directories(true)
                    .not_found_service(ServeFile::new(index_path)),
            );
        }
    }

    app
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::RANGE])
        .expose_headers([
            header::CONTENT_RANGE,
            header::ACCEPT_RANGES,
            header::CONTENT_LENGTH,
        ]);

    if origin.trim() == "*" {
        return layer.allow_origin(Any);
    }

    match HeaderValue::from_str(origin.trim()) {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            tracing::warn!("Invalid CORS origin {:?}, allowing any origin", origin);
            layer.allow_origin(Any)
        }
    }
}

async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn banner() -> impl IntoResponse {
    Json(json!({
        "name": "reelvault",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "videos": "/api/videos",
            "upload": "/api/videos/upload",
            "stream": "/api/videos/stream/:filename",
            "thumbnails": "/api/videos/thumbnails/:filename",
            "status": "/api/test",
            "health": "/health",
        }
    }))
}

/// Wire the store, tools and library together and load the catalog.
pub async fn build_context(config: Config) -> Result<AppContext> {
    let store = create_store(&config.storage_config())
        .with_context(|| format!("Failed to create {} store", config.storage.storage_type))?;

    let transcoder = Transcoder::detect(
        config.tools.ffmpeg_path.as_deref(),
        config.tools.ffprobe_path.as_deref(),
    )
    .with_timeout(Duration::from_secs(config.tools.timeout_secs));

    let library = VideoLibrary::new(
        store,
        ThumbnailGenerator::new(transcoder),
        config.library.videos_dir.clone(),
        config.library.thumbnails_dir.clone(),
    );
    library
        .initialize()
        .await
        .context("Failed to initialize video library")?;

    Ok(AppContext::new(Arc::new(library), Arc::new(config)))
}

/// Start the HTTP server
pub async fn start_server(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let ctx = build_context(config).await?;
    let library = ctx.library.clone();
    let app = create_router(ctx);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Err(e) = library.shutdown().await {
        tracing::warn!("Store shutdown failed: {}", e);
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
