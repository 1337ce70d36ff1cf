//! Router configuration for the HTTP API.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use super::handlers::{download_by_name, download_from_url, get_files, upload, AppState};
use super::middleware::create_cors_layer;

/// Room for multipart boundaries and the `user_id` field on top of the file.
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let upload_limit = body_limit(app_state.max_upload_size);

    Router::new()
        .route(
            "/upload",
            post(upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/download_by_name", post(download_by_name))
        .route("/download_from_url", post(download_from_url))
        .route("/get_files", get(get_files))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins)),
        )
        .with_state(app_state)
}

fn body_limit(max_upload_size: u64) -> usize {
    usize::try_from(max_upload_size.saturating_add(MULTIPART_OVERHEAD)).unwrap_or(usize::MAX)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

/// Serve the frontend from `static_path`, with `index.html` as the fallback.
///
/// Returns `None` if the directory does not exist.
pub fn create_static_router(static_path: &str) -> Option<Router> {
    let dir = Path::new(static_path);
    if !dir.is_dir() {
        tracing::warn!("Static directory not found: {}", static_path);
        return None;
    }

    let serve_dir = ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html")));
    Some(Router::new().fallback_service(serve_dir))
}
