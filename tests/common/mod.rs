//! Shared helpers for integration tests.
//!
//! Provides an in-process API server and a local origin server that stands
//! in for remote file hosts.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header::USER_AGENT, HeaderMap, StatusCode};
use axum::response::Redirect;
use axum::routing::get;
use axum::Router;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use tempfile::TempDir;
use tokio::net::TcpListener;

use sharebox::config::FetchConfig;
use sharebox::web::{create_router, AppState};
use sharebox::{ContentStore, Database, RemoteFetcher};

/// Bytes served by the origin at `/files/report.pdf` and `/mirror/report-copy.pdf`.
pub const ORIGIN_PDF: &[u8] = b"%PDF-1.4 origin report body";

/// User agent configured for test fetchers.
pub const TEST_USER_AGENT: &str = "Sharebox-Test/1.0";

/// An API server over a fresh database and content store.
pub struct TestApp {
    pub server: TestServer,
    pub db: Arc<Database>,
    pub store: ContentStore,
    _storage_dir: TempDir,
}

/// Fetch settings that allow the loopback origin.
pub fn test_fetch_config() -> FetchConfig {
    FetchConfig {
        user_agent: TEST_USER_AGENT.to_string(),
        connect_timeout_secs: 2,
        total_timeout_secs: 5,
        max_size_mb: 1,
        allow_private_hosts: true,
        ..FetchConfig::default()
    }
}

/// Create a test app with the default upload limit.
pub async fn create_test_app() -> TestApp {
    create_test_app_with(test_fetch_config(), None).await
}

/// Create a test app with custom fetch settings and upload limit.
pub async fn create_test_app_with(fetch: FetchConfig, max_upload_size: Option<u64>) -> TestApp {
    let storage_dir = TempDir::new().expect("Failed to create storage dir");
    let db = Arc::new(
        Database::open_in_memory()
            .await
            .expect("Failed to create test database"),
    );
    let store = ContentStore::new(storage_dir.path()).expect("Failed to create content store");
    let fetcher = RemoteFetcher::new(&fetch).expect("Failed to create fetcher");

    let mut app_state = AppState::new(db.clone(), store.clone()).with_fetcher(fetcher);
    if let Some(max) = max_upload_size {
        app_state = app_state.with_max_upload_size(max);
    }

    let router = create_router(Arc::new(app_state), &[]);
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        db,
        store,
        _storage_dir: storage_dir,
    }
}

/// Multipart body for `/upload`.
pub fn upload_form(file_name: &str, content: &[u8], user_id: &str) -> MultipartForm {
    MultipartForm::new()
        .add_text("user_id", user_id.to_string())
        .add_part(
            "file",
            Part::bytes(content.to_vec()).file_name(file_name.to_string()),
        )
}

async fn echo_user_agent(headers: HeaderMap) -> String {
    headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Start a local origin server and return its address.
///
/// Routes:
/// - `/files/report.pdf`, `/mirror/report-copy.pdf`: [`ORIGIN_PDF`]
/// - `/files/notes.txt`: distinct text content
/// - `/redirect`: temporary redirect to `/files/notes.txt`
/// - `/forbidden`: 403
/// - `/large`: 2 MiB body
/// - `/agent`: echoes the request's user agent
pub async fn spawn_origin() -> SocketAddr {
    let router = Router::new()
        .route("/files/report.pdf", get(|| async { ORIGIN_PDF }))
        .route("/mirror/report-copy.pdf", get(|| async { ORIGIN_PDF }))
        .route("/files/notes.txt", get(|| async { "plain notes" }))
        .route(
            "/redirect",
            get(|| async { Redirect::temporary("/files/notes.txt") }),
        )
        .route("/forbidden", get(|| async { StatusCode::FORBIDDEN }))
        .route("/large", get(|| async { vec![b'x'; 2 * 1024 * 1024] }))
        .route("/agent", get(echo_user_agent));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind origin");
    let addr = listener.local_addr().expect("Failed to get origin address");

    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    addr
}

/// An address nothing is listening on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get address");
    drop(listener);
    addr
}
