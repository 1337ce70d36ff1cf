//! HTTP API for Sharebox.
//!
//! Routes mirror the classic endpoints (`/upload`, `/download_by_name`,
//! `/download_from_url`, `/get_files`) and can serve a static frontend.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::create_router;
pub use server::WebServer;
