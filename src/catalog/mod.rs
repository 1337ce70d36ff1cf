//! File catalog for Sharebox.
//!
//! Maps file names to stored content and keeps the download audit trail.

mod record;
mod repository;

pub use record::{DownloadEvent, FileRecord, NewFileRecord};
pub use repository::Catalog;
