//! Sharebox - file sharing with content-hash deduplication.
//!
//! Uploaded and remotely fetched files are fingerprinted with SHA-256 and
//! stored once per distinct content. A SQLite catalog maps names to content
//! and records who downloaded what.

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod share;
pub mod store;
pub mod web;

pub use catalog::{Catalog, DownloadEvent, FileRecord, NewFileRecord};
pub use config::Config;
pub use db::Database;
pub use error::{ConflictField, FetchError, Result, ShareError};
pub use fetch::{FetchedFile, RemoteFetcher};
pub use share::{
    DownloadOutcome, DuplicateReport, IngestOutcome, ShareService, UploadOutcome, UploadRequest,
};
pub use store::{ContentStore, Fingerprint, Fingerprinter, StagedFile};
