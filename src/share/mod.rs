//! File sharing workflows for Sharebox.

mod service;
mod types;

pub use service::{ShareService, DEFAULT_MAX_UPLOAD_SIZE};
pub use types::{DownloadOutcome, DuplicateReport, IngestOutcome, UploadOutcome, UploadRequest};
