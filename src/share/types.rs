//! Inputs and outcomes of the share workflows.

use crate::catalog::{DownloadEvent, FileRecord};

/// Request data for file upload.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Name the client gave the file.
    pub file_name: String,
    /// File content.
    pub content: Vec<u8>,
    /// Identity of the uploader.
    pub uploader: String,
}

impl UploadRequest {
    /// Create a new upload request.
    pub fn new(
        file_name: impl Into<String>,
        content: impl Into<Vec<u8>>,
        uploader: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
            uploader: uploader.into(),
        }
    }
}

/// Result of an upload.
#[derive(Debug, Clone)]
pub enum UploadOutcome {
    /// New content, now in the catalog.
    Stored(FileRecord),
    /// Identical content was already stored; nothing new was kept.
    Duplicate {
        /// The record holding the content.
        existing: FileRecord,
    },
}

/// An existing record together with its download history.
#[derive(Debug, Clone)]
pub struct DuplicateReport {
    /// The record that already holds the content.
    pub existing: FileRecord,
    /// Every download of the record's name, oldest first.
    pub downloads: Vec<DownloadEvent>,
}

/// Result of a download by name.
#[derive(Debug)]
pub enum DownloadOutcome {
    /// The file content; a download event was recorded.
    File {
        /// Record of the downloaded file.
        record: FileRecord,
        /// File content.
        content: Vec<u8>,
    },
    /// The requester downloaded this file before. No bytes, no new event.
    AlreadyDownloaded(DuplicateReport),
}

/// Result of ingesting a file from a remote URL.
#[derive(Debug, Clone)]
pub enum IngestOutcome {
    /// New content, stored under a generated name.
    Stored(FileRecord),
    /// The fetched content was already stored.
    Duplicate(DuplicateReport),
}
