//! Response DTOs for the HTTP API.

use serde::Serialize;

use crate::catalog::{DownloadEvent, FileRecord};
use crate::share::DuplicateReport;

/// Outcome marker carried by transfer responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    /// New content was stored.
    Stored,
    /// The content (or this download) already existed.
    Duplicate,
}

/// New content was stored.
#[derive(Debug, Serialize)]
pub struct StoredResponse {
    /// Always `stored`.
    pub status: TransferStatus,
    /// Human-readable message.
    pub message: String,
    /// Catalog name of the stored file.
    pub file_name: String,
}

impl StoredResponse {
    /// Build a response for `record`.
    pub fn new(record: &FileRecord, message: impl Into<String>) -> Self {
        Self {
            status: TransferStatus::Stored,
            message: message.into(),
            file_name: record.name.clone(),
        }
    }
}

/// An upload whose content was already stored.
#[derive(Debug, Serialize)]
pub struct UploadDuplicateResponse {
    /// Always `duplicate`.
    pub status: TransferStatus,
    /// Human-readable message.
    pub message: String,
    /// Who uploaded the content first.
    pub uploaded_by: String,
    /// Name the content is stored under.
    pub existing_file: String,
}

impl From<FileRecord> for UploadDuplicateResponse {
    fn from(existing: FileRecord) -> Self {
        Self {
            status: TransferStatus::Duplicate,
            message: "Duplicate file detected".to_string(),
            uploaded_by: existing.uploaded_by,
            existing_file: existing.name,
        }
    }
}

/// One entry of a file's download history.
#[derive(Debug, Serialize)]
pub struct DownloadEntry {
    /// Requester identity.
    pub user_id: String,
    /// When the download happened.
    pub timestamp: String,
}

impl From<DownloadEvent> for DownloadEntry {
    fn from(event: DownloadEvent) -> Self {
        Self {
            user_id: event.user_id,
            timestamp: event.timestamp,
        }
    }
}

/// Content or download that already existed, with its history.
#[derive(Debug, Serialize)]
pub struct DuplicateResponse {
    /// Always `duplicate`.
    pub status: TransferStatus,
    /// Human-readable message.
    pub message: String,
    /// Name of the existing file.
    pub existing_file: String,
    /// Stored location of the existing file.
    pub location: String,
    /// Who uploaded the existing file.
    pub uploaded_by: String,
    /// Everyone who downloaded the existing file, oldest first.
    pub users: Vec<DownloadEntry>,
}

impl From<DuplicateReport> for DuplicateResponse {
    fn from(report: DuplicateReport) -> Self {
        Self {
            status: TransferStatus::Duplicate,
            message: "Duplicate file detected".to_string(),
            existing_file: report.existing.name,
            location: report.existing.path,
            uploaded_by: report.existing.uploaded_by,
            users: report.downloads.into_iter().map(DownloadEntry::from).collect(),
        }
    }
}

/// A catalog entry.
#[derive(Debug, Serialize)]
pub struct FileEntry {
    /// Catalog name.
    pub file_name: String,
    /// Stored location.
    pub file_path: String,
    /// Uploader identity.
    pub uploaded_by: String,
}

impl From<FileRecord> for FileEntry {
    fn from(record: FileRecord) -> Self {
        Self {
            file_name: record.name,
            file_path: record.path,
            uploaded_by: record.uploaded_by,
        }
    }
}

/// File listing.
#[derive(Debug, Serialize)]
pub struct FilesResponse {
    /// Every file in insertion order.
    pub files: Vec<FileEntry>,
}
