//! Catalog row types.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::store::Fingerprint;

/// Timestamp format written by the schema defaults.
const SQLITE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Parse a stored timestamp as UTC.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, SQLITE_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// A file known to the catalog.
///
/// Never updated after insertion.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct FileRecord {
    /// Row ID (insertion order).
    pub id: i64,
    /// Unique display name.
    pub name: String,
    /// Stored name inside the content store.
    pub path: String,
    /// SHA-256 of the content, lowercase hex. Unique.
    pub fingerprint: String,
    /// Identity of the uploader.
    pub uploaded_by: String,
    /// Source URL when ingested from a remote location.
    pub url: Option<String>,
    /// Content size in bytes.
    pub size: i64,
    /// When the record was created (UTC, SQLite format).
    pub created_at: String,
}

impl FileRecord {
    /// Get the created_at as DateTime<Utc>.
    pub fn created_at_datetime(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.created_at)
    }
}

/// Data for creating a new catalog entry.
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    /// Unique display name.
    pub name: String,
    /// Stored name inside the content store.
    pub path: String,
    /// Content fingerprint.
    pub fingerprint: String,
    /// Identity of the uploader.
    pub uploaded_by: String,
    /// Source URL.
    pub url: Option<String>,
    /// Content size in bytes.
    pub size: i64,
}

impl NewFileRecord {
    /// Create a new NewFileRecord.
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        fingerprint: &Fingerprint,
        uploaded_by: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            fingerprint: fingerprint.to_string(),
            uploaded_by: uploaded_by.into(),
            url: None,
            size: 0,
        }
    }

    /// Set the source URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the content size.
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size as i64;
        self
    }
}

/// One entry of the download audit trail.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct DownloadEvent {
    /// Row ID (insertion order).
    pub id: i64,
    /// Name of the downloaded file. Not enforced as a foreign key.
    pub file_name: String,
    /// Requester identity.
    pub user_id: String,
    /// When the download happened (UTC, SQLite format).
    pub timestamp: String,
}

impl DownloadEvent {
    /// Get the timestamp as DateTime<Utc>.
    pub fn timestamp_datetime(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }
}
