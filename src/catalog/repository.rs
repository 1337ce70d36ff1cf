//! Catalog repository: file records and the download audit trail.

use sqlx::SqlitePool;
use tracing::debug;

use super::record::{DownloadEvent, FileRecord, NewFileRecord};
use crate::error::ConflictField;
use crate::store::Fingerprint;
use crate::{Result, ShareError};

const FILE_COLUMNS: &str = "id, name, path, fingerprint, uploaded_by, url, size, created_at";

/// Repository over the `files` and `downloads` tables.
///
/// Every call checks a connection out of the pool for the duration of a
/// single statement.
pub struct Catalog<'a> {
    pool: &'a SqlitePool,
}

impl<'a> Catalog<'a> {
    /// Create a new Catalog with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new file record.
    ///
    /// Uniqueness of name and fingerprint is enforced by the table's UNIQUE
    /// constraints, so two racing inserts cannot both succeed. The loser
    /// gets [`ShareError::Conflict`] naming the taken key.
    pub async fn insert(&self, record: &NewFileRecord) -> Result<FileRecord> {
        let result = sqlx::query(
            "INSERT INTO files (name, path, fingerprint, uploaded_by, url, size)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.name)
        .bind(&record.path)
        .bind(&record.fingerprint)
        .bind(&record.uploaded_by)
        .bind(&record.url)
        .bind(record.size)
        .execute(self.pool)
        .await;

        let result = match result {
            Ok(result) => result,
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                return Err(unique_conflict(db_err.message(), record));
            }
            Err(e) => return Err(e.into()),
        };

        let id = result.last_insert_rowid();
        debug!(id, name = %record.name, fingerprint = %record.fingerprint, "Inserted file record");

        self.get_by_id(id)
            .await?
            .ok_or_else(|| ShareError::NotFound("file".to_string()))
    }

    /// Get a file record by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<FileRecord>> {
        let record = sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(record)
    }

    /// Find the record holding the given content, if any.
    pub async fn find_by_fingerprint(&self, fingerprint: &Fingerprint) -> Result<Option<FileRecord>> {
        let record = sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE fingerprint = ?"
        ))
        .bind(fingerprint.as_str())
        .fetch_optional(self.pool)
        .await?;

        Ok(record)
    }

    /// Find a record by its display name.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<FileRecord>> {
        let record = sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE name = ?"
        ))
        .bind(name)
        .fetch_optional(self.pool)
        .await?;

        Ok(record)
    }

    /// List all records in insertion order.
    pub async fn list_files(&self) -> Result<Vec<FileRecord>> {
        let records = sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {FILE_COLUMNS} FROM files ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(records)
    }

    /// Count file records.
    pub async fn count_files(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM files")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    /// Append a download event.
    ///
    /// Does not check that `file_name` resolves to a record. The timestamp is
    /// clamped to the latest existing one so the trail never goes backwards,
    /// even if the wall clock does.
    pub async fn record_download(&self, file_name: &str, user_id: &str) -> Result<DownloadEvent> {
        let event = sqlx::query_as::<_, DownloadEvent>(
            "INSERT INTO downloads (file_name, user_id, timestamp)
             VALUES (?, ?, MAX(strftime('%Y-%m-%d %H:%M:%f', 'now'), COALESCE((
                 SELECT timestamp FROM downloads ORDER BY id DESC LIMIT 1), '')))
             RETURNING id, file_name, user_id, timestamp",
        )
        .bind(file_name)
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        debug!(file_name, user_id, id = event.id, "Recorded download");
        Ok(event)
    }

    /// Append a download event unless `user_id` already has one for `file_name`.
    ///
    /// The check and the insert are one statement, so concurrent calls for
    /// the same pair record at most one event. Returns `None` when an event
    /// already existed.
    pub async fn record_first_download(
        &self,
        file_name: &str,
        user_id: &str,
    ) -> Result<Option<DownloadEvent>> {
        let event = sqlx::query_as::<_, DownloadEvent>(
            "INSERT INTO downloads (file_name, user_id, timestamp)
             SELECT ?1, ?2, MAX(strftime('%Y-%m-%d %H:%M:%f', 'now'), COALESCE((
                 SELECT timestamp FROM downloads ORDER BY id DESC LIMIT 1), ''))
             WHERE NOT EXISTS (
                 SELECT 1 FROM downloads WHERE file_name = ?1 AND user_id = ?2)
             RETURNING id, file_name, user_id, timestamp",
        )
        .bind(file_name)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        match &event {
            Some(event) => debug!(file_name, user_id, id = event.id, "Recorded first download"),
            None => debug!(file_name, user_id, "Download already recorded"),
        }
        Ok(event)
    }

    /// Full download history for a file name, oldest first.
    pub async fn downloads_for(&self, file_name: &str) -> Result<Vec<DownloadEvent>> {
        let events = sqlx::query_as::<_, DownloadEvent>(
            "SELECT id, file_name, user_id, timestamp
             FROM downloads WHERE file_name = ? ORDER BY id",
        )
        .bind(file_name)
        .fetch_all(self.pool)
        .await?;

        Ok(events)
    }

    /// Whether `user_id` has downloaded `file_name` before.
    pub async fn has_downloaded(&self, file_name: &str, user_id: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM downloads WHERE file_name = ? AND user_id = ?)",
        )
        .bind(file_name)
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Count download events for a file name.
    pub async fn count_downloads(&self, file_name: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM downloads WHERE file_name = ?")
            .bind(file_name)
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }
}

/// Map a UNIQUE violation message to the key that collided.
///
/// SQLite reports these as "UNIQUE constraint failed: files.<column>".
fn unique_conflict(message: &str, record: &NewFileRecord) -> ShareError {
    if message.contains("files.fingerprint") {
        ShareError::Conflict {
            field: ConflictField::Fingerprint,
            value: record.fingerprint.clone(),
        }
    } else {
        ShareError::Conflict {
            field: ConflictField::Name,
            value: record.name.clone(),
        }
    }
}
