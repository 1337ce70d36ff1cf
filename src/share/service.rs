//! Share service.
//!
//! This module provides the file workflows:
//! - Upload with content deduplication
//! - Download by name with an audit trail
//! - Ingestion from a remote URL
//! - Catalog listing

use tracing::{debug, info, warn};

use super::types::{DownloadOutcome, DuplicateReport, IngestOutcome, UploadOutcome, UploadRequest};
use crate::catalog::{Catalog, FileRecord, NewFileRecord};
use crate::db::Database;
use crate::error::ConflictField;
use crate::fetch::RemoteFetcher;
use crate::store::{display_name, remote_file_name, ContentStore, Fingerprint, StagedFile};
use crate::{Result, ShareError};

/// Default maximum upload size (50 MB).
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 50 * 1024 * 1024;

/// Result of trying to add staged content to the catalog.
enum Admission {
    Stored(FileRecord),
    Duplicate(FileRecord),
}

/// Service composing the content store, the catalog and the fetcher.
pub struct ShareService<'a> {
    db: &'a Database,
    store: &'a ContentStore,
    fetcher: Option<&'a RemoteFetcher>,
    max_upload_size: u64,
}

impl<'a> ShareService<'a> {
    /// Create a new ShareService.
    pub fn new(db: &'a Database, store: &'a ContentStore) -> Self {
        Self {
            db,
            store,
            fetcher: None,
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
        }
    }

    /// Enable ingestion from remote URLs.
    pub fn with_fetcher(mut self, fetcher: &'a RemoteFetcher) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Set the maximum upload size in bytes.
    pub fn with_max_upload_size(mut self, max_size: u64) -> Self {
        self.max_upload_size = max_size;
        self
    }

    /// Get the max upload size.
    pub fn max_upload_size(&self) -> u64 {
        self.max_upload_size
    }

    fn catalog(&self) -> Catalog<'a> {
        Catalog::new(self.db.pool())
    }

    /// Upload a file.
    ///
    /// Content already in the catalog is not stored again; the outcome
    /// names the original record instead. A name already taken by different
    /// content is rejected with [`ShareError::Conflict`].
    pub async fn upload(&self, request: UploadRequest) -> Result<UploadOutcome> {
        let uploader = required("user id", &request.uploader)?;
        let name = display_name(&request.file_name)
            .ok_or_else(|| ShareError::Validation("invalid file name".to_string()))?;

        if request.content.len() as u64 > self.max_upload_size {
            let max_mb = self.max_upload_size / 1024 / 1024;
            return Err(ShareError::Validation(format!(
                "file too large (max {max_mb}MB)"
            )));
        }

        let (staged, fingerprint) = self.stage(&name, request.content).await?;
        let catalog = self.catalog();

        if let Some(existing) = catalog.find_by_fingerprint(&fingerprint).await? {
            self.store.discard(staged)?;
            info!(name = %name, existing = %existing.name, "Duplicate upload");
            return Ok(UploadOutcome::Duplicate { existing });
        }

        if catalog.find_by_name(&name).await?.is_some() {
            self.store.discard(staged)?;
            return Err(ShareError::Conflict {
                field: ConflictField::Name,
                value: name,
            });
        }

        let size = staged.size();
        let stored_name = self.store.commit(staged, &fingerprint, &name)?;
        let new_record =
            NewFileRecord::new(&name, &stored_name, &fingerprint, uploader).with_size(size);

        match self.admit(&catalog, &new_record, &fingerprint).await? {
            Admission::Stored(record) => {
                info!(name = %record.name, uploader = %record.uploaded_by, size, "File stored");
                Ok(UploadOutcome::Stored(record))
            }
            Admission::Duplicate(existing) => Ok(UploadOutcome::Duplicate { existing }),
        }
    }

    /// Download a file by name on behalf of `requester`.
    ///
    /// The first download by each requester returns the bytes and appends a
    /// download event. Later ones return the duplicate report only, including
    /// when two requests from the same requester race.
    pub async fn download_by_name(&self, name: &str, requester: &str) -> Result<DownloadOutcome> {
        let name = required("file name", name)?;
        let requester = required("user id", requester)?;
        let catalog = self.catalog();

        let record = catalog
            .find_by_name(name)
            .await?
            .ok_or_else(|| ShareError::NotFound(format!("file {name}")))?;

        if catalog.has_downloaded(name, requester).await? {
            debug!(name, requester, "Repeat download");
            return self.repeat_download(&catalog, record).await;
        }

        let content = self.store.load(&record.path)?;
        if catalog.record_first_download(name, requester).await?.is_none() {
            debug!(name, requester, "Concurrent repeat download");
            return self.repeat_download(&catalog, record).await;
        }
        info!(name, requester, "File downloaded");

        Ok(DownloadOutcome::File { record, content })
    }

    async fn repeat_download(
        &self,
        catalog: &Catalog<'_>,
        record: FileRecord,
    ) -> Result<DownloadOutcome> {
        self.duplicate_report(catalog, record)
            .await
            .map(DownloadOutcome::AlreadyDownloaded)
    }

    /// Fetch a file from `url` and add it to the catalog for `requester`.
    ///
    /// New content is stored under a name derived from the URL and the
    /// content fingerprint, and a download event is recorded for the
    /// requester. Content already in the catalog yields the duplicate report.
    pub async fn download_from_url(&self, url: &str, requester: &str) -> Result<IngestOutcome> {
        let url = required("file URL", url)?;
        let requester = required("user id", requester)?;
        let fetcher = self
            .fetcher
            .ok_or_else(|| ShareError::Config("remote fetching is not enabled".to_string()))?;

        let fetched = fetcher.fetch(url).await?;
        let source_url = fetched.url.to_string();

        let (staged, fingerprint) = self.stage(&source_url, fetched.content).await?;
        let catalog = self.catalog();

        if let Some(existing) = catalog.find_by_fingerprint(&fingerprint).await? {
            self.store.discard(staged)?;
            info!(url = %source_url, existing = %existing.name, "Duplicate remote file");
            return self.duplicate_report(&catalog, existing).await.map(IngestOutcome::Duplicate);
        }

        let name = remote_file_name(&fetched.url, &fingerprint);
        let size = staged.size();
        let stored_name = self.store.commit(staged, &fingerprint, &name)?;
        let new_record = NewFileRecord::new(&name, &stored_name, &fingerprint, requester)
            .with_url(&source_url)
            .with_size(size);

        match self.admit(&catalog, &new_record, &fingerprint).await? {
            Admission::Stored(record) => {
                catalog.record_download(&record.name, requester).await?;
                info!(name = %record.name, url = %source_url, size, "Remote file stored");
                Ok(IngestOutcome::Stored(record))
            }
            Admission::Duplicate(existing) => self
                .duplicate_report(&catalog, existing)
                .await
                .map(IngestOutcome::Duplicate),
        }
    }

    /// List every file in insertion order.
    pub async fn list_files(&self) -> Result<Vec<FileRecord>> {
        self.catalog().list_files().await
    }

    /// Write bytes to the staging area and fingerprint them off the async runtime.
    async fn stage(&self, name_hint: &str, content: Vec<u8>) -> Result<(StagedFile, Fingerprint)> {
        let store = self.store.clone();
        let name_hint = name_hint.to_string();

        tokio::task::spawn_blocking(move || {
            let staged = store.save(&name_hint, &content)?;
            match store.fingerprint(staged.path()) {
                Ok(fingerprint) => Ok((staged, fingerprint)),
                Err(e) => {
                    let _ = store.discard(staged);
                    Err(e)
                }
            }
        })
        .await
        .map_err(|e| ShareError::Io(std::io::Error::other(e)))?
    }

    /// Insert committed content into the catalog.
    ///
    /// The UNIQUE constraints decide races the pre-checks missed: losing on
    /// the fingerprint turns into a duplicate of the winner, any other
    /// failure is returned. Either way the loser's bytes are deleted; every
    /// commit has its own stored name, so no record can point at them.
    async fn admit(
        &self,
        catalog: &Catalog<'_>,
        new_record: &NewFileRecord,
        fingerprint: &Fingerprint,
    ) -> Result<Admission> {
        match catalog.insert(new_record).await {
            Ok(record) => Ok(Admission::Stored(record)),
            Err(ShareError::Conflict {
                field: ConflictField::Fingerprint,
                ..
            }) => {
                self.release(&new_record.path);
                let existing = catalog
                    .find_by_fingerprint(fingerprint)
                    .await?
                    .ok_or_else(|| ShareError::NotFound(format!("file {fingerprint}")))?;
                info!(name = %new_record.name, existing = %existing.name, "Lost insert race to identical content");
                Ok(Admission::Duplicate(existing))
            }
            Err(e) => {
                self.release(&new_record.path);
                Err(e)
            }
        }
    }

    /// Delete bytes committed by a request whose record was not inserted.
    fn release(&self, stored_name: &str) {
        if let Err(e) = self.store.delete(stored_name) {
            warn!(stored_name, error = %e, "Failed to delete unreferenced content");
        }
    }

    async fn duplicate_report(
        &self,
        catalog: &Catalog<'_>,
        existing: FileRecord,
    ) -> Result<DuplicateReport> {
        let downloads = catalog.downloads_for(&existing.name).await?;
        Ok(DuplicateReport {
            existing,
            downloads,
        })
    }
}

/// Trim `value`, rejecting it if nothing is left.
fn required<'v>(what: &str, value: &'v str) -> Result<&'v str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ShareError::Validation(format!("{what} is required")));
    }
    Ok(trimmed)
}
