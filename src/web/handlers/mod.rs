//! HTTP handlers and shared state.

pub mod files;

pub use files::*;

use std::sync::Arc;

use crate::fetch::RemoteFetcher;
use crate::share::{ShareService, DEFAULT_MAX_UPLOAD_SIZE};
use crate::store::ContentStore;
use crate::Database;

/// Database handle shared by all handlers.
///
/// The pool inside [`Database`] does its own locking.
pub type SharedDatabase = Arc<Database>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Catalog database.
    pub db: SharedDatabase,
    /// Content store for file bytes.
    pub store: ContentStore,
    /// Fetcher for remote ingestion. `None` disables `/download_from_url`.
    pub fetcher: Option<RemoteFetcher>,
    /// Maximum upload size in bytes.
    pub max_upload_size: u64,
}

impl AppState {
    /// Create a new application state.
    pub fn new(db: SharedDatabase, store: ContentStore) -> Self {
        Self {
            db,
            store,
            fetcher: None,
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
        }
    }

    /// Enable remote ingestion.
    pub fn with_fetcher(mut self, fetcher: RemoteFetcher) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Set the maximum upload size in bytes.
    pub fn with_max_upload_size(mut self, max_size: u64) -> Self {
        self.max_upload_size = max_size;
        self
    }

    /// A share service borrowing this state.
    pub fn service(&self) -> ShareService<'_> {
        let service =
            ShareService::new(&self.db, &self.store).with_max_upload_size(self.max_upload_size);
        match &self.fetcher {
            Some(fetcher) => service.with_fetcher(fetcher),
            None => service,
        }
    }
}
