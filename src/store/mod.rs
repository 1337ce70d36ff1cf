//! Content store for Sharebox.
//!
//! This module provides:
//! - SHA-256 fingerprinting of file content
//! - Staged writes committed to fingerprint-derived paths
//! - Safe name derivation for uploads and remote ingestion

mod fingerprint;
mod naming;
mod storage;

pub use fingerprint::{Fingerprint, Fingerprinter, CHUNK_SIZE, FINGERPRINT_LEN};
pub use naming::{
    display_name, remote_file_name, sanitize_extension, DEFAULT_EXTENSION, MAX_NAME_LENGTH,
};
pub use storage::{ContentStore, StagedFile, STAGING_DIR};
