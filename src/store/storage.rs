//! Content-addressed file storage for Sharebox.
//!
//! Incoming bytes are first written to a staging area, fingerprinted, then
//! either discarded (duplicate content) or committed under a path derived
//! from the fingerprint plus a per-commit id:
//!
//! ```text
//! {base_path}/
//! ├── .staging/
//! │   └── 0f8e2c1a-....part
//! ├── ba/
//! │   └── ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad-5c1e....pdf
//! └── ...
//! ```
//!
//! Every commit owns its stored file, so deleting one never affects another
//! request's bytes. Stored names are relative paths such as `ba/ba78...-5c1e....pdf`
//! and never contain caller-supplied text.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use super::fingerprint::Fingerprint;
use super::naming::sanitize_extension;
use crate::{Result, ShareError};

/// Directory (under the base path) holding uncommitted uploads.
pub const STAGING_DIR: &str = ".staging";

const STAGING_SUFFIX: &str = "part";

/// Bytes written to the staging area but not yet committed.
///
/// Must be handed back to [`ContentStore::commit`] or
/// [`ContentStore::discard`].
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    size: u64,
}

impl StagedFile {
    /// Location of the staged bytes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of bytes staged.
    pub fn size(&self) -> u64 {
        self.size
    }
}

/// File storage service for managing physical files.
#[derive(Debug, Clone)]
pub struct ContentStore {
    /// Base directory for file storage.
    base_path: PathBuf,
}

impl ContentStore {
    /// Create a new ContentStore with the given base path.
    ///
    /// The base and staging directories will be created if they don't exist.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(base_path.join(STAGING_DIR))?;

        Ok(Self { base_path })
    }

    /// Get the base path of this storage.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn staging_path(&self) -> PathBuf {
        self.base_path.join(STAGING_DIR)
    }

    /// Stage a buffer in the staging area.
    ///
    /// The staged file is removed again if writing fails part way.
    pub fn save(&self, name_hint: &str, content: &[u8]) -> Result<StagedFile> {
        let path = self
            .staging_path()
            .join(format!("{}.{STAGING_SUFFIX}", Uuid::new_v4()));

        let written = File::create(&path).and_then(|file| {
            let mut writer = BufWriter::new(file);
            writer.write_all(content)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
            Ok(content.len() as u64)
        });

        match written {
            Ok(size) => {
                debug!(name_hint, size, path = %path.display(), "Staged upload");
                Ok(StagedFile { path, size })
            }
            Err(e) => {
                let _ = fs::remove_file(&path);
                Err(e.into())
            }
        }
    }

    /// Compute the fingerprint of a staged or stored file.
    pub fn fingerprint(&self, path: &Path) -> Result<Fingerprint> {
        Fingerprint::of_file(path)
    }

    /// A fresh stored name for content with `fingerprint` uploaded as `name_hint`.
    fn new_stored_name(fingerprint: &Fingerprint, name_hint: &str) -> String {
        format!(
            "{}/{}-{}.{}",
            fingerprint.shard(),
            fingerprint,
            Uuid::new_v4().simple(),
            sanitize_extension(name_hint)
        )
    }

    /// Move staged bytes to a new location under their fingerprint's shard.
    ///
    /// Each call gets its own stored name, even for identical content.
    /// Returns the stored name.
    pub fn commit(
        &self,
        staged: StagedFile,
        fingerprint: &Fingerprint,
        name_hint: &str,
    ) -> Result<String> {
        let stored_name = Self::new_stored_name(fingerprint, name_hint);
        let target = self.base_path.join(&stored_name);

        let moved = match target.parent() {
            Some(parent) => fs::create_dir_all(parent),
            None => Ok(()),
        }
        .and_then(|()| fs::rename(&staged.path, &target));

        if let Err(e) = moved {
            let _ = self.discard(staged);
            return Err(e.into());
        }

        debug!(stored_name = %stored_name, "Committed content");
        Ok(stored_name)
    }

    /// Delete staged bytes that will not be committed.
    pub fn discard(&self, staged: StagedFile) -> Result<()> {
        match fs::remove_file(&staged.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve a stored name to its full path.
    ///
    /// Rejects names that would escape the storage root.
    pub fn get_file_path(&self, stored_name: &str) -> Result<PathBuf> {
        let relative = Path::new(stored_name);
        let safe = !stored_name.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));

        if !safe {
            return Err(ShareError::Validation(format!(
                "invalid stored name: {stored_name:?}"
            )));
        }

        Ok(self.base_path.join(relative))
    }

    /// Load content from storage.
    pub fn load(&self, stored_name: &str) -> Result<Vec<u8>> {
        let file_path = self.get_file_path(stored_name)?;

        match fs::read(&file_path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(ShareError::NotFound(format!("stored file {stored_name}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a file from storage.
    ///
    /// Returns `true` if the file was deleted, `false` if it didn't exist.
    pub fn delete(&self, stored_name: &str) -> Result<bool> {
        let file_path = self.get_file_path(stored_name)?;

        match fs::remove_file(&file_path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Check if a file exists in storage.
    pub fn exists(&self, stored_name: &str) -> bool {
        self.get_file_path(stored_name)
            .map(|p| p.is_file())
            .unwrap_or(false)
    }

    /// Get the size of a stored file.
    pub fn file_size(&self, stored_name: &str) -> Result<u64> {
        let file_path = self.get_file_path(stored_name)?;

        match fs::metadata(&file_path) {
            Ok(m) => Ok(m.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(ShareError::NotFound(format!("stored file {stored_name}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Number of committed files, across all shards.
    pub fn stored_count(&self) -> Result<usize> {
        let mut count = 0;

        for shard in fs::read_dir(&self.base_path)?.flatten() {
            let path = shard.path();
            if !path.is_dir() || shard.file_name() == STAGING_DIR {
                continue;
            }
            count += fs::read_dir(&path)?
                .flatten()
                .filter(|entry| entry.path().is_file())
                .count();
        }

        Ok(count)
    }

    /// Number of files currently in the staging area.
    pub fn staged_count(&self) -> Result<usize> {
        let count = fs::read_dir(self.staging_path())?
            .flatten()
            .filter(|entry| entry.path().is_file())
            .count();
        Ok(count)
    }

    /// Remove staged files left behind by an interrupted process.
    ///
    /// Only call this while no upload is in flight (e.g. at startup).
    pub fn cleanup_staging(&self) -> Result<usize> {
        let mut removed = 0;

        for entry in fs::read_dir(self.staging_path())?.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove staged file"),
            }
        }

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_storage() -> (TempDir, ContentStore) {
        let temp_dir = TempDir::new().unwrap();
        let storage = ContentStore::new(temp_dir.path()).unwrap();
        (temp_dir, storage)
    }

    fn stage_and_commit(storage: &ContentStore, content: &[u8], name: &str) -> String {
        let staged = storage.save(name, content).unwrap();
        let fp = storage.fingerprint(staged.path()).unwrap();
        storage.commit(staged, &fp, name).unwrap()
    }

    #[test]
    fn test_new_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let storage_path = temp_dir.path().join("uploads");

        let storage = ContentStore::new(&storage_path).unwrap();

        assert!(storage_path.join(STAGING_DIR).is_dir());
        assert_eq!(storage.base_path(), storage_path);
    }

    #[test]
    fn test_save_stages_bytes() {
        let (_temp_dir, storage) = setup_storage();

        let staged = storage.save("hello.txt", b"Hello, World!").unwrap();

        assert_eq!(staged.size(), 13);
        assert!(staged.path().starts_with(storage.base_path().join(STAGING_DIR)));
        assert_eq!(fs::read(staged.path()).unwrap(), b"Hello, World!");
        assert_eq!(storage.staged_count().unwrap(), 1);
    }

    #[test]
    fn test_commit_uses_fingerprint_path() {
        let (_temp_dir, storage) = setup_storage();

        let stored = stage_and_commit(&storage, b"abc", "../../evil.PDF");

        assert!(stored
            .starts_with("ba/ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad-"));
        assert!(stored.ends_with(".pdf"));
        assert!(!stored.contains("evil"));
        assert!(storage.exists(&stored));
        assert_eq!(storage.staged_count().unwrap(), 0);
        assert_eq!(storage.load(&stored).unwrap(), b"abc");
    }

    #[test]
    fn test_commits_of_same_content_are_independent() {
        let (_temp_dir, storage) = setup_storage();

        let first = stage_and_commit(&storage, b"same", "a.txt");
        let second = stage_and_commit(&storage, b"same", "b.txt");

        assert_ne!(first, second);
        assert_eq!(storage.stored_count().unwrap(), 2);
        assert_eq!(storage.staged_count().unwrap(), 0);

        // Removing one leaves the other intact.
        assert!(storage.delete(&first).unwrap());
        assert_eq!(storage.load(&second).unwrap(), b"same");
    }

    #[test]
    fn test_save_into_missing_staging_dir_is_io_error() {
        let (_temp_dir, storage) = setup_storage();
        fs::remove_dir_all(storage.base_path().join(STAGING_DIR)).unwrap();

        let result = storage.save("a.txt", b"data");

        assert!(matches!(result, Err(ShareError::Io(_))));
        assert!(!storage.base_path().join(STAGING_DIR).exists());
        assert_eq!(storage.stored_count().unwrap(), 0);
    }

    #[test]
    fn test_commit_failure_discards_staged_copy() {
        let (_temp_dir, storage) = setup_storage();

        let staged = storage.save("a.txt", b"data").unwrap();
        let fp = storage.fingerprint(staged.path()).unwrap();
        // A plain file where the shard directory should go.
        fs::write(storage.base_path().join(fp.shard()), b"blocker").unwrap();

        let result = storage.commit(staged, &fp, "a.txt");

        assert!(matches!(result, Err(ShareError::Io(_))));
        assert_eq!(storage.staged_count().unwrap(), 0);
    }

    #[test]
    fn test_discard() {
        let (_temp_dir, storage) = setup_storage();

        let staged = storage.save("tmp.bin", b"temporary").unwrap();
        storage.discard(staged).unwrap();

        assert_eq!(storage.staged_count().unwrap(), 0);
    }

    #[test]
    fn test_load_not_found() {
        let (_temp_dir, storage) = setup_storage();

        let result = storage.load("ab/nonexistent.txt");
        assert!(matches!(result, Err(ShareError::NotFound(_))));
    }

    #[test]
    fn test_traversal_names_rejected() {
        let (_temp_dir, storage) = setup_storage();

        assert!(matches!(
            storage.load("../outside.txt"),
            Err(ShareError::Validation(_))
        ));
        assert!(matches!(
            storage.delete("/etc/passwd"),
            Err(ShareError::Validation(_))
        ));
        assert!(storage.get_file_path("").is_err());
        assert!(!storage.exists("../x"));
    }

    #[test]
    fn test_delete() {
        let (_temp_dir, storage) = setup_storage();

        let stored = stage_and_commit(&storage, b"to delete", "delete.txt");
        assert!(storage.delete(&stored).unwrap());
        assert!(!storage.exists(&stored));
        assert!(!storage.delete(&stored).unwrap());
    }

    #[test]
    fn test_file_size() {
        let (_temp_dir, storage) = setup_storage();

        let stored = stage_and_commit(&storage, b"Hello, World!", "hello.txt");
        assert_eq!(storage.file_size(&stored).unwrap(), 13);
        assert!(matches!(
            storage.file_size("ab/missing.bin"),
            Err(ShareError::NotFound(_))
        ));
    }

    #[test]
    fn test_cleanup_staging() {
        let (_temp_dir, storage) = setup_storage();

        storage.save("a", b"1").unwrap();
        storage.save("b", b"2").unwrap();
        assert_eq!(storage.staged_count().unwrap(), 2);

        assert_eq!(storage.cleanup_staging().unwrap(), 2);
        assert_eq!(storage.staged_count().unwrap(), 0);
    }

    #[test]
    fn test_large_binary_round_trip() {
        let (_temp_dir, storage) = setup_storage();

        let content: Vec<u8> = (0..1024 * 1024).map(|i| (i % 256) as u8).collect();
        let stored = stage_and_commit(&storage, &content, "large.bin");

        assert_eq!(storage.file_size(&stored).unwrap(), content.len() as u64);
        assert_eq!(storage.load(&stored).unwrap(), content);
    }
}
