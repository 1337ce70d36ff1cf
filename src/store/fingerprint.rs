//! SHA-256 content fingerprints.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::{Result, ShareError};

/// Read size used when hashing files.
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Length of a fingerprint in hex characters.
pub const FINGERPRINT_LEN: usize = 64;

/// Lowercase hex SHA-256 digest of a file's full content.
///
/// Two byte-identical inputs always produce equal fingerprints, whatever
/// they are called.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Parse a hex digest, accepting upper or lower case.
    pub fn parse(s: &str) -> Result<Self> {
        if s.len() != FINGERPRINT_LEN || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ShareError::Validation(format!(
                "invalid fingerprint: {s:?}"
            )));
        }
        Ok(Self(s.to_ascii_lowercase()))
    }

    /// Fingerprint an in-memory buffer.
    pub fn of_bytes(data: &[u8]) -> Self {
        let mut hasher = Fingerprinter::new();
        hasher.update(data);
        hasher.finish()
    }

    /// Fingerprint a file, reading it in `CHUNK_SIZE` pieces.
    pub fn of_file(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::of_reader(file)
    }

    /// Fingerprint everything a reader yields.
    pub fn of_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut hasher = Fingerprinter::new();
        let mut buffer = [0u8; CHUNK_SIZE];

        loop {
            let n = reader.read(&mut buffer)?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }

        Ok(hasher.finish())
    }

    /// The full hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 16 hex characters, for derived names.
    pub fn short(&self) -> &str {
        &self.0[..16]
    }

    /// First 2 hex characters, used as the storage shard directory.
    pub fn shard(&self) -> &str {
        &self.0[..2]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Incremental SHA-256 hasher.
///
/// Use this when bytes arrive in pieces, e.g. while writing a stream to disk.
#[derive(Debug, Clone, Default)]
pub struct Fingerprinter {
    inner: Sha256,
    bytes: u64,
}

impl Fingerprinter {
    /// Create a new hasher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed more bytes.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
        self.bytes += data.len() as u64;
    }

    /// Number of bytes fed so far.
    pub fn bytes_hashed(&self) -> u64 {
        self.bytes
    }

    /// Finalize into a fingerprint.
    pub fn finish(self) -> Fingerprint {
        Fingerprint(format!("{:x}", self.inner.finalize()))
    }
}
