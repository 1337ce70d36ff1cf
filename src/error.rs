//! Error types for Sharebox.

use thiserror::Error;

/// Failure while ingesting a file from a remote URL.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The remote server answered with a non-success status.
    #[error("HTTP error occurred: {code}")]
    HttpStatus {
        /// Upstream HTTP status code.
        code: u16,
    },

    /// Transport-level failure (DNS, connect, TLS, timeout, reset).
    #[error("URL error occurred: {reason}")]
    Network {
        /// Transport error description.
        reason: String,
    },

    /// The URL could not be parsed or points to a forbidden target.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The remote body exceeded the configured size limit.
    #[error("remote file too large: more than {limit} bytes")]
    TooLarge {
        /// Size limit in bytes.
        limit: u64,
    },
}

/// Unique key of the file catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictField {
    /// The human-readable file name.
    Name,
    /// The content fingerprint.
    Fingerprint,
}

impl std::fmt::Display for ConflictField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictField::Name => write!(f, "file name"),
            ConflictField::Fingerprint => write!(f, "file content"),
        }
    }
}

/// Common error type for Sharebox.
#[derive(Error, Debug)]
pub enum ShareError {
    /// Database error.
    #[error("database error: {0}")]
    Database(String),

    /// The database stayed locked past the configured busy timeout.
    ///
    /// Safe to retry.
    #[error("database busy: {0}")]
    Busy(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation error for caller input.
    #[error("validation error: {0}")]
    Validation(String),

    /// A unique catalog key is already taken.
    #[error("{field} already exists: {value}")]
    Conflict {
        /// Which unique key collided.
        field: ConflictField,
        /// The colliding value.
        value: String,
    },

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Remote ingestion failure.
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ShareError {
    /// Whether the operation may succeed if simply retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ShareError::Busy(_))
    }
}

/// SQLite primary result codes that mean "try again later".
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

// Conversion from sqlx errors
impl From<sqlx::Error> for ShareError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::PoolTimedOut => ShareError::Busy(e.to_string()),
            sqlx::Error::Database(db_err) => {
                // Extended result codes keep the primary code in the low byte.
                let primary = db_err
                    .code()
                    .and_then(|c| c.parse::<i32>().ok())
                    .map(|c| c & 0xff);
                match primary {
                    Some(SQLITE_BUSY) | Some(SQLITE_LOCKED) => ShareError::Busy(e.to_string()),
                    _ => ShareError::Database(e.to_string()),
                }
            }
            _ => ShareError::Database(e.to_string()),
        }
    }
}

/// Result type alias for Sharebox operations.
pub type Result<T> = std::result::Result<T, ShareError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ShareError::Validation("user id is required".to_string());
        assert_eq!(err.to_string(), "validation error: user id is required");
    }

    #[test]
    fn test_not_found_error_display() {
        let err = ShareError::NotFound("file".to_string());
        assert_eq!(err.to_string(), "file not found");
    }

    #[test]
    fn test_conflict_error_display() {
        let err = ShareError::Conflict {
            field: ConflictField::Name,
            value: "report.pdf".to_string(),
        };
        assert_eq!(err.to_string(), "file name already exists: report.pdf");
    }

    #[test]
    fn test_fetch_error_display() {
        let err: ShareError = FetchError::HttpStatus { code: 404 }.into();
        assert_eq!(err.to_string(), "fetch error: HTTP error occurred: 404");

        let err: ShareError = FetchError::Network {
            reason: "connection refused".to_string(),
        }
        .into();
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: ShareError = io_err.into();
        assert!(matches!(err, ShareError::Io(_)));
        assert!(err.to_string().contains("read-only"));
    }

    #[test]
    fn test_pool_timeout_is_busy() {
        let err: ShareError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, ShareError::Busy(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_other_sqlx_errors_are_database() {
        let err: ShareError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, ShareError::Database(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_result_alias() {
        fn sample_ok() -> Result<i32> {
            Ok(42)
        }

        fn sample_err() -> Result<i32> {
            Err(ShareError::Busy("locked".to_string()))
        }

        assert_eq!(sample_ok().unwrap(), 42);
        assert!(sample_err().is_err());
    }
}
