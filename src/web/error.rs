//! API error handling for the Sharebox HTTP API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::HashMap;

use crate::error::FetchError;
use crate::ShareError;

/// API error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Bad request (400).
    BadRequest,
    /// Field-level validation error (400).
    ValidationError,
    /// Not found (404).
    NotFound,
    /// Conflict (409).
    Conflict,
    /// Payload too large (413).
    PayloadTooLarge,
    /// The remote server answered with an error; its status is passed through.
    UpstreamError,
    /// The remote server could not be reached (502).
    BadGateway,
    /// Temporarily unavailable, retry later (503).
    ServiceUnavailable,
    /// Internal server error (500).
    InternalError,
}

impl ErrorCode {
    /// Get the default HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::BadRequest | ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorCode::UpstreamError | ErrorCode::BadGateway => StatusCode::BAD_GATEWAY,
            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Error details.
    pub error: ErrorDetail,
}

/// Error detail.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Field-level validation error details (only present for validation errors).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Vec<String>>>,
}

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    status: StatusCode,
    message: String,
    details: Option<HashMap<String, Vec<String>>>,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            status: code.status_code(),
            message: message.into(),
            details: None,
        }
    }

    /// Create a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Create a payload too large error.
    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PayloadTooLarge, message)
    }

    /// Relay an error status returned by a remote server.
    ///
    /// Codes that are not valid HTTP error statuses become 502.
    pub fn upstream(code: u16, message: impl Into<String>) -> Self {
        let status = StatusCode::from_u16(code)
            .ok()
            .filter(|s| s.is_client_error() || s.is_server_error())
            .unwrap_or(StatusCode::BAD_GATEWAY);

        Self {
            status,
            ..Self::new(ErrorCode::UpstreamError, message)
        }
    }

    /// Create a bad gateway error.
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadGateway, message)
    }

    /// Create a service unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Create an internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Create a validation error with field-level details.
    pub fn validation(details: HashMap<String, Vec<String>>) -> Self {
        Self {
            details: Some(details),
            ..Self::new(ErrorCode::ValidationError, "Validation failed")
        }
    }

    /// Create a validation error from validator::ValidationErrors.
    pub fn from_validation_errors(errors: validator::ValidationErrors) -> Self {
        let details: HashMap<String, Vec<String>> = errors
            .field_errors()
            .into_iter()
            .map(|(field, field_errors)| {
                let messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| match &e.message {
                        Some(m) => m.to_string(),
                        None => format!("Invalid value for {field}"),
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();

        Self::validation(details)
    }

    /// The error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// The HTTP status this error is rendered with.
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
                details: self.details,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        let message = err.to_string();
        match err {
            FetchError::HttpStatus { code } => ApiError::upstream(code, message),
            FetchError::Network { .. } => ApiError::bad_gateway(message),
            FetchError::InvalidUrl(_) => ApiError::bad_request(message),
            FetchError::TooLarge { .. } => ApiError::payload_too_large(message),
        }
    }
}

impl From<ShareError> for ApiError {
    fn from(err: ShareError) -> Self {
        match err {
            ShareError::Validation(msg) => ApiError::bad_request(msg),
            ShareError::NotFound(_) => ApiError::not_found(err.to_string()),
            ShareError::Conflict { .. } => ApiError::conflict(err.to_string()),
            ShareError::Fetch(fetch) => fetch.into(),
            ShareError::Busy(ref msg) => {
                tracing::warn!(error = %msg, "Database busy");
                ApiError::unavailable("The service is busy, please retry")
            }
            _ => {
                tracing::error!("Internal error: {}", err);
                ApiError::internal("An internal error occurred")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConflictField;

    #[test]
    fn test_error_code_status() {
        assert_eq!(ErrorCode::BadRequest.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::ValidationError.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ErrorCode::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::Conflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::PayloadTooLarge.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(ErrorCode::BadGateway.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            ErrorCode::ServiceUnavailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ErrorCode::InternalError.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upstream_status_passthrough() {
        assert_eq!(ApiError::upstream(404, "x").status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::upstream(503, "x").status(), StatusCode::SERVICE_UNAVAILABLE);
        // Not an error status.
        assert_eq!(ApiError::upstream(200, "x").status(), StatusCode::BAD_GATEWAY);
        assert_eq!(ApiError::upstream(42, "x").status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_from_share_error() {
        let cases = [
            (ShareError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (ShareError::NotFound("file a".into()), StatusCode::NOT_FOUND),
            (
                ShareError::Conflict {
                    field: ConflictField::Name,
                    value: "a.txt".into(),
                },
                StatusCode::CONFLICT,
            ),
            (
                ShareError::Fetch(FetchError::HttpStatus { code: 403 }),
                StatusCode::FORBIDDEN,
            ),
            (
                ShareError::Fetch(FetchError::Network {
                    reason: "refused".into(),
                }),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ShareError::Fetch(FetchError::InvalidUrl("x".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                ShareError::Fetch(FetchError::TooLarge { limit: 1 }),
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (ShareError::Busy("locked".into()), StatusCode::SERVICE_UNAVAILABLE),
            (
                ShareError::Io(std::io::Error::other("disk full")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (ShareError::Database("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_internal_errors_are_masked() {
        let err = ApiError::from(ShareError::Database("secret table layout".into()));
        assert_eq!(err.code(), ErrorCode::InternalError);
        assert!(!err.to_string().contains("secret"));
    }

    #[test]
    fn test_io_errors_are_internal() {
        let err = ApiError::from(ShareError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "/srv/files/.staging denied",
        )));
        assert_eq!(err.code(), ErrorCode::InternalError);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.to_string().contains("/srv/files"));
    }

    #[test]
    fn test_fetch_messages_kept() {
        let err = ApiError::from(ShareError::Fetch(FetchError::HttpStatus { code: 404 }));
        assert_eq!(err.message, "HTTP error occurred: 404");
    }

    #[test]
    fn test_validation_error() {
        let mut details = HashMap::new();
        details.insert("user_id".to_string(), vec!["Required".to_string()]);

        let err = ApiError::validation(details);
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "Validation failed");
        assert_eq!(
            err.details.unwrap().get("user_id").unwrap(),
            &vec!["Required".to_string()]
        );
    }
}
