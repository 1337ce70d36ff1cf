//! Request DTOs for the HTTP API.

use serde::Deserialize;
use validator::Validate;

/// Download-by-name request.
///
/// Missing fields deserialize as empty and are reported by validation.
#[derive(Debug, Deserialize, Validate)]
pub struct DownloadByNameRequest {
    /// Name of the file to download.
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "File name must be 1 to 255 characters"))]
    pub file_name: String,
    /// Requester identity.
    #[serde(default)]
    #[validate(length(min = 1, max = 128, message = "User ID must be 1 to 128 characters"))]
    pub user_id: String,
}

/// Download-from-URL request.
#[derive(Debug, Deserialize, Validate)]
pub struct DownloadFromUrlRequest {
    /// Remote URL to ingest.
    #[serde(default)]
    #[validate(length(min = 1, max = 2048, message = "File URL must be 1 to 2048 characters"))]
    pub file_url: String,
    /// Requester identity.
    #[serde(default)]
    #[validate(length(min = 1, max = 128, message = "User ID must be 1 to 128 characters"))]
    pub user_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_fail_validation() {
        let request: DownloadByNameRequest = serde_json::from_str("{}").unwrap();
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("file_name"));
        assert!(fields.contains_key("user_id"));
    }

    #[test]
    fn test_valid_request() {
        let request: DownloadFromUrlRequest = serde_json::from_str(
            r#"{"file_url": "https://example.com/a.pdf", "user_id": "carol"}"#,
        )
        .unwrap();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_overlong_url_rejected() {
        let request = DownloadFromUrlRequest {
            file_url: format!("https://example.com/{}", "a".repeat(3000)),
            user_id: "carol".to_string(),
        };
        assert!(request.validate().is_err());
    }
}
