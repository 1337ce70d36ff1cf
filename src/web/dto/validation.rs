//! Validated JSON extraction.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::web::error::ApiError;

/// A JSON extractor that validates the request body.
///
/// Malformed JSON and failed validation both surface as 400 responses, the
/// latter with per-field messages.
///
/// # Example
///
/// ```ignore
/// use sharebox::web::dto::{DownloadByNameRequest, ValidatedJson};
///
/// async fn handler(ValidatedJson(payload): ValidatedJson<DownloadByNameRequest>) {
///     // payload is already validated
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e.body_text())))?;

        value.validate().map_err(ApiError::from_validation_errors)?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::dto::DownloadByNameRequest;
    use axum::body::Body;
    use axum::http::{header::CONTENT_TYPE, StatusCode};

    fn json_request(body: &str) -> Request {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_body_extracts() {
        let req = json_request(r#"{"file_name": "a.txt", "user_id": "carol"}"#);
        let ValidatedJson(payload) =
            ValidatedJson::<DownloadByNameRequest>::from_request(req, &())
                .await
                .unwrap();
        assert_eq!(payload.file_name, "a.txt");
    }

    #[tokio::test]
    async fn test_invalid_json_is_bad_request() {
        let req = json_request("{not json");
        let err = ValidatedJson::<DownloadByNameRequest>::from_request(req, &())
            .await
            .err()
            .unwrap();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_failed_validation_is_bad_request() {
        let req = json_request(r#"{"file_name": "a.txt"}"#);
        let err = ValidatedJson::<DownloadByNameRequest>::from_request(req, &())
            .await
            .err()
            .unwrap();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), crate::web::error::ErrorCode::ValidationError);
    }
}
