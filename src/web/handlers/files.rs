//! File sharing handlers.

use axum::{
    body::Body,
    extract::{multipart::MultipartError, Multipart, State},
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use super::AppState;
use crate::share::{DownloadOutcome, IngestOutcome, UploadOutcome, UploadRequest};
use crate::web::dto::{
    DownloadByNameRequest, DownloadFromUrlRequest, DuplicateResponse, FileEntry, FilesResponse,
    StoredResponse, UploadDuplicateResponse, ValidatedJson,
};
use crate::web::error::ApiError;

/// Header marking a response body as file content rather than JSON.
pub const CONTENT_KIND_HEADER: HeaderName = HeaderName::from_static("x-content-kind");

/// Build a Content-Disposition header value with RFC 5987 encoding for non-ASCII filenames.
///
/// Returns a header value like:
/// - ASCII: `attachment; filename="example.txt"`
/// - Non-ASCII: `attachment; filename="____.txt"; filename*=UTF-8''%E6%97%A5%E6%9C%AC.txt`
fn content_disposition_header(filename: &str) -> String {
    let needs_escape = |c: char| !c.is_ascii() || c.is_control() || c == '"' || c == '\\';

    if !filename.chars().any(needs_escape) {
        return format!("attachment; filename=\"{filename}\"");
    }

    let fallback: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| if needs_escape(c) { '_' } else { c })
        .collect();

    format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        urlencoding::encode(filename)
    )
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::payload_too_large("Upload exceeds the size limit");
    }
    tracing::warn!("Failed to read multipart data: {}", e.body_text());
    ApiError::bad_request("Invalid multipart data")
}

/// POST /upload - Upload a file.
///
/// Request body: multipart/form-data with `file` and `user_id` fields.
/// Duplicate content answers 409 with the original uploader.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut user_id: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content = field.bytes().await.map_err(multipart_error)?;
                file = Some((filename, content.to_vec()));
            }
            "user_id" => {
                user_id = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    let ((file_name, content), user_id) = file
        .zip(user_id.filter(|u| !u.trim().is_empty()))
        .ok_or_else(|| ApiError::bad_request("File and user ID are required"))?;

    let outcome = state
        .service()
        .upload(UploadRequest::new(file_name, content, user_id))
        .await?;

    let response = match outcome {
        UploadOutcome::Stored(record) => {
            Json(StoredResponse::new(&record, "File uploaded successfully")).into_response()
        }
        UploadOutcome::Duplicate { existing } => (
            StatusCode::CONFLICT,
            Json(UploadDuplicateResponse::from(existing)),
        )
            .into_response(),
    };

    Ok(response)
}

/// POST /download_by_name - Download a file by its catalog name.
///
/// The first download per user returns the bytes as an attachment. Repeat
/// downloads return the duplicate report as JSON.
pub async fn download_by_name(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<DownloadByNameRequest>,
) -> Result<Response, ApiError> {
    let outcome = state
        .service()
        .download_by_name(&req.file_name, &req.user_id)
        .await?;

    let (record, content) = match outcome {
        DownloadOutcome::File { record, content } => (record, content),
        DownloadOutcome::AlreadyDownloaded(report) => {
            return Ok(Json(DuplicateResponse::from(report)).into_response());
        }
    };

    let content_type = mime_guess::from_path(&record.name)
        .first_or_octet_stream()
        .to_string();

    let response = Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(&record.name),
        )
        .header(header::CONTENT_LENGTH, content.len())
        .header(CONTENT_KIND_HEADER, HeaderValue::from_static("file"))
        .body(Body::from(content))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })?;

    Ok(response)
}

/// POST /download_from_url - Ingest a file from a remote URL.
pub async fn download_from_url(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<DownloadFromUrlRequest>,
) -> Result<Response, ApiError> {
    let outcome = state
        .service()
        .download_from_url(&req.file_url, &req.user_id)
        .await?;

    let response = match outcome {
        IngestOutcome::Stored(record) => Json(StoredResponse::new(
            &record,
            "File downloaded and processed successfully",
        ))
        .into_response(),
        IngestOutcome::Duplicate(report) => Json(DuplicateResponse::from(report)).into_response(),
    };

    Ok(response)
}

/// GET /get_files - List every file.
pub async fn get_files(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FilesResponse>, ApiError> {
    let files = state.service().list_files().await?;

    Ok(Json(FilesResponse {
        files: files.into_iter().map(FileEntry::from).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_ascii() {
        assert_eq!(
            content_disposition_header("report.pdf"),
            "attachment; filename=\"report.pdf\""
        );
    }

    #[test]
    fn test_content_disposition_non_ascii() {
        let header = content_disposition_header("日本語.txt");
        assert!(header.starts_with("attachment; filename=\"___.txt\""));
        assert!(header.contains("filename*=UTF-8''%E6%97%A5%E6%9C%AC%E8%AA%9E.txt"));
    }

    #[test]
    fn test_content_disposition_quotes() {
        let header = content_disposition_header("a\"b.txt");
        assert!(header.starts_with("attachment; filename=\"a_b.txt\""));
        assert!(header.contains("filename*=UTF-8''a%22b.txt"));
    }
}
