//! Name derivation for stored and remotely ingested files.
//!
//! Storage paths are built from fingerprints only. Caller-supplied names are
//! reduced to a display name for the catalog and an extension hint.

use std::path::Path;

use url::Url;

use super::fingerprint::Fingerprint;

/// Extension used when a name has none (or an unusable one).
pub const DEFAULT_EXTENSION: &str = "bin";

/// Maximum length of a catalog file name (in characters).
pub const MAX_NAME_LENGTH: usize = 255;

const MAX_EXTENSION_LENGTH: usize = 16;
const MAX_STEM_LENGTH: usize = 64;

/// Extract a safe, lowercase extension from a caller-supplied name.
///
/// Returns "bin" if no usable extension is found.
pub fn sanitize_extension(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|s| s.to_str())
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LENGTH
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

/// Reduce an uploaded file name to its display form.
///
/// Drops any directory part (some clients send full paths) and surrounding
/// whitespace. Returns `None` when nothing usable remains.
pub fn display_name(raw: &str) -> Option<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw).trim();

    if base.is_empty() || base == "." || base == ".." {
        return None;
    }
    if base.chars().any(|c| c.is_control()) {
        return None;
    }
    if base.chars().count() > MAX_NAME_LENGTH {
        return None;
    }

    Some(base.to_string())
}

/// Keep ASCII alphanumerics, '-' and '_'; everything else becomes '_'.
fn sanitize_stem(stem: &str) -> String {
    let cleaned: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_STEM_LENGTH)
        .collect();

    cleaned.trim_matches('_').to_string()
}

/// Derive the catalog name for a file ingested from `url`.
///
/// The name is `{stem}-{fingerprint prefix}.{ext}`, where the stem comes from
/// the last path segment (or the host). It is deterministic for a given URL
/// and content, and safe to use on any filesystem.
pub fn remote_file_name(url: &Url, fingerprint: &Fingerprint) -> String {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
        .map(|s| {
            urlencoding::decode(s)
                .map(|d| d.into_owned())
                .unwrap_or_else(|_| s.to_string())
        })
        .unwrap_or_default();

    let segment_path = Path::new(&segment);
    let raw_stem = segment_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();

    let mut stem = sanitize_stem(raw_stem);
    if stem.is_empty() {
        stem = url.host_str().map(sanitize_stem).unwrap_or_default();
    }
    if stem.is_empty() {
        stem = "download".to_string();
    }

    let ext = sanitize_extension(&segment);
    format!("{stem}-{}.{ext}", fingerprint.short())
}
