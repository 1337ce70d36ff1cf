//! Rewrites for share links that do not point at the file itself.

/// Host whose `/file/d/{id}/...` view pages wrap a direct download.
const DRIVE_HOST: &str = "drive.google.com";

/// Turn known viewer links into direct download URLs.
///
/// Anything not recognised is returned unchanged.
pub fn normalize_url(raw: &str) -> String {
    match drive_file_id(raw) {
        Some(id) => format!("https://{DRIVE_HOST}/uc?export=download&id={id}"),
        None => raw.to_string(),
    }
}

fn drive_file_id(raw: &str) -> Option<&str> {
    if !raw.contains(DRIVE_HOST) {
        return None;
    }

    let (_, rest) = raw.split_once("/file/d/")?;
    // The id must be followed by another path segment.
    let (id, _) = rest.split_once('/')?;

    (!id.is_empty()).then_some(id)
}
