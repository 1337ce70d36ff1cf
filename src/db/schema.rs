//! Database schema and migrations for Sharebox.
//!
//! Migrations are applied sequentially when the database is first opened
//! or upgraded.

/// Database migrations.
///
/// Each migration is a SQL script that will be executed in order.
/// The schema_version table tracks which migrations have been applied.
pub const MIGRATIONS: &[&str] = &[
    // v1: File catalog
    r#"
-- One row per distinct content; both the display name and the digest are unique
CREATE TABLE files (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT NOT NULL UNIQUE,
    path         TEXT NOT NULL,           -- stored name relative to the storage root, one per record
    fingerprint  TEXT NOT NULL UNIQUE,    -- SHA-256, lowercase hex
    uploaded_by  TEXT NOT NULL,
    url          TEXT,                    -- source URL for remote ingestion
    size         INTEGER NOT NULL DEFAULT 0,
    created_at   TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
);
"#,
    // v2: Download audit trail
    r#"
-- Append-only; file_name is a soft reference so history survives record removal
CREATE TABLE downloads (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    file_name   TEXT NOT NULL,
    user_id     TEXT NOT NULL,
    timestamp   TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
);

CREATE INDEX idx_downloads_file_name ON downloads(file_name);
CREATE INDEX idx_downloads_file_user ON downloads(file_name, user_id);
"#,
];
