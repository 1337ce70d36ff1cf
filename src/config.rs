//! Configuration module for Sharebox.

use serde::Deserialize;
use std::path::Path;

use crate::{Result, ShareError};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
    /// Maximum number of pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// How long a statement waits on a locked database before failing.
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_secs: u64,
}

fn default_db_path() -> String {
    "data/files.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_busy_timeout() -> u64 {
    10
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
            busy_timeout_secs: default_busy_timeout(),
        }
    }
}

/// File storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    /// Path to the file storage directory.
    #[serde(default = "default_storage_path")]
    pub storage_path: String,
    /// Maximum upload size in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
}

fn default_storage_path() -> String {
    "data/uploads".to_string()
}

fn default_max_upload_size() -> u64 {
    50
}

impl FilesConfig {
    /// Maximum upload size in bytes.
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_size_mb * 1024 * 1024
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            max_upload_size_mb: default_max_upload_size(),
        }
    }
}

/// Remote URL ingestion configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// User agent sent with every remote request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Total request timeout in seconds.
    #[serde(default = "default_total_timeout")]
    pub total_timeout_secs: u64,
    /// Maximum number of redirects to follow.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// Maximum remote file size in megabytes.
    #[serde(default = "default_max_fetch_size")]
    pub max_size_mb: u64,
    /// Allow loopback and private network targets.
    #[serde(default)]
    pub allow_private_hosts: bool,
}

fn default_user_agent() -> String {
    "Sharebox/0.1 (+file ingestion)".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_total_timeout() -> u64 {
    120
}

fn default_max_redirects() -> usize {
    5
}

fn default_max_fetch_size() -> u64 {
    50
}

impl FetchConfig {
    /// Maximum remote file size in bytes.
    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_mb * 1024 * 1024
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            connect_timeout_secs: default_connect_timeout(),
            total_timeout_secs: default_total_timeout(),
            max_redirects: default_max_redirects(),
            max_size_mb: default_max_fetch_size(),
            allow_private_hosts: false,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/sharebox.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Web frontend configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Whether to serve the static frontend.
    #[serde(default = "default_serve_static")]
    pub serve_static: bool,
    /// Path to the static frontend directory.
    #[serde(default = "default_static_path")]
    pub static_path: String,
}

fn default_serve_static() -> bool {
    true
}

fn default_static_path() -> String {
    "frontend".to_string()
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            cors_origins: vec![],
            serve_static: default_serve_static(),
            static_path: default_static_path(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// File storage configuration.
    #[serde(default)]
    pub files: FilesConfig,
    /// Remote fetch configuration.
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Web frontend configuration.
    #[serde(default)]
    pub web: WebConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ShareError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| ShareError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `SHAREBOX_DB_PATH`: Override the database file path
    /// - `SHAREBOX_STORAGE_PATH`: Override the upload storage directory
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("SHAREBOX_DB_PATH") {
            if !path.is_empty() {
                self.database.path = path;
            }
        }
        if let Ok(path) = std::env::var("SHAREBOX_STORAGE_PATH") {
            if !path.is_empty() {
                self.files.storage_path = path;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.database.max_connections == 0 {
            return Err(ShareError::Config(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        if self.database.busy_timeout_secs == 0 {
            return Err(ShareError::Config(
                "database.busy_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.files.max_upload_size_mb == 0 {
            return Err(ShareError::Config(
                "files.max_upload_size_mb must be greater than 0".to_string(),
            ));
        }
        if self.fetch.user_agent.trim().is_empty() {
            return Err(ShareError::Config(
                "fetch.user_agent must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
