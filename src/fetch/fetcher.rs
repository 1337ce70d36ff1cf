//! HTTP client for remote file ingestion.

use std::error::Error as StdError;
use std::time::Duration;

use reqwest::redirect::Policy;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use super::guard::{check_host, validate_url};
use super::normalize::normalize_url;
use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::{Result, ShareError};

/// Bytes retrieved from a remote URL.
#[derive(Debug, Clone)]
pub struct FetchedFile {
    /// The URL that was requested, after normalization.
    pub url: Url,
    /// Response body.
    pub content: Vec<u8>,
}

/// Fetches remote files with timeouts, a size cap and SSRF checks.
///
/// Redirect targets are checked against the same host rules as the
/// initial URL.
#[derive(Debug, Clone)]
pub struct RemoteFetcher {
    client: Client,
    max_size: u64,
    allow_private_hosts: bool,
}

impl RemoteFetcher {
    /// Create a new fetcher from configuration.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let max_redirects = config.max_redirects;
        let allow_private_hosts = config.allow_private_hosts;

        let policy = Policy::custom(move |attempt| {
            if attempt.previous().len() > max_redirects {
                return attempt.error("too many redirects");
            }
            if allow_private_hosts {
                return attempt.follow();
            }
            match check_host(attempt.url()) {
                Ok(()) => attempt.follow(),
                Err(e) => attempt.error(e),
            }
        });

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.total_timeout_secs))
            .redirect(policy)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ShareError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_size: config.max_size_bytes(),
            allow_private_hosts,
        })
    }

    /// Size limit applied to response bodies.
    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Normalize, validate and fetch `raw_url`.
    pub async fn fetch(&self, raw_url: &str) -> Result<FetchedFile> {
        let normalized = normalize_url(raw_url.trim());
        let url = validate_url(&normalized, self.allow_private_hosts)?;

        debug!(url = %url, "Fetching remote file");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = status.as_u16(), "Remote server returned an error");
            return Err(FetchError::HttpStatus {
                code: status.as_u16(),
            }
            .into());
        }

        if let Some(length) = response.content_length() {
            if length > self.max_size {
                return Err(FetchError::TooLarge {
                    limit: self.max_size,
                }
                .into());
            }
        }

        let content = self.read_body(response).await?;
        debug!(url = %url, size = content.len(), "Fetched remote file");

        Ok(FetchedFile { url, content })
    }

    /// Read the body chunk by chunk, stopping once it passes the size cap.
    async fn read_body(&self, mut response: reqwest::Response) -> Result<Vec<u8>> {
        let mut content = Vec::new();

        while let Some(chunk) = response.chunk().await.map_err(classify)? {
            if (content.len() + chunk.len()) as u64 > self.max_size {
                return Err(FetchError::TooLarge {
                    limit: self.max_size,
                }
                .into());
            }
            content.extend_from_slice(&chunk);
        }

        Ok(content)
    }
}

/// Map a client error to a fetch failure.
///
/// Errors raised by the redirect policy carry a [`FetchError`] in their
/// source chain and are passed through as-is.
fn classify(err: reqwest::Error) -> FetchError {
    let mut source = err.source();
    while let Some(inner) = source {
        if let Some(fetch) = inner.downcast_ref::<FetchError>() {
            return fetch.clone();
        }
        source = inner.source();
    }

    let reason = if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        match err.source() {
            Some(inner) => format!("connection failed: {inner}"),
            None => "connection failed".to_string(),
        }
    } else {
        err.to_string()
    };

    FetchError::Network { reason }
}
