//! Remote file retrieval.
//!
//! URLs are normalized, validated against private-network targets and
//! fetched with bounded time and size.

mod fetcher;
mod guard;
mod normalize;

pub use fetcher::{FetchedFile, RemoteFetcher};
pub use guard::{check_host, validate_url};
pub use normalize::normalize_url;
