//! Catalog Client Traits
//!
//! The contract the paging and detail layers consume. A client performs
//! exactly one round trip per call and reports the outcome as a
//! [`FetchResult`]; retry, caching and deduplication are deliberately left to
//! the callers.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{CatalogItem, Page};

/// Default public catalog endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.jikan.moe/v4";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default user agent sent with every request
pub const DEFAULT_USER_AGENT: &str = concat!("anime-catalog/", env!("CARGO_PKG_VERSION"));

/// Failure of a single catalog call
///
/// This is the only error kind the paging and detail layers recognise. It is
/// logged and swallowed there, never surfaced to the presentation layer.
#[derive(Debug, Error)]
pub enum TransportFailure {
    /// The request never produced a response (DNS, connect, timeout, TLS)
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("catalog returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// The body did not match the expected shape
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The caller passed a value the API cannot serve (e.g. page 0)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The client could not serve the call for another reason
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

impl TransportFailure {
    /// Whether re-issuing the same call could succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(_) | Self::Unavailable(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Decode(_) | Self::InvalidArgument(_) => false,
        }
    }
}

/// Outcome of a catalog call: success payload or failure
pub type FetchResult<T> = Result<T, TransportFailure>;

/// Catalog client trait
///
/// Implement this to point the paging and detail layers at a different
/// catalog source. Page numbers and identifiers are 1-based and must be
/// positive; passing zero is a caller bug.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Client name used in logs
    fn name(&self) -> &str;

    /// Fetch one page of the ranked list
    async fn fetch_page(&self, page: u32) -> FetchResult<Page>;

    /// Fetch a single item by identifier
    async fn fetch_item(&self, id: u32) -> FetchResult<CatalogItem>;
}

/// Connection settings for an HTTP catalog client
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root, without trailing slash
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// User agent header
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    /// Create a config for the given API root
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
