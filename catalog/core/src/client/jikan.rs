//! Jikan Client Implementation
//!
//! HTTP client for the Jikan v4 REST API (an unofficial MyAnimeList mirror).
//!
//! # Endpoints
//!
//! - `/top/anime?page={page}` - Ranked list, one page per call
//! - `/anime/{id}` - Single entry
//!
//! One call is one request. Rate limiting (HTTP 429) is reported as a
//! [`TransportFailure::Status`] like any other non-success status.

use async_trait::async_trait;

use super::traits::{CatalogClient, ClientConfig, FetchResult, TransportFailure};
use crate::model::{self, CatalogItem, Page};

/// Jikan catalog client
#[derive(Clone, Debug)]
pub struct JikanClient {
    /// API root, without trailing slash
    base_url: String,
    /// HTTP client
    http_client: reqwest::Client,
}

impl JikanClient {
    /// Create a client from connection settings
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built
    /// (e.g. the TLS backend fails to initialise).
    pub fn new(config: &ClientConfig) -> FetchResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    /// Get the API root
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get ranked-list endpoint URL
    fn top_url(&self, page: u32) -> String {
        format!("{}/top/anime?page={page}", self.base_url)
    }

    /// Get single-item endpoint URL
    fn item_url(&self, id: u32) -> String {
        format!("{}/anime/{id}", self.base_url)
    }

    /// Issue a GET and return the body of a successful response
    async fn get_body(&self, url: &str) -> FetchResult<String> {
        tracing::debug!(url = %url, "Catalog request");

        let response = self
            .http_client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TransportFailure::Status { status, body });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl CatalogClient for JikanClient {
    fn name(&self) -> &'static str {
        "Jikan"
    }

    async fn fetch_page(&self, page: u32) -> FetchResult<Page> {
        if page == 0 {
            return Err(TransportFailure::InvalidArgument(
                "page numbers start at 1".to_string(),
            ));
        }

        let body = self.get_body(&self.top_url(page)).await?;
        Ok(model::decode_page(&body)?)
    }

    async fn fetch_item(&self, id: u32) -> FetchResult<CatalogItem> {
        if id == 0 {
            return Err(TransportFailure::InvalidArgument(
                "item identifiers are positive".to_string(),
            ));
        }

        let body = self.get_body(&self.item_url(id)).await?;
        Ok(model::decode_item(&body)?)
    }
}
