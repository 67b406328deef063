//! Catalog API Integration
//!
//! Access to the remote catalog through a common trait so the paging and
//! detail layers can be driven by the real API, a scripted test double, or
//! any other source.
//!
//! # Available Clients
//!
//! - **Jikan**: public MyAnimeList mirror (default)
//!
//! # Usage
//!
//! ```ignore
//! use anime_catalog_core::client::{CatalogClient, ClientConfig, JikanClient};
//!
//! let client = JikanClient::new(&ClientConfig::default())?;
//! let page = client.fetch_page(1).await?;
//! ```

mod jikan;
mod traits;

pub use jikan::JikanClient;
pub use traits::{
    CatalogClient, ClientConfig, FetchResult, TransportFailure, DEFAULT_BASE_URL,
    DEFAULT_TIMEOUT, DEFAULT_USER_AGENT,
};
