//! Anime Catalog Core - Headless Paging and Detail Loading
//!
//! This crate holds the client-side state for browsing a remote anime catalog:
//! a paged "top anime" list, a single-item detail view, and a reachability
//! signal. It has no UI dependencies; a terminal front end, a GUI, or a test
//! can drive it the same way.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      Presentation                             │
//! │     list screen            detail screen        offline banner│
//! │         │                       │                     │       │
//! │   watch::Receiver        watch::Receiver        watch::Receiver
//! │   <ListSnapshot>         <DetailSnapshot>          <bool>     │
//! └─────────┼───────────────────────┼─────────────────────┼───────┘
//!           │                       │                     │
//! ┌─────────┼───────────────────────┼─────────────────────┼───────┐
//! │  ┌──────┴────────────┐  ┌───────┴────────┐  ┌─────────┴─────┐ │
//! │  │PaginationController│  │  DetailLoader  │  │ Connectivity  │ │
//! │  │ cursor, items,    │  │ supersede,     │  │   Observer    │ │
//! │  │ single flight     │  │ discard stale  │  │ probe+events  │ │
//! │  └─────────┬─────────┘  └───────┬────────┘  └───────────────┘ │
//! │            └──────────┬─────────┘                              │
//! │                 CatalogClient (trait)                          │
//! │             JikanClient  │  ScriptedClient (tests)             │
//! └──────────────────────────┼─────────────────────────────────────┘
//!                            ▼
//!                    GET {base}/top/anime?page=N
//!                    GET {base}/anime/{id}
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use anime_catalog_core::{ClientConfig, JikanClient, LoadOutcome, PaginationController};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = Arc::new(JikanClient::new(&ClientConfig::default())?);
//!     let list = PaginationController::new(client);
//!
//!     if let Some(pending) = list.reset() {
//!         if pending.wait().await != LoadOutcome::Applied {
//!             anyhow::bail!("first page did not load");
//!         }
//!     }
//!     for item in list.items() {
//!         println!("{} {}", item.id, item.title);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`client`]: Catalog backend abstraction and the Jikan HTTP client
//! - [`config`]: TOML/env configuration loading
//! - [`connectivity`]: Reachability observer and probes
//! - [`detail`]: Single-item detail loader
//! - [`model`]: Catalog items, pages, and wire decoding
//! - [`pagination`]: Paged list controller
//! - [`test_utils`]: Scripted client for driving the controllers in tests

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod connectivity;
pub mod detail;
pub mod model;
pub mod pagination;
mod pending;
pub mod test_utils;

// Re-exports for convenience
pub use client::{
    CatalogClient, ClientConfig, FetchResult, JikanClient, TransportFailure, DEFAULT_BASE_URL,
    DEFAULT_TIMEOUT, DEFAULT_USER_AGENT,
};
pub use connectivity::{
    ConnectivityObserver, NetworkEvent, ReachabilityProbe, RouteProbe, StaticProbe, Subscription,
    DEFAULT_PROBE_ADDRESS,
};
pub use detail::{DetailLoader, DetailPhase, DetailSnapshot};
pub use model::{CatalogItem, Page, PageInfo, Trailer};
pub use pagination::{ListPhase, ListSnapshot, PaginationController, FIRST_PAGE};
pub use pending::{LoadOutcome, PendingLoad};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, CatalogConfig, CatalogToml,
    ConfigError, ConfigOverrides, ConfigSource,
};
