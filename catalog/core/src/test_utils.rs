//! Catalog Test Utilities
//!
//! Mock infrastructure for exercising the paging and detail layers without a
//! network. [`ScriptedClient`] replays queued replies per page number or item
//! identifier, records every call, and can hold a reply back behind a
//! [`Gate`] so tests control exactly when a fetch resolves.
//!
//! # Usage
//!
//! ```ignore
//! use anime_catalog_core::test_utils::{page, ScriptedClient};
//!
//! let client = Arc::new(ScriptedClient::new());
//! client.push_page(page(1, true, &[1, 2]));
//! let gate = client.gate_page(2);
//!
//! // ... drive a controller, then:
//! gate.resolve(Ok(page(2, false, &[3])));
//! assert_eq!(client.page_calls(), vec![1, 2]);
//! ```

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::client::{CatalogClient, FetchResult, TransportFailure};
use crate::model::{CatalogItem, Page, PageInfo};

// ============================================================================
// Builders
// ============================================================================

/// Item with a predictable title
#[must_use]
pub fn item(id: u32) -> CatalogItem {
    CatalogItem::new(id, format!("Title {id}"))
}

/// Page numbered `current_page` holding items with the given identifiers
#[must_use]
pub fn page(current_page: u32, has_next_page: bool, ids: &[u32]) -> Page {
    let count = u32::try_from(ids.len()).unwrap_or(u32::MAX);
    Page {
        items: ids.iter().copied().map(item).collect(),
        info: PageInfo {
            current_page,
            has_next_page,
            last_visible_page: if has_next_page {
                current_page + 1
            } else {
                current_page
            },
            item_count: count,
            total: count,
            per_page: 25,
        },
    }
}

// ============================================================================
// Scripted Replies
// ============================================================================

enum Reply<T> {
    Ready(FetchResult<T>),
    Gated(oneshot::Receiver<FetchResult<T>>),
}

impl<T> Reply<T> {
    async fn into_result(self) -> FetchResult<T> {
        match self {
            Self::Ready(result) => result,
            Self::Gated(rx) => rx.await.unwrap_or_else(|_| {
                Err(TransportFailure::Unavailable(
                    "gate dropped without a reply".to_string(),
                ))
            }),
        }
    }
}

/// Held-back reply for one scripted call
#[must_use = "an unresolved gate fails the call when dropped"]
pub struct Gate<T> {
    tx: oneshot::Sender<FetchResult<T>>,
}

impl<T> Gate<T> {
    /// Release the call with `result`
    ///
    /// Does nothing if the call was cancelled before it got this far.
    pub fn resolve(self, result: FetchResult<T>) {
        let _ = self.tx.send(result);
    }
}

/// Mock catalog client replaying scripted replies
///
/// Replies are queued per key and consumed in order. A call with nothing
/// queued fails with [`TransportFailure::Unavailable`]. A call shows up in
/// [`page_calls`](Self::page_calls) / [`item_calls`](Self::item_calls) only
/// after it has taken its reply off the queue.
#[derive(Default)]
pub struct ScriptedClient {
    pages: Mutex<HashMap<u32, VecDeque<Reply<Page>>>>,
    items: Mutex<HashMap<u32, VecDeque<Reply<CatalogItem>>>>,
    page_calls: Mutex<Vec<u32>>,
    item_calls: Mutex<Vec<u32>>,
}

impl ScriptedClient {
    /// Create a client with nothing scripted
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `page` as the reply for its own page number
    pub fn push_page(&self, page: Page) {
        self.push_page_for(page.info.current_page, page);
    }

    /// Queue `page` as the reply for a request of page `requested`
    pub fn push_page_for(&self, requested: u32, page: Page) {
        self.push_page_reply(requested, Reply::Ready(Ok(page)));
    }

    /// Queue a failure for page `requested`
    pub fn push_page_failure(&self, requested: u32, reason: &str) {
        self.push_page_reply(
            requested,
            Reply::Ready(Err(TransportFailure::Unavailable(reason.to_string()))),
        );
    }

    /// Queue a held-back reply for page `requested`
    pub fn gate_page(&self, requested: u32) -> Gate<Page> {
        let (tx, rx) = oneshot::channel();
        self.push_page_reply(requested, Reply::Gated(rx));
        Gate { tx }
    }

    /// Queue `item` as the reply for its own identifier
    pub fn push_item(&self, item: CatalogItem) {
        self.push_item_reply(item.id, Reply::Ready(Ok(item)));
    }

    /// Queue a failure for item `id`
    pub fn push_item_failure(&self, id: u32, reason: &str) {
        self.push_item_reply(
            id,
            Reply::Ready(Err(TransportFailure::Unavailable(reason.to_string()))),
        );
    }

    /// Queue a held-back reply for item `id`
    pub fn gate_item(&self, id: u32) -> Gate<CatalogItem> {
        let (tx, rx) = oneshot::channel();
        self.push_item_reply(id, Reply::Gated(rx));
        Gate { tx }
    }

    /// Page numbers requested so far, in call order
    #[must_use]
    pub fn page_calls(&self) -> Vec<u32> {
        self.page_calls.lock().clone()
    }

    /// Item identifiers requested so far, in call order
    #[must_use]
    pub fn item_calls(&self) -> Vec<u32> {
        self.item_calls.lock().clone()
    }

    fn push_page_reply(&self, requested: u32, reply: Reply<Page>) {
        self.pages
            .lock()
            .entry(requested)
            .or_default()
            .push_back(reply);
    }

    fn push_item_reply(&self, id: u32, reply: Reply<CatalogItem>) {
        self.items.lock().entry(id).or_default().push_back(reply);
    }
}

#[async_trait]
impl CatalogClient for ScriptedClient {
    fn name(&self) -> &'static str {
        "Scripted"
    }

    async fn fetch_page(&self, page: u32) -> FetchResult<Page> {
        let reply = self
            .pages
            .lock()
            .get_mut(&page)
            .and_then(VecDeque::pop_front);
        self.page_calls.lock().push(page);

        match reply {
            Some(reply) => reply.into_result().await,
            None => Err(TransportFailure::Unavailable(format!(
                "no scripted reply for page {page}"
            ))),
        }
    }

    async fn fetch_item(&self, id: u32) -> FetchResult<CatalogItem> {
        let reply = self.items.lock().get_mut(&id).and_then(VecDeque::pop_front);
        self.item_calls.lock().push(id);

        match reply {
            Some(reply) => reply.into_result().await,
            None => Err(TransportFailure::Unavailable(format!(
                "no scripted reply for item {id}"
            ))),
        }
    }
}
