//! Single-Item Detail Loading
//!
//! [`DetailLoader`] tracks one item for the detail screen: idle, loading, or
//! loaded.
//!
//! A failed load is logged and leaves the loader not loading and without an
//! item, which looks exactly like a loader that was never asked. There is no
//! retained failure phase.
//!
//! Each [`load`](DetailLoader::load) supersedes the previous one: the older
//! request is aborted and, should its result still arrive, it is discarded.
//! Only the most recent request can set the item.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::AbortHandle;

use crate::client::{CatalogClient, FetchResult};
use crate::connectivity::ConnectivityObserver;
use crate::model::CatalogItem;
use crate::pending::{LoadOutcome, PendingLoad};

/// Observable phase of the detail screen
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DetailPhase {
    /// No item and nothing outstanding
    #[default]
    Idle,
    /// A request is outstanding
    Loading,
    /// An item is available
    Loaded,
}

/// What the presentation layer renders for the detail screen
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct DetailSnapshot {
    /// Loaded item, if any
    pub item: Option<CatalogItem>,
    /// Whether a request is outstanding
    pub is_loading: bool,
    /// Identifier of the most recent request
    pub requested: Option<u32>,
    /// Derived phase
    pub phase: DetailPhase,
}

#[derive(Debug, Default)]
struct DetailState {
    item: Option<CatalogItem>,
    loading: bool,
    requested: Option<u32>,
    generation: u64,
    closed: bool,
    pending: Option<AbortHandle>,
}

impl DetailState {
    fn phase(&self) -> DetailPhase {
        if self.loading {
            DetailPhase::Loading
        } else if self.item.is_some() {
            DetailPhase::Loaded
        } else {
            DetailPhase::Idle
        }
    }

    fn snapshot(&self) -> DetailSnapshot {
        DetailSnapshot {
            item: self.item.clone(),
            is_loading: self.loading,
            requested: self.requested,
            phase: self.phase(),
        }
    }
}

struct Shared {
    state: Mutex<DetailState>,
    tx: watch::Sender<DetailSnapshot>,
}

impl Shared {
    fn publish(&self, state: &DetailState) {
        self.tx.send_replace(state.snapshot());
    }

    fn apply(&self, generation: u64, id: u32, result: FetchResult<CatalogItem>) -> LoadOutcome {
        let mut state = self.state.lock();

        if state.closed || state.generation != generation {
            tracing::debug!(id, generation, "Discarding stale detail result");
            return LoadOutcome::Discarded;
        }

        state.loading = false;
        state.pending = None;

        let outcome = match result {
            Ok(item) => {
                tracing::debug!(id, title = %item.title, "Detail loaded");
                state.item = Some(item);
                LoadOutcome::Applied
            }
            Err(e) => {
                tracing::error!(id, error = %e, "Error loading item detail");
                LoadOutcome::Failed
            }
        };

        self.publish(&state);
        outcome
    }
}

/// Detail loader for one screen
pub struct DetailLoader<C: CatalogClient + ?Sized + 'static> {
    client: Arc<C>,
    shared: Arc<Shared>,
    connectivity: Option<ConnectivityObserver>,
}

impl<C: CatalogClient + ?Sized + 'static> DetailLoader<C> {
    /// Create an idle loader
    pub fn new(client: Arc<C>) -> Self {
        let state = DetailState::default();
        let tx = watch::Sender::new(state.snapshot());

        Self {
            client,
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                tx,
            }),
            connectivity: None,
        }
    }

    /// Attach a connectivity observer for display and logging
    #[must_use]
    pub fn with_connectivity(mut self, observer: ConnectivityObserver) -> Self {
        self.connectivity = Some(observer);
        self
    }

    /// Load the item with identifier `id`
    ///
    /// Supersedes any outstanding request. The current item is kept only if
    /// it already is `id`. Returns `None` only if the loader is closed.
    ///
    /// Must be called from within a tokio runtime.
    pub fn load(&self, id: u32) -> Option<PendingLoad> {
        let mut state = self.shared.state.lock();
        if state.closed {
            return None;
        }

        if let Some(previous) = state.pending.take() {
            tracing::debug!(id, superseded = ?state.requested, "Superseding detail request");
            previous.abort();
        }
        if state.item.as_ref().is_some_and(|item| item.id != id) {
            state.item = None;
        }

        if !self.is_connected() {
            tracing::warn!(id, "No connectivity reported, requesting detail anyway");
        }

        state.generation += 1;
        state.requested = Some(id);
        state.loading = true;
        self.shared.publish(&state);

        let generation = state.generation;
        let client = Arc::clone(&self.client);
        let shared = Arc::clone(&self.shared);
        let handle = tokio::spawn(async move {
            let result = client.fetch_item(id).await;
            shared.apply(generation, id, result)
        });
        state.pending = Some(handle.abort_handle());

        tracing::debug!(id, client = self.client.name(), "Requesting detail");
        Some(PendingLoad::new(id, handle))
    }

    /// End this loader's lifetime
    ///
    /// Aborts any outstanding request. Called automatically on drop.
    pub fn close(&self) {
        let mut state = self.shared.state.lock();
        if state.closed {
            return;
        }

        state.closed = true;
        if let Some(handle) = state.pending.take() {
            handle.abort();
        }
        state.loading = false;
        self.shared.publish(&state);
        tracing::debug!("Detail loader closed");
    }

    /// Subscribe to state changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DetailSnapshot> {
        self.shared.tx.subscribe()
    }

    /// Current state
    #[must_use]
    pub fn snapshot(&self) -> DetailSnapshot {
        self.shared.state.lock().snapshot()
    }

    /// Loaded item, if any
    #[must_use]
    pub fn item(&self) -> Option<CatalogItem> {
        self.shared.state.lock().item.clone()
    }

    /// Whether a request is outstanding
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.shared.state.lock().loading
    }

    /// Derived phase
    #[must_use]
    pub fn phase(&self) -> DetailPhase {
        self.shared.state.lock().phase()
    }

    /// Reachability as last reported; `true` when no observer is attached
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connectivity
            .as_ref()
            .map_or(true, ConnectivityObserver::is_connected)
    }

    /// Subscribe to reachability changes, if an observer is attached
    #[must_use]
    pub fn connectivity(&self) -> Option<watch::Receiver<bool>> {
        self.connectivity.as_ref().map(ConnectivityObserver::subscribe)
    }
}

impl<C: CatalogClient + ?Sized + 'static> Drop for DetailLoader<C> {
    fn drop(&mut self) {
        self.close();
    }
}
