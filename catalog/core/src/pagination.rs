//! Paginated List Loading
//!
//! [`PaginationController`] owns the accumulated list for one screen and pulls
//! pages from a [`CatalogClient`] one at a time.
//!
//! # State Machine
//!
//! ```text
//!            load_next_page            success, has_next
//!   Idle ───────────────────► Loading ──────────────────► Ready
//!                                │  ▲                        │
//!                        failure │  └────── load_next_page ──┘
//!                  (back to the  │
//!                  prior phase)  │ success, !has_next
//!                                ▼
//!                          ReadyExhausted
//! ```
//!
//! - At most one fetch is in flight. A load request while one is in flight,
//!   or after the last page, is dropped silently (not queued).
//! - Pages are appended in response order. Duplicate identifiers across pages
//!   are kept.
//! - The cursor advances from the page number the *response* reports.
//! - A failure clears the in-flight flag and nothing else, so the call can
//!   simply be repeated.
//! - [`reset`](PaginationController::reset) starts a new session. Any fetch
//!   still outstanding from the old session is abandoned and its result
//!   discarded.
//! - Dropping or [`close`](PaginationController::close)-ing the controller
//!   ends its lifetime; late results never touch its state.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::AbortHandle;

use crate::client::{CatalogClient, FetchResult};
use crate::connectivity::ConnectivityObserver;
use crate::model::{CatalogItem, Page};
use crate::pending::{LoadOutcome, PendingLoad};

/// First page of every session
pub const FIRST_PAGE: u32 = 1;

/// Observable phase of the list
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ListPhase {
    /// Nothing loaded yet in this session
    #[default]
    Idle,
    /// A page request is outstanding
    Loading,
    /// Items present, more pages may exist
    Ready,
    /// The backend reported the last page
    ReadyExhausted,
}

/// What the presentation layer renders for the list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListSnapshot {
    /// Accumulated items in first-seen order
    pub items: Vec<CatalogItem>,
    /// Whether a page request is outstanding
    pub is_loading: bool,
    /// Whether the last page has been seen
    pub is_exhausted: bool,
    /// Next page number that will be requested
    pub next_page: u32,
    /// Derived phase
    pub phase: ListPhase,
}

#[derive(Debug)]
struct PaginationState {
    items: Vec<CatalogItem>,
    next_page: u32,
    exhausted: bool,
    in_flight: bool,
    pages_loaded: u32,
    /// Bumped by reset; results from older sessions are discarded
    generation: u64,
    closed: bool,
    pending: Option<AbortHandle>,
}

impl PaginationState {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            next_page: FIRST_PAGE,
            exhausted: false,
            in_flight: false,
            pages_loaded: 0,
            generation: 0,
            closed: false,
            pending: None,
        }
    }

    fn phase(&self) -> ListPhase {
        if self.in_flight {
            ListPhase::Loading
        } else if self.exhausted {
            ListPhase::ReadyExhausted
        } else if self.pages_loaded > 0 {
            ListPhase::Ready
        } else {
            ListPhase::Idle
        }
    }

    fn snapshot(&self) -> ListSnapshot {
        ListSnapshot {
            items: self.items.clone(),
            is_loading: self.in_flight,
            is_exhausted: self.exhausted,
            next_page: self.next_page,
            phase: self.phase(),
        }
    }

    fn abandon_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
        self.in_flight = false;
    }
}

struct Shared {
    state: Mutex<PaginationState>,
    tx: watch::Sender<ListSnapshot>,
}

impl Shared {
    fn publish(&self, state: &PaginationState) {
        self.tx.send_replace(state.snapshot());
    }

    fn apply(&self, generation: u64, requested: u32, result: FetchResult<Page>) -> LoadOutcome {
        let mut state = self.state.lock();

        if state.closed || state.generation != generation {
            tracing::debug!(
                page = requested,
                generation,
                current_generation = state.generation,
                closed = state.closed,
                "Discarding stale page result"
            );
            return LoadOutcome::Discarded;
        }

        state.in_flight = false;
        state.pending = None;

        let outcome = match result {
            Ok(page) => {
                let received = page.items.len();
                if page.info.current_page != requested {
                    tracing::debug!(
                        requested,
                        reported = page.info.current_page,
                        "Response page differs from request, following response"
                    );
                }

                state.items.extend(page.items);
                state.next_page = page.info.current_page.saturating_add(1);
                state.exhausted = !page.info.has_next_page;
                state.pages_loaded += 1;

                tracing::debug!(
                    page = page.info.current_page,
                    received,
                    total = state.items.len(),
                    exhausted = state.exhausted,
                    "Page loaded"
                );
                LoadOutcome::Applied
            }
            Err(e) => {
                tracing::error!(page = requested, error = %e, "Error loading next page");
                LoadOutcome::Failed
            }
        };

        self.publish(&state);
        outcome
    }
}

/// Paged list loader for one screen
///
/// Not `Clone`: a controller belongs to a single consumer. Share the
/// observable state through [`subscribe`](Self::subscribe) instead.
pub struct PaginationController<C: CatalogClient + ?Sized + 'static> {
    client: Arc<C>,
    shared: Arc<Shared>,
    connectivity: Option<ConnectivityObserver>,
}

impl<C: CatalogClient + ?Sized + 'static> PaginationController<C> {
    /// Create an idle controller
    pub fn new(client: Arc<C>) -> Self {
        let state = PaginationState::new();
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

    /// Start a new session from the first page
    ///
    /// Clears the list, rewinds the cursor, and requests page 1. An
    /// outstanding request from the previous session is abandoned. Returns
    /// `None` only if the controller is closed.
    pub fn reset(&self) -> Option<PendingLoad> {
        {
            let mut state = self.shared.state.lock();
            if state.closed {
                return None;
            }

            state.abandon_pending();
            state.generation += 1;
            state.items.clear();
            state.next_page = FIRST_PAGE;
            state.exhausted = false;
            state.pages_loaded = 0;

            tracing::debug!(generation = state.generation, "List reset");
            self.shared.publish(&state);
        }

        self.load_next_page()
    }

    /// Request the page at the cursor
    ///
    /// Returns `None` without doing anything if a request is already in
    /// flight, the last page has been seen, or the controller is closed.
    ///
    /// Must be called from within a tokio runtime.
    pub fn load_next_page(&self) -> Option<PendingLoad> {
        let mut state = self.shared.state.lock();

        if state.closed {
            return None;
        }
        if state.in_flight {
            tracing::trace!(page = state.next_page, "Page load already in flight");
            return None;
        }
        if state.exhausted {
            tracing::trace!("List exhausted, not loading");
            return None;
        }

        let page = state.next_page;
        let generation = state.generation;

        if !self.is_connected() {
            tracing::warn!(page, "No connectivity reported, requesting page anyway");
        }

        state.in_flight = true;
        self.shared.publish(&state);

        let client = Arc::clone(&self.client);
        let shared = Arc::clone(&self.shared);
        let handle = tokio::spawn(async move {
            let result = client.fetch_page(page).await;
            shared.apply(generation, page, result)
        });
        state.pending = Some(handle.abort_handle());

        tracing::debug!(page, client = self.client.name(), "Requesting page");
        Some(PendingLoad::new(page, handle))
    }

    /// End this controller's lifetime
    ///
    /// Aborts any outstanding request. Further loads are no-ops. Called
    /// automatically on drop.
    pub fn close(&self) {
        let mut state = self.shared.state.lock();
        if state.closed {
            return;
        }

        state.closed = true;
        state.abandon_pending();
        self.shared.publish(&state);
        tracing::debug!("List controller closed");
    }

    /// Subscribe to state changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot> {
        self.shared.tx.subscribe()
    }

    /// Current state
    #[must_use]
    pub fn snapshot(&self) -> ListSnapshot {
        self.shared.state.lock().snapshot()
    }

    /// Accumulated items
    #[must_use]
    pub fn items(&self) -> Vec<CatalogItem> {
        self.shared.state.lock().items.clone()
    }

    /// Number of accumulated items
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.state.lock().items.len()
    }

    /// Whether no items have been accumulated
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shared.state.lock().items.is_empty()
    }

    /// Whether a request is outstanding
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.shared.state.lock().in_flight
    }

    /// Whether the last page has been seen
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.shared.state.lock().exhausted
    }

    /// Cursor: next page number to request
    #[must_use]
    pub fn next_page(&self) -> u32 {
        self.shared.state.lock().next_page
    }

    /// Derived phase
    #[must_use]
    pub fn phase(&self) -> ListPhase {
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

impl<C: CatalogClient + ?Sized + 'static> Drop for PaginationController<C> {
    fn drop(&mut self) {
        self.close();
    }
}
