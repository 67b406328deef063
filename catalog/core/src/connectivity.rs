//! Network Reachability Observation
//!
//! [`ConnectivityObserver`] holds a single reachability flag for the lifetime
//! of the process and pushes changes to anyone subscribed. It is a cheap
//! cloneable handle: create one at startup and hand clones to every screen
//! that needs it.
//!
//! # Event Model
//!
//! ```text
//!   platform ──NetworkEvent──► handle_event ──► watch<bool> ──► subscribers
//!                                  │
//!                       Lost ──► probe.has_internet()
//! ```
//!
//! - The initial value is read synchronously from a [`ReachabilityProbe`].
//! - `Available` sets the flag.
//! - `Lost` refers to one network going away, so the probe is queried again
//!   rather than assuming the device is offline.
//!
//! There is no polling and no retry. Being offline is a value, not an error.
//! The flag is advisory: fetch layers read it for display but still issue
//! requests while it is `false`.

use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Default address used to check for a route to the internet
pub const DEFAULT_PROBE_ADDRESS: &str = "1.1.1.1:53";

// ============================================================================
// Probes
// ============================================================================

/// Snapshot query against the platform's current network capability
pub trait ReachabilityProbe: Send + Sync {
    /// Whether an internet-capable network is currently available
    fn has_internet(&self) -> bool;
}

/// Probe backed by the OS routing table
///
/// "Connecting" an unbound UDP socket only resolves a route; no packet leaves
/// the host. The call fails with `ENETUNREACH` when no interface can reach the
/// target.
#[derive(Clone, Debug)]
pub struct RouteProbe {
    target: SocketAddr,
}

impl RouteProbe {
    /// Create a probe that checks for a route to `target`
    #[must_use]
    pub fn new(target: SocketAddr) -> Self {
        Self { target }
    }

    /// The address routes are resolved against
    #[must_use]
    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

impl ReachabilityProbe for RouteProbe {
    fn has_internet(&self) -> bool {
        let local = if self.target.is_ipv4() {
            "0.0.0.0:0"
        } else {
            "[::]:0"
        };

        match UdpSocket::bind(local).and_then(|socket| socket.connect(self.target)) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(target_addr = %self.target, error = %e, "No route to probe address");
                false
            }
        }
    }
}

/// Probe with a value set by hand
///
/// Clones share the same flag, so a test can keep one clone and flip it after
/// handing the other to an observer.
#[derive(Clone, Debug, Default)]
pub struct StaticProbe {
    value: Arc<AtomicBool>,
}

impl StaticProbe {
    /// Create a probe reporting `value`
    #[must_use]
    pub fn new(value: bool) -> Self {
        Self {
            value: Arc::new(AtomicBool::new(value)),
        }
    }

    /// Change the reported value
    pub fn set(&self, value: bool) {
        self.value.store(value, Ordering::SeqCst);
    }
}

impl ReachabilityProbe for StaticProbe {
    fn has_internet(&self) -> bool {
        self.value.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Observer
// ============================================================================

/// Platform network callback
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NetworkEvent {
    /// An internet-capable network became available
    Available,
    /// A network was lost (others may remain)
    Lost,
}

struct ObserverInner {
    probe: Arc<dyn ReachabilityProbe>,
    tx: watch::Sender<bool>,
}

/// Process-wide reachability flag with change notification
#[derive(Clone)]
pub struct ConnectivityObserver {
    inner: Arc<ObserverInner>,
}

impl std::fmt::Debug for ConnectivityObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectivityObserver")
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

impl ConnectivityObserver {
    /// Create an observer, reading the initial value from `probe`
    pub fn new<P: ReachabilityProbe + 'static>(probe: P) -> Self {
        Self::from_shared(Arc::new(probe))
    }

    /// Create an observer around an already shared probe
    #[must_use]
    pub fn from_shared(probe: Arc<dyn ReachabilityProbe>) -> Self {
        let initial = probe.has_internet();
        tracing::debug!(connected = initial, "Connectivity observer created");

        Self {
            inner: Arc::new(ObserverInner {
                probe,
                tx: watch::Sender::new(initial),
            }),
        }
    }

    /// Current reachability
    #[must_use]
    pub fn is_connected(&self) -> bool {
        *self.inner.tx.borrow()
    }

    /// Subscribe to changes
    ///
    /// The receiver starts with the current value marked as seen. Dropping it
    /// unsubscribes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.inner.tx.subscribe()
    }

    /// Run `callback` with every new value until the returned
    /// [`Subscription`] is dropped or cancelled
    ///
    /// Must be called from within a tokio runtime.
    pub fn on_change<F>(&self, mut callback: F) -> Subscription
    where
        F: FnMut(bool) + Send + 'static,
    {
        let mut rx = self.subscribe();
        let handle = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let connected = *rx.borrow_and_update();
                callback(connected);
            }
        });

        Subscription { handle }
    }

    /// Apply a platform network callback
    ///
    /// Returns `true` if the flag changed. Subscribers are only woken on a
    /// change.
    ///
    /// `Lost` queries the probe on the calling thread, which may block. From
    /// async code, feed events through [`attach`](Self::attach) instead.
    pub fn handle_event(&self, event: NetworkEvent) -> bool {
        let connected = match event {
            NetworkEvent::Available => true,
            NetworkEvent::Lost => self.inner.probe.has_internet(),
        };

        self.set_connected(connected, event)
    }

    /// Feed platform events from `events` into this observer
    ///
    /// Events are applied one at a time in arrival order. Probe queries run
    /// on the blocking pool. The task ends when every sender is dropped.
    pub fn attach(&self, mut events: mpsc::Receiver<NetworkEvent>) -> JoinHandle<()> {
        let observer = self.clone();
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                let connected = match event {
                    NetworkEvent::Available => true,
                    NetworkEvent::Lost => {
                        let probe = Arc::clone(&observer.inner.probe);
                        match tokio::task::spawn_blocking(move || probe.has_internet()).await {
                            Ok(connected) => connected,
                            Err(e) => {
                                tracing::warn!(
                                    error = %e,
                                    "Reachability probe failed, keeping last value"
                                );
                                continue;
                            }
                        }
                    }
                };
                observer.set_connected(connected, event);
            }
            tracing::debug!("Network event source closed");
        })
    }

    fn set_connected(&self, connected: bool, event: NetworkEvent) -> bool {
        let changed = self.inner.tx.send_if_modified(|current| {
            if *current == connected {
                false
            } else {
                *current = connected;
                true
            }
        });

        if changed {
            tracing::info!(connected, event = ?event, "Connectivity changed");
        } else {
            tracing::trace!(connected, event = ?event, "Connectivity unchanged");
        }

        changed
    }
}

/// Handle for an [`ConnectivityObserver::on_change`] callback
///
/// Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    handle: JoinHandle<()>,
}

impl Subscription {
    /// Stop receiving callbacks
    pub fn cancel(self) {
        self.handle.abort();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_initial_value_from_probe() {
        assert!(ConnectivityObserver::new(StaticProbe::new(true)).is_connected());
        assert!(!ConnectivityObserver::new(StaticProbe::new(false)).is_connected());
    }

    #[test]
    fn test_available_sets_connected() {
        let observer = ConnectivityObserver::new(StaticProbe::new(false));

        assert!(observer.handle_event(NetworkEvent::Available));
        assert!(observer.is_connected());

        // Already connected: no change
        assert!(!observer.handle_event(NetworkEvent::Available));
    }

    #[test]
    fn test_lost_requeries_probe() {
        let probe = StaticProbe::new(true);
        let observer = ConnectivityObserver::new(probe.clone());

        // Another network is still up
        assert!(!observer.handle_event(NetworkEvent::Lost));
        assert!(observer.is_connected());

        probe.set(false);
        assert!(observer.handle_event(NetworkEvent::Lost));
        assert!(!observer.is_connected());
    }

    #[test]
    fn test_subscribers_only_see_changes() {
        let probe = StaticProbe::new(true);
        let observer = ConnectivityObserver::new(probe.clone());
        let mut rx = observer.subscribe();

        observer.handle_event(NetworkEvent::Available);
        assert!(!rx.has_changed().unwrap());

        probe.set(false);
        observer.handle_event(NetworkEvent::Lost);
        assert!(rx.has_changed().unwrap());
        assert!(!*rx.borrow_and_update());
    }

    #[test]
    fn test_clones_share_state() {
        let observer = ConnectivityObserver::new(StaticProbe::new(false));
        let clone = observer.clone();

        observer.handle_event(NetworkEvent::Available);
        assert!(clone.is_connected());
    }

    #[tokio::test]
    async fn test_on_change_callback_and_cancel() {
        let probe = StaticProbe::new(true);
        let observer = ConnectivityObserver::new(probe.clone());
        let (tx, mut rx) = mpsc::unbounded_channel();

        let subscription = observer.on_change(move |connected| {
            let _ = tx.send(connected);
        });

        probe.set(false);
        observer.handle_event(NetworkEvent::Lost);
        let seen = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap();
        assert_eq!(seen, Some(false));

        subscription.cancel();
        observer.handle_event(NetworkEvent::Available);

        // Sender lives in the aborted task, so the channel closes
        let after = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap();
        assert_eq!(after, None);
    }

    #[tokio::test]
    async fn test_attach_applies_events_in_order() {
        let probe = StaticProbe::new(false);
        let observer = ConnectivityObserver::new(probe);
        let (tx, rx) = mpsc::channel(8);

        let task = observer.attach(rx);
        tx.send(NetworkEvent::Available).await.unwrap();
        tx.send(NetworkEvent::Lost).await.unwrap();
        drop(tx);
        task.await.unwrap();

        // Lost re-queried the probe, which reports offline
        assert!(!observer.is_connected());
    }

    /// Records which thread each query ran on
    struct ThreadRecordingProbe {
        threads: parking_lot::Mutex<Vec<std::thread::ThreadId>>,
    }

    impl ReachabilityProbe for ThreadRecordingProbe {
        fn has_internet(&self) -> bool {
            self.threads.lock().push(std::thread::current().id());
            false
        }
    }

    #[tokio::test]
    async fn test_attach_queries_probe_off_the_runtime_thread() {
        let probe = Arc::new(ThreadRecordingProbe {
            threads: parking_lot::Mutex::new(Vec::new()),
        });
        let observer = ConnectivityObserver::from_shared(probe.clone());
        let (tx, rx) = mpsc::channel(4);

        observer.handle_event(NetworkEvent::Available);
        let task = observer.attach(rx);
        tx.send(NetworkEvent::Lost).await.unwrap();
        drop(tx);
        task.await.unwrap();

        assert!(!observer.is_connected());
        let threads = probe.threads.lock().clone();
        // Construction queried inline; the attached Lost did not
        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0], std::thread::current().id());
        assert_ne!(threads[1], std::thread::current().id());
    }

    #[test]
    fn test_route_probe_loopback() {
        let probe = RouteProbe::new("127.0.0.1:9".parse().unwrap());
        assert!(probe.has_internet());
        assert_eq!(probe.target().port(), 9);
    }
}
