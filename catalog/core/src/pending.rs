//! Handles for fetches started by the paging and detail layers

use tokio::task::JoinHandle;

/// What became of a fetch once its task finished
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The response was applied to the owner's state
    Applied,
    /// The call failed; the owner only cleared its loading flag
    Failed,
    /// The result never reached the owner's state: the task was aborted, the
    /// owner was closed, or a newer request superseded this one
    Discarded,
}

impl LoadOutcome {
    /// Whether the response was applied
    #[must_use]
    pub fn is_applied(self) -> bool {
        self == Self::Applied
    }
}

/// A fetch that has been issued and not yet applied
///
/// Dropping this does not cancel the fetch; cancellation belongs to the
/// controller or loader that issued it. Callers that want to block until the
/// result has been applied (or discarded) can [`wait`](Self::wait).
#[derive(Debug)]
#[must_use = "dropping a PendingLoad detaches it; call wait() to block on the result"]
pub struct PendingLoad {
    target: u32,
    handle: JoinHandle<LoadOutcome>,
}

impl PendingLoad {
    pub(crate) fn new(target: u32, handle: JoinHandle<LoadOutcome>) -> Self {
        Self { target, handle }
    }

    /// Page number or item identifier this fetch was issued for
    #[must_use]
    pub fn target(&self) -> u32 {
        self.target
    }

    /// Whether the fetch task has finished (applied, discarded or aborted)
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the fetch to finish and report what happened to its result
    pub async fn wait(self) -> LoadOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => LoadOutcome::Discarded,
            Err(e) => {
                tracing::error!(target_id = self.target, error = %e, "Fetch task panicked");
                LoadOutcome::Discarded
            }
        }
    }
}
