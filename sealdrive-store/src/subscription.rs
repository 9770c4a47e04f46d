//! Live query handles.

use crate::document::StoredDocument;
use crate::error::{StoreError, StoreResult};
use tokio::sync::watch;

/// Full result set of a live query at one point in time.
pub type Snapshot = Vec<StoredDocument>;

type OnCancel = Box<dyn FnOnce() + Send + Sync>;

/// A cancellable live query.
///
/// Every update carries the complete result set, so consumers rebuild their
/// view from [`latest`](Self::latest) rather than applying deltas. Dropping
/// the handle unsubscribes.
pub struct Subscription {
    rx: watch::Receiver<Snapshot>,
    on_cancel: Option<OnCancel>,
}

impl Subscription {
    /// Wraps a watch receiver. `on_cancel` runs once, when the handle is
    /// cancelled or dropped.
    pub fn new(
        rx: watch::Receiver<Snapshot>,
        on_cancel: impl FnOnce() + Send + Sync + 'static,
    ) -> Self {
        Self {
            rx,
            on_cancel: Some(Box::new(on_cancel)),
        }
    }

    /// Returns the most recent snapshot.
    pub fn latest(&self) -> Snapshot {
        self.rx.borrow().clone()
    }

    /// Waits for the next update and returns the new snapshot.
    ///
    /// Fails with `Unavailable` once the store has closed the query.
    pub async fn changed(&mut self) -> StoreResult<Snapshot> {
        self.rx
            .changed()
            .await
            .map_err(|_| StoreError::Unavailable("subscription closed".to_string()))?;
        Ok(self.rx.borrow_and_update().clone())
    }

    /// Releases the query.
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(on_cancel) = self.on_cancel.take() {
            on_cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("documents", &self.rx.borrow().len())
            .finish()
    }
}
