//! Persist-on-change: writes each committed cart snapshot to storage.
//!
//! The persister is decoupled from the operations. It only watches the
//! manager's change channel, so every mutation path is persisted without the
//! operations knowing about storage.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument};

use crate::manager::CartSnapshot;
use crate::storage::{KeyValueStore, save_cart};

/// Writes cart snapshots under a fixed key.
pub struct CartPersister<S> {
    store: Arc<S>,
    key: String,
    changes: watch::Receiver<CartSnapshot>,
    last_written: CartSnapshot,
}

impl<S: KeyValueStore + 'static> CartPersister<S> {
    /// Create a persister for the cart behind `changes`.
    ///
    /// The snapshot current at this point is taken as already stored.
    #[must_use]
    pub fn new(store: S, key: impl Into<String>, changes: watch::Receiver<CartSnapshot>) -> Self {
        let last_written = Arc::clone(&changes.borrow());

        Self {
            store: Arc::new(store),
            key: key.into(),
            changes,
            last_written,
        }
    }

    /// Persist every new snapshot until the cart is dropped.
    ///
    /// A write is skipped when the published snapshot is the same `Arc` as
    /// the last one written. Snapshots committed in quick succession may be
    /// coalesced; the latest one is always written. Once every
    /// [`CartManager`] handle is dropped, any unseen snapshot is written and
    /// the loop ends.
    ///
    /// Writes run on the blocking pool, one at a time and in commit order.
    ///
    /// [`CartManager`]: crate::manager::CartManager
    #[instrument(skip_all, fields(key = %self.key))]
    pub async fn run(mut self) {
        while self.changes.changed().await.is_ok() {
            let snapshot = Arc::clone(&self.changes.borrow_and_update());
            if Arc::ptr_eq(&snapshot, &self.last_written) {
                continue;
            }

            self.write(Arc::clone(&snapshot)).await;
            self.last_written = snapshot;
        }

        debug!("Cart dropped, persister stopped");
    }

    /// Run the persister on the current tokio runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn write(&self, snapshot: CartSnapshot) {
        let store = Arc::clone(&self.store);
        let key = self.key.clone();
        let items = snapshot.len();

        let result =
            tokio::task::spawn_blocking(move || save_cart(&*store, &key, &snapshot)).await;

        match result {
            Ok(Ok(())) => debug!(items, "Persisted cart"),
            // Cart state is unaffected; the next change retries the write
            Ok(Err(e)) => error!(error = %e, "Failed to persist cart"),
            Err(e) => error!(error = %e, "Cart write task failed"),
        }
    }
}
