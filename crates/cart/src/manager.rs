//! Cart Manager: the single owner of cart state.
//!
//! The current cart is an immutable snapshot (`Arc<Cart>`) published through a
//! `tokio::sync::watch` channel. Every successful operation builds the next
//! snapshot from the latest one and publishes it; readers (UI, the persister)
//! observe changes through [`CartManager::subscribe`].
//!
//! # Concurrency
//!
//! `add_product` and `update_product_amount` suspend on the inventory API.
//! Operations on the same product are serialized with a per-product async
//! lock, so overlapping adds of one product never lose an increment.
//! Operations on different products run freely; commits are applied to the
//! latest snapshot so they cannot overwrite each other.
//!
//! `remove_product` never suspends and takes no lock. If it removes a product
//! while an add or update of that product is waiting on the API, the removal
//! stands and the waiting operation reports its failure notice.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use rocketshoes_core::{Cart, CartLineItem, CartSummary, ProductId};
use tokio::sync::{OwnedMutexGuard, watch};
use tracing::{debug, info, instrument, warn};

use crate::error::{CartError, CartOperation};
use crate::inventory::InventoryService;
use crate::notify::Notifier;
use crate::storage::{KeyValueStore, load_cart};

/// Shared, immutable view of the cart at one point in time.
pub type CartSnapshot = Arc<Cart>;

/// Handle to the cart state and its three operations.
///
/// Cheap to clone; every clone drives the same cart. Hand a clone to any
/// component that needs to read or change the cart.
pub struct CartManager<I, N> {
    inner: Arc<CartManagerInner<I, N>>,
}

struct CartManagerInner<I, N> {
    inventory: I,
    notifier: N,
    state: watch::Sender<CartSnapshot>,
    locks: ProductLocks,
}

impl<I, N> Clone for CartManager<I, N> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<I: InventoryService, N: Notifier> CartManager<I, N> {
    /// Create a manager holding `initial`.
    #[must_use]
    pub fn new(inventory: I, notifier: N, initial: Cart) -> Self {
        let (state, _) = watch::channel(Arc::new(initial));

        Self {
            inner: Arc::new(CartManagerInner {
                inventory,
                notifier,
                state,
                locks: ProductLocks::default(),
            }),
        }
    }

    /// Create a manager from the snapshot stored under `key`.
    ///
    /// Starts empty if there is no snapshot or it cannot be parsed.
    #[must_use]
    pub fn restore<S: KeyValueStore + ?Sized>(
        inventory: I,
        notifier: N,
        store: &S,
        key: &str,
    ) -> Self {
        Self::new(inventory, notifier, load_cart(store, key))
    }

    /// Current cart snapshot.
    #[must_use]
    pub fn cart(&self) -> CartSnapshot {
        Arc::clone(&self.inner.state.borrow())
    }

    /// Totals of the current cart.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        self.cart().summary()
    }

    /// Receive every new snapshot as it is committed.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.inner.state.subscribe()
    }

    #[must_use]
    pub fn inventory(&self) -> &I {
        &self.inner.inventory
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Add one unit of a product.
    ///
    /// A product not yet in the cart is appended with amount 1 after its
    /// metadata is fetched. Rejections and failures are reported through the
    /// notifier; the cart is left unchanged.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_product(&self, product_id: ProductId) {
        let _guard = self.inner.locks.acquire(product_id).await;

        match self.try_add_product(product_id).await {
            Ok(amount) => info!(amount, "Added product to cart"),
            Err(e) => self.report(CartOperation::Add, &e),
        }
    }

    /// Remove a product's line from the cart.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub fn remove_product(&self, product_id: ProductId) {
        let result = self.commit(|cart| {
            cart.remove(product_id)
                .map(|_| ())
                .ok_or(CartError::NotInCart(product_id))
        });

        match result {
            Ok(()) => info!("Removed product from cart"),
            Err(e) => self.report(CartOperation::Remove, &e),
        }
    }

    /// Set a product's amount.
    ///
    /// Amounts of zero or less are ignored without a notice.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn update_product_amount(&self, product_id: ProductId, amount: i64) {
        if amount <= 0 {
            debug!(amount, "Ignoring non-positive amount");
            return;
        }

        let _guard = self.inner.locks.acquire(product_id).await;

        match self.try_update_product_amount(product_id, amount).await {
            Ok(()) => info!(amount, "Updated product amount"),
            Err(e) => self.report(CartOperation::Update, &e),
        }
    }

    async fn try_add_product(&self, product_id: ProductId) -> Result<u32, CartError> {
        let current = self.cart().amount_of(product_id);
        let stock = self.inner.inventory.stock(product_id).await?;
        let requested = current.saturating_add(1);

        if !stock.covers(i64::from(requested)) {
            return Err(CartError::OutOfStock {
                product_id,
                requested: i64::from(requested),
                available: stock.amount,
            });
        }

        if current == 0 {
            let product = self.inner.inventory.product(product_id).await?;
            self.commit(|cart| {
                cart.push(CartLineItem::new(product, 1));
                Ok(())
            })?;
        } else {
            self.commit(|cart| set_amount(cart, product_id, requested))?;
        }

        Ok(requested)
    }

    async fn try_update_product_amount(
        &self,
        product_id: ProductId,
        amount: i64,
    ) -> Result<(), CartError> {
        let stock = self.inner.inventory.stock(product_id).await?;

        let out_of_stock = || CartError::OutOfStock {
            product_id,
            requested: amount,
            available: stock.amount,
        };

        if !stock.covers(amount) {
            return Err(out_of_stock());
        }
        let amount = u32::try_from(amount).map_err(|_| out_of_stock())?;

        self.commit(|cart| set_amount(cart, product_id, amount))
    }

    /// Apply `mutate` to a copy of the latest snapshot and publish the result.
    ///
    /// Nothing is published if `mutate` fails.
    fn commit<F>(&self, mutate: F) -> Result<(), CartError>
    where
        F: FnOnce(&mut Cart) -> Result<(), CartError>,
    {
        let mut outcome = Ok(());

        self.inner.state.send_if_modified(|snapshot| {
            let mut next = (**snapshot).clone();
            match mutate(&mut next) {
                Ok(()) => {
                    *snapshot = Arc::new(next);
                    true
                }
                Err(e) => {
                    outcome = Err(e);
                    false
                }
            }
        });

        outcome
    }

    fn report(&self, operation: CartOperation, error: &CartError) {
        match error {
            CartError::Inventory(_) => warn!(?operation, error = %error, "Cart operation failed"),
            CartError::OutOfStock { .. } | CartError::NotInCart(_) => {
                info!(?operation, reason = %error, "Cart operation rejected");
            }
        }

        self.inner.notifier.notify(error.notice(operation));
    }
}

fn set_amount(cart: &mut Cart, product_id: ProductId, amount: u32) -> Result<(), CartError> {
    if cart.set_amount(product_id, amount) {
        Ok(())
    } else {
        Err(CartError::NotInCart(product_id))
    }
}

// =============================================================================
// Per-product locks
// =============================================================================

/// One async mutex per product with an operation in flight.
#[derive(Default)]
struct ProductLocks {
    locks: Mutex<HashMap<ProductId, Arc<tokio::sync::Mutex<()>>>>,
}

impl ProductLocks {
    async fn acquire(&self, product_id: ProductId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            // Entries only referenced by the map are idle
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(product_id).or_default())
        };

        lock.lock_owned().await
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
