//! RocketShoes Cart - Shopping cart state for the storefront.
//!
//! # Architecture
//!
//! - [`manager`] - The Cart Manager: owns the cart, exposes add/remove/update
//! - [`inventory`] - Stock and product metadata from the inventory API
//! - [`storage`] - Key-value persistence store and cart snapshots
//! - [`persist`] - Writes each committed snapshot to the store
//! - [`notify`] - User-facing notices for rejected or failed operations
//!
//! Operations validate against the inventory, commit a new snapshot, and the
//! persister writes it out in the background. Nothing is returned to the
//! caller; outcomes are visible in the cart itself and through notices.
//!
//! # Example
//!
//! ```rust,ignore
//! use rocketshoes_cart::{CartConfig, FileStore, InventoryClient, TracingNotifier};
//!
//! let config = CartConfig::from_env()?;
//! let inventory = InventoryClient::new(&config.inventory)?;
//! let store = FileStore::new(&config.storage_path);
//!
//! let (cart, persister) = rocketshoes_cart::start(inventory, TracingNotifier, store, &config.cart_key);
//! cart.add_product(ProductId::new(1)).await;
//!
//! drop(cart);
//! persister.await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod inventory;
pub mod manager;
pub mod notify;
pub mod persist;
pub mod storage;

pub use config::{CartConfig, ConfigError, InventoryConfig};
pub use error::{CartError, CartOperation};
pub use inventory::{InventoryClient, InventoryError, InventoryService};
pub use manager::{CartManager, CartSnapshot};
pub use notify::{ChannelNotifier, Notice, Notifier, TracingNotifier};
pub use persist::CartPersister;
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError, load_cart, save_cart};

use tokio::task::JoinHandle;

/// Restore the cart stored under `key` and start persisting its changes.
///
/// Returns the manager and the persister task. The task ends, after writing
/// the final snapshot, once every clone of the manager is dropped.
///
/// Must be called from within a tokio runtime.
pub fn start<I, N, S>(
    inventory: I,
    notifier: N,
    store: S,
    key: &str,
) -> (CartManager<I, N>, JoinHandle<()>)
where
    I: InventoryService,
    N: Notifier,
    S: KeyValueStore + 'static,
{
    let manager = CartManager::restore(inventory, notifier, &store, key);
    let persister = CartPersister::new(store, key, manager.subscribe()).spawn();
    (manager, persister)
}
