//! Inventory Query Service: stock levels and product metadata.
//!
//! # Endpoints
//!
//! - `GET {base}/stock/{id}` - `{ "id": 1, "amount": 3 }`
//! - `GET {base}/products/{id}` - `{ "id": 1, "title": "...", "price": 179.9, "image": "..." }`
//!
//! Any non-2xx status is treated as a failure; error bodies are not
//! interpreted.
//!
//! # Example
//!
//! ```rust,ignore
//! use rocketshoes_cart::inventory::{InventoryClient, InventoryService};
//!
//! let client = InventoryClient::new(&config.inventory)?;
//! let stock = client.stock(ProductId::new(1)).await?;
//! ```

mod client;

pub use client::InventoryClient;

use std::future::Future;
use std::sync::Arc;

use rocketshoes_core::{Product, ProductId, Stock};
use thiserror::Error;

/// Errors that can occur when querying the inventory API.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API answered with a non-success status.
    #[error("Inventory API returned {status} for {path}")]
    Status { status: u16, path: String },

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Request URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Read-only view of the catalog and its stock levels.
///
/// Implemented by [`InventoryClient`] for the HTTP API; tests provide
/// in-memory implementations.
pub trait InventoryService: Send + Sync {
    /// Current available quantity for a product.
    fn stock(&self, id: ProductId) -> impl Future<Output = Result<Stock, InventoryError>> + Send;

    /// Catalog metadata for a product.
    fn product(&self, id: ProductId)
    -> impl Future<Output = Result<Product, InventoryError>> + Send;
}

impl<T: InventoryService> InventoryService for Arc<T> {
    fn stock(&self, id: ProductId) -> impl Future<Output = Result<Stock, InventoryError>> + Send {
        (**self).stock(id)
    }

    fn product(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<Product, InventoryError>> + Send {
        (**self).product(id)
    }
}
