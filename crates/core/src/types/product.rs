//! Catalog metadata and stock levels as returned by the inventory API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::id::ProductId;

/// Product metadata from the catalog.
///
/// The inventory API may return more fields than the cart cares about; those
/// are kept in `extra` so they survive a round trip through storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    /// Unit price. Accepted from JSON numbers or strings, written as a string.
    pub price: Decimal,
    #[serde(default)]
    pub image: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    /// Create a product with no extra metadata.
    #[must_use]
    pub fn new(id: ProductId, title: impl Into<String>, price: Decimal, image: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            price,
            image: image.into(),
            extra: Map::new(),
        }
    }
}

/// Available quantity for a product.
///
/// Consulted on every quantity change and never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub id: ProductId,
    pub amount: i64,
}

impl Stock {
    /// Whether `requested` units fit in the available stock.
    #[must_use]
    pub const fn covers(&self, requested: i64) -> bool {
        requested <= self.amount
    }
}
