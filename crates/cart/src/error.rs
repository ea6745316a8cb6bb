//! Cart operation errors and how they are reported to the user.
//!
//! Cart operations never hand these to their caller. Each public operation
//! logs the error and turns it into a [`Notice`] via [`CartError::notice`].

use rocketshoes_core::ProductId;
use thiserror::Error;

use crate::inventory::InventoryError;
use crate::notify::Notice;

/// The cart operation an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOperation {
    Add,
    Remove,
    Update,
}

impl CartOperation {
    /// Generic failure notice for this operation.
    #[must_use]
    pub const fn failure_notice(self) -> Notice {
        match self {
            Self::Add => Notice::AddFailed,
            Self::Remove => Notice::RemoveFailed,
            Self::Update => Notice::UpdateFailed,
        }
    }
}

/// Reasons a cart operation did not change the cart.
#[derive(Debug, Error)]
pub enum CartError {
    /// Requested quantity exceeds available stock.
    #[error("Product {product_id}: requested {requested}, only {available} in stock")]
    OutOfStock {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    /// Product is not in the cart.
    #[error("Product {0} is not in the cart")]
    NotInCart(ProductId),

    /// Inventory lookup failed.
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),
}

impl CartError {
    /// Notice shown to the user when `operation` fails with this error.
    ///
    /// Stock rejections get their own message; everything else falls back to
    /// the operation's generic failure notice.
    #[must_use]
    pub const fn notice(&self, operation: CartOperation) -> Notice {
        match self {
            Self::OutOfStock { .. } => Notice::OutOfStock,
            Self::NotInCart(_) | Self::Inventory(_) => operation.failure_notice(),
        }
    }
}
