//! Cart line items and the ordered cart sequence.
//!
//! A [`Cart`] serializes as a bare JSON array of line items, each line item
//! being the product metadata with an `amount` field alongside:
//!
//! ```json
//! [{"id":1,"title":"Tênis de Caminhada","price":"179.9","image":"...","amount":2}]
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::id::ProductId;
use super::price::line_subtotal;
use super::product::Product;

const AMOUNT_FIELD: &str = "amount";

/// A product in the cart together with the requested quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    #[serde(flatten)]
    pub product: Product,
    /// Requested quantity. Always at least 1 while the item is in a cart.
    pub amount: u32,
}

impl CartLineItem {
    /// Create a line item for `product`.
    ///
    /// An `amount` field the catalog may have sent along with the product is
    /// dropped; the line's own amount is the only one written out.
    #[must_use]
    pub fn new(mut product: Product, amount: u32) -> Self {
        product.extra.remove(AMOUNT_FIELD);
        Self { product, amount }
    }

    /// The product this line refers to.
    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.product.id
    }

    /// Unit price times amount.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        line_subtotal(self.product.price, self.amount)
    }
}

/// Ordered sequence of line items, unique by product.
///
/// Iteration order is the order in which products were first added.
/// Deserializing goes through [`From<Vec<CartLineItem>>`], so stored
/// snapshots get the same guarantees as carts built in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CartLineItem> {
        self.items.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find the line item for a product.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Current amount for a product, 0 when it is not in the cart.
    #[must_use]
    pub fn amount_of(&self, id: ProductId) -> u32 {
        self.get(id).map_or(0, |item| item.amount)
    }

    /// Append a line item at the end of the cart.
    ///
    /// If the product is already present its amount is replaced instead, so
    /// the cart never holds two lines for the same product.
    pub fn push(&mut self, mut item: CartLineItem) {
        item.product.extra.remove(AMOUNT_FIELD);
        match self.items.iter_mut().find(|line| line.id() == item.id()) {
            Some(line) => line.amount = item.amount,
            None => self.items.push(item),
        }
    }

    /// Set the amount of an existing line. Returns `false` if the product is
    /// not in the cart.
    pub fn set_amount(&mut self, id: ProductId, amount: u32) -> bool {
        match self.items.iter_mut().find(|item| item.id() == id) {
            Some(item) => {
                item.amount = amount;
                true
            }
            None => false,
        }
    }

    /// Remove a product's line, keeping the order of the others.
    pub fn remove(&mut self, id: ProductId) -> Option<CartLineItem> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(index))
    }

    /// Totals for display.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary {
            products: self.items.len(),
            units: self.items.iter().map(|item| u64::from(item.amount)).sum(),
            subtotal: self.items.iter().map(CartLineItem::subtotal).sum(),
        }
    }
}

/// Lines with amount 0 are dropped and repeated products collapse into the
/// first line, keeping the last amount.
impl From<Vec<CartLineItem>> for Cart {
    fn from(items: Vec<CartLineItem>) -> Self {
        let mut cart = Self::new();
        for item in items.into_iter().filter(|item| item.amount > 0) {
            cart.push(item);
        }
        cart
    }
}

impl<'de> Deserialize<'de> for Cart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<CartLineItem>::deserialize(deserializer).map(Self::from)
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartLineItem;
    type IntoIter = std::slice::Iter<'a, CartLineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Cart totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CartSummary {
    /// Number of distinct products (the header badge count).
    pub products: usize,
    /// Sum of all line amounts.
    pub units: u64,
    /// Sum of all line subtotals.
    pub subtotal: Decimal,
}
