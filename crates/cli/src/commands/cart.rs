//! Cart commands.
//!
//! # Environment Variables
//!
//! - `ROCKETSHOES_API_URL` - Inventory API base URL
//! - `ROCKETSHOES_STORAGE_PATH` - Local storage file holding the cart
//! - `ROCKETSHOES_CART_KEY` - Storage key for the cart snapshot

use std::io::Write;

use rocketshoes_cart::{
    CartConfig, ChannelNotifier, FileStore, InventoryClient, InventoryError, Notice,
};
use rocketshoes_core::{Cart, format_price};
use thiserror::Error;

use crate::Commands;

/// Errors that stop a command before it reaches the cart.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Inventory client could not be built.
    #[error("Inventory client error: {0}")]
    Inventory(#[from] InventoryError),

    /// Persister task panicked or was cancelled.
    #[error("Persister task failed: {0}")]
    Persister(#[from] tokio::task::JoinError),

    /// Writing output failed.
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run one cart command against the configured inventory API and storage.
///
/// Notices raised by the operation are printed before the cart.
///
/// # Errors
///
/// Returns an error if setup fails or output cannot be written. Rejected
/// cart operations are not errors.
pub async fn run(config: &CartConfig, command: Commands) -> Result<(), CommandError> {
    let inventory = InventoryClient::new(&config.inventory)?;
    let store = FileStore::new(&config.storage_path);
    let (notifier, mut notices) = ChannelNotifier::new();

    tracing::debug!(path = %store.path().display(), "Opening cart storage");
    let (cart, persister) = rocketshoes_cart::start(inventory, notifier, store, &config.cart_key);

    match command {
        Commands::Show => {}
        Commands::Add { product_id } => cart.add_product(product_id).await,
        Commands::Remove { product_id } => cart.remove_product(product_id),
        Commands::Update { product_id, amount } => {
            cart.update_product_amount(product_id, amount).await;
        }
    }

    let snapshot = cart.cart();

    // Dropping the last handle lets the persister flush and exit
    drop(cart);
    persister.await?;

    let mut received = Vec::new();
    while let Ok(notice) = notices.try_recv() {
        received.push(notice);
    }

    let mut stdout = std::io::stdout().lock();
    render_notices(&received, &mut stdout)?;
    render_cart(&snapshot, &mut stdout)?;
    Ok(())
}

fn render_notices(notices: &[Notice], out: &mut impl Write) -> std::io::Result<()> {
    for notice in notices {
        writeln!(out, "! {notice}")?;
    }
    Ok(())
}

/// Write the cart as a table followed by its totals.
fn render_cart(cart: &Cart, out: &mut impl Write) -> std::io::Result<()> {
    if cart.is_empty() {
        return writeln!(out, "Cart is empty");
    }

    for item in cart {
        writeln!(
            out,
            "{:>6}  {:<40}  {:>4} x {:>10}  {:>11}",
            format!("#{}", item.id()),
            item.product.title,
            item.amount,
            format_price(item.product.price),
            format_price(item.subtotal()),
        )?;
    }

    let summary = cart.summary();
    writeln!(
        out,
        "{} product(s), {} unit(s), subtotal {}",
        summary.products,
        summary.units,
        format_price(summary.subtotal)
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rocketshoes_core::{CartLineItem, Product, ProductId};
    use rust_decimal::Decimal;

    use super::*;

    fn rendered(cart: &Cart) -> String {
        let mut out = Vec::new();
        render_cart(cart, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_render_empty_cart() {
        assert_eq!(rendered(&Cart::new()), "Cart is empty\n");
    }

    #[test]
    fn test_render_cart_lines_and_totals() {
        let cart = Cart::from(vec![
            CartLineItem::new(
                Product::new(ProductId::new(1), "Tênis de Caminhada", Decimal::new(1799, 1), ""),
                2,
            ),
            CartLineItem::new(
                Product::new(ProductId::new(3), "Tênis VR", Decimal::new(13990, 2), ""),
                1,
            ),
        ]);

        let output = rendered(&cart);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("#1"));
        assert!(lines[0].contains("$359.80"));
        assert!(lines[1].contains("Tênis VR"));
        assert_eq!(lines[2], "2 product(s), 3 unit(s), subtotal $499.70");
    }

    #[test]
    fn test_render_notices() {
        let mut out = Vec::new();
        render_notices(&[Notice::OutOfStock, Notice::RemoveFailed], &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "! Requested quantity is out of stock\n! Failed to remove product\n"
        );
    }
}
