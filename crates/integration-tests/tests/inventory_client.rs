//! HTTP inventory client against a local fake of the inventory API.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use rocketshoes_cart::{
    CartManager, ChannelNotifier, InventoryClient, InventoryConfig, InventoryError,
    InventoryService, Notice,
};
use rocketshoes_core::{Cart, ProductId};
use rocketshoes_integration_tests::{Catalog, spawn_inventory_api, unused_local_addr};
use rust_decimal::Decimal;

fn catalog() -> Arc<Catalog> {
    Arc::new(
        Catalog::new()
            .with_product(1, "Tênis de Caminhada Leve Confortável", 17990, 3)
            .with_product(3, "Tênis Adidas Duramo Lite 2.0", 21990, 0),
    )
}

async fn client_for(catalog: &Arc<Catalog>) -> InventoryClient {
    let base_url = spawn_inventory_api(Arc::clone(catalog)).await.unwrap();
    let config = InventoryConfig::new(&base_url, Duration::from_secs(300)).unwrap();
    InventoryClient::new(&config).unwrap()
}

#[tokio::test]
async fn test_fetches_stock() {
    let catalog = catalog();
    let client = client_for(&catalog).await;

    let stock = client.stock(ProductId::new(1)).await.unwrap();
    assert_eq!(stock.id, ProductId::new(1));
    assert_eq!(stock.amount, 3);

    let empty = client.stock(ProductId::new(3)).await.unwrap();
    assert_eq!(empty.amount, 0);
}

#[tokio::test]
async fn test_fetches_product() {
    let catalog = catalog();
    let client = client_for(&catalog).await;

    let product = client.product(ProductId::new(1)).await.unwrap();
    assert_eq!(product.title, "Tênis de Caminhada Leve Confortável");
    assert_eq!(product.price, Decimal::new(17990, 2));
    assert_eq!(
        product.image,
        "https://rocketseat-cdn.s3-sa-east-1.amazonaws.com/1.jpg"
    );
}

#[tokio::test]
async fn test_product_is_cached_and_stock_is_not() {
    let catalog = catalog();
    let client = client_for(&catalog).await;

    client.product(ProductId::new(1)).await.unwrap();
    client.product(ProductId::new(1)).await.unwrap();
    assert_eq!(catalog.product_requests(), 1);

    catalog.set_stock(1, 7);
    client.stock(ProductId::new(1)).await.unwrap();
    let stock = client.stock(ProductId::new(1)).await.unwrap();
    assert_eq!(stock.amount, 7);
    assert_eq!(catalog.stock_requests(), 2);
}

#[tokio::test]
async fn test_unknown_product_is_status_error() {
    let catalog = catalog();
    let client = client_for(&catalog).await;

    let err = client.stock(ProductId::new(42)).await.unwrap_err();
    assert!(
        matches!(&err, InventoryError::Status { status: 404, path } if path == "stock/42"),
        "unexpected error: {err:?}"
    );

    let err = client.product(ProductId::new(42)).await.unwrap_err();
    assert!(matches!(err, InventoryError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let catalog = catalog();
    catalog.break_product(1);
    let client = client_for(&catalog).await;

    let err = client.product(ProductId::new(1)).await.unwrap_err();
    assert!(matches!(err, InventoryError::Parse(_)), "unexpected error: {err:?}");
}

#[tokio::test]
async fn test_unreachable_api_is_http_error() {
    let addr = unused_local_addr().await.unwrap();
    let config = InventoryConfig::new(&format!("http://{addr}"), Duration::from_secs(300)).unwrap();
    let client = InventoryClient::new(&config).unwrap();

    let err = client.stock(ProductId::new(1)).await.unwrap_err();
    assert!(matches!(err, InventoryError::Http(_)), "unexpected error: {err:?}");
}

#[tokio::test]
async fn test_manager_over_http() {
    let catalog = catalog();
    let client = client_for(&catalog).await;
    let (notifier, mut notices) = ChannelNotifier::new();
    let cart = CartManager::new(client, notifier, Cart::new());

    for _ in 0..4 {
        cart.add_product(ProductId::new(1)).await;
    }
    cart.add_product(ProductId::new(3)).await;
    cart.add_product(ProductId::new(42)).await;

    let snapshot = cart.cart();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.amount_of(ProductId::new(1)), 3);
    assert_eq!(catalog.product_requests(), 1);

    let mut received = Vec::new();
    while let Ok(notice) = notices.try_recv() {
        received.push(notice);
    }
    assert_eq!(
        received,
        vec![Notice::OutOfStock, Notice::OutOfStock, Notice::AddFailed]
    );
}

#[tokio::test]
async fn test_manager_metadata_failure_reports_add_failed() {
    let catalog = catalog();
    catalog.break_product(1);
    let client = client_for(&catalog).await;
    let (notifier, mut notices) = ChannelNotifier::new();
    let cart = CartManager::new(client, notifier, Cart::new());

    cart.add_product(ProductId::new(1)).await;

    // Stock was fine, only the metadata fetch failed
    assert_eq!(catalog.stock_requests(), 1);
    assert!(cart.cart().is_empty());
    assert_eq!(notices.try_recv().unwrap(), Notice::AddFailed);
    assert!(notices.try_recv().is_err());
}
