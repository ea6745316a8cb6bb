//! Integration tests for the RocketShoes cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocketshoes-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_flow` - Cart Manager operations, notices, and restarts
//! - `inventory_client` - HTTP inventory client against a fake API
//!
//! # Fixtures
//!
//! [`Catalog`] is an in-memory inventory. It implements
//! [`InventoryService`] directly and can also be served over HTTP with
//! [`spawn_inventory_api`], so the same fixture drives both the manager tests
//! and the HTTP client tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use rocketshoes_cart::{InventoryError, InventoryService};
use rocketshoes_core::{Product, ProductId, Stock};
use rust_decimal::Decimal;

/// In-memory catalog with stock levels.
#[derive(Debug, Default)]
pub struct Catalog {
    products: Mutex<HashMap<ProductId, Product>>,
    stock: Mutex<HashMap<ProductId, i64>>,
    malformed: Mutex<HashSet<ProductId>>,
    product_requests: AtomicUsize,
    stock_requests: AtomicUsize,
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product priced at `cents` with `stock` units available.
    #[must_use]
    pub fn with_product(self, id: i32, title: &str, cents: i64, stock: i64) -> Self {
        let id = ProductId::new(id);
        let product = Product::new(
            id,
            title,
            Decimal::new(cents, 2),
            format!("https://rocketseat-cdn.s3-sa-east-1.amazonaws.com/{id}.jpg"),
        );
        lock(&self.products).insert(id, product);
        lock(&self.stock).insert(id, stock);
        self
    }

    /// Change the available stock of a product.
    pub fn set_stock(&self, id: i32, amount: i64) {
        lock(&self.stock).insert(ProductId::new(id), amount);
    }

    /// Make the HTTP API answer `200` with a body that is not JSON for this
    /// product.
    pub fn break_product(&self, id: i32) {
        lock(&self.malformed).insert(ProductId::new(id));
    }

    /// Number of product metadata lookups served.
    pub fn product_requests(&self) -> usize {
        self.product_requests.load(Ordering::SeqCst)
    }

    /// Number of stock lookups served.
    pub fn stock_requests(&self) -> usize {
        self.stock_requests.load(Ordering::SeqCst)
    }

    fn lookup_stock(&self, id: ProductId) -> Option<Stock> {
        self.stock_requests.fetch_add(1, Ordering::SeqCst);
        lock(&self.stock)
            .get(&id)
            .map(|&amount| Stock { id, amount })
    }

    fn lookup_product(&self, id: ProductId) -> Option<Product> {
        self.product_requests.fetch_add(1, Ordering::SeqCst);
        lock(&self.products).get(&id).cloned()
    }

    fn is_malformed(&self, id: ProductId) -> bool {
        lock(&self.malformed).contains(&id)
    }
}

impl InventoryService for Catalog {
    async fn stock(&self, id: ProductId) -> Result<Stock, InventoryError> {
        // Suspend like a network call would
        tokio::task::yield_now().await;
        self.lookup_stock(id).ok_or_else(|| not_found("stock", id))
    }

    async fn product(&self, id: ProductId) -> Result<Product, InventoryError> {
        tokio::task::yield_now().await;
        self.lookup_product(id).ok_or_else(|| not_found("products", id))
    }
}

fn not_found(resource: &str, id: ProductId) -> InventoryError {
    InventoryError::Status {
        status: 404,
        path: format!("{resource}/{id}"),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Fake inventory API
// =============================================================================

/// Serve `catalog` over HTTP on a random local port.
///
/// Returns the base URL (with trailing slash). The server runs until the
/// test's runtime shuts down.
///
/// # Errors
///
/// Returns an error if no local port can be bound.
pub async fn spawn_inventory_api(catalog: Arc<Catalog>) -> std::io::Result<String> {
    let app = Router::new()
        .route("/stock/{id}", get(stock_handler))
        .route("/products/{id}", get(product_handler))
        .with_state(catalog);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(format!("http://{addr}/"))
}

/// An address nothing listens on.
///
/// # Errors
///
/// Returns an error if no local port can be bound.
pub async fn unused_local_addr() -> std::io::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    listener.local_addr()
}

async fn stock_handler(State(catalog): State<Arc<Catalog>>, Path(id): Path<i32>) -> Response {
    let id = ProductId::new(id);
    match catalog.lookup_stock(id) {
        Some(stock) => Json(stock).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn product_handler(State(catalog): State<Arc<Catalog>>, Path(id): Path<i32>) -> Response {
    let id = ProductId::new(id);
    if catalog.is_malformed(id) {
        return (StatusCode::OK, "<html>oops</html>").into_response();
    }
    match catalog.lookup_product(id) {
        Some(product) => Json(product).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Path of a storage file inside `dir`, one level down so the store has to
/// create its parent directory.
#[must_use]
pub fn storage_path(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join(".rocketshoes").join("storage.json")
}
