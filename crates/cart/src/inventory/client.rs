//! HTTP client for the inventory API.
//!
//! Uses `reqwest` for HTTP. Product metadata is cached with `moka`; stock is
//! always fetched fresh since it is what every quantity change is checked
//! against.

use std::sync::Arc;

use moka::future::Cache;
use rocketshoes_core::{Product, ProductId, Stock};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::{InventoryError, InventoryService};
use crate::config::InventoryConfig;

/// Client for the inventory API.
///
/// Cheap to clone; clones share the connection pool and product cache.
#[derive(Clone)]
pub struct InventoryClient {
    inner: Arc<InventoryClientInner>,
}

struct InventoryClientInner {
    client: reqwest::Client,
    base_url: Url,
    products: Cache<ProductId, Product>,
}

impl InventoryClient {
    /// Create a new inventory client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &InventoryConfig) -> Result<Self, InventoryError> {
        let products = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.product_cache_ttl)
            .build();

        let client = reqwest::Client::builder()
            .user_agent(concat!("rocketshoes-cart/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(InventoryClientInner {
                client,
                base_url: config.base_url.clone(),
                products,
            }),
        })
    }

    /// GET a JSON document relative to the base URL.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, InventoryError> {
        let url = self.inner.base_url.join(path)?;

        let response = self
            .inner
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                path,
                body = %response_text.chars().take(200).collect::<String>(),
                "Inventory API returned non-success status"
            );
            return Err(InventoryError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                path,
                body = %response_text.chars().take(200).collect::<String>(),
                "Failed to parse inventory response"
            );
            InventoryError::Parse(e)
        })
    }
}

impl InventoryService for InventoryClient {
    #[instrument(skip(self), fields(product_id = %id))]
    async fn stock(&self, id: ProductId) -> Result<Stock, InventoryError> {
        let stock: Stock = self.get_json(&format!("stock/{id}")).await?;
        debug!(amount = stock.amount, "Fetched stock");
        Ok(stock)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn product(&self, id: ProductId) -> Result<Product, InventoryError> {
        if let Some(product) = self.inner.products.get(&id).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let product: Product = self.get_json(&format!("products/{id}")).await?;

        self.inner.products.insert(id, product.clone()).await;

        Ok(product)
    }
}
