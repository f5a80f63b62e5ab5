//! Product catalog service client.
//!
//! Catalog reads are cached in-memory via `moka` (5-minute TTL); writes
//! invalidate the affected entries.

use std::time::Duration;

use moka::future::Cache;
use prism_core::ProductId;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, instrument};
use url::Url;

use super::{ApiError, ServiceClient};
use crate::local::LocalStore;
use crate::models::Product;

const CACHE_CAPACITY: u64 = 1000;
const CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
enum CacheValue {
    Product(Box<Product>),
    Products(Vec<Product>),
}

/// A new product to publish to the catalog (admin screen).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    pub image: String,
    pub description: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sizes: Option<Vec<String>>,
}

/// Client for the product catalog service.
#[derive(Clone)]
pub struct ProductClient {
    inner: ServiceClient,
    cache: Cache<String, CacheValue>,
}

impl ProductClient {
    /// Create a new product service client.
    #[must_use]
    pub fn new(base: Url, local: LocalStore) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();
        Self {
            inner: ServiceClient::new(base, local),
            cache,
        }
    }

    /// Get the full product catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Product>, ApiError> {
        let cache_key = "products:all".to_string();

        if let Some(CacheValue::Products(products)) = self.cache.get(&cache_key).await {
            debug!("Cache hit for product list");
            return Ok(products);
        }

        let products: Vec<Product> = self.inner.get_json("/api/products").await?;
        self.cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    /// Get a single product by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the API request
    /// fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get(&self, product_id: &ProductId) -> Result<Product, ApiError> {
        let cache_key = format!("product:{product_id}");

        if let Some(CacheValue::Product(product)) = self.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let path = format!("/api/products/{}", urlencoding::encode(product_id.as_str()));
        let product: Product = match self.inner.get_json(&path).await {
            Ok(product) => product,
            Err(ApiError::Api { status: 404, .. }) => {
                return Err(ApiError::NotFound(format!("product {product_id}")));
            }
            Err(err) => return Err(err),
        };

        self.cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// Publish a new product to the catalog.
    ///
    /// Invalidates the cached listing so the next read sees it.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create(&self, product: &NewProduct) -> Result<Product, ApiError> {
        let created: Product = self.inner.post_json("/api/products", product).await?;
        self.cache.invalidate(&"products:all".to_string()).await;
        Ok(created)
    }

    /// Drop all cached catalog data.
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}
