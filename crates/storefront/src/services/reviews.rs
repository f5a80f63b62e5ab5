//! Review service client.
//!
//! Not exercised by the checkout sequencer; product pages read and
//! write reviews directly.

use prism_core::{ProductId, ReviewId, UserId};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use url::Url;

use super::{ApiError, ServiceClient};
use crate::local::LocalStore;

/// A product review.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    pub rating: u8,
    pub comment: String,
    #[serde(default)]
    pub helpful: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// A review to submit.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub product_id: ProductId,
    pub user_id: UserId,
    pub rating: u8,
    pub comment: String,
}

/// Client for the review service.
#[derive(Debug, Clone)]
pub struct ReviewClient {
    inner: ServiceClient,
}

impl ReviewClient {
    /// Create a new review service client.
    #[must_use]
    pub fn new(base: Url, local: LocalStore) -> Self {
        Self {
            inner: ServiceClient::new(base, local),
        }
    }

    /// List reviews for a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn for_product(&self, product_id: &ProductId) -> Result<Vec<Review>, ApiError> {
        let path = format!(
            "/products/{}/reviews",
            urlencoding::encode(product_id.as_str())
        );
        self.inner.get_json(&path).await
    }

    /// Submit a review.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, review), fields(product_id = %review.product_id))]
    pub async fn create(&self, review: &NewReview) -> Result<Review, ApiError> {
        self.inner.post_json("/reviews", review).await
    }

    /// Delete a review.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(review_id = %review_id))]
    pub async fn delete(&self, review_id: &ReviewId) -> Result<(), ApiError> {
        let path = format!("/reviews/{}", urlencoding::encode(review_id.as_str()));
        self.inner.delete(&path).await
    }

    /// Mark a review as helpful.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(review_id = %review_id))]
    pub async fn mark_helpful(&self, review_id: &ReviewId) -> Result<Review, ApiError> {
        let path = format!(
            "/reviews/{}/helpful",
            urlencoding::encode(review_id.as_str())
        );
        self.inner.post_empty(&path).await
    }
}
