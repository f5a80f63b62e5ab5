//! Shipping service client.

use prism_core::{OrderId, TrackingNumber, UserId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;
use url::Url;

use super::{ApiError, ServiceClient};
use crate::local::LocalStore;

/// A shipment creation request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentRequest {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub carrier: String,
    pub service: String,
    pub to_address: String,
}

/// One tracking event on a shipment's timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingEvent {
    pub status: String,
    pub message: String,
    #[serde(default)]
    pub location: String,
    pub timestamp: String,
}

/// Client for the shipping service.
#[derive(Debug, Clone)]
pub struct ShippingClient {
    inner: ServiceClient,
}

impl ShippingClient {
    /// Create a new shipping service client.
    #[must_use]
    pub fn new(base: Url, local: LocalStore) -> Self {
        Self {
            inner: ServiceClient::new(base, local),
        }
    }

    /// Create a shipment for an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, request), fields(order_id = %request.order_id))]
    pub async fn create_shipment(&self, request: &ShipmentRequest) -> Result<Value, ApiError> {
        self.inner
            .post_json("/api/shipping/shipments", request)
            .await
    }

    /// Fetch shipments for a user (the polling read).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn for_user(&self, user_id: UserId) -> Result<Value, ApiError> {
        let path = format!("/api/shipping/shipments/user/{user_id}");
        self.inner.get_json(&path).await
    }

    /// Fetch the tracking timeline for a shipment.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(tracking_number = %tracking_number))]
    pub async fn track(
        &self,
        tracking_number: &TrackingNumber,
    ) -> Result<Vec<TrackingEvent>, ApiError> {
        let path = format!(
            "/api/shipping/shipments/tracking/{}",
            urlencoding::encode(tracking_number.as_str())
        );
        self.inner.get_json(&path).await
    }
}
