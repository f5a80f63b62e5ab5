//! Payment service client.
//!
//! `for_user` returns the raw JSON body: the checkout sequencer applies
//! its own shape-tolerant qualifying-record predicate over it rather
//! than forcing the several backend spellings into one struct here.

use prism_core::{OrderId, PaymentMethodId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;
use url::Url;

use super::{ApiError, ServiceClient};
use crate::local::LocalStore;

/// A charge request against an order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub amount: Decimal,
    pub currency: String,
    pub payment_method: String,
}

/// A stored payment method.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    #[serde(rename = "type")]
    pub kind: String,
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last4: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_month: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_year: Option<u16>,
    #[serde(default)]
    pub is_default: bool,
}

/// A payment method to register.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPaymentMethod {
    #[serde(rename = "type")]
    pub kind: String,
    pub provider: String,
    pub token: String,
    pub is_default: bool,
}

/// Client for the payment service.
#[derive(Debug, Clone)]
pub struct PaymentClient {
    inner: ServiceClient,
}

impl PaymentClient {
    /// Create a new payment service client.
    #[must_use]
    pub fn new(base: Url, local: LocalStore) -> Self {
        Self {
            inner: ServiceClient::new(base, local),
        }
    }

    /// Submit a charge for processing.
    ///
    /// The response does not confirm the payment; confirmation arrives
    /// later via [`Self::for_user`] polling.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, request), fields(order_id = %request.order_id))]
    pub async fn process(&self, request: &PaymentRequest) -> Result<Value, ApiError> {
        self.inner.post_json("/api/payments/process", request).await
    }

    /// Fetch payments for a user (the polling read).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn for_user(&self, user_id: UserId) -> Result<Value, ApiError> {
        let path = format!("/api/payments/user/{user_id}");
        self.inner.get_json(&path).await
    }

    /// List a user's stored payment methods.
    ///
    /// Payment methods live under `/payment-methods` on the payment
    /// service base, outside the `/api/payments` prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn methods_for_user(&self, user_id: UserId) -> Result<Vec<PaymentMethod>, ApiError> {
        let path = format!("/payment-methods/user/{user_id}");
        self.inner.get_json(&path).await
    }

    /// Register a payment method.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails; the caller surfaces
    /// it, there is no automatic retry.
    #[instrument(skip(self, method))]
    pub async fn add_method(&self, method: &NewPaymentMethod) -> Result<PaymentMethod, ApiError> {
        self.inner.post_json("/payment-methods", method).await
    }
}
