//! Order service client.

use prism_core::{OrderId, UserId};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;
use url::Url;

use super::{ApiError, ServiceClient};
use crate::local::LocalStore;
use crate::store::CartItem;

/// One line of an order submission, denormalized from the cart.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDraft {
    pub product_id: prism_core::ProductId,
    pub product_name: String,
    pub product_image: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_size: Option<String>,
}

/// An order submission payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub user_id: UserId,
    pub total_amount: Decimal,
    pub shipping_address: String,
    pub billing_address: String,
    pub payment_method: String,
    pub shipping_method: String,
    pub notes: String,
    pub order_items: Vec<OrderItemDraft>,
}

impl OrderDraft {
    /// Build a draft from the current cart lines.
    ///
    /// The total is recomputed from the lines, never trusted from a
    /// cached value.
    #[must_use]
    pub fn from_cart(
        user_id: UserId,
        cart: &[CartItem],
        shipping_address: impl Into<String>,
        billing_address: impl Into<String>,
        payment_method: impl Into<String>,
        shipping_method: impl Into<String>,
        notes: impl Into<String>,
    ) -> Self {
        let total_amount = cart
            .iter()
            .map(|line| line.price * Decimal::from(line.quantity))
            .sum();
        Self {
            user_id,
            total_amount,
            shipping_address: shipping_address.into(),
            billing_address: billing_address.into(),
            payment_method: payment_method.into(),
            shipping_method: shipping_method.into(),
            notes: notes.into(),
            order_items: cart
                .iter()
                .map(|line| OrderItemDraft {
                    product_id: line.product_id.clone(),
                    product_name: line.name.clone(),
                    product_image: line.image.clone(),
                    quantity: line.quantity,
                    unit_price: line.price,
                    selected_color: line.selected_color.clone(),
                    selected_size: line.selected_size.clone(),
                })
                .collect(),
        }
    }
}

/// An order cancellation request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationRequest {
    pub order_id: OrderId,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A successfully placed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    pub order_id: OrderId,
    pub status: String,
    pub payment_status: String,
}

/// Client for the order service.
#[derive(Debug, Clone)]
pub struct OrderClient {
    inner: ServiceClient,
}

impl OrderClient {
    /// Create a new order service client.
    #[must_use]
    pub fn new(base: Url, local: LocalStore) -> Self {
        Self {
            inner: ServiceClient::new(base, local),
        }
    }

    /// Place an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails; the caller may
    /// resubmit, there is no automatic retry.
    #[instrument(skip(self, draft), fields(user_id = %draft.user_id))]
    pub async fn place(&self, draft: &OrderDraft) -> Result<PlacedOrder, ApiError> {
        let response: Value = self.inner.post_json("/api/orders", draft).await?;

        let order_id = extract_order_id(&response)
            .ok_or_else(|| ApiError::Parse("order response carries no order id".to_string()))?;

        Ok(PlacedOrder {
            order_id,
            status: string_field(&response, "status").unwrap_or_else(|| "pending".to_string()),
            payment_status: string_field(&response, "paymentStatus")
                .unwrap_or_else(|| "pending".to_string()),
        })
    }

    /// List a user's orders, newest first.
    ///
    /// The doubled `orders` segment is the order service's actual
    /// route, not a typo.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list_for_user(
        &self,
        user_id: UserId,
        page: u32,
        limit: u32,
    ) -> Result<Value, ApiError> {
        let path = format!("/api/orders/orders/user/{user_id}?page={page}&limit={limit}");
        self.inner.get_json(&path).await
    }

    /// Cancel an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, request), fields(order_id = %request.order_id))]
    pub async fn cancel(&self, request: &CancellationRequest) -> Result<Value, ApiError> {
        let path = format!(
            "/api/orders/{}/cancel",
            urlencoding::encode(request.order_id.as_str())
        );
        self.inner.post_json(&path, request).await
    }
}

/// Pull the order id out of a placement response.
///
/// Backends disagree on the field name; accept the known spellings in
/// preference order.
fn extract_order_id(response: &Value) -> Option<OrderId> {
    for key in ["orderNumber", "id", "orderId", "order_id"] {
        if let Some(id) = field_as_string(response, key) {
            return Some(OrderId::new(id));
        }
    }
    None
}

/// Read a field as a string, stringifying numeric ids.
fn field_as_string(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(ToString::to_string)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_order_id_spellings() {
        let cases = [
            (json!({"orderNumber": "ORD-7"}), "ORD-7"),
            (json!({"id": 42}), "42"),
            (json!({"orderId": "o-9"}), "o-9"),
            (json!({"order_id": "o-10"}), "o-10"),
        ];
        for (value, expected) in cases {
            assert_eq!(extract_order_id(&value), Some(OrderId::new(expected)));
        }
    }

    #[test]
    fn test_extract_order_id_prefers_order_number() {
        let value = json!({"orderNumber": "ORD-7", "id": 42});
        assert_eq!(extract_order_id(&value), Some(OrderId::new("ORD-7")));
    }

    #[test]
    fn test_extract_order_id_missing() {
        assert_eq!(extract_order_id(&json!({"status": "pending"})), None);
    }
}
