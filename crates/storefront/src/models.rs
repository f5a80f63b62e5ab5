//! Shared domain types.
//!
//! Wire payloads that only one service understands live next to their
//! client in [`crate::services`]; the types here cross module
//! boundaries (the session store, the sequencer, and several clients).

use prism_core::{ProductId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A catalog product as returned by the product service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub image: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub reviews: u32,
    #[serde(default)]
    pub in_stock: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizes: Option<Vec<String>>,
}

/// An authenticated storefront user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Whether the user holds admin rights.
    ///
    /// Part of the user entity rather than tracked out-of-band; the
    /// persisted session blob still mirrors it for compatibility.
    #[serde(default)]
    pub is_admin: bool,
}
