//! The typed context threaded between checkout stages.

use prism_core::{CurrencyCode, OrderId, Price, UserId};
use rust_decimal::Decimal;

use crate::local::LocalStore;

/// Everything a later stage needs from an earlier one.
///
/// Produced by order submission and carried forward explicitly. The
/// user id is optional because the chain can be entered with a lost
/// context (a fresh process resuming mid-flow); [`Self::recover`]
/// fills the gaps from the fallback blob before the caller falls back
/// to asking the user.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderContext {
    pub order_id: OrderId,
    pub user_id: Option<UserId>,
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub payment_method: String,
}

impl OrderContext {
    /// The order total as a displayable price.
    #[must_use]
    pub const fn total(&self) -> Price {
        Price::new(self.amount, self.currency)
    }

    /// Fill missing fields from the last-payment fallback blob.
    ///
    /// Returns `true` if a user id is available afterwards, from
    /// either the context itself or the blob. Fields already present
    /// are never overwritten; the blob is a fallback, not an
    /// authority.
    pub fn recover(&mut self, local: &LocalStore) -> bool {
        if self.user_id.is_some() {
            return true;
        }
        if let Some(record) = local.last_payment() {
            self.user_id = record.user_id;
        }
        self.user_id.is_some()
    }

    /// Resume with a user id supplied out-of-band (the manual-entry
    /// fallback for a broken context chain).
    pub fn set_user_id(&mut self, user_id: UserId) {
        self.user_id = Some(user_id);
    }
}
