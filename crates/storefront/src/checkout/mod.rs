//! The checkout/payment/shipping sequencer.
//!
//! Three sequential stages connected by explicit context passing:
//! order submission (one synchronous POST), payment confirmation
//! (bounded status polling), and shipment confirmation (same polling
//! pattern). [`CheckoutFlow`] is the state machine; callers drive it
//! stage by stage and hold the [`CancellationToken`] that tears the
//! polling down when the user leaves the flow.
//!
//! Confirmation is not driven by POST responses. The payment charge is
//! triggered out-of-band; this client learns the outcome by polling
//! "payments by user" until a qualifying record appears, then carries
//! the extracted ids forward to the shipment stage.

mod context;
mod extract;
mod poll;

pub use context::OrderContext;
pub use extract::PaymentConfirmation;
pub use poll::PollError;

use prism_core::{CurrencyCode, TrackingNumber, UserId};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::config::{PollingConfig, StorefrontConfig};
use crate::local::{LocalStore, PaymentRecord};
use crate::services::orders::OrderDraft;
use crate::services::payments::PaymentRequest;
use crate::services::{ApiError, OrderClient, PaymentClient, ShippingClient};
use crate::store::SessionStore;

/// Where the flow currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutStage {
    AwaitingOrderSubmission,
    OrderSubmitted,
    AwaitingPaymentConfirmation,
    PaymentConfirmed,
    AwaitingShipmentConfirmation,
    ShipmentConfirmed,
}

/// Errors surfaced by the sequencer.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Caught before any network call; the form cannot be submitted.
    #[error("cart is empty")]
    EmptyCart,

    /// No user id in the context and none recoverable; the caller may
    /// resume by supplying one.
    #[error("no user id available to poll with")]
    MissingUserId,

    /// A one-shot submission failed. No automatic retry; resubmit.
    #[error("submission failed: {0}")]
    Submission(#[source] ApiError),

    /// A polling stage terminated without a qualifying record.
    #[error(transparent)]
    Poll(#[from] PollError),
}

/// The checkout form fields forwarded verbatim into the order payload.
#[derive(Debug, Clone, Default)]
pub struct CheckoutForm {
    pub shipping_address: String,
    pub billing_address: String,
    pub payment_method: String,
    pub shipping_method: String,
    pub notes: String,
}

/// The three-stage order, payment, shipment state machine.
///
/// The session store is constructor-injected so tests can run isolated
/// flows against isolated carts.
#[derive(Debug)]
pub struct CheckoutFlow {
    store: SessionStore,
    orders: OrderClient,
    payments: PaymentClient,
    shipping: ShippingClient,
    local: LocalStore,
    polling: PollingConfig,
    stage: CheckoutStage,
}

impl CheckoutFlow {
    /// Build a flow over the configured backend services.
    #[must_use]
    pub fn new(config: &StorefrontConfig, store: SessionStore, local: LocalStore) -> Self {
        Self {
            orders: OrderClient::new(config.services.orders.clone(), local.clone()),
            payments: PaymentClient::new(config.services.payments.clone(), local.clone()),
            shipping: ShippingClient::new(config.services.shipping.clone(), local.clone()),
            store,
            local,
            polling: config.polling,
            stage: CheckoutStage::AwaitingOrderSubmission,
        }
    }

    /// The current stage.
    #[must_use]
    pub fn stage(&self) -> CheckoutStage {
        self.stage
    }

    /// Submit the cart as an order.
    ///
    /// Success clears the cart, advances the stage, and yields the
    /// context the later stages need. Failure leaves both the cart and
    /// the stage untouched so the caller can fix the form and
    /// resubmit.
    ///
    /// # Errors
    ///
    /// `EmptyCart` or `MissingUserId` before any network call;
    /// `Submission` if the order service rejects the request.
    #[instrument(skip(self, form))]
    pub async fn submit_order(&mut self, form: &CheckoutForm) -> Result<OrderContext, CheckoutError> {
        let user = self.store.user().ok_or(CheckoutError::MissingUserId)?;
        let cart = self.store.cart();
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let draft = OrderDraft::from_cart(
            user.id,
            &cart,
            form.shipping_address.clone(),
            form.billing_address.clone(),
            form.payment_method.clone(),
            form.shipping_method.clone(),
            form.notes.clone(),
        );
        let amount = draft.total_amount;

        let placed = self
            .orders
            .place(&draft)
            .await
            .map_err(CheckoutError::Submission)?;

        self.store.clear_cart();
        self.stage = CheckoutStage::OrderSubmitted;

        let ctx = OrderContext {
            order_id: placed.order_id,
            user_id: Some(user.id),
            amount,
            currency: CurrencyCode::default(),
            payment_method: form.payment_method.clone(),
        };
        info!(order_id = %ctx.order_id, total = %ctx.total(), "order placed");
        Ok(ctx)
    }

    /// Trigger the charge for a submitted order.
    ///
    /// The response does not confirm anything; call
    /// [`Self::await_payment`] for that.
    ///
    /// # Errors
    ///
    /// `MissingUserId` if the context has no user id; `Submission` if
    /// the payment service rejects the request.
    #[instrument(skip(self, ctx), fields(order_id = %ctx.order_id))]
    pub async fn submit_payment(&self, ctx: &OrderContext) -> Result<(), CheckoutError> {
        let user_id = ctx.user_id.ok_or(CheckoutError::MissingUserId)?;
        let request = PaymentRequest {
            order_id: ctx.order_id.clone(),
            user_id,
            amount: ctx.amount,
            currency: ctx.currency.code().to_string(),
            payment_method: ctx.payment_method.clone(),
        };
        self.payments
            .process(&request)
            .await
            .map_err(CheckoutError::Submission)?;
        Ok(())
    }

    /// Poll for payment confirmation.
    ///
    /// Resolves exactly once with the first qualifying record, whose
    /// ids are persisted to the fallback blob before the stage
    /// advances.
    ///
    /// # Errors
    ///
    /// `MissingUserId` if the context has no user id (call
    /// [`Self::recover_context`] or [`OrderContext::set_user_id`]
    /// first); otherwise a [`PollError`] terminal outcome.
    #[instrument(skip(self, ctx, cancel), fields(order_id = %ctx.order_id))]
    pub async fn await_payment(
        &mut self,
        ctx: &OrderContext,
        cancel: &CancellationToken,
    ) -> Result<PaymentConfirmation, CheckoutError> {
        let user_id = ctx.user_id.ok_or(CheckoutError::MissingUserId)?;
        self.stage = CheckoutStage::AwaitingPaymentConfirmation;

        let payments = self.payments.clone();
        let confirmation = poll::poll_until(&self.polling, cancel, move || {
            let payments = payments.clone();
            async move {
                let body = payments.for_user(user_id).await?;
                Ok(extract::payment_confirmation(&body))
            }
        })
        .await?;

        self.local.merge_last_payment(&PaymentRecord {
            user_id: Some(user_id),
            order_id: Some(ctx.order_id.clone()),
            amount: Some(ctx.amount),
            transaction_id: Some(confirmation.transaction_id.clone()),
            payment_id: Some(confirmation.payment_id.clone()),
        });

        info!(transaction_id = %confirmation.transaction_id, "payment confirmed");
        self.stage = CheckoutStage::PaymentConfirmed;
        Ok(confirmation)
    }

    /// Poll for shipment confirmation.
    ///
    /// # Errors
    ///
    /// Same shape as [`Self::await_payment`].
    #[instrument(skip(self, ctx, cancel), fields(order_id = %ctx.order_id))]
    pub async fn await_shipment(
        &mut self,
        ctx: &OrderContext,
        cancel: &CancellationToken,
    ) -> Result<TrackingNumber, CheckoutError> {
        let user_id = ctx.user_id.ok_or(CheckoutError::MissingUserId)?;
        self.stage = CheckoutStage::AwaitingShipmentConfirmation;

        let shipping = self.shipping.clone();
        let tracking = poll::poll_until(&self.polling, cancel, move || {
            let shipping = shipping.clone();
            async move {
                let body = shipping.for_user(user_id).await?;
                Ok(extract::tracking_number(&body))
            }
        })
        .await?;

        info!(tracking_number = %tracking, "shipment confirmed");
        self.stage = CheckoutStage::ShipmentConfirmed;
        Ok(tracking)
    }

    /// Fill a lost context from the fallback blob.
    ///
    /// Returns `true` if the context is usable afterwards. When it
    /// returns `false` the caller's remaining option is manual entry
    /// via [`OrderContext::set_user_id`].
    pub fn recover_context(&self, ctx: &mut OrderContext) -> bool {
        ctx.recover(&self.local)
    }

    /// Resume a flow entered mid-chain with a known user id.
    pub fn resume_with_user_id(&self, ctx: &mut OrderContext, user_id: UserId) {
        ctx.set_user_id(user_id);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ServiceUrls;
    use crate::models::User;
    use std::path::PathBuf;
    use std::time::Duration;

    fn test_config() -> StorefrontConfig {
        let url = |s: &str| url::Url::parse(s).unwrap();
        StorefrontConfig {
            services: ServiceUrls {
                users: url("http://localhost:8081"),
                products: url("http://localhost:8082"),
                orders: url("http://localhost:8083"),
                payments: url("http://localhost:8084"),
                shipping: url("http://localhost:8085"),
                reviews: url("http://localhost:8086"),
            },
            polling: PollingConfig {
                interval: Duration::from_millis(10),
                max_attempts: 3,
                max_consecutive_failures: 2,
            },
            local_store_path: PathBuf::from("/dev/null"),
            dev_admin_bypass: false,
        }
    }

    fn temp_local(name: &str) -> LocalStore {
        let path = std::env::temp_dir().join(format!(
            "prism-checkout-{name}-{}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        LocalStore::new(path)
    }

    #[tokio::test]
    async fn test_submit_order_requires_user() {
        let mut flow = CheckoutFlow::new(&test_config(), SessionStore::new(), temp_local("user"));
        let result = flow.submit_order(&CheckoutForm::default()).await;
        assert!(matches!(result, Err(CheckoutError::MissingUserId)));
        assert_eq!(flow.stage(), CheckoutStage::AwaitingOrderSubmission);
    }

    #[tokio::test]
    async fn test_submit_order_requires_nonempty_cart() {
        let store = SessionStore::new();
        store.set_user(Some(User {
            id: UserId::new(1001),
            name: "Test".to_string(),
            email: "test@example.com".to_string(),
            avatar: None,
            is_admin: false,
        }));
        let mut flow = CheckoutFlow::new(&test_config(), store, temp_local("cart"));
        let result = flow.submit_order(&CheckoutForm::default()).await;
        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
        assert_eq!(flow.stage(), CheckoutStage::AwaitingOrderSubmission);
    }

    #[tokio::test]
    async fn test_await_payment_requires_user_id() {
        let mut flow = CheckoutFlow::new(&test_config(), SessionStore::new(), temp_local("poll"));
        let mut ctx = OrderContext {
            order_id: prism_core::OrderId::new("ord-1"),
            user_id: None,
            amount: "10.00".parse().unwrap(),
            currency: CurrencyCode::USD,
            payment_method: "card".to_string(),
        };
        let cancel = CancellationToken::new();

        let result = flow.await_payment(&ctx, &cancel).await;
        assert!(matches!(result, Err(CheckoutError::MissingUserId)));

        // Manual resume makes the context usable again.
        flow.resume_with_user_id(&mut ctx, UserId::new(1001));
        assert_eq!(ctx.user_id, Some(UserId::new(1001)));
    }
}
