//! Best-effort persisted client-side state.
//!
//! The browser original keeps three things in `localStorage`: the bearer
//! token, an admin flag, and a "last payment data" record used as a
//! fallback when the hop-to-hop checkout context is lost. [`LocalStore`]
//! is the native analogue: one JSON file, loaded tolerantly (a missing
//! or corrupt file reads as empty) and written best-effort (failures are
//! logged at warn, never surfaced). None of this is a durable data
//! store; it may be absent or stale at any time.

use std::path::PathBuf;

use prism_core::{OrderId, PaymentId, TransactionId, UserId};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// The fallback record persisted after a confirmed payment.
///
/// Field names mirror the wire blob (`lastPaymentData`) so sessions
/// written by older clients still read back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<TransactionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<PaymentId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct PersistedSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(default)]
    is_admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_payment_data: Option<PaymentRecord>,
}

/// File-backed session blob.
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    /// Create a store backed by the given file path.
    ///
    /// The file is not created until the first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The stored bearer token, if any.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.load().token.map(SecretString::from)
    }

    /// Persist the bearer token.
    pub fn set_token(&self, token: impl Into<String>) {
        let mut session = self.load();
        session.token = Some(token.into());
        self.save(&session);
    }

    /// The stored admin flag.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.load().is_admin
    }

    /// Persist the admin flag.
    pub fn set_is_admin(&self, is_admin: bool) {
        let mut session = self.load();
        session.is_admin = is_admin;
        self.save(&session);
    }

    /// The last-payment fallback record, if any.
    #[must_use]
    pub fn last_payment(&self) -> Option<PaymentRecord> {
        self.load().last_payment_data
    }

    /// Merge fields into the last-payment record.
    ///
    /// Fields present in `update` overwrite; fields absent keep their
    /// previously stored value (the original merges over the prior
    /// blob the same way).
    pub fn merge_last_payment(&self, update: &PaymentRecord) {
        let mut session = self.load();
        let mut record = session.last_payment_data.unwrap_or_default();
        if update.user_id.is_some() {
            record.user_id = update.user_id;
        }
        if update.order_id.is_some() {
            record.order_id = update.order_id.clone();
        }
        if update.amount.is_some() {
            record.amount = update.amount;
        }
        if update.transaction_id.is_some() {
            record.transaction_id = update.transaction_id.clone();
        }
        if update.payment_id.is_some() {
            record.payment_id = update.payment_id.clone();
        }
        session.last_payment_data = Some(record);
        self.save(&session);
    }

    /// Forget everything.
    pub fn clear(&self) {
        self.save(&PersistedSession::default());
    }

    fn load(&self) -> PersistedSession {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(path = %self.path.display(), error = %e, "corrupt session blob, starting fresh");
                PersistedSession::default()
            }),
            Err(_) => PersistedSession::default(),
        }
    }

    fn save(&self, session: &PersistedSession) {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to create session blob directory");
            return;
        }
        match serde_json::to_string_pretty(session) {
            Ok(raw) => {
                if let Err(e) = std::fs::write(&self.path, raw) {
                    tracing::warn!(path = %self.path.display(), error = %e, "failed to persist session blob");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize session blob");
            }
        }
    }
}
