//! Shape-tolerant extraction from polling responses.
//!
//! The backends disagree on response shape and field spelling. A
//! payments-by-user read may return a bare array, an object with a
//! `payment` key, or the record itself; ids arrive as `transactionId`,
//! `transaction_id`, or plain `id`, sometimes as numbers. These helpers
//! normalize all of that into typed ids, and a record that yields no id
//! is simply not a qualifying record.

use prism_core::{PaymentId, TrackingNumber, TransactionId};
use serde_json::Value;

/// Ids pulled from a qualifying payment record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfirmation {
    pub transaction_id: TransactionId,
    pub payment_id: PaymentId,
}

/// Pick the record out of a polling response body.
///
/// Preference order: head of an array, then the object under
/// `nested_key`, then the body itself if it is an object. An empty
/// array or a non-object body yields nothing.
fn normalize_record<'a>(body: &'a Value, nested_key: &str) -> Option<&'a Value> {
    match body {
        Value::Array(items) => items.first(),
        Value::Object(map) => match map.get(nested_key) {
            Some(nested) if nested.is_object() => Some(nested),
            _ => Some(body),
        },
        _ => None,
    }
}

/// Read a field as a non-empty string, stringifying numbers.
fn field_as_string(record: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        match record.get(key) {
            Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

/// Extract transaction and payment ids from a payments-by-user body.
///
/// Returns `None` when the body carries no usable record, which the
/// poller treats as "not yet ready".
pub(crate) fn payment_confirmation(body: &Value) -> Option<PaymentConfirmation> {
    let record = normalize_record(body, "payment")?;
    let transaction_id = field_as_string(record, &["transactionId", "id", "transaction_id"])?;
    let payment_id = field_as_string(record, &["paymentId", "payment_id", "id"])?;
    Some(PaymentConfirmation {
        transaction_id: TransactionId::new(transaction_id),
        payment_id: PaymentId::new(payment_id),
    })
}

/// Extract the tracking number from a shipments-by-user body.
pub(crate) fn tracking_number(body: &Value) -> Option<TrackingNumber> {
    let record = normalize_record(body, "shipment")?;
    let tracking = field_as_string(record, &["trackingNumber", "tracking_number", "trackingId"])?;
    Some(TrackingNumber::new(tracking))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payment_spellings() {
        let cases = [
            json!({"transactionId": "txn-1", "paymentId": "pay-1"}),
            json!({"transaction_id": "txn-1", "payment_id": "pay-1"}),
            json!({"id": "txn-1", "paymentId": "pay-1"}),
        ];
        for body in cases {
            let confirmation = payment_confirmation(&body).unwrap();
            assert_eq!(confirmation.transaction_id, TransactionId::new("txn-1"));
        }
    }

    #[test]
    fn test_payment_from_array_head() {
        let body = json!([
            {"transactionId": "txn-7", "paymentId": "pay-7"},
            {"transactionId": "txn-8", "paymentId": "pay-8"}
        ]);
        let confirmation = payment_confirmation(&body).unwrap();
        assert_eq!(confirmation.transaction_id, TransactionId::new("txn-7"));
        assert_eq!(confirmation.payment_id, PaymentId::new("pay-7"));
    }

    #[test]
    fn test_payment_from_nested_key() {
        let body = json!({"payment": {"transactionId": "txn-2", "payment_id": "pay-2"}});
        let confirmation = payment_confirmation(&body).unwrap();
        assert_eq!(confirmation.payment_id, PaymentId::new("pay-2"));
    }

    #[test]
    fn test_numeric_ids_stringified() {
        let body = json!({"transactionId": 9001, "paymentId": 42});
        let confirmation = payment_confirmation(&body).unwrap();
        assert_eq!(confirmation.transaction_id, TransactionId::new("9001"));
        assert_eq!(confirmation.payment_id, PaymentId::new("42"));
    }

    #[test]
    fn test_empty_array_not_qualifying() {
        assert!(payment_confirmation(&json!([])).is_none());
    }

    #[test]
    fn test_record_without_ids_not_qualifying() {
        assert!(payment_confirmation(&json!({"status": "processing"})).is_none());
    }

    #[test]
    fn test_tracking_spellings() {
        let cases = [
            json!({"trackingNumber": "TRK-1"}),
            json!({"tracking_number": "TRK-1"}),
            json!({"trackingId": "TRK-1"}),
            json!({"shipment": {"trackingNumber": "TRK-1"}}),
            json!([{"trackingNumber": "TRK-1"}]),
        ];
        for body in cases {
            assert_eq!(tracking_number(&body), Some(TrackingNumber::new("TRK-1")));
        }
    }

    #[test]
    fn test_shipment_without_tracking_not_qualifying() {
        assert!(tracking_number(&json!({"status": "label_created"})).is_none());
    }
}
