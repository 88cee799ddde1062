//! Translation of Midtrans transaction vocabulary into the order lifecycle.
//!
//! Reference: https://docs.midtrans.com/docs/https-notification-webhooks
//!
//! The mapping is total. Anything not recognized leaves the order pending, so
//! an unfamiliar signal can never complete or cancel an order.

use crate::order::OrderStatus;

/// Midtrans `transaction_status` values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    Capture,
    Settlement,
    Pending,
    Cancel,
    Deny,
    Expire,
    Other(String),
}

impl From<&str> for TransactionStatus {
    fn from(value: &str) -> Self {
        match value {
            "capture" => TransactionStatus::Capture,
            "settlement" => TransactionStatus::Settlement,
            "pending" => TransactionStatus::Pending,
            "cancel" => TransactionStatus::Cancel,
            "deny" => TransactionStatus::Deny,
            "expire" => TransactionStatus::Expire,
            other => TransactionStatus::Other(other.to_string()),
        }
    }
}

/// Midtrans `fraud_status` values, only sent alongside card captures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FraudStatus {
    Accept,
    Challenge,
    Other(String),
}

impl From<&str> for FraudStatus {
    fn from(value: &str) -> Self {
        match value {
            "accept" => FraudStatus::Accept,
            "challenge" => FraudStatus::Challenge,
            other => FraudStatus::Other(other.to_string()),
        }
    }
}

/// Map vendor statuses to the internal order status.
pub fn map_status(transaction_status: &str, fraud_status: Option<&str>) -> OrderStatus {
    let fraud = fraud_status.map(FraudStatus::from);

    match TransactionStatus::from(transaction_status) {
        TransactionStatus::Capture => match fraud {
            Some(FraudStatus::Accept) => OrderStatus::Completed,
            // challenge, unknown or absent: wait for the vendor's final decision
            _ => OrderStatus::Pending,
        },
        TransactionStatus::Settlement => OrderStatus::Completed,
        TransactionStatus::Cancel | TransactionStatus::Deny | TransactionStatus::Expire => {
            OrderStatus::Cancelled
        }
        TransactionStatus::Pending | TransactionStatus::Other(_) => OrderStatus::Pending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settlement_completes() {
        assert_eq!(map_status("settlement", None), OrderStatus::Completed);
        assert_eq!(map_status("settlement", Some("challenge")), OrderStatus::Completed);
    }

    #[test]
    fn test_cancel_deny_expire_cancel() {
        for status in ["cancel", "deny", "expire"] {
            assert_eq!(map_status(status, None), OrderStatus::Cancelled, "{status}");
            assert_eq!(map_status(status, Some("accept")), OrderStatus::Cancelled, "{status}");
        }
    }

    #[test]
    fn test_capture_depends_on_fraud_status() {
        assert_eq!(map_status("capture", Some("accept")), OrderStatus::Completed);
        assert_eq!(map_status("capture", Some("challenge")), OrderStatus::Pending);
        assert_eq!(map_status("capture", Some("deny")), OrderStatus::Pending);
        assert_eq!(map_status("capture", None), OrderStatus::Pending);
    }

    #[test]
    fn test_pending_stays_pending() {
        assert_eq!(map_status("pending", None), OrderStatus::Pending);
    }

    #[test]
    fn test_unknown_values_default_to_pending() {
        assert_eq!(map_status("unknown-value", None), OrderStatus::Pending);
        assert_eq!(map_status("refund", None), OrderStatus::Pending);
        assert_eq!(map_status("SETTLEMENT", None), OrderStatus::Pending);
        assert_eq!(map_status("", Some("accept")), OrderStatus::Pending);
    }

    #[test]
    fn test_vendor_vocabulary_parsing() {
        assert_eq!(TransactionStatus::from("expire"), TransactionStatus::Expire);
        assert_eq!(
            TransactionStatus::from("authorize"),
            TransactionStatus::Other("authorize".to_string())
        );
        assert_eq!(FraudStatus::from("challenge"), FraudStatus::Challenge);
    }
}
