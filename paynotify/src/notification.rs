//! Inbound payment notification payload.
//!
//! Midtrans posts a JSON document per transaction status change. Only a handful
//! of its fields matter here; everything else is ignored. A notification is
//! validated, used once and dropped.

use serde::Deserialize;
use thiserror::Error;

/// Errors raised while validating a notification body.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NotificationError {
    #[error("required field `{0}` is missing or empty")]
    MissingField(&'static str),
}

/// A string-or-number field.
///
/// `status_code` and `gross_amount` are documented as strings but some senders
/// emit bare numbers. Numbers are rendered with their JSON text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl Scalar {
    pub fn render(&self) -> String {
        match self {
            Scalar::Text(s) => s.clone(),
            Scalar::Number(n) => n.to_string(),
        }
    }
}

/// Notification exactly as received, every field optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawNotification {
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub status_code: Option<Scalar>,
    #[serde(default)]
    pub gross_amount: Option<Scalar>,
    #[serde(default)]
    pub signature_key: Option<String>,
    #[serde(default)]
    pub transaction_status: Option<String>,
    #[serde(default)]
    pub fraud_status: Option<String>,
}

/// A notification with every required field present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub order_id: String,
    pub status_code: String,
    pub gross_amount: String,
    pub signature_key: String,
    pub transaction_status: String,
    /// Only meaningful for `capture` transactions.
    pub fraud_status: Option<String>,
}

impl RawNotification {
    /// Check required fields and normalize scalars into strings.
    pub fn validate(self) -> Result<Notification, NotificationError> {
        Ok(Notification {
            order_id: required("order_id", self.order_id)?,
            status_code: required("status_code", self.status_code.map(|s| s.render()))?,
            gross_amount: required("gross_amount", self.gross_amount.map(|s| s.render()))?,
            signature_key: required("signature_key", self.signature_key)?,
            transaction_status: required("transaction_status", self.transaction_status)?,
            fraud_status: self.fraud_status.filter(|s| !s.is_empty()),
        })
    }
}

fn required(name: &'static str, value: Option<String>) -> Result<String, NotificationError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(NotificationError::MissingField(name))
}
