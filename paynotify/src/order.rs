//! Order record and its internal lifecycle.
//!
//! Orders are created by the order-management side of the system. This crate
//! only reads them and moves `status` forward in response to payment
//! notifications.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Internal order lifecycle state.
///
/// `Completed` and `Cancelled` are absorbing: once reached, no notification
/// can move the order anywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Whether a reconciliation may move an order from `self` to `next`.
    ///
    /// Staying in place is always allowed so repeated deliveries stay harmless.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        *self == next || !self.is_terminal()
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A locally persisted order, keyed by the external order id shared with the
/// payment provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub order_id: String,
    pub status: OrderStatus,
    /// Bumped on every status write.
    pub version: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Order {
    /// A freshly created order awaiting payment.
    pub fn pending(order_id: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            status: OrderStatus::Pending,
            version: 0,
            updated_at: OffsetDateTime::now_utc(),
        }
    }
}
