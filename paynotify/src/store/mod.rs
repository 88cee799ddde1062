//! Order store abstraction.
//!
//! The order store is owned by the order-management side of the system. This
//! module defines the narrow interface the reconciler needs from it:
//!
//! - lookup by external order id
//! - an atomic conditional status write (compare-and-swap on the current status)
//!
//! Two implementations are provided: an in-memory map for single-process
//! deployments and tests, and SQLite for deployments where several processes
//! share the same orders.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use thiserror::Error;

use crate::order::{Order, OrderStatus};

pub use memory::MemoryOrderStore;
pub use sqlite::SqliteOrderStore;

/// Errors returned by an [`OrderStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("order {0} not found")]
    NotFound(String),

    #[error("order {0} already exists")]
    Duplicate(String),

    /// The conditional write lost: the stored status was not the expected one.
    #[error("order {} is {} rather than the expected status", .current.order_id, .current.status)]
    Conflict { current: Order },

    #[error("order store failure: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

/// Read/write access to orders by external order id.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Fetch an order by the id shared with the payment provider.
    async fn find_by_external_id(&self, order_id: &str) -> Result<Option<Order>, StoreError>;

    /// Atomically set `new_status`.
    ///
    /// When `expected_current` is given the write only happens if the stored
    /// status still equals it; otherwise [`StoreError::Conflict`] carries the
    /// order as it currently is.
    async fn update_status(
        &self,
        order_id: &str,
        new_status: OrderStatus,
        expected_current: Option<OrderStatus>,
    ) -> Result<Order, StoreError>;

    /// Create a new order.
    async fn insert(&self, order: Order) -> Result<Order, StoreError>;
}
