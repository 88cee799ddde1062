//! Order reconciliation.
//!
//! Applies a mapped notification status to the stored order. Notifications are
//! delivered at least once, in any order and possibly concurrently, so every
//! write is a compare-and-swap against the status that was read:
//!
//! ```text
//! read ──► same status? ──yes──► Unchanged
//!   │          │no
//!   │          ▼
//!   │      terminal? ──yes──► Ignored
//!   │          │no
//!   │          ▼
//!   └──── CAS write ──conflict──► (re-read)
//!              │ok
//!              ▼
//!           Applied
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::order::{Order, OrderStatus};
use crate::store::{OrderStore, StoreError};

/// Upper bound on compare-and-swap retries for a single notification.
pub const MAX_CAS_ATTEMPTS: usize = 5;

/// Errors that stop a reconciliation.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("order {0} not found")]
    OrderNotFound(String),

    #[error("order store did not answer within {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Storage(StoreError),
}

/// Successful reconciliation outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// The status was written.
    Applied { order: Order, previous: OrderStatus },
    /// The order already had the requested status.
    Unchanged(Order),
    /// The order is in an absorbing state; the request was dropped.
    Ignored { order: Order, requested: OrderStatus },
}

impl Reconciliation {
    /// The order as it stands after reconciliation.
    pub fn order(&self) -> &Order {
        match self {
            Reconciliation::Applied { order, .. } => order,
            Reconciliation::Unchanged(order) => order,
            Reconciliation::Ignored { order, .. } => order,
        }
    }

    pub fn outcome(&self) -> &'static str {
        match self {
            Reconciliation::Applied { .. } => "applied",
            Reconciliation::Unchanged(_) => "unchanged",
            Reconciliation::Ignored { .. } => "ignored",
        }
    }
}

/// Applies notification statuses to orders.
#[derive(Clone)]
pub struct OrderReconciler {
    store: Arc<dyn OrderStore>,
    store_timeout: Duration,
}

impl OrderReconciler {
    pub fn new(store: Arc<dyn OrderStore>, store_timeout: Duration) -> Self {
        Self {
            store,
            store_timeout,
        }
    }

    /// Move `order_id` to `new_status` unless the order is already settled.
    pub async fn reconcile(
        &self,
        order_id: &str,
        new_status: OrderStatus,
    ) -> Result<Reconciliation, ReconcileError> {
        let mut order = self
            .bounded(self.store.find_by_external_id(order_id))
            .await?
            .ok_or_else(|| ReconcileError::OrderNotFound(order_id.to_string()))?;

        for attempt in 1..=MAX_CAS_ATTEMPTS {
            let current = order.status;

            if current == new_status {
                info!(
                    order_id = %order_id,
                    status = %current,
                    "order_status_unchanged"
                );
                return Ok(Reconciliation::Unchanged(order));
            }

            if !current.can_transition_to(new_status) {
                warn!(
                    order_id = %order_id,
                    current = %current,
                    requested = %new_status,
                    "order_status_transition_ignored"
                );
                return Ok(Reconciliation::Ignored {
                    order,
                    requested: new_status,
                });
            }

            let write = self
                .store
                .update_status(order_id, new_status, Some(current));

            match self.bounded(write).await {
                Ok(updated) => {
                    info!(
                        order_id = %order_id,
                        previous = %current,
                        status = %updated.status,
                        version = updated.version,
                        "order_status_applied"
                    );
                    return Ok(Reconciliation::Applied {
                        order: updated,
                        previous: current,
                    });
                }
                Err(ReconcileError::Storage(StoreError::Conflict { current: latest })) => {
                    info!(
                        order_id = %order_id,
                        attempt = attempt,
                        expected = %current,
                        found = %latest.status,
                        "order_status_write_conflict"
                    );
                    order = latest;
                }
                Err(ReconcileError::Storage(StoreError::NotFound(_))) => {
                    return Err(ReconcileError::OrderNotFound(order_id.to_string()));
                }
                Err(e) => return Err(e),
            }
        }

        Err(ReconcileError::Storage(StoreError::Backend(format!(
            "order {order_id} kept changing after {MAX_CAS_ATTEMPTS} attempts"
        ))))
    }

    /// Run a store call under the configured timeout.
    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, ReconcileError> {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(result) => result.map_err(ReconcileError::Storage),
            Err(_) => Err(ReconcileError::Timeout(self.store_timeout)),
        }
    }
}
