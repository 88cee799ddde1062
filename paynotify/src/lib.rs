//! Paynotify - Midtrans payment notification receiver.
//!
//! Authenticates HTTP notifications from the payment provider, translates the
//! provider's transaction status into the local order lifecycle and applies it
//! to the stored order exactly once, whatever the delivery order.
//!
//! ## Flow
//!
//! ```text
//! Notification → SignatureVerifier → map_status → OrderReconciler → OrderStore
//! ```

pub mod config;
pub mod notification;
pub mod order;
pub mod reconcile;
pub mod status;
pub mod store;
pub mod web;

// Re-export commonly used types
pub use config::{Config, ServerKey};
pub use notification::{Notification, RawNotification};
pub use order::{Order, OrderStatus};
pub use reconcile::{OrderReconciler, ReconcileError, Reconciliation};
pub use status::map_status;
pub use store::{MemoryOrderStore, OrderStore, SqliteOrderStore, StoreError};
pub use web::{AppState, SignatureVerifier};
