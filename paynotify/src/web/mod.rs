//! Web server module for handling payment notifications.
//!
//! This module provides the HTTP surface that:
//! - Receives Midtrans HTTP notifications
//! - Verifies their signatures
//! - Reconciles the matching order
//! - Answers with the response codes Midtrans expects

pub mod handlers;
pub mod signature;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use handlers::{
    health, index, midtrans_notification, AppState, HealthResponse, MessageResponse, WebhookError,
};
pub use signature::SignatureVerifier;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let api = Router::new().route("/midtrans-notification", post(midtrans_notification));

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
