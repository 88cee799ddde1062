//! HTTP handlers.
//!
//! The notification handler walks one request through:
//! 1. Parse and validate the notification
//! 2. Verify the signature
//! 3. Map the vendor status
//! 4. Reconcile the order
//!
//! Response bodies follow the contract the payment provider expects; anything
//! other than 2xx makes it retry later.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::notification::{NotificationError, RawNotification};
use crate::reconcile::{OrderReconciler, ReconcileError};
use crate::status::map_status;
use crate::web::signature::SignatureVerifier;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<SignatureVerifier>,
    pub reconciler: Arc<OrderReconciler>,
}

impl AppState {
    pub fn new(verifier: SignatureVerifier, reconciler: OrderReconciler) -> Self {
        Self {
            verifier: Arc::new(verifier),
            reconciler: Arc::new(reconciler),
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Root banner response.
#[derive(Serialize)]
pub struct IndexResponse {
    pub message: &'static str,
    pub data: Option<()>,
}

/// `GET /` liveness banner.
pub async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        message: "Server is running",
        data: None,
    })
}

// =============================================================================
// Midtrans Notification
// =============================================================================

/// Notification response body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Ways a notification can be turned away.
#[derive(Debug)]
pub enum WebhookError {
    /// Body is not JSON or misses a required field.
    BadRequest,
    /// Signature did not match.
    SignatureInvalid,
    /// No order with the notified id.
    OrderNotFound,
    /// The order store did not answer in time.
    StoreUnavailable,
    /// The order store failed.
    Internal,
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            WebhookError::BadRequest => (StatusCode::BAD_REQUEST, "Invalid notification"),
            WebhookError::SignatureInvalid => (StatusCode::FORBIDDEN, "Invalid signature"),
            WebhookError::OrderNotFound => (StatusCode::NOT_FOUND, "Order not found"),
            WebhookError::StoreUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable")
            }
            WebhookError::Internal => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        };
        (status, Json(MessageResponse { message })).into_response()
    }
}

impl From<NotificationError> for WebhookError {
    fn from(e: NotificationError) -> Self {
        warn!(error = %e, "notification_invalid");
        WebhookError::BadRequest
    }
}

/// Midtrans HTTP notification endpoint.
///
/// This endpoint:
/// 1. Validates the JSON payload
/// 2. Verifies the SHA-512 signature against the server key
/// 3. Maps the transaction status and reconciles the order
/// 4. Returns 200 for processed, repeated and ignored notifications alike
pub async fn midtrans_notification(
    State(state): State<AppState>,
    payload: Result<Json<RawNotification>, JsonRejection>,
) -> Result<Json<MessageResponse>, WebhookError> {
    let Json(raw) = payload.map_err(|e| {
        warn!(error = %e.body_text(), "notification_unparseable");
        WebhookError::BadRequest
    })?;
    let notification = raw.validate()?;

    info!(
        order_id = %notification.order_id,
        transaction_status = %notification.transaction_status,
        fraud_status = ?notification.fraud_status,
        status_code = %notification.status_code,
        "notification_received"
    );

    if !state.verifier.verify(
        &notification.order_id,
        &notification.status_code,
        &notification.gross_amount,
        &notification.signature_key,
    ) {
        warn!(order_id = %notification.order_id, "notification_signature_invalid");
        return Err(WebhookError::SignatureInvalid);
    }

    let mapped = map_status(
        &notification.transaction_status,
        notification.fraud_status.as_deref(),
    );

    match state
        .reconciler
        .reconcile(&notification.order_id, mapped)
        .await
    {
        Ok(result) => {
            info!(
                order_id = %notification.order_id,
                mapped_status = %mapped,
                status = %result.order().status,
                outcome = result.outcome(),
                "notification_processed"
            );
            Ok(Json(MessageResponse {
                message: "Notification processed",
            }))
        }
        Err(ReconcileError::OrderNotFound(_)) => {
            warn!(order_id = %notification.order_id, "notification_order_not_found");
            Err(WebhookError::OrderNotFound)
        }
        Err(e @ ReconcileError::Timeout(_)) => {
            error!(
                order_id = %notification.order_id,
                mapped_status = %mapped,
                error = %e,
                "notification_store_timeout"
            );
            Err(WebhookError::StoreUnavailable)
        }
        Err(e @ ReconcileError::Storage(_)) => {
            error!(
                order_id = %notification.order_id,
                mapped_status = %mapped,
                error = %e,
                "notification_store_failed"
            );
            Err(WebhookError::Internal)
        }
    }
}
