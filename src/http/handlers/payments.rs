use crate::domain::payment::{CreatePaymentRequest, ReconcileOutcome};
use crate::domain::principal::Principal;
use crate::error::PaymentError;
use crate::AppState;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub message: &'static str,
    #[serde(flatten)]
    pub outcome: ReconcileOutcome,
}

pub async fn create_payment(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreatePaymentRequest>,
) -> impl IntoResponse {
    match state
        .payment_service
        .request_payment(req.booking_id, &principal)
        .await
    {
        Ok(resp) => (axum::http::StatusCode::OK, Json(resp)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_payment(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(payment_id): Path<i64>,
) -> impl IntoResponse {
    match state.payment_service.get_payment(payment_id, &principal).await {
        Ok(payment) => (axum::http::StatusCode::OK, Json(payment)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn check_status(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(bill_id): Path<String>,
) -> impl IntoResponse {
    match state.payment_service.check_status(&bill_id, &principal).await {
        Ok(resp) => (axum::http::StatusCode::OK, Json(resp)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Unauthenticated transport; the body signature is the only gate.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    if !state.verifier.verify(&headers, &body) {
        tracing::warn!("rejected webhook with missing or invalid signature");
        return PaymentError::InvalidSignature.into_response();
    }

    let payload: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            return PaymentError::ValidationFailure(format!("webhook body is not JSON: {e}"))
                .into_response()
        }
    };

    match state.payment_service.reconcile_webhook(payload).await {
        Ok(outcome) => (
            axum::http::StatusCode::OK,
            Json(WebhookAck {
                message: "Webhook processed successfully",
                outcome,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!("webhook not applied: {}", e);
            e.into_response()
        }
    }
}

pub async fn health() -> impl IntoResponse {
    (axum::http::StatusCode::OK, "ok")
}
