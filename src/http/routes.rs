use crate::http::handlers::{ops, payments};
use crate::http::middleware::principal_auth::require_principal;
use crate::AppState;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;

pub fn build_router(state: AppState, internal_api_key: String) -> Router {
    let principal_routes = Router::new()
        .route("/api/payments/create", post(payments::create_payment))
        .route("/api/payments/status/:bill_id", get(payments::check_status))
        .route("/api/payments/:payment_id", get(payments::get_payment))
        .layer(from_fn_with_state(internal_api_key, require_principal));

    Router::new()
        .route("/health", get(payments::health))
        .route("/api/payments/webhook", post(payments::webhook))
        .route("/ops/readiness", get(ops::readiness))
        .route("/ops/liveness", get(ops::liveness))
        .merge(principal_routes)
        .with_state(state)
}
