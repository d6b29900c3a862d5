use axum::middleware::from_fn_with_state;
use lot_payments::config::{is_production, AppConfig, BillplzConfig};
use lot_payments::gateways::billplz::BillplzGateway;
use lot_payments::gateways::signature::SignatureVerifier;
use lot_payments::http::middleware::rate_limit::{enforce, RateLimitState};
use lot_payments::http::routes::build_router;
use lot_payments::repo::bookings_repo::BookingsRepo;
use lot_payments::repo::payments_repo::PaymentsRepo;
use lot_payments::repo::users_repo::UsersRepo;
use lot_payments::service::booking_locks::BookingLocks;
use lot_payments::service::payment_service::PaymentService;
use lot_payments::AppState;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cfg = AppConfig::from_env();
    cfg.check_internal_key(is_production())?;
    let billplz = BillplzConfig::from_env();
    if billplz.api_key.is_empty() || billplz.x_signature_key.is_empty() {
        tracing::warn!("BILLPLZ_API_KEY or BILLPLZ_X_SIGNATURE_KEY is empty; bill creation and webhooks will fail");
    }
    tracing::info!(
        "billplz endpoint {} (sandbox={})",
        billplz.base_url,
        billplz.is_sandbox()
    );

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&cfg.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let verifier = SignatureVerifier::new(billplz.x_signature_key.clone());
    let gateway = Arc::new(BillplzGateway::new(billplz, reqwest::Client::new()));

    let payment_service = PaymentService {
        payments: Arc::new(PaymentsRepo { pool: pool.clone() }),
        bookings: Arc::new(BookingsRepo { pool: pool.clone() }),
        users: Arc::new(UsersRepo { pool: pool.clone() }),
        gateway,
        locks: BookingLocks::new(),
    };

    let state = AppState {
        payment_service,
        verifier,
        pool: pool.clone(),
        redis_client: redis::Client::open(cfg.redis_url.clone())?,
    };

    let app = build_router(state, cfg.internal_api_key.clone()).layer(from_fn_with_state(
        RateLimitState {
            redis_client: redis::Client::open(cfg.redis_url.clone())?,
            max_per_minute: cfg.rate_limit_per_minute,
        },
        enforce,
    ));

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!("listening on {}", cfg.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
