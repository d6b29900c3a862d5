use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use std::time::Duration;

const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Serialize)]
pub struct ReadinessReport {
    pub ready: bool,
    pub db: bool,
    pub redis: bool,
    pub gateway: &'static str,
}

async fn probe_db(pool: &sqlx::PgPool) -> bool {
    matches!(
        tokio::time::timeout(PROBE_TIMEOUT, sqlx::query("SELECT 1").execute(pool)).await,
        Ok(Ok(_))
    )
}

async fn probe_redis(client: &redis::Client) -> bool {
    let ping = async {
        let mut conn = client.get_multiplexed_async_connection().await?;
        redis::cmd("PING").query_async::<_, String>(&mut conn).await
    };
    matches!(tokio::time::timeout(PROBE_TIMEOUT, ping).await, Ok(Ok(_)))
}

pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let (db, redis) = tokio::join!(probe_db(&state.pool), probe_redis(&state.redis_client));
    let report = ReadinessReport {
        ready: db && redis,
        db,
        redis,
        gateway: state.payment_service.gateway.name(),
    };

    let status = if report.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report)).into_response()
}

pub async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({"alive": true}))).into_response()
}
