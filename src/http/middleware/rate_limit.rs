use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use chrono::{DateTime, Utc};
use redis::AsyncCommands;

/// Fixed one-minute window per client IP, counted in Redis. Requests pass
/// through when Redis is unreachable.
#[derive(Clone)]
pub struct RateLimitState {
    pub redis_client: redis::Client,
    pub max_per_minute: i64,
}

pub async fn enforce(
    State(state): State<RateLimitState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let key = window_key(&client_ip(request.headers()), Utc::now());

    if let Ok(mut conn) = state.redis_client.get_multiplexed_async_connection().await {
        let count: i64 = conn.incr(&key, 1).await.unwrap_or(1);
        let _: bool = conn.expire(&key, 120).await.unwrap_or(false);
        if count > state.max_per_minute {
            tracing::warn!("rate limit exceeded for {}", key);
            return Response::builder()
                .status(StatusCode::TOO_MANY_REQUESTS)
                .body(Body::from("rate limit exceeded"))
                .unwrap_or_else(|_| Response::new(Body::from("rate limit exceeded")));
        }
    }

    next.run(request).await
}

pub fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

pub fn window_key(ip: &str, now: DateTime<Utc>) -> String {
    format!("lot-payments:rate:{}:{}", ip, now.format("%Y%m%d%H%M"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::TimeZone;

    #[test]
    fn uses_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(" 10.0.0.1 , 172.16.0.2"));
        assert_eq!(client_ip(&headers), "10.0.0.1");
        assert_eq!(client_ip(&HeaderMap::new()), "unknown");
    }

    #[test]
    fn key_changes_every_minute() {
        let t = Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 59).unwrap();
        assert_eq!(window_key("1.2.3.4", t), "lot-payments:rate:1.2.3.4:202610190830");
        let next = t + chrono::Duration::seconds(1);
        assert_ne!(window_key("1.2.3.4", t), window_key("1.2.3.4", next));
    }
}
