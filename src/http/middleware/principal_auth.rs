use crate::domain::principal::{Principal, Role};
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use subtle::ConstantTimeEq;

/// The auth tier in front of this service resolves sessions and forwards the
/// caller as headers, proving itself with the shared internal key.
pub async fn require_principal(
    State(expected_key): State<String>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let provided = request
        .headers()
        .get("X-Internal-Api-Key")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");
    let key_ok: bool = provided.as_bytes().ct_eq(expected_key.as_bytes()).into();

    let principal = match principal_from_headers(request.headers()) {
        Some(p) if key_ok => p,
        _ => {
            return Response::builder()
                .status(StatusCode::UNAUTHORIZED)
                .body(Body::from("unauthorized"))
                .unwrap_or_else(|_| Response::new(Body::from("unauthorized")));
        }
    };

    request.extensions_mut().insert(principal);
    next.run(request).await
}

pub fn principal_from_headers(headers: &HeaderMap) -> Option<Principal> {
    let user_id = headers
        .get("X-User-Id")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.trim().parse::<i64>().ok())?;
    let role = headers
        .get("X-User-Role")
        .and_then(|h| h.to_str().ok())
        .map(Role::from_header)
        .unwrap_or(Role::User);

    Some(Principal { user_id, role })
}
