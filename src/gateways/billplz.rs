use crate::config::BillplzConfig;
use crate::gateways::{BillGateway, BillRequest, CreatedBill};
use anyhow::{anyhow, bail, Context, Result};
use serde_json::json;
use std::time::Duration;

pub struct BillplzGateway {
    config: BillplzConfig,
    client: reqwest::Client,
}

impl BillplzGateway {
    pub fn new(config: BillplzConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    pub fn bill_body(&self, request: &BillRequest) -> serde_json::Value {
        json!({
            "collection_id": self.config.collection_id,
            "email": request.email,
            "name": request.name,
            "amount": request.amount_minor,
            "callback_url": self.config.callback_url,
            "redirect_url": self.config.redirect_url,
            "description": request.description,
            "reference_1_label": "Booking ID",
            "reference_1": request.booking_id.to_string(),
            "reference_2_label": "User ID",
            "reference_2": request.user_id.to_string(),
        })
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(self.config.timeout_ms)
    }
}

#[async_trait::async_trait]
impl BillGateway for BillplzGateway {
    fn name(&self) -> &'static str {
        "billplz"
    }

    async fn create_bill(&self, request: &BillRequest) -> Result<CreatedBill> {
        let url = format!("{}/bills", self.config.base_url);
        let resp = self
            .client
            .post(url)
            .basic_auth(&self.config.api_key, None::<&str>)
            .json(&self.bill_body(request))
            .timeout(self.timeout())
            .send()
            .await
            .context("billplz create bill request")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!(
                "billplz create bill returned HTTP {}: {}",
                status.as_u16(),
                body.chars().take(200).collect::<String>()
            );
        }

        let raw: serde_json::Value = resp.json().await.context("billplz create bill body")?;
        let bill_id = raw
            .get("id")
            .and_then(|v| v.as_str())
            .map(ToString::to_string)
            .ok_or_else(|| anyhow!("billplz create bill response missing id"))?;
        let url = raw
            .get("url")
            .and_then(|v| v.as_str())
            .map(ToString::to_string)
            .ok_or_else(|| anyhow!("billplz create bill response missing url"))?;

        Ok(CreatedBill { bill_id, url, raw })
    }

    async fn fetch_bill(&self, bill_id: &str) -> Result<serde_json::Value> {
        let url = format!("{}/bills/{}", self.config.base_url, bill_id);
        let resp = self
            .client
            .get(url)
            .basic_auth(&self.config.api_key, None::<&str>)
            .timeout(self.timeout())
            .send()
            .await
            .context("billplz get bill request")?;

        let status = resp.status();
        if !status.is_success() {
            bail!("billplz get bill {} returned HTTP {}", bill_id, status.as_u16());
        }

        resp.json().await.context("billplz get bill body")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use std::sync::{Arc, Mutex};

    fn gateway(base_url: &str) -> BillplzGateway {
        BillplzGateway::new(
            BillplzConfig {
                api_key: "key".to_string(),
                collection_id: "col_1".to_string(),
                x_signature_key: "sig".to_string(),
                base_url: base_url.to_string(),
                callback_url: "http://svc/api/payments/webhook".to_string(),
                redirect_url: "http://web/payment/status".to_string(),
                timeout_ms: 2000,
            },
            reqwest::Client::new(),
        )
    }

    fn bill_request() -> BillRequest {
        BillRequest {
            booking_id: 7,
            user_id: 12,
            email: "a@b.com".to_string(),
            name: "Aisyah".to_string(),
            amount_minor: 2550,
            description: "Booking #7 - Carboot Slot Booking".to_string(),
        }
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    type Seen = Arc<Mutex<Vec<String>>>;

    async fn accept_bill(
        State(seen): State<Seen>,
        headers: HeaderMap,
        Json(body): Json<serde_json::Value>,
    ) -> Json<serde_json::Value> {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        seen.lock().unwrap().push(format!("{} amount={}", auth, body["amount"]));
        Json(json!({"id": "b1", "url": "https://billplz.test/bills/b1", "state": "due"}))
    }

    async fn known_bill(Path(id): Path<String>) -> axum::response::Response {
        if id == "b1" {
            Json(json!({"id": "b1", "state": "paid", "paid": true})).into_response()
        } else {
            StatusCode::NOT_FOUND.into_response()
        }
    }

    #[test]
    fn wire_body_carries_references_and_urls() {
        let body = gateway("http://billplz.test/api/v3").bill_body(&bill_request());

        assert_eq!(body["amount"], 2550);
        assert_eq!(body["collection_id"], "col_1");
        assert_eq!(body["reference_1"], "7");
        assert_eq!(body["reference_2"], "12");
        assert_eq!(body["reference_1_label"], "Booking ID");
        assert_eq!(body["callback_url"], "http://svc/api/payments/webhook");
        assert!(body["description"].as_str().unwrap().contains('7'));
    }

    #[tokio::test]
    async fn create_posts_with_key_as_basic_auth_user() {
        let seen = Seen::default();
        let base = serve(
            Router::new()
                .route("/bills", post(accept_bill))
                .with_state(seen.clone()),
        )
        .await;

        let bill = gateway(&base).create_bill(&bill_request()).await.unwrap();

        assert_eq!(bill.bill_id, "b1");
        assert_eq!(bill.url, "https://billplz.test/bills/b1");
        assert_eq!(bill.raw["state"], "due");
        assert_eq!(*seen.lock().unwrap(), vec!["Basic a2V5Og== amount=2550".to_string()]);
    }

    #[tokio::test]
    async fn create_fails_on_server_error() {
        let base = serve(Router::new().route(
            "/bills",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream down") }),
        ))
        .await;

        let err = gateway(&base).create_bill(&bill_request()).await.unwrap_err();
        assert!(err.to_string().contains("HTTP 500"), "{err}");
    }

    #[tokio::test]
    async fn create_fails_when_response_lacks_id_or_url() {
        let no_id = serve(Router::new().route(
            "/bills",
            post(|| async { Json(json!({"url": "https://billplz.test/bills/x"})) }),
        ))
        .await;
        let no_url = serve(Router::new().route(
            "/bills",
            post(|| async { Json(json!({"id": "x"})) }),
        ))
        .await;

        let err = gateway(&no_id).create_bill(&bill_request()).await.unwrap_err();
        assert!(err.to_string().contains("missing id"), "{err}");
        let err = gateway(&no_url).create_bill(&bill_request()).await.unwrap_err();
        assert!(err.to_string().contains("missing url"), "{err}");
    }

    #[tokio::test]
    async fn fetch_returns_bill_and_fails_on_unknown() {
        let base = serve(Router::new().route("/bills/:id", get(known_bill))).await;
        let gw = gateway(&base);

        let bill = gw.fetch_bill("b1").await.unwrap();
        assert_eq!(bill["state"], "paid");

        let err = gw.fetch_bill("nope").await.unwrap_err();
        assert!(err.to_string().contains("HTTP 404"), "{err}");
    }
}
