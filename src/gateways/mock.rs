use crate::gateways::{BillGateway, BillRequest, CreatedBill};
use anyhow::{bail, Result};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    AlwaysSuccess,
    AlwaysFailure,
}

/// In-process stand-in for the provider. Remembers every bill request and
/// serves whatever status payload a test registers for a bill id.
pub struct MockBillGateway {
    pub behavior: MockBehavior,
    requests: Mutex<Vec<BillRequest>>,
    statuses: Mutex<HashMap<String, serde_json::Value>>,
}

impl MockBillGateway {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            requests: Mutex::new(Vec::new()),
            statuses: Mutex::new(HashMap::new()),
        }
    }

    pub fn requests(&self) -> Vec<BillRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn set_status(&self, bill_id: &str, payload: serde_json::Value) {
        if let Ok(mut statuses) = self.statuses.lock() {
            statuses.insert(bill_id.to_string(), payload);
        }
    }
}

#[async_trait::async_trait]
impl BillGateway for MockBillGateway {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn create_bill(&self, request: &BillRequest) -> Result<CreatedBill> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        if self.behavior == MockBehavior::AlwaysFailure {
            bail!("mock provider declined bill");
        }

        let bill_id = format!("mock_bill_{}", uuid::Uuid::new_v4().simple());
        let url = format!("https://mock.billplz.test/bills/{bill_id}");
        let raw = json!({
            "id": bill_id,
            "url": url,
            "amount": request.amount_minor,
            "state": "due",
            "paid": false,
            "description": request.description,
        });
        Ok(CreatedBill { bill_id, url, raw })
    }

    async fn fetch_bill(&self, bill_id: &str) -> Result<serde_json::Value> {
        if self.behavior == MockBehavior::AlwaysFailure {
            bail!("mock provider unavailable");
        }
        match self.statuses.lock().ok().and_then(|s| s.get(bill_id).cloned()) {
            Some(payload) => Ok(payload),
            None => Ok(json!({"id": bill_id, "state": "due", "paid": false})),
        }
    }
}
