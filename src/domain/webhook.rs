use crate::domain::payment::PaymentStatus;
use serde::Deserialize;

/// Billplz reports `paid` as a JSON boolean on some paths and as a string on others.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PaidFlag {
    Bool(bool),
    Text(String),
}

impl PaidFlag {
    pub fn is_paid(&self) -> bool {
        match self {
            PaidFlag::Bool(b) => *b,
            PaidFlag::Text(s) => s == "true",
        }
    }
}

/// Fields of a bill payload that drive reconciliation. Webhook deliveries and
/// `GET /bills/{id}` responses share this shape.
#[derive(Debug, Clone, Deserialize)]
pub struct BillState {
    pub id: String,
    pub state: String,
    pub paid: PaidFlag,
    #[serde(default)]
    pub payment_method: Option<String>,
}

impl BillState {
    pub fn from_value(payload: &serde_json::Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(payload)
    }

    pub fn status(&self) -> PaymentStatus {
        decide_status(self.paid.is_paid(), &self.state)
    }
}

/// paid wins over state; "due" means still awaiting payment; anything else failed.
pub fn decide_status(paid: bool, state: &str) -> PaymentStatus {
    if paid {
        PaymentStatus::Completed
    } else if state == "due" {
        PaymentStatus::Pending
    } else {
        PaymentStatus::Failed
    }
}
