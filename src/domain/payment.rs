use crate::domain::provider_log::ProviderResponseLog;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    /// Declared by the schema; nothing in the reconciliation path produces it.
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }

    pub fn parse(s: &str) -> anyhow::Result<Self> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "completed" => Ok(PaymentStatus::Completed),
            "failed" => Ok(PaymentStatus::Failed),
            "refunded" => Ok(PaymentStatus::Refunded),
            other => anyhow::bail!("unknown payment status {other:?}"),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Completed | PaymentStatus::Failed)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: i64,
    pub booking_id: i64,
    pub user_id: i64,
    pub bill_id: Option<String>,
    pub amount: Decimal,
    pub status: PaymentStatus,
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
    pub payment_date: Option<DateTime<Utc>>,
    pub bill_url: Option<String>,
    pub provider_responses: ProviderResponseLog,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn descriptor(&self) -> PaymentDescriptor {
        PaymentDescriptor {
            payment_id: self.id,
            bill_id: self.bill_id.clone(),
            bill_url: self.bill_url.clone(),
            status: self.status,
        }
    }
}

/// Row written once a bill has been created upstream.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub booking_id: i64,
    pub user_id: i64,
    pub bill_id: String,
    pub amount: Decimal,
    pub bill_url: String,
    pub provider_responses: ProviderResponseLog,
}

/// Full overwrite of the fields a reconciliation may touch.
#[derive(Debug, Clone)]
pub struct PaymentUpdate {
    pub status: PaymentStatus,
    pub payment_method: Option<String>,
    pub payment_date: Option<DateTime<Utc>>,
    pub provider_responses: ProviderResponseLog,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDescriptor {
    pub payment_id: i64,
    #[serde(rename = "billplzBillId")]
    pub bill_id: Option<String>,
    #[serde(rename = "billplzUrl")]
    pub bill_url: Option<String>,
    pub status: PaymentStatus,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub booking_id: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileOutcome {
    pub payment_id: i64,
    #[serde(rename = "billplzBillId")]
    pub bill_id: String,
    pub status: PaymentStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCheckResponse {
    pub payment: Payment,
    #[serde(rename = "billplzStatus")]
    pub provider_status: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorPayload,
}

#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}
