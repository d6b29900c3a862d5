use crate::domain::payment::PaymentStatus;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Approved,
    Rejected,
}

impl BookingStatus {
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "approved" => Ok(BookingStatus::Approved),
            "rejected" => Ok(BookingStatus::Rejected),
            other => anyhow::bail!("unknown booking status {other:?}"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i64,
    pub user_id: Option<i64>,
    pub full_name: String,
    pub lot_number: Option<String>,
    pub booking_date: NaiveDate,
    pub status: BookingStatus,
    pub payment_id: Option<i64>,
    pub payment_status: Option<PaymentStatus>,
    pub amount: Decimal,
}

impl Booking {
    pub fn bill_description(&self) -> String {
        format!("Booking #{} - Carboot Slot Booking", self.id)
    }
}
