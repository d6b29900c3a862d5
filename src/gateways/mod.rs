use crate::domain::booking::Booking;
use crate::domain::principal::UserProfile;
use crate::error::PaymentError;
use anyhow::Result;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

pub mod billplz;
pub mod mock;
pub mod signature;

/// Provider-neutral description of the bill to raise for one booking.
#[derive(Debug, Clone, PartialEq)]
pub struct BillRequest {
    pub booking_id: i64,
    pub user_id: i64,
    pub email: String,
    pub name: String,
    pub amount_minor: i64,
    pub description: String,
}

impl BillRequest {
    pub fn for_booking(booking: &Booking, payer: &UserProfile) -> Result<Self, PaymentError> {
        Ok(Self {
            booking_id: booking.id,
            user_id: payer.id,
            email: payer.email.clone(),
            name: payer.full_name.clone(),
            amount_minor: to_minor_units(booking.amount)?,
            description: booking.bill_description(),
        })
    }
}

pub fn to_minor_units(amount: Decimal) -> Result<i64, PaymentError> {
    if amount <= Decimal::ZERO {
        return Err(PaymentError::ValidationFailure(format!(
            "booking amount must be positive, got {amount}"
        )));
    }
    (amount * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| PaymentError::ValidationFailure(format!("booking amount {amount} out of range")))
}

#[derive(Debug, Clone)]
pub struct CreatedBill {
    pub bill_id: String,
    pub url: String,
    pub raw: serde_json::Value,
}

#[async_trait::async_trait]
pub trait BillGateway: Send + Sync {
    fn name(&self) -> &'static str;

    async fn create_bill(&self, request: &BillRequest) -> Result<CreatedBill>;

    /// Raw provider view of a bill. Never touches local state.
    async fn fetch_bill(&self, bill_id: &str) -> Result<serde_json::Value>;
}
