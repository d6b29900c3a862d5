use crate::domain::booking::Booking;
use crate::domain::payment::{NewPayment, Payment, PaymentStatus, PaymentUpdate};
use crate::domain::principal::UserProfile;
use anyhow::Result;

pub mod bookings_repo;
pub mod memory;
pub mod payments_repo;
pub mod users_repo;

#[async_trait::async_trait]
pub trait PaymentStore: Send + Sync {
    async fn insert_payment(&self, new: &NewPayment) -> Result<Payment>;

    async fn find_payment(&self, payment_id: i64) -> Result<Option<Payment>>;

    async fn find_payment_by_bill(&self, bill_id: &str) -> Result<Option<Payment>>;

    /// Overwrites status, method, date and response log; errors if the row is gone.
    async fn update_payment(&self, payment_id: i64, update: &PaymentUpdate) -> Result<Payment>;
}

#[async_trait::async_trait]
pub trait BookingStore: Send + Sync {
    async fn find_booking(&self, booking_id: i64) -> Result<Option<Booking>>;

    async fn link_payment(&self, booking_id: i64, payment_id: i64, status: PaymentStatus) -> Result<()>;

    async fn set_payment_status(&self, booking_id: i64, status: PaymentStatus) -> Result<()>;
}

#[async_trait::async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_profile(&self, user_id: i64) -> Result<Option<UserProfile>>;
}
