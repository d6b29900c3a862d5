use crate::domain::booking::Booking;
use crate::domain::payment::{NewPayment, Payment, PaymentStatus, PaymentUpdate};
use crate::domain::principal::UserProfile;
use crate::repo::{BookingStore, PaymentStore, UserDirectory};
use anyhow::{anyhow, bail, Result};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::Mutex;

#[derive(Default)]
struct Tables {
    bookings: HashMap<i64, Booking>,
    payments: BTreeMap<i64, Payment>,
    users: HashMap<i64, UserProfile>,
    next_payment_id: i64,
}

/// Process-memory implementation of every store trait, for tests.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put_booking(&self, booking: Booking) {
        self.tables.lock().await.bookings.insert(booking.id, booking);
    }

    pub async fn put_user(&self, user: UserProfile) {
        self.tables.lock().await.users.insert(user.id, user);
    }

    pub async fn booking(&self, booking_id: i64) -> Option<Booking> {
        self.tables.lock().await.bookings.get(&booking_id).cloned()
    }

    pub async fn payments(&self) -> Vec<Payment> {
        self.tables.lock().await.payments.values().cloned().collect()
    }
}

#[async_trait::async_trait]
impl PaymentStore for InMemoryStore {
    async fn insert_payment(&self, new: &NewPayment) -> Result<Payment> {
        let mut tables = self.tables.lock().await;
        if tables
            .payments
            .values()
            .any(|p| p.bill_id.as_deref() == Some(new.bill_id.as_str()))
        {
            bail!("duplicate bill id {}", new.bill_id);
        }

        tables.next_payment_id += 1;
        let now = chrono::Utc::now();
        let payment = Payment {
            id: tables.next_payment_id,
            booking_id: new.booking_id,
            user_id: new.user_id,
            bill_id: Some(new.bill_id.clone()),
            amount: new.amount,
            status: PaymentStatus::Pending,
            payment_method: None,
            transaction_id: None,
            payment_date: None,
            bill_url: Some(new.bill_url.clone()),
            provider_responses: new.provider_responses.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.payments.insert(payment.id, payment.clone());
        Ok(payment)
    }

    async fn find_payment(&self, payment_id: i64) -> Result<Option<Payment>> {
        Ok(self.tables.lock().await.payments.get(&payment_id).cloned())
    }

    async fn find_payment_by_bill(&self, bill_id: &str) -> Result<Option<Payment>> {
        Ok(self
            .tables
            .lock()
            .await
            .payments
            .values()
            .find(|p| p.bill_id.as_deref() == Some(bill_id))
            .cloned())
    }

    async fn update_payment(&self, payment_id: i64, update: &PaymentUpdate) -> Result<Payment> {
        let mut tables = self.tables.lock().await;
        let payment = tables
            .payments
            .get_mut(&payment_id)
            .ok_or_else(|| anyhow!("payment {payment_id} disappeared during update"))?;

        payment.status = update.status;
        payment.payment_method = update.payment_method.clone();
        payment.payment_date = update.payment_date;
        payment.provider_responses = update.provider_responses.clone();
        payment.updated_at = chrono::Utc::now();
        Ok(payment.clone())
    }
}

#[async_trait::async_trait]
impl BookingStore for InMemoryStore {
    async fn find_booking(&self, booking_id: i64) -> Result<Option<Booking>> {
        Ok(self.booking(booking_id).await)
    }

    async fn link_payment(&self, booking_id: i64, payment_id: i64, status: PaymentStatus) -> Result<()> {
        let mut tables = self.tables.lock().await;
        let booking = tables
            .bookings
            .get_mut(&booking_id)
            .ok_or_else(|| anyhow!("booking {booking_id} missing while linking payment {payment_id}"))?;
        booking.payment_id = Some(payment_id);
        booking.payment_status = Some(status);
        Ok(())
    }

    async fn set_payment_status(&self, booking_id: i64, status: PaymentStatus) -> Result<()> {
        let mut tables = self.tables.lock().await;
        let booking = tables
            .bookings
            .get_mut(&booking_id)
            .ok_or_else(|| anyhow!("booking {booking_id} missing while propagating payment status"))?;
        booking.payment_status = Some(status);
        Ok(())
    }
}

#[async_trait::async_trait]
impl UserDirectory for InMemoryStore {
    async fn find_profile(&self, user_id: i64) -> Result<Option<UserProfile>> {
        Ok(self.tables.lock().await.users.get(&user_id).cloned())
    }
}
