use crate::domain::booking::Booking;
use crate::domain::payment::{
    NewPayment, Payment, PaymentDescriptor, PaymentStatus, PaymentUpdate, ReconcileOutcome,
    StatusCheckResponse,
};
use crate::domain::principal::{can_access, Principal, UserProfile};
use crate::domain::provider_log::{ProviderResponseLog, ResponseSource};
use crate::domain::webhook::BillState;
use crate::error::PaymentError;
use crate::gateways::{BillGateway, BillRequest};
use crate::repo::{BookingStore, PaymentStore, UserDirectory};
use crate::service::booking_locks::BookingLocks;
use std::sync::Arc;

#[derive(Clone)]
pub struct PaymentService {
    pub payments: Arc<dyn PaymentStore>,
    pub bookings: Arc<dyn BookingStore>,
    pub users: Arc<dyn UserDirectory>,
    pub gateway: Arc<dyn BillGateway>,
    pub locks: BookingLocks,
}

impl PaymentService {
    /// Returns the booking's outstanding bill when its latest payment is still
    /// pending, otherwise raises a new one.
    pub async fn request_payment(
        &self,
        booking_id: i64,
        principal: &Principal,
    ) -> Result<PaymentDescriptor, PaymentError> {
        let _guard = self.locks.acquire(booking_id).await;

        let booking = self
            .bookings
            .find_booking(booking_id)
            .await?
            .ok_or(PaymentError::NotFound("booking"))?;

        if !can_access(principal, booking.user_id) {
            return Err(PaymentError::Unauthorized);
        }

        if let Some(payment_id) = booking.payment_id {
            if let Some(existing) = self.payments.find_payment(payment_id).await? {
                if existing.status == PaymentStatus::Pending {
                    tracing::info!(
                        "reusing pending payment {} for booking {}",
                        existing.id,
                        booking.id
                    );
                    return Ok(existing.descriptor());
                }
            }
        }

        let payer = self
            .users
            .find_profile(principal.user_id)
            .await?
            .ok_or(PaymentError::NotFound("user"))?;

        self.create_bill(&booking, &payer).await
    }

    /// Raises a bill upstream, records the payment and links it to the booking.
    /// Callers must hold the booking's lock.
    pub async fn create_bill(
        &self,
        booking: &Booking,
        payer: &UserProfile,
    ) -> Result<PaymentDescriptor, PaymentError> {
        let request = BillRequest::for_booking(booking, payer)?;

        let bill = self.gateway.create_bill(&request).await.map_err(|e| {
            tracing::error!(
                "{} bill creation failed for booking {}: {:#}",
                self.gateway.name(),
                booking.id,
                e
            );
            PaymentError::UpstreamFailure("bill creation failed")
        })?;

        let payment = self
            .payments
            .insert_payment(&NewPayment {
                booking_id: booking.id,
                user_id: payer.id,
                bill_id: bill.bill_id.clone(),
                amount: booking.amount,
                bill_url: bill.url.clone(),
                provider_responses: ProviderResponseLog::seeded(bill.raw, chrono::Utc::now()),
            })
            .await
            .map_err(|e| {
                tracing::error!(
                    "bill {} created upstream but not recorded for booking {}",
                    bill.bill_id,
                    booking.id
                );
                PaymentError::Storage(e)
            })?;

        self.bookings
            .link_payment(booking.id, payment.id, PaymentStatus::Pending)
            .await?;

        tracing::info!(
            "created bill {} (payment {}) for booking {}, amount_minor={}",
            bill.bill_id,
            payment.id,
            booking.id,
            request.amount_minor
        );
        Ok(payment.descriptor())
    }

    pub async fn get_payment(
        &self,
        payment_id: i64,
        principal: &Principal,
    ) -> Result<Payment, PaymentError> {
        let payment = self
            .payments
            .find_payment(payment_id)
            .await?
            .ok_or(PaymentError::NotFound("payment"))?;

        if !can_access(principal, Some(payment.user_id)) {
            return Err(PaymentError::Unauthorized);
        }
        Ok(payment)
    }

    /// Applies a signature-verified webhook body. The caller is responsible for
    /// the signature check.
    pub async fn reconcile_webhook(
        &self,
        payload: serde_json::Value,
    ) -> Result<ReconcileOutcome, PaymentError> {
        let state = BillState::from_value(&payload)
            .map_err(|e| PaymentError::ValidationFailure(format!("webhook payload: {e}")))?;

        let payment = self
            .payments
            .find_payment_by_bill(&state.id)
            .await?
            .ok_or(PaymentError::NotFound("payment for bill"))?;

        let updated = self
            .apply_bill_state(payment.id, payment.booking_id, &state, ResponseSource::Webhook, payload)
            .await?;

        Ok(ReconcileOutcome {
            payment_id: updated.id,
            bill_id: state.id,
            status: updated.status,
        })
    }

    /// Local record joined with the provider's live view of the bill. A payload
    /// carrying bill state is reconciled the same way a webhook would be.
    pub async fn check_status(
        &self,
        bill_id: &str,
        principal: &Principal,
    ) -> Result<StatusCheckResponse, PaymentError> {
        let payment = self
            .payments
            .find_payment_by_bill(bill_id)
            .await?
            .ok_or(PaymentError::NotFound("payment"))?;

        if !can_access(principal, Some(payment.user_id)) {
            return Err(PaymentError::Unauthorized);
        }

        let live = self.gateway.fetch_bill(bill_id).await.map_err(|e| {
            tracing::error!("{} status check failed for bill {}: {:#}", self.gateway.name(), bill_id, e);
            PaymentError::UpstreamFailure("status check failed")
        })?;

        let payment = match BillState::from_value(&live) {
            Ok(state) if state.id == bill_id => {
                self.apply_bill_state(
                    payment.id,
                    payment.booking_id,
                    &state,
                    ResponseSource::StatusCheck,
                    live.clone(),
                )
                .await?
            }
            Ok(state) => {
                tracing::warn!("status check for bill {} returned bill {}", bill_id, state.id);
                payment
            }
            Err(_) => payment,
        };

        Ok(StatusCheckResponse {
            payment,
            provider_status: live,
        })
    }

    /// Writes the decided status to the payment and then the same status to its
    /// booking. Re-reads the payment under the booking lock so the response log
    /// is appended to the latest copy.
    async fn apply_bill_state(
        &self,
        payment_id: i64,
        booking_id: i64,
        state: &BillState,
        source: ResponseSource,
        raw: serde_json::Value,
    ) -> Result<Payment, PaymentError> {
        let _guard = self.locks.acquire(booking_id).await;

        let current = self
            .payments
            .find_payment(payment_id)
            .await?
            .ok_or(PaymentError::NotFound("payment"))?;

        let now = chrono::Utc::now();
        let status = state.status();
        let payment_date = if state.paid.is_paid() {
            match (current.status, current.payment_date) {
                (PaymentStatus::Completed, Some(paid_at)) => Some(paid_at),
                _ => Some(now),
            }
        } else {
            None
        };

        let mut responses = current.provider_responses.clone();
        responses.record(source, raw, now);

        let updated = self
            .payments
            .update_payment(
                current.id,
                &PaymentUpdate {
                    status,
                    payment_method: state.payment_method.clone(),
                    payment_date,
                    provider_responses: responses,
                },
            )
            .await?;

        if let Err(e) = self.bookings.set_payment_status(booking_id, status).await {
            tracing::error!(
                "payment {} is {} but booking {} was not updated: {:#}",
                updated.id,
                status.as_str(),
                booking_id,
                e
            );
            return Err(PaymentError::Storage(e));
        }

        if current.status.is_terminal() && current.status != status {
            tracing::warn!(
                "payment {} left terminal status {} for {} via {:?}",
                updated.id,
                current.status.as_str(),
                status.as_str(),
                source
            );
        } else if current.status != status {
            tracing::info!(
                "payment {} moved {} -> {} via {:?}",
                updated.id,
                current.status.as_str(),
                status.as_str(),
                source
            );
        }
        Ok(updated)
    }
}
