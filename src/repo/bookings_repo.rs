use crate::domain::booking::{Booking, BookingStatus};
use crate::domain::payment::PaymentStatus;
use crate::repo::BookingStore;
use anyhow::{bail, Result};
use sqlx::{PgPool, Row};

#[derive(Clone)]
pub struct BookingsRepo {
    pub pool: PgPool,
}

#[async_trait::async_trait]
impl BookingStore for BookingsRepo {
    async fn find_booking(&self, booking_id: i64) -> Result<Option<Booking>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, full_name, lot_number, booking_date, status, payment_id, payment_status, amount
            FROM bookings
            WHERE id = $1
            "#,
        )
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(r) = row else {
            return Ok(None);
        };
        let status: String = r.get("status");
        let payment_status: Option<String> = r.get("payment_status");

        Ok(Some(Booking {
            id: r.get("id"),
            user_id: r.get("user_id"),
            full_name: r.get("full_name"),
            lot_number: r.get("lot_number"),
            booking_date: r.get("booking_date"),
            status: BookingStatus::parse(&status)?,
            payment_id: r.get("payment_id"),
            payment_status: payment_status.as_deref().map(PaymentStatus::parse).transpose()?,
            amount: r.get("amount"),
        }))
    }

    async fn link_payment(&self, booking_id: i64, payment_id: i64, status: PaymentStatus) -> Result<()> {
        let res = sqlx::query(
            "UPDATE bookings SET payment_id = $2, payment_status = $3, updated_at = now() WHERE id = $1",
        )
        .bind(booking_id)
        .bind(payment_id)
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;

        if res.rows_affected() == 0 {
            bail!("booking {booking_id} missing while linking payment {payment_id}");
        }
        Ok(())
    }

    async fn set_payment_status(&self, booking_id: i64, status: PaymentStatus) -> Result<()> {
        let res = sqlx::query("UPDATE bookings SET payment_status = $2, updated_at = now() WHERE id = $1")
            .bind(booking_id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;

        if res.rows_affected() == 0 {
            bail!("booking {booking_id} missing while propagating payment status");
        }
        Ok(())
    }
}
