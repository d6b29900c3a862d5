use crate::domain::payment::{NewPayment, Payment, PaymentStatus, PaymentUpdate};
use crate::domain::provider_log::ProviderResponseLog;
use crate::repo::PaymentStore;
use anyhow::{Context, Result};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};

const PAYMENT_COLUMNS: &str = "id, booking_id, user_id, bill_id, amount, status, payment_method, \
     transaction_id, payment_date, bill_url, provider_responses, created_at, updated_at";

#[derive(Clone)]
pub struct PaymentsRepo {
    pub pool: PgPool,
}

fn payment_from_row(r: &PgRow) -> Result<Payment> {
    let status: String = r.get("status");
    let responses: Json<ProviderResponseLog> = r.get("provider_responses");
    Ok(Payment {
        id: r.get("id"),
        booking_id: r.get("booking_id"),
        user_id: r.get("user_id"),
        bill_id: r.get("bill_id"),
        amount: r.get("amount"),
        status: PaymentStatus::parse(&status)?,
        payment_method: r.get("payment_method"),
        transaction_id: r.get("transaction_id"),
        payment_date: r.get("payment_date"),
        bill_url: r.get("bill_url"),
        provider_responses: responses.0,
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    })
}

#[async_trait::async_trait]
impl PaymentStore for PaymentsRepo {
    async fn insert_payment(&self, new: &NewPayment) -> Result<Payment> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO payments (booking_id, user_id, bill_id, amount, status, bill_url, provider_responses)
            VALUES ($1, $2, $3, $4, 'pending', $5, $6)
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(new.booking_id)
        .bind(new.user_id)
        .bind(&new.bill_id)
        .bind(new.amount)
        .bind(&new.bill_url)
        .bind(Json(&new.provider_responses))
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("insert payment for bill {}", new.bill_id))?;

        payment_from_row(&row)
    }

    async fn find_payment(&self, payment_id: i64) -> Result<Option<Payment>> {
        let row = sqlx::query(&format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1"))
            .bind(payment_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(payment_from_row).transpose()
    }

    async fn find_payment_by_bill(&self, bill_id: &str) -> Result<Option<Payment>> {
        let row = sqlx::query(&format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE bill_id = $1"))
            .bind(bill_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(payment_from_row).transpose()
    }

    async fn update_payment(&self, payment_id: i64, update: &PaymentUpdate) -> Result<Payment> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE payments
            SET status = $2, payment_method = $3, payment_date = $4, provider_responses = $5, updated_at = now()
            WHERE id = $1
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(payment_id)
        .bind(update.status.as_str())
        .bind(&update.payment_method)
        .bind(update.payment_date)
        .bind(Json(&update.provider_responses))
        .fetch_optional(&self.pool)
        .await?
        .with_context(|| format!("payment {payment_id} disappeared during update"))?;

        payment_from_row(&row)
    }
}
