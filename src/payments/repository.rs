use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::payments::error::PaymentError;
use crate::payments::models::{
    NewPayment, Payment, PaymentStatus, PaymentTarget, PaymentType,
};

const PAYMENT_COLUMNS: &str = "id, payment_id, gateway_order_id, amount, currency, status, \
     payment_type, customer_name, customer_email, customer_phone, target_type, \
     application_id, booking_id, product_id, gateway_response, created_at, updated_at, \
     completed_at";

/// Raw payments row; the nullable reference columns are collapsed into a
/// `PaymentTarget` before the record leaves this module
#[derive(Debug, FromRow)]
struct PaymentRow {
    id: Uuid,
    payment_id: String,
    gateway_order_id: String,
    amount: Decimal,
    currency: String,
    status: PaymentStatus,
    payment_type: PaymentType,
    customer_name: String,
    customer_email: String,
    customer_phone: Option<String>,
    target_type: String,
    application_id: Option<Uuid>,
    booking_id: Option<Uuid>,
    product_id: Option<i32>,
    gateway_response: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = PaymentError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let target = PaymentTarget::from_columns(
            &row.target_type,
            row.application_id,
            row.booking_id,
            row.product_id,
        )?;
        Ok(Payment {
            id: row.id,
            payment_id: row.payment_id,
            gateway_order_id: row.gateway_order_id,
            amount: row.amount,
            currency: row.currency,
            status: row.status,
            payment_type: row.payment_type,
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            customer_phone: row.customer_phone,
            target,
            gateway_response: row.gateway_response,
            created_at: row.created_at,
            updated_at: row.updated_at,
            completed_at: row.completed_at,
        })
    }
}

/// Repository for payment record operations
#[derive(Clone)]
pub struct PaymentsRepository {
    pool: PgPool,
}

impl PaymentsRepository {
    /// Create a new PaymentsRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new payment record with status `pending`
    pub async fn create(&self, new_payment: NewPayment) -> Result<Payment, PaymentError> {
        let (application_id, booking_id, product_id) = new_payment.target.columns();

        let query = format!(
            r#"
            INSERT INTO payments
                (payment_id, gateway_order_id, amount, currency, status, payment_type,
                 customer_name, customer_email, customer_phone, target_type,
                 application_id, booking_id, product_id, gateway_response)
            VALUES ($1, $2, $3, $4, 'pending', $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {}
            "#,
            PAYMENT_COLUMNS
        );

        let row = sqlx::query_as::<_, PaymentRow>(&query)
            .bind(&new_payment.payment_id)
            .bind(&new_payment.gateway_order_id)
            .bind(new_payment.amount)
            .bind(&new_payment.currency)
            .bind(new_payment.payment_type)
            .bind(&new_payment.customer_name)
            .bind(&new_payment.customer_email)
            .bind(&new_payment.customer_phone)
            .bind(new_payment.target.type_str())
            .bind(application_id)
            .bind(booking_id)
            .bind(product_id)
            .bind(&new_payment.gateway_response)
            .fetch_one(&self.pool)
            .await?;

        row.try_into()
    }

    /// Find a payment by its application-level token
    pub async fn find_by_payment_id(
        &self,
        payment_id: &str,
    ) -> Result<Option<Payment>, PaymentError> {
        let query = format!("SELECT {} FROM payments WHERE payment_id = $1", PAYMENT_COLUMNS);

        let row = sqlx::query_as::<_, PaymentRow>(&query)
            .bind(payment_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Payment::try_from).transpose()
    }

    /// Move a payment to a new status
    ///
    /// Settlement hook for the (out-of-scope) confirmation path: a webhook or
    /// poller verifies the gateway order and then calls this. `completed_at`
    /// is stamped exactly once, on the transition to `completed`.
    pub async fn mark_status(
        &self,
        payment_id: &str,
        status: PaymentStatus,
    ) -> Result<Payment, PaymentError> {
        let query = format!(
            r#"
            UPDATE payments
            SET status = $1,
                updated_at = NOW(),
                completed_at = CASE
                    WHEN $1 = 'completed' AND completed_at IS NULL THEN NOW()
                    ELSE completed_at
                END
            WHERE payment_id = $2
            RETURNING {}
            "#,
            PAYMENT_COLUMNS
        );

        let row = sqlx::query_as::<_, PaymentRow>(&query)
            .bind(status)
            .bind(payment_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(PaymentError::NotFound)?;

        row.try_into()
    }
}
