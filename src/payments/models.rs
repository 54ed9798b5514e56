use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::payments::error::PaymentError;

/// Payment lifecycle status
///
/// A payment is created `pending` at order-creation time and reaches a
/// terminal status through the settlement path (webhook or poller, not
/// implemented here; see `PaymentsRepository::mark_status`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Cancelled => "cancelled",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Business category of a payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    Workshop,
    Product,
    Subscription,
    Service,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Workshop => "workshop",
            PaymentType::Product => "product",
            PaymentType::Subscription => "subscription",
            PaymentType::Service => "service",
        }
    }
}

impl std::fmt::Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The entity a payment pays for
///
/// Tagged variant instead of multiple nullable foreign keys; exactly one
/// owner per payment, mirrored by the `payments_single_target` CHECK
/// constraint in the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum PaymentTarget {
    Workshop(Uuid),
    Service(Uuid),
    Product(i32),
}

impl PaymentTarget {
    pub fn type_str(&self) -> &'static str {
        match self {
            PaymentTarget::Workshop(_) => "workshop",
            PaymentTarget::Service(_) => "service",
            PaymentTarget::Product(_) => "product",
        }
    }

    /// Split into the nullable column triple (application_id, booking_id, product_id)
    pub fn columns(&self) -> (Option<Uuid>, Option<Uuid>, Option<i32>) {
        match self {
            PaymentTarget::Workshop(id) => (Some(*id), None, None),
            PaymentTarget::Service(id) => (None, Some(*id), None),
            PaymentTarget::Product(id) => (None, None, Some(*id)),
        }
    }

    /// Rebuild from stored columns, rejecting combinations the CHECK
    /// constraint should have made impossible
    pub fn from_columns(
        target_type: &str,
        application_id: Option<Uuid>,
        booking_id: Option<Uuid>,
        product_id: Option<i32>,
    ) -> Result<Self, PaymentError> {
        match (target_type, application_id, booking_id, product_id) {
            ("workshop", Some(id), None, None) => Ok(PaymentTarget::Workshop(id)),
            ("service", None, Some(id), None) => Ok(PaymentTarget::Service(id)),
            ("product", None, None, Some(id)) => Ok(PaymentTarget::Product(id)),
            _ => Err(PaymentError::InvalidTarget(format!(
                "target_type {} with inconsistent reference columns",
                target_type
            ))),
        }
    }
}

/// A persisted payment record, one per attempted payment
#[derive(Debug, Clone, Serialize)]
pub struct Payment {
    pub id: Uuid,
    /// Application-level unique token, not gateway-verified
    pub payment_id: String,
    /// Gateway order id, real or `order_mock_<hex>`
    pub gateway_order_id: String,
    /// Amount in major units, always derived from the local catalog price
    pub amount: Decimal,
    pub currency: String,
    pub status: PaymentStatus,
    pub payment_type: PaymentType,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub target: PaymentTarget,
    /// Raw gateway response blob; untrusted, stored for reconciliation only
    pub gateway_response: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Null until settlement
    pub completed_at: Option<DateTime<Utc>>,
}

/// Data for inserting a new payment record
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub payment_id: String,
    pub gateway_order_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub payment_type: PaymentType,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub target: PaymentTarget,
    pub gateway_response: Option<serde_json::Value>,
}

/// Generate a fresh application-level payment token
pub fn new_payment_token() -> String {
    format!("pay_{}", Uuid::new_v4().simple())
}

/// Convert a major-unit price to gateway minor units (price x 100)
///
/// `None` when the product would overflow an i64, which no real catalog
/// price does.
pub fn to_minor_units(price: Decimal) -> Option<i64> {
    use rust_decimal::prelude::ToPrimitive;
    (price * Decimal::ONE_HUNDRED).round_dp(0).to_i64()
}
