use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A booking for a trading service
///
/// No capacity or duplicate rule applies; any number of bookings per email
/// is permitted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ServiceBooking {
    pub id: Uuid,
    pub service_id: i32,
    pub user_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub preferred_contact_method: String,
    pub preferred_time: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

fn default_user_name() -> String {
    "Guest User".to_string()
}

fn default_email() -> String {
    "guest@example.com".to_string()
}

fn default_contact_method() -> String {
    "whatsapp".to_string()
}

/// Request DTO for creating a service order
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateServiceOrder {
    #[schema(example = 1)]
    pub service_id: i32,
    #[serde(default = "default_user_name")]
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub user_name: String,
    #[serde(default = "default_email")]
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[serde(default)]
    pub user_phone: Option<String>,
    #[serde(default)]
    #[validate(length(max = 2000, message = "Message must be at most 2000 characters"))]
    pub message: String,
    #[serde(default = "default_contact_method")]
    #[validate(custom = "crate::validation::validate_contact_method")]
    #[schema(example = "whatsapp", pattern = "whatsapp|email|phone")]
    pub preferred_contact_method: String,
    #[serde(default)]
    pub preferred_time: Option<String>,
}

/// Response for POST /api/services/order
///
/// Mirrors the paid workshop order shape with `booking_id` in place of
/// `application_id`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceOrderCreated {
    pub order_id: String,
    /// Amount in minor units
    #[schema(example = 150000)]
    pub amount: i64,
    #[schema(example = "INR")]
    pub currency: String,
    pub payment_id: String,
    pub item_title: String,
    /// Price in major units
    pub item_price: Decimal,
    #[schema(example = "service")]
    pub item_type: String,
    pub booking_id: Uuid,
    pub mock: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_order_defaults() {
        let request: CreateServiceOrder =
            serde_json::from_str(r#"{"service_id": 3}"#).unwrap();

        assert_eq!(request.service_id, 3);
        assert_eq!(request.user_name, "Guest User");
        assert_eq!(request.email, "guest@example.com");
        assert_eq!(request.preferred_contact_method, "whatsapp");
        assert_eq!(request.preferred_time, None);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_order_rejects_bad_contact_method() {
        let request: CreateServiceOrder = serde_json::from_str(
            r#"{"service_id": 3, "preferred_contact_method": "pigeon"}"#,
        )
        .unwrap();
        assert!(request.validate().is_err());
    }
}
