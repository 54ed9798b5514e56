use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Application status over its lifecycle
///
/// Free registrations go straight to `approved`; paid applications stay
/// `pending` until the settlement path moves them to `paid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
    Waitlist,
    Paid,
    Cancelled,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Waitlist => "waitlist",
            ApplicationStatus::Paid => "paid",
            ApplicationStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A workshop application, created once per (workshop, email) pair
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkshopApplication {
    pub id: Uuid,
    pub workshop_id: i32,
    pub user_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub experience_level: String,
    pub motivation: String,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_user_name() -> String {
    "Guest User".to_string()
}

fn default_email() -> String {
    "guest@example.com".to_string()
}

fn default_experience_level() -> String {
    "beginner".to_string()
}

/// Request DTO for creating a workshop order
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateWorkshopOrder {
    #[schema(example = 1)]
    pub workshop_id: i32,
    #[serde(default = "default_user_name")]
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    #[schema(example = "Asha Rao")]
    pub user_name: String,
    #[serde(default = "default_email")]
    #[validate(email(message = "Invalid email address"))]
    #[schema(example = "asha@example.com")]
    pub email: String,
    #[serde(default)]
    pub user_phone: Option<String>,
    #[serde(default = "default_experience_level")]
    #[validate(custom = "crate::validation::validate_experience_level")]
    #[schema(example = "beginner", pattern = "beginner|intermediate|advanced")]
    pub experience_level: String,
    #[serde(default)]
    #[validate(length(max = 2000, message = "Motivation must be at most 2000 characters"))]
    pub motivation: String,
}

/// Response for a paid workshop order
///
/// `amount` is in minor units (price x 100), always derived from the local
/// catalog price. `mock` is true when the gateway was unreachable and the
/// order id was synthesized locally.
#[derive(Debug, Serialize, ToSchema)]
pub struct WorkshopOrderCreated {
    #[schema(example = "order_mock_3fa2b81c09de")]
    pub order_id: String,
    /// Amount in minor units
    #[schema(example = 50000)]
    pub amount: i64,
    #[schema(example = "INR")]
    pub currency: String,
    #[schema(example = "pay_2f5b0c7e9d414f6b8a1c3e5d7f90ab12")]
    pub payment_id: String,
    pub item_title: String,
    /// Price in major units
    #[schema(example = "500.00")]
    pub item_price: Decimal,
    #[schema(example = "workshop")]
    pub item_type: String,
    pub application_id: Uuid,
    pub mock: bool,
}

/// Response for a successful free registration
#[derive(Debug, Serialize, ToSchema)]
pub struct FreeRegistration {
    #[schema(example = "Registration confirmed")]
    pub message: String,
    pub application_id: Uuid,
    #[schema(example = false)]
    pub requires_payment: bool,
}

/// Response for POST /api/workshops/order, shaped by the paid/free branch
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum WorkshopOrderResponse {
    Order(WorkshopOrderCreated),
    Free(FreeRegistration),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_order_defaults() {
        let request: CreateWorkshopOrder =
            serde_json::from_str(r#"{"workshop_id": 1}"#).unwrap();

        assert_eq!(request.workshop_id, 1);
        assert_eq!(request.user_name, "Guest User");
        assert_eq!(request.email, "guest@example.com");
        assert_eq!(request.experience_level, "beginner");
        assert_eq!(request.user_phone, None);
        assert_eq!(request.motivation, "");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_order_rejects_bad_email() {
        let request: CreateWorkshopOrder =
            serde_json::from_str(r#"{"workshop_id": 1, "email": "not-an-email"}"#).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_order_rejects_bad_experience_level() {
        let request: CreateWorkshopOrder = serde_json::from_str(
            r#"{"workshop_id": 1, "experience_level": "wizard"}"#,
        )
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_free_registration_serialization() {
        let response = WorkshopOrderResponse::Free(FreeRegistration {
            message: "Registration confirmed".to_string(),
            application_id: Uuid::new_v4(),
            requires_payment: false,
        });
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["requires_payment"], false);
        assert!(json.get("order_id").is_none());
    }
}
