use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A workshop in the catalog
///
/// `price` is in major currency units; order payloads convert to minor units
/// (price x 100) at order-creation time. `registered_count` counts confirmed
/// free registrations and is only mutated through a conditional update that
/// cannot exceed `capacity`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Workshop {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Options Trading Basics")]
    pub title: String,
    pub description: String,
    /// Price in major units
    #[schema(example = "500.00")]
    pub price: Decimal,
    #[schema(example = "INR")]
    pub currency: String,
    #[schema(example = 30)]
    pub capacity: i32,
    #[schema(example = 12)]
    pub registered_count: i32,
    #[schema(example = true)]
    pub is_paid: bool,
    #[schema(example = true)]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Workshop {
    /// A workshop at capacity rejects new applications, free and paid alike
    pub fn is_full(&self) -> bool {
        self.capacity > 0 && self.registered_count >= self.capacity
    }
}

/// A trading service in the catalog
///
/// Unlike workshops there is no free path, no capacity and no duplicate
/// rule: every booking produces a payment order.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TradingService {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Portfolio Review Call")]
    pub title: String,
    pub description: String,
    /// Price in major units
    #[schema(example = "1500.00")]
    pub price: Decimal,
    #[schema(example = "INR")]
    pub currency: String,
    #[schema(example = true)]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A digital product (ebook, course download)
///
/// No order workflow of its own yet; exists as a payment target and as the
/// source of the product revenue breakdown in analytics.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct DigitalProduct {
    pub id: i32,
    pub title: String,
    pub price: Decimal,
    pub currency: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn workshop(capacity: i32, registered: i32) -> Workshop {
        Workshop {
            id: 1,
            title: "Options Trading Basics".to_string(),
            description: String::new(),
            price: dec!(500.00),
            currency: "INR".to_string(),
            capacity,
            registered_count: registered,
            is_paid: true,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_workshop_full_at_capacity() {
        assert!(workshop(30, 30).is_full());
        assert!(workshop(30, 31).is_full());
    }

    #[test]
    fn test_workshop_not_full_below_capacity() {
        assert!(!workshop(30, 29).is_full());
        assert!(!workshop(30, 0).is_full());
    }

    #[test]
    fn test_zero_capacity_means_unlimited() {
        assert!(!workshop(0, 1000).is_full());
    }
}
