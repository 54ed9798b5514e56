use sqlx::PgPool;

use crate::models::TradingService;
use crate::trading::error::BookingError;
use crate::trading::models::{CreateServiceOrder, ServiceBooking};

const SERVICE_COLUMNS: &str = "id, title, description, price, currency, is_active, created_at";

const BOOKING_COLUMNS: &str = "id, service_id, user_name, email, phone, message, \
     preferred_contact_method, preferred_time, status, created_at";

/// Repository for trading service catalog reads
#[derive(Clone)]
pub struct TradingServicesRepository {
    pool: PgPool,
}

impl TradingServicesRepository {
    /// Create a new TradingServicesRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an active service by id
    pub async fn find_active(&self, id: i32) -> Result<Option<TradingService>, BookingError> {
        let query = format!(
            "SELECT {} FROM trading_services WHERE id = $1 AND is_active",
            SERVICE_COLUMNS
        );
        let service = sqlx::query_as::<_, TradingService>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(service)
    }

    /// List all active services
    pub async fn list_active(&self) -> Result<Vec<TradingService>, BookingError> {
        let query = format!(
            "SELECT {} FROM trading_services WHERE is_active ORDER BY id",
            SERVICE_COLUMNS
        );
        let services = sqlx::query_as::<_, TradingService>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(services)
    }
}

/// Repository for service booking operations
#[derive(Clone)]
pub struct ServiceBookingsRepository {
    pool: PgPool,
}

impl ServiceBookingsRepository {
    /// Create a new ServiceBookingsRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a pending booking
    pub async fn create(
        &self,
        request: &CreateServiceOrder,
    ) -> Result<ServiceBooking, BookingError> {
        let query = format!(
            r#"
            INSERT INTO service_bookings
                (service_id, user_name, email, phone, message, preferred_contact_method,
                 preferred_time, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending')
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        );

        let booking = sqlx::query_as::<_, ServiceBooking>(&query)
            .bind(request.service_id)
            .bind(&request.user_name)
            .bind(&request.email)
            .bind(&request.user_phone)
            .bind(&request.message)
            .bind(&request.preferred_contact_method)
            .bind(&request.preferred_time)
            .fetch_one(&self.pool)
            .await?;

        Ok(booking)
    }
}
