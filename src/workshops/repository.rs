use sqlx::PgPool;

use crate::models::Workshop;
use crate::workshops::error::WorkshopError;
use crate::workshops::models::{CreateWorkshopOrder, WorkshopApplication};

const WORKSHOP_COLUMNS: &str =
    "id, title, description, price, currency, capacity, registered_count, is_paid, is_active, created_at";

const APPLICATION_COLUMNS: &str =
    "id, workshop_id, user_name, email, phone, experience_level, motivation, status, created_at, updated_at";

/// Map insert failures, turning a unique-index violation on
/// (workshop_id, email) into the typed duplicate error
fn map_insert_error(err: sqlx::Error) -> WorkshopError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            WorkshopError::DuplicateApplication
        }
        _ => WorkshopError::DatabaseError(err.to_string()),
    }
}

/// Repository for workshop catalog reads
#[derive(Clone)]
pub struct WorkshopsRepository {
    pool: PgPool,
}

impl WorkshopsRepository {
    /// Create a new WorkshopsRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an active workshop by id
    pub async fn find_active(&self, id: i32) -> Result<Option<Workshop>, WorkshopError> {
        let query = format!(
            "SELECT {} FROM workshops WHERE id = $1 AND is_active",
            WORKSHOP_COLUMNS
        );
        let workshop = sqlx::query_as::<_, Workshop>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(workshop)
    }

    /// List all active workshops
    pub async fn list_active(&self) -> Result<Vec<Workshop>, WorkshopError> {
        let query = format!(
            "SELECT {} FROM workshops WHERE is_active ORDER BY id",
            WORKSHOP_COLUMNS
        );
        let workshops = sqlx::query_as::<_, Workshop>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(workshops)
    }
}

/// Repository for workshop application operations
#[derive(Clone)]
pub struct WorkshopApplicationsRepository {
    pool: PgPool,
}

impl WorkshopApplicationsRepository {
    /// Create a new WorkshopApplicationsRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a pending application (paid path)
    ///
    /// Duplicate (workshop, email) submissions are rejected by the unique
    /// index, concurrent ones included.
    pub async fn create_pending(
        &self,
        request: &CreateWorkshopOrder,
    ) -> Result<WorkshopApplication, WorkshopError> {
        let query = format!(
            r#"
            INSERT INTO workshop_applications
                (workshop_id, user_name, email, phone, experience_level, motivation, status)
            VALUES ($1, $2, $3, $4, $5, $6, 'pending')
            RETURNING {}
            "#,
            APPLICATION_COLUMNS
        );

        sqlx::query_as::<_, WorkshopApplication>(&query)
            .bind(request.workshop_id)
            .bind(&request.user_name)
            .bind(&request.email)
            .bind(&request.user_phone)
            .bind(&request.experience_level)
            .bind(&request.motivation)
            .fetch_one(&self.pool)
            .await
            .map_err(map_insert_error)
    }

    /// Register for a free workshop in one transaction
    ///
    /// Inserts the application, takes a seat with a conditional increment
    /// (`registered_count < capacity`), then approves the application. A
    /// full workshop rolls everything back; the counter can never overrun
    /// capacity, concurrent registrations included.
    pub async fn register_free(
        &self,
        request: &CreateWorkshopOrder,
    ) -> Result<WorkshopApplication, WorkshopError> {
        let mut tx = self.pool.begin().await?;

        let insert_query = format!(
            r#"
            INSERT INTO workshop_applications
                (workshop_id, user_name, email, phone, experience_level, motivation, status)
            VALUES ($1, $2, $3, $4, $5, $6, 'pending')
            RETURNING {}
            "#,
            APPLICATION_COLUMNS
        );

        let application = sqlx::query_as::<_, WorkshopApplication>(&insert_query)
            .bind(request.workshop_id)
            .bind(&request.user_name)
            .bind(&request.email)
            .bind(&request.user_phone)
            .bind(&request.experience_level)
            .bind(&request.motivation)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_insert_error)?;

        let seated = sqlx::query(
            r#"
            UPDATE workshops
            SET registered_count = registered_count + 1
            WHERE id = $1 AND (capacity <= 0 OR registered_count < capacity)
            "#,
        )
        .bind(request.workshop_id)
        .execute(&mut *tx)
        .await?;

        if seated.rows_affected() == 0 {
            // Dropping the transaction rolls the insert back
            return Err(WorkshopError::WorkshopFull);
        }

        let approve_query = format!(
            r#"
            UPDATE workshop_applications
            SET status = 'approved', updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            APPLICATION_COLUMNS
        );

        let application = sqlx::query_as::<_, WorkshopApplication>(&approve_query)
            .bind(application.id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(application)
    }
}
