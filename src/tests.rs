// Handler tests for the Academy API
// Covers the workshop and service order workflows and the analytics layer

use super::*;
use axum::http::StatusCode;
use axum_test::TestServer;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

// ============================================================================
// Test Helpers
// ============================================================================

/// Helper function to create a test database pool
/// Connects to the database, runs migrations, and cleans test data
async fn create_test_pool() -> PgPool {
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgresql://academy_user:academy_pass@db:5432/academy_db".to_string());

    let pool = crate::db::create_pool(&database_url)
        .await
        .expect("Failed to connect to test database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    // Clean up any existing test data; children before parents
    for table in [
        "payments",
        "user_analytics",
        "workshop_analytics",
        "content_analytics",
        "revenue_analytics",
        "newsletter_analytics",
        "trading_service_analytics",
        "workshop_applications",
        "service_bookings",
        "workshops",
        "trading_services",
        "digital_products",
        "users",
        "content_posts",
        "newsletter_campaigns",
    ] {
        sqlx::query(&format!("DELETE FROM {}", table))
            .execute(&pool)
            .await
            .expect("Failed to clean test data");
    }

    pool
}

/// Gateway client aimed at an unreachable endpoint so every order takes the
/// mock fallback deterministically
fn unreachable_gateway() -> gateway::GatewayOrderClient {
    gateway::GatewayOrderClient::new(gateway::GatewayConfig {
        order_url: "http://127.0.0.1:9/orders".to_string(),
        key_id: "test_key".to_string(),
        key_secret: "test_secret".to_string(),
    })
    .expect("Failed to build gateway client")
}

/// Helper function to create a test app with database
async fn create_test_app(pool: PgPool) -> TestServer {
    let state = AppState::new(pool, unreachable_gateway());
    TestServer::new(create_router(state)).unwrap()
}

async fn seed_workshop(
    pool: &PgPool,
    title: &str,
    price: Decimal,
    capacity: i32,
    registered: i32,
    is_paid: bool,
    is_active: bool,
) -> i32 {
    sqlx::query_scalar(
        r#"
        INSERT INTO workshops (title, price, currency, capacity, registered_count, is_paid, is_active)
        VALUES ($1, $2, 'INR', $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(title)
    .bind(price)
    .bind(capacity)
    .bind(registered)
    .bind(is_paid)
    .bind(is_active)
    .fetch_one(pool)
    .await
    .expect("Failed to seed workshop")
}

async fn seed_service(pool: &PgPool, title: &str, price: Decimal, is_active: bool) -> i32 {
    sqlx::query_scalar(
        r#"
        INSERT INTO trading_services (title, price, currency, is_active)
        VALUES ($1, $2, 'INR', $3)
        RETURNING id
        "#,
    )
    .bind(title)
    .bind(price)
    .bind(is_active)
    .fetch_one(pool)
    .await
    .expect("Failed to seed service")
}

async fn count_payments_for_application(pool: &PgPool, application_id: Uuid) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM payments WHERE application_id = $1")
        .bind(application_id)
        .fetch_one(pool)
        .await
        .expect("Failed to count payments")
}

// ============================================================================
// Workshop Order Tests (POST /api/workshops/order)
// ============================================================================

/// Paid workshop order with the gateway unreachable: mock order id, minor
/// unit amount from the local price, pending payment and application rows
#[tokio::test]
async fn test_paid_workshop_order_mock_fallback() {
    let pool = create_test_pool().await;
    let workshop_id = seed_workshop(&pool, "Options Basics", dec!(500), 30, 0, true, true).await;
    let server = create_test_app(pool.clone()).await;

    let response = server
        .post("/api/workshops/order")
        .json(&json!({ "workshop_id": workshop_id, "email": "a@b.com" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();

    assert!(body["order_id"]
        .as_str()
        .unwrap()
        .starts_with("order_mock_"));
    assert_eq!(body["amount"], 50000);
    assert_eq!(body["currency"], "INR");
    assert_eq!(body["mock"], true);
    assert_eq!(body["item_type"], "workshop");
    assert_eq!(body["item_title"], "Options Basics");
    assert!(body["payment_id"].as_str().unwrap().starts_with("pay_"));

    let application_id = Uuid::parse_str(body["application_id"].as_str().unwrap()).unwrap();

    // One pending payment carrying the major-unit catalog price
    let (amount, status): (Decimal, String) = sqlx::query_as(
        "SELECT amount, status FROM payments WHERE application_id = $1",
    )
    .bind(application_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(amount, dec!(500));
    assert_eq!(status, "pending");

    // The application stays pending until settlement
    let app_status: String =
        sqlx::query_scalar("SELECT status FROM workshop_applications WHERE id = $1")
            .bind(application_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(app_status, "pending");
}

/// Free workshop registration: approved application, counter +1, no payment
#[tokio::test]
async fn test_free_workshop_registration() {
    let pool = create_test_pool().await;
    let workshop_id = seed_workshop(&pool, "Intro Webinar", dec!(0), 30, 0, false, true).await;
    let server = create_test_app(pool.clone()).await;

    let response = server
        .post("/api/workshops/order")
        .json(&json!({ "workshop_id": workshop_id, "email": "free@b.com" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["requires_payment"], false);
    assert!(body.get("order_id").is_none());

    let application_id = Uuid::parse_str(body["application_id"].as_str().unwrap()).unwrap();

    let app_status: String =
        sqlx::query_scalar("SELECT status FROM workshop_applications WHERE id = $1")
            .bind(application_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(app_status, "approved");

    let registered: i32 =
        sqlx::query_scalar("SELECT registered_count FROM workshops WHERE id = $1")
            .bind(workshop_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(registered, 1);

    assert_eq!(count_payments_for_application(&pool, application_id).await, 0);
}

/// A full workshop rejects paid and free applications alike
#[tokio::test]
async fn test_full_workshop_rejected() {
    let pool = create_test_pool().await;
    let paid_id = seed_workshop(&pool, "Full Paid", dec!(500), 10, 10, true, true).await;
    let free_id = seed_workshop(&pool, "Full Free", dec!(0), 10, 10, false, true).await;
    let server = create_test_app(pool.clone()).await;

    for id in [paid_id, free_id] {
        let response = server
            .post("/api/workshops/order")
            .json(&json!({ "workshop_id": id, "email": "late@b.com" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CONFLICT);
    }

    // Nothing was recorded for the full workshops
    let applications: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM workshop_applications")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(applications, 0);
}

/// Free registration cannot overrun capacity even when the catalog row was
/// read before the last seat went
#[tokio::test]
async fn test_free_workshop_last_seat() {
    let pool = create_test_pool().await;
    let workshop_id = seed_workshop(&pool, "Last Seat", dec!(0), 2, 1, false, true).await;
    let server = create_test_app(pool.clone()).await;

    let first = server
        .post("/api/workshops/order")
        .json(&json!({ "workshop_id": workshop_id, "email": "one@b.com" }))
        .await;
    assert_eq!(first.status_code(), StatusCode::OK);

    let second = server
        .post("/api/workshops/order")
        .json(&json!({ "workshop_id": workshop_id, "email": "two@b.com" }))
        .await;
    assert_eq!(second.status_code(), StatusCode::CONFLICT);

    let registered: i32 =
        sqlx::query_scalar("SELECT registered_count FROM workshops WHERE id = $1")
            .bind(workshop_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(registered, 2);
}

/// A second application for the same (workshop, email) pair is rejected
#[tokio::test]
async fn test_duplicate_application_rejected() {
    let pool = create_test_pool().await;
    let workshop_id = seed_workshop(&pool, "Dup Check", dec!(500), 30, 0, true, true).await;
    let server = create_test_app(pool.clone()).await;

    let first = server
        .post("/api/workshops/order")
        .json(&json!({ "workshop_id": workshop_id, "email": "dup@b.com" }))
        .await;
    assert_eq!(first.status_code(), StatusCode::OK);

    // Same email, different case: the unique index is case-insensitive
    let second = server
        .post("/api/workshops/order")
        .json(&json!({ "workshop_id": workshop_id, "email": "Dup@b.com" }))
        .await;
    assert_eq!(second.status_code(), StatusCode::CONFLICT);

    let applications: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM workshop_applications WHERE workshop_id = $1",
    )
    .bind(workshop_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(applications, 1);
}

/// Unknown and inactive workshops both return 404
#[tokio::test]
async fn test_workshop_order_not_found() {
    let pool = create_test_pool().await;
    let inactive_id = seed_workshop(&pool, "Retired", dec!(500), 30, 0, true, false).await;
    let server = create_test_app(pool).await;

    let unknown = server
        .post("/api/workshops/order")
        .json(&json!({ "workshop_id": 999999, "email": "x@b.com" }))
        .await;
    assert_eq!(unknown.status_code(), StatusCode::NOT_FOUND);

    let inactive = server
        .post("/api/workshops/order")
        .json(&json!({ "workshop_id": inactive_id, "email": "x@b.com" }))
        .await;
    assert_eq!(inactive.status_code(), StatusCode::NOT_FOUND);
}

/// Invalid email is rejected before any row is written
#[tokio::test]
async fn test_workshop_order_invalid_email() {
    let pool = create_test_pool().await;
    let workshop_id = seed_workshop(&pool, "Validation", dec!(500), 30, 0, true, true).await;
    let server = create_test_app(pool.clone()).await;

    let response = server
        .post("/api/workshops/order")
        .json(&json!({ "workshop_id": workshop_id, "email": "not-an-email" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let applications: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM workshop_applications")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(applications, 0);
}

// ============================================================================
// Service Order Tests (POST /api/services/order)
// ============================================================================

/// Every service booking produces a payment order; mock fallback applies
#[tokio::test]
async fn test_service_order_creates_booking_and_payment() {
    let pool = create_test_pool().await;
    let service_id = seed_service(&pool, "Portfolio Review", dec!(1500), true).await;
    let server = create_test_app(pool.clone()).await;

    let response = server
        .post("/api/services/order")
        .json(&json!({ "service_id": service_id, "email": "svc@b.com" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();

    assert!(body["order_id"].as_str().unwrap().starts_with("order_mock_"));
    assert_eq!(body["amount"], 150000);
    assert_eq!(body["item_type"], "service");
    assert_eq!(body["mock"], true);

    let booking_id = Uuid::parse_str(body["booking_id"].as_str().unwrap()).unwrap();

    let (payment_type, target_type): (String, String) = sqlx::query_as(
        "SELECT payment_type, target_type FROM payments WHERE booking_id = $1",
    )
    .bind(booking_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(payment_type, "service");
    assert_eq!(target_type, "service");

    let contact_method: String =
        sqlx::query_scalar("SELECT preferred_contact_method FROM service_bookings WHERE id = $1")
            .bind(booking_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(contact_method, "whatsapp");
}

/// Repeat bookings from the same email are allowed for services
#[tokio::test]
async fn test_service_order_no_duplicate_rule() {
    let pool = create_test_pool().await;
    let service_id = seed_service(&pool, "Repeat Service", dec!(800), true).await;
    let server = create_test_app(pool.clone()).await;

    for _ in 0..2 {
        let response = server
            .post("/api/services/order")
            .json(&json!({ "service_id": service_id, "email": "again@b.com" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    let bookings: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM service_bookings WHERE service_id = $1")
            .bind(service_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(bookings, 2);
}

/// Unknown and inactive services both return 404
#[tokio::test]
async fn test_service_order_not_found() {
    let pool = create_test_pool().await;
    let inactive_id = seed_service(&pool, "Retired Service", dec!(800), false).await;
    let server = create_test_app(pool).await;

    let unknown = server
        .post("/api/services/order")
        .json(&json!({ "service_id": 999999 }))
        .await;
    assert_eq!(unknown.status_code(), StatusCode::NOT_FOUND);

    let inactive = server
        .post("/api/services/order")
        .json(&json!({ "service_id": inactive_id }))
        .await;
    assert_eq!(inactive.status_code(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Catalog Tests
// ============================================================================

/// Catalog lists return only active rows
#[tokio::test]
async fn test_catalog_lists_active_only() {
    let pool = create_test_pool().await;
    seed_workshop(&pool, "Active WS", dec!(500), 30, 0, true, true).await;
    seed_workshop(&pool, "Inactive WS", dec!(500), 30, 0, true, false).await;
    seed_service(&pool, "Active Svc", dec!(800), true).await;
    seed_service(&pool, "Inactive Svc", dec!(800), false).await;
    let server = create_test_app(pool).await;

    let workshops: serde_json::Value = server.get("/api/workshops").await.json();
    assert_eq!(workshops.as_array().unwrap().len(), 1);
    assert_eq!(workshops[0]["title"], "Active WS");

    let services: serde_json::Value = server.get("/api/services").await.json();
    assert_eq!(services.as_array().unwrap().len(), 1);
    assert_eq!(services[0]["title"], "Active Svc");
}

/// Unknown catalog ids return the shared NOT_FOUND error shape
#[tokio::test]
async fn test_catalog_get_not_found() {
    let pool = create_test_pool().await;
    let server = create_test_app(pool).await;

    let response = server.get("/api/workshops/999999").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error_code"], "NOT_FOUND");
}

// ============================================================================
// Analytics Tests
// ============================================================================

/// Dashboard metrics on an empty reporting store: all-zero nested structure
#[tokio::test]
async fn test_dashboard_metrics_empty_store() {
    let pool = create_test_pool().await;
    let server = create_test_app(pool).await;

    let response = server.get("/api/analytics/dashboard").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: serde_json::Value = response.json();
    assert_eq!(body["revenue"]["total"], "0");
    assert_eq!(body["revenue"]["transactions"], 0);
    assert_eq!(body["users"]["total"], 0);
    assert_eq!(body["workshops"]["total"], 0);
    assert_eq!(body["workshops"]["avg_fill_rate"], 0.0);
    assert_eq!(body["content"]["posts"], 0);
}

/// Full sync populates every reporting table and is idempotent: a second
/// run over unchanged operational data rewrites identical rows
#[tokio::test]
async fn test_full_sync_idempotent() {
    let pool = create_test_pool().await;
    let workshop_id = seed_workshop(&pool, "Sync WS", dec!(500), 10, 3, true, true).await;
    let service_id = seed_service(&pool, "Sync Svc", dec!(1500), true).await;

    sqlx::query("INSERT INTO users (name, email, last_login) VALUES ('Asha', 'sync@b.com', NOW())")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO content_posts (title, views, likes) VALUES ('Post', 200, 40)")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query(
        "INSERT INTO newsletter_campaigns (subject, recipients, opens, clicks) VALUES ('Issue 1', 100, 50, 10)",
    )
    .execute(&pool)
    .await
    .unwrap();

    // A booked service with a settled payment so revenue has a row
    let server = create_test_app(pool.clone()).await;
    let order: serde_json::Value = server
        .post("/api/services/order")
        .json(&json!({ "service_id": service_id, "email": "sync@b.com" }))
        .await
        .json();
    payments::PaymentsRepository::new(pool.clone())
        .mark_status(
            order["payment_id"].as_str().unwrap(),
            payments::PaymentStatus::Completed,
        )
        .await
        .unwrap();

    async fn service_snapshot(pool: &PgPool) -> Vec<(i32, i64, Decimal)> {
        sqlx::query_as(
            "SELECT service_id, bookings_total, revenue_total FROM trading_service_analytics ORDER BY service_id",
        )
        .fetch_all(pool)
        .await
        .unwrap()
    }

    let sync = analytics::AnalyticsSyncManager::new(pool.clone());
    sync.full_sync().await.expect("first sync failed");

    let first = service_snapshot(&pool).await;
    assert_eq!(first, vec![(service_id, 1, dec!(1500))]);

    let workshop_row: (i64, f64) = sqlx::query_as(
        "SELECT applications_total, fill_rate FROM workshop_analytics WHERE workshop_id = $1",
    )
    .bind(workshop_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(workshop_row.0, 0);
    assert_eq!(workshop_row.1, 0.3);

    let revenue: (Decimal, Decimal, i64) = sqlx::query_as(
        "SELECT total_revenue, service_revenue, transactions FROM revenue_analytics WHERE date = CURRENT_DATE",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(revenue, (dec!(1500), dec!(1500), 1));

    // Second run, nothing changed: identical rows
    sync.full_sync().await.expect("second sync failed");
    let second = service_snapshot(&pool).await;
    assert_eq!(first, second);

    let engagement: f64 =
        sqlx::query_scalar("SELECT engagement_rate FROM content_analytics LIMIT 1")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(engagement, 0.2);
}

/// Per-domain sync over the HTTP operator endpoint
#[tokio::test]
async fn test_sync_endpoint() {
    let pool = create_test_pool().await;
    seed_workshop(&pool, "Endpoint WS", dec!(500), 10, 0, true, true).await;
    let server = create_test_app(pool.clone()).await;

    let response = server.post("/api/analytics/sync/workshops").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body[0]["domain"], "workshops");
    assert_eq!(body[0]["rows"], 1);

    let unknown = server.post("/api/analytics/sync/payments").await;
    assert_eq!(unknown.status_code(), StatusCode::BAD_REQUEST);
}

/// Top content ordering and limit
#[tokio::test]
async fn test_top_content() {
    let pool = create_test_pool().await;
    for (title, views) in [("low", 10_i64), ("high", 500), ("mid", 100)] {
        sqlx::query("INSERT INTO content_posts (title, views, likes) VALUES ($1, $2, 0)")
            .bind(title)
            .bind(views)
            .execute(&pool)
            .await
            .unwrap();
    }
    let sync = analytics::AnalyticsSyncManager::new(pool.clone());
    sync.run(analytics::SyncDomain::Content).await.unwrap();

    let server = create_test_app(pool).await;
    let body: serde_json::Value = server
        .get("/api/analytics/content/top?limit=2")
        .await
        .json();
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["view_count"], 500);
    assert_eq!(rows[1]["view_count"], 100);
}

/// The trends window covers exactly `days` calendar days ending today
#[tokio::test]
async fn test_revenue_trends_window_bounds() {
    let pool = create_test_pool().await;
    for offset in [0, 6, 7] {
        sqlx::query(
            "INSERT INTO revenue_analytics (date, total_revenue, transactions)
             VALUES (CURRENT_DATE - $1, 100, 1)",
        )
        .bind(offset)
        .execute(&pool)
        .await
        .unwrap();
    }

    let server = create_test_app(pool).await;
    let body: serde_json::Value = server
        .get("/api/analytics/revenue/trends?days=7")
        .await
        .json();
    // Today and six days back are in; the seventh day back is out
    assert_eq!(body.as_array().unwrap().len(), 2);
}

// ============================================================================
// Payment Settlement Tests
// ============================================================================

/// `mark_status` stamps `completed_at` once, on the transition to
/// `completed`, and later status changes leave it untouched
#[tokio::test]
async fn test_mark_status_stamps_completed_at_once() {
    let pool = create_test_pool().await;
    let service_id = seed_service(&pool, "Settlement Svc", dec!(900), true).await;
    let server = create_test_app(pool.clone()).await;

    let order: serde_json::Value = server
        .post("/api/services/order")
        .json(&json!({ "service_id": service_id, "email": "settle@b.com" }))
        .await
        .json();
    let payment_id = order["payment_id"].as_str().unwrap();

    let payments = payments::PaymentsRepository::new(pool.clone());

    let completed = payments
        .mark_status(payment_id, payments::PaymentStatus::Completed)
        .await
        .unwrap();
    assert_eq!(completed.status, payments::PaymentStatus::Completed);
    let stamped = completed.completed_at.expect("completed_at not stamped");

    // Re-settling does not move the stamp
    let again = payments
        .mark_status(payment_id, payments::PaymentStatus::Completed)
        .await
        .unwrap();
    assert_eq!(again.completed_at, Some(stamped));

    // Neither does a later transition away from completed
    let refunded = payments
        .mark_status(payment_id, payments::PaymentStatus::Refunded)
        .await
        .unwrap();
    assert_eq!(refunded.status, payments::PaymentStatus::Refunded);
    assert_eq!(refunded.completed_at, Some(stamped));

    // Unknown token is a typed miss
    assert!(payments
        .mark_status("pay_does_not_exist", payments::PaymentStatus::Completed)
        .await
        .is_err());
}
