mod analytics;
mod db;
mod error;
mod gateway;
mod models;
mod payments;
mod trading;
mod validation;
mod workshops;

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use analytics::{AnalyticsQueryService, AnalyticsSyncManager, SyncDomain};
use gateway::{GatewayConfig, GatewayOrderClient};
use payments::PaymentsRepository;
use trading::{ServiceBookingsRepository, ServiceOrderService, TradingServicesRepository};
use workshops::{WorkshopApplicationsRepository, WorkshopOrderService, WorkshopsRepository};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        workshops::handlers::create_workshop_order_handler,
        workshops::handlers::list_workshops_handler,
        trading::handlers::create_service_order_handler,
        trading::handlers::list_services_handler,
        analytics::handlers::dashboard_metrics_handler,
        analytics::handlers::revenue_trends_handler,
        analytics::handlers::top_content_handler,
        analytics::handlers::sync_handler,
    ),
    components(
        schemas(
            models::Workshop,
            models::TradingService,
            workshops::ApplicationStatus,
            workshops::CreateWorkshopOrder,
            workshops::WorkshopOrderCreated,
            workshops::FreeRegistration,
            trading::CreateServiceOrder,
            trading::ServiceOrderCreated,
            analytics::DashboardMetrics,
            analytics::RevenueSummary,
            analytics::UserSummary,
            analytics::WorkshopSummary,
            analytics::ContentSummary,
            analytics::ContentAnalytics,
            analytics::RevenueTrendPoint,
            analytics::DomainSyncResult,
        )
    ),
    tags(
        (name = "workshops", description = "Workshop registration and order endpoints"),
        (name = "services", description = "Trading service booking endpoints"),
        (name = "analytics", description = "Reporting dashboard and sync endpoints")
    ),
    info(
        title = "Academy API",
        version = "1.0.0",
        description = "Trading-education backend: workshop and service payment orders plus a reporting analytics layer"
    )
)]
struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub workshops: WorkshopsRepository,
    pub trading_services: TradingServicesRepository,
    pub workshop_orders: WorkshopOrderService,
    pub service_orders: ServiceOrderService,
    pub analytics: AnalyticsQueryService,
    pub analytics_sync: AnalyticsSyncManager,
}

impl AppState {
    /// Wire repositories and services over one pool and gateway client
    pub fn new(db: PgPool, gateway: GatewayOrderClient) -> Self {
        let workshops = WorkshopsRepository::new(db.clone());
        let applications = WorkshopApplicationsRepository::new(db.clone());
        let trading_services = TradingServicesRepository::new(db.clone());
        let bookings = ServiceBookingsRepository::new(db.clone());
        let payments = PaymentsRepository::new(db.clone());

        let workshop_orders = WorkshopOrderService::new(
            workshops.clone(),
            applications,
            payments.clone(),
            gateway.clone(),
        );
        let service_orders = ServiceOrderService::new(
            trading_services.clone(),
            bookings,
            payments,
            gateway,
        );

        Self {
            analytics: AnalyticsQueryService::new(db.clone()),
            analytics_sync: AnalyticsSyncManager::new(db.clone()),
            db,
            workshops,
            trading_services,
            workshop_orders,
            service_orders,
        }
    }
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS middleware
fn create_router(state: AppState) -> Router {
    use tower_http::cors::{Any, CorsLayer};

    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Workshop endpoints
        .route("/api/workshops", get(workshops::list_workshops_handler))
        .route("/api/workshops/:id", get(workshops::get_workshop_handler))
        .route(
            "/api/workshops/order",
            post(workshops::create_workshop_order_handler),
        )
        // Trading service endpoints
        .route("/api/services", get(trading::list_services_handler))
        .route("/api/services/:id", get(trading::get_service_handler))
        .route(
            "/api/services/order",
            post(trading::create_service_order_handler),
        )
        // Analytics endpoints
        .route(
            "/api/analytics/dashboard",
            get(analytics::dashboard_metrics_handler),
        )
        .route(
            "/api/analytics/revenue/trends",
            get(analytics::revenue_trends_handler),
        )
        .route(
            "/api/analytics/content/top",
            get(analytics::top_content_handler),
        )
        .route("/api/analytics/sync/:domain", post(analytics::sync_handler))
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Academy API - Starting...");

    // Get configuration from environment variables
    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&database_url)
        .await
        .expect("Failed to create database pool");

    // Run SQLx migrations on startup
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations completed successfully");

    // Operator command: `academy-api sync [all|users|workshops|content|revenue|newsletters|services]`
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(String::as_str) == Some("sync") {
        let selector = args.get(2).map(String::as_str).unwrap_or("all");
        let domain: SyncDomain = selector.parse().expect("Unknown sync domain");

        let sync = AnalyticsSyncManager::new(db_pool);
        let results = sync.run(domain).await.expect("Analytics sync failed");
        for result in results {
            tracing::info!("Synced {}: {} rows", result.domain, result.rows);
        }
        return;
    }

    let gateway = GatewayOrderClient::new(GatewayConfig::from_env())
        .expect("Failed to build gateway client");

    // Create the application router
    let app = create_router(AppState::new(db_pool, gateway));

    // Start the Axum server
    let addr = format!("{}:{}", host, port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Academy API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await.expect("Server error");
}

#[cfg(test)]
mod tests;
