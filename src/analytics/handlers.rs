// HTTP handlers for analytics endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::analytics::{
    AnalyticsError, ContentAnalytics, DashboardMetrics, DomainSyncResult, RevenueTrendPoint,
    SyncDomain,
};
use crate::AppState;

const DEFAULT_WINDOW_DAYS: i32 = 30;
const DEFAULT_TOP_CONTENT: i64 = 10;

/// Query parameters for windowed dashboard queries
#[derive(Debug, Deserialize)]
pub struct WindowParams {
    /// Trailing window in days
    pub days: Option<i32>,
}

/// Query parameters for the top-content query
#[derive(Debug, Deserialize)]
pub struct TopContentParams {
    pub limit: Option<i64>,
}

/// Handler for GET /api/analytics/dashboard
/// Never fails: an empty reporting store yields an all-zero structure
#[utoipa::path(
    get,
    path = "/api/analytics/dashboard",
    params(("days" = Option<i32>, Query, description = "Trailing window in days, default 30")),
    responses(
        (status = 200, description = "Dashboard metrics", body = DashboardMetrics)
    ),
    tag = "analytics"
)]
pub async fn dashboard_metrics_handler(
    State(state): State<AppState>,
    Query(params): Query<WindowParams>,
) -> Json<DashboardMetrics> {
    let days = params.days.unwrap_or(DEFAULT_WINDOW_DAYS).max(1);
    Json(state.analytics.dashboard_metrics(days).await)
}

/// Handler for GET /api/analytics/revenue/trends
#[utoipa::path(
    get,
    path = "/api/analytics/revenue/trends",
    params(("days" = Option<i32>, Query, description = "Trailing window in days, default 30")),
    responses(
        (status = 200, description = "Daily revenue breakdowns, ascending by date", body = Vec<RevenueTrendPoint>)
    ),
    tag = "analytics"
)]
pub async fn revenue_trends_handler(
    State(state): State<AppState>,
    Query(params): Query<WindowParams>,
) -> Json<Vec<RevenueTrendPoint>> {
    let days = params.days.unwrap_or(DEFAULT_WINDOW_DAYS).max(1);
    Json(state.analytics.revenue_trends(days).await)
}

/// Handler for GET /api/analytics/content/top
#[utoipa::path(
    get,
    path = "/api/analytics/content/top",
    params(("limit" = Option<i64>, Query, description = "Number of rows, default 10")),
    responses(
        (status = 200, description = "Content rows by view count, descending", body = Vec<ContentAnalytics>)
    ),
    tag = "analytics"
)]
pub async fn top_content_handler(
    State(state): State<AppState>,
    Query(params): Query<TopContentParams>,
) -> Json<Vec<ContentAnalytics>> {
    let limit = params.limit.unwrap_or(DEFAULT_TOP_CONTENT).clamp(1, 100);
    Json(state.analytics.top_content(limit).await)
}

/// Handler for POST /api/analytics/sync/:domain
/// Operator endpoint; domain is one of
/// all|users|workshops|content|revenue|newsletters|services
#[utoipa::path(
    post,
    path = "/api/analytics/sync/{domain}",
    params(("domain" = String, Path, description = "Sync selector")),
    responses(
        (status = 200, description = "Rows written per domain", body = Vec<DomainSyncResult>),
        (status = 400, description = "Unknown sync domain"),
        (status = 500, description = "Sync failed")
    ),
    tag = "analytics"
)]
pub async fn sync_handler(
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> Result<Json<Vec<DomainSyncResult>>, AnalyticsError> {
    let domain: SyncDomain = domain.parse()?;
    let results = state.analytics_sync.run(domain).await?;
    Ok(Json(results))
}
