use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

// Rows served by the query endpoints. The per-domain reporting tables the
// sync writes are derived snapshots, rebuildable from operational data at
// any time; the sync statements recompute them entirely in SQL.

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ContentAnalytics {
    pub post_id: i32,
    pub view_count: i64,
    pub like_count: i64,
    pub engagement_rate: f64,
}

/// One day of revenue, broken down by payment type
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct RevenueTrendPoint {
    pub date: NaiveDate,
    pub total_revenue: Decimal,
    pub workshop_revenue: Decimal,
    pub product_revenue: Decimal,
    pub service_revenue: Decimal,
}

// Dashboard summaries. Every field defaults to zero; the dashboard renders
// an empty store as zeros, never as an error.

#[derive(Debug, Default, Clone, Serialize, ToSchema)]
pub struct RevenueSummary {
    pub total: Decimal,
    pub workshops: Decimal,
    pub products: Decimal,
    pub services: Decimal,
    pub transactions: i64,
}

#[derive(Debug, Default, Clone, Serialize, ToSchema)]
pub struct UserSummary {
    pub total: i64,
    pub active: i64,
    pub total_spent: Decimal,
}

#[derive(Debug, Default, Clone, Serialize, ToSchema)]
pub struct WorkshopSummary {
    pub total: i64,
    pub applications: i64,
    pub revenue: Decimal,
    pub avg_fill_rate: f64,
}

#[derive(Debug, Default, Clone, Serialize, ToSchema)]
pub struct ContentSummary {
    pub posts: i64,
    pub views: i64,
    pub likes: i64,
}

/// Nested dashboard aggregate over the trailing window
#[derive(Debug, Default, Clone, Serialize, ToSchema)]
pub struct DashboardMetrics {
    pub revenue: RevenueSummary,
    pub users: UserSummary,
    pub workshops: WorkshopSummary,
    pub content: ContentSummary,
}

/// Row counts written by one domain's sync
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DomainSyncResult {
    pub domain: String,
    pub rows: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_metrics_default_is_all_zero() {
        let metrics = DashboardMetrics::default();
        let json = serde_json::to_value(&metrics).unwrap();

        assert_eq!(json["revenue"]["total"], "0");
        assert_eq!(json["revenue"]["transactions"], 0);
        assert_eq!(json["users"]["total"], 0);
        assert_eq!(json["workshops"]["applications"], 0);
        assert_eq!(json["workshops"]["avg_fill_rate"], 0.0);
        assert_eq!(json["content"]["views"], 0);
    }
}
