// Analytics query service
//
// Read-only aggregations over the reporting tables for dashboards. Every
// public method swallows internal errors and returns an empty or all-zero
// result: the dashboard must never hard-fail.

use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use crate::analytics::models::{
    ContentAnalytics, ContentSummary, DashboardMetrics, RevenueSummary, RevenueTrendPoint,
    UserSummary, WorkshopSummary,
};

#[derive(FromRow)]
struct RevenueRow {
    total: Decimal,
    workshops: Decimal,
    products: Decimal,
    services: Decimal,
    transactions: i64,
}

#[derive(FromRow)]
struct UserRow {
    total: i64,
    active: i64,
    total_spent: Decimal,
}

#[derive(FromRow)]
struct WorkshopRow {
    total: i64,
    applications: i64,
    revenue: Decimal,
    avg_fill_rate: f64,
}

#[derive(FromRow)]
struct ContentRow {
    posts: i64,
    views: i64,
    likes: i64,
}

/// Read-only query service over the reporting tables
#[derive(Clone)]
pub struct AnalyticsQueryService {
    pool: PgPool,
}

impl AnalyticsQueryService {
    /// Create a new AnalyticsQueryService
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Nested dashboard summaries over the trailing window of `days`
    /// calendar days ending today
    ///
    /// Missing aggregates default to zero; on any internal error the full
    /// all-zero structure is returned and the error is logged.
    pub async fn dashboard_metrics(&self, days: i32) -> DashboardMetrics {
        match self.dashboard_metrics_inner(days).await {
            Ok(metrics) => metrics,
            Err(err) => {
                tracing::error!("Dashboard metrics query failed: {}", err);
                DashboardMetrics::default()
            }
        }
    }

    async fn dashboard_metrics_inner(&self, days: i32) -> Result<DashboardMetrics, sqlx::Error> {
        let revenue = sqlx::query_as::<_, RevenueRow>(
            r#"
            SELECT COALESCE(SUM(total_revenue), 0) AS total,
                   COALESCE(SUM(workshop_revenue), 0) AS workshops,
                   COALESCE(SUM(product_revenue), 0) AS products,
                   COALESCE(SUM(service_revenue), 0) AS services,
                   COALESCE(SUM(transactions), 0)::bigint AS transactions
            FROM revenue_analytics
            WHERE date >= CURRENT_DATE - ($1 - 1)
            "#,
        )
        .bind(days)
        .fetch_one(&self.pool)
        .await?;

        let users = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE last_active >= NOW() - make_interval(days => $1)) AS active,
                   COALESCE(SUM(total_spent), 0) AS total_spent
            FROM user_analytics
            "#,
        )
        .bind(days)
        .fetch_one(&self.pool)
        .await?;

        let workshops = sqlx::query_as::<_, WorkshopRow>(
            r#"
            SELECT COUNT(*) AS total,
                   COALESCE(SUM(applications_total), 0)::bigint AS applications,
                   COALESCE(SUM(revenue_total), 0) AS revenue,
                   COALESCE(AVG(fill_rate), 0)::float8 AS avg_fill_rate
            FROM workshop_analytics
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let content = sqlx::query_as::<_, ContentRow>(
            r#"
            SELECT COUNT(*) AS posts,
                   COALESCE(SUM(view_count), 0)::bigint AS views,
                   COALESCE(SUM(like_count), 0)::bigint AS likes
            FROM content_analytics
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(DashboardMetrics {
            revenue: RevenueSummary {
                total: revenue.total,
                workshops: revenue.workshops,
                products: revenue.products,
                services: revenue.services,
                transactions: revenue.transactions,
            },
            users: UserSummary {
                total: users.total,
                active: users.active,
                total_spent: users.total_spent,
            },
            workshops: WorkshopSummary {
                total: workshops.total,
                applications: workshops.applications,
                revenue: workshops.revenue,
                avg_fill_rate: workshops.avg_fill_rate,
            },
            content: ContentSummary {
                posts: content.posts,
                views: content.views,
                likes: content.likes,
            },
        })
    }

    /// Daily revenue breakdowns over the trailing window of `days` calendar
    /// days ending today, ascending by date; empty on any internal error
    pub async fn revenue_trends(&self, days: i32) -> Vec<RevenueTrendPoint> {
        let result = sqlx::query_as::<_, RevenueTrendPoint>(
            r#"
            SELECT date, total_revenue, workshop_revenue, product_revenue, service_revenue
            FROM revenue_analytics
            WHERE date >= CURRENT_DATE - ($1 - 1)
            ORDER BY date ASC
            "#,
        )
        .bind(days)
        .fetch_all(&self.pool)
        .await;

        match result {
            Ok(points) => points,
            Err(err) => {
                tracing::error!("Revenue trends query failed: {}", err);
                Vec::new()
            }
        }
    }

    /// Top `limit` content rows by view count, descending; empty on any
    /// internal error
    pub async fn top_content(&self, limit: i64) -> Vec<ContentAnalytics> {
        let result = sqlx::query_as::<_, ContentAnalytics>(
            r#"
            SELECT post_id, view_count, like_count, engagement_rate
            FROM content_analytics
            ORDER BY view_count DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await;

        match result {
            Ok(rows) => rows,
            Err(err) => {
                tracing::error!("Top content query failed: {}", err);
                Vec::new()
            }
        }
    }
}
