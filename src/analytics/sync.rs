// Analytics sync manager
//
// Batch-recomputes the reporting tables from operational data. Every
// statement is a full recompute for its keys (INSERT ... SELECT ... ON
// CONFLICT DO UPDATE), never an accumulation, so re-running a sync over
// unchanged operational data rewrites identical rows.

use sqlx::{PgConnection, PgPool};
use std::str::FromStr;

use crate::analytics::error::AnalyticsError;
use crate::analytics::models::DomainSyncResult;

/// Sync selector: one reporting domain or all of them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDomain {
    All,
    Users,
    Workshops,
    Content,
    Revenue,
    Newsletters,
    Services,
}

impl SyncDomain {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncDomain::All => "all",
            SyncDomain::Users => "users",
            SyncDomain::Workshops => "workshops",
            SyncDomain::Content => "content",
            SyncDomain::Revenue => "revenue",
            SyncDomain::Newsletters => "newsletters",
            SyncDomain::Services => "services",
        }
    }
}

impl FromStr for SyncDomain {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(SyncDomain::All),
            "users" => Ok(SyncDomain::Users),
            "workshops" => Ok(SyncDomain::Workshops),
            "content" => Ok(SyncDomain::Content),
            "revenue" => Ok(SyncDomain::Revenue),
            "newsletters" => Ok(SyncDomain::Newsletters),
            "services" => Ok(SyncDomain::Services),
            other => Err(AnalyticsError::UnknownDomain(other.to_string())),
        }
    }
}

const SYNC_USERS: &str = r#"
INSERT INTO user_analytics (user_id, workshops_registered, services_booked, total_spent, last_active)
SELECT u.id,
       (SELECT COUNT(*) FROM workshop_applications a WHERE lower(a.email) = lower(u.email)),
       (SELECT COUNT(*) FROM service_bookings b WHERE lower(b.email) = lower(u.email)),
       (SELECT COALESCE(SUM(p.amount), 0) FROM payments p
         WHERE lower(p.customer_email) = lower(u.email) AND p.status = 'completed'),
       u.last_login
FROM users u
ON CONFLICT (user_id) DO UPDATE SET
    workshops_registered = EXCLUDED.workshops_registered,
    services_booked = EXCLUDED.services_booked,
    total_spent = EXCLUDED.total_spent,
    last_active = EXCLUDED.last_active
"#;

const SYNC_WORKSHOPS: &str = r#"
INSERT INTO workshop_analytics
    (workshop_id, applications_total, applications_approved, applications_paid, revenue_total, fill_rate)
SELECT w.id,
       (SELECT COUNT(*) FROM workshop_applications a WHERE a.workshop_id = w.id),
       (SELECT COUNT(*) FROM workshop_applications a WHERE a.workshop_id = w.id AND a.status = 'approved'),
       (SELECT COUNT(*) FROM workshop_applications a WHERE a.workshop_id = w.id AND a.status = 'paid'),
       (SELECT COALESCE(SUM(p.amount), 0)
          FROM payments p
          JOIN workshop_applications a ON p.application_id = a.id
         WHERE a.workshop_id = w.id AND p.status = 'completed'),
       CASE WHEN w.capacity > 0
            THEN w.registered_count::float8 / w.capacity
            ELSE 0 END
FROM workshops w
ON CONFLICT (workshop_id) DO UPDATE SET
    applications_total = EXCLUDED.applications_total,
    applications_approved = EXCLUDED.applications_approved,
    applications_paid = EXCLUDED.applications_paid,
    revenue_total = EXCLUDED.revenue_total,
    fill_rate = EXCLUDED.fill_rate
"#;

const SYNC_CONTENT: &str = r#"
INSERT INTO content_analytics (post_id, view_count, like_count, engagement_rate)
SELECT c.id,
       c.views,
       c.likes,
       CASE WHEN c.views > 0 THEN c.likes::float8 / c.views ELSE 0 END
FROM content_posts c
ON CONFLICT (post_id) DO UPDATE SET
    view_count = EXCLUDED.view_count,
    like_count = EXCLUDED.like_count,
    engagement_rate = EXCLUDED.engagement_rate
"#;

const SYNC_REVENUE: &str = r#"
INSERT INTO revenue_analytics
    (date, total_revenue, workshop_revenue, product_revenue, service_revenue,
     subscription_revenue, transactions)
SELECT COALESCE(p.completed_at, p.created_at)::date AS day,
       SUM(p.amount),
       COALESCE(SUM(p.amount) FILTER (WHERE p.payment_type = 'workshop'), 0),
       COALESCE(SUM(p.amount) FILTER (WHERE p.payment_type = 'product'), 0),
       COALESCE(SUM(p.amount) FILTER (WHERE p.payment_type = 'service'), 0),
       COALESCE(SUM(p.amount) FILTER (WHERE p.payment_type = 'subscription'), 0),
       COUNT(*)
FROM payments p
WHERE p.status = 'completed'
GROUP BY day
ON CONFLICT (date) DO UPDATE SET
    total_revenue = EXCLUDED.total_revenue,
    workshop_revenue = EXCLUDED.workshop_revenue,
    product_revenue = EXCLUDED.product_revenue,
    service_revenue = EXCLUDED.service_revenue,
    subscription_revenue = EXCLUDED.subscription_revenue,
    transactions = EXCLUDED.transactions
"#;

const SYNC_NEWSLETTERS: &str = r#"
INSERT INTO newsletter_analytics (campaign_id, recipients, open_rate, click_rate)
SELECT n.id,
       n.recipients,
       CASE WHEN n.recipients > 0 THEN n.opens::float8 / n.recipients ELSE 0 END,
       CASE WHEN n.recipients > 0 THEN n.clicks::float8 / n.recipients ELSE 0 END
FROM newsletter_campaigns n
ON CONFLICT (campaign_id) DO UPDATE SET
    recipients = EXCLUDED.recipients,
    open_rate = EXCLUDED.open_rate,
    click_rate = EXCLUDED.click_rate
"#;

const SYNC_SERVICES: &str = r#"
INSERT INTO trading_service_analytics (service_id, bookings_total, revenue_total)
SELECT s.id,
       (SELECT COUNT(*) FROM service_bookings b WHERE b.service_id = s.id),
       (SELECT COALESCE(SUM(p.amount), 0)
          FROM payments p
          JOIN service_bookings b ON p.booking_id = b.id
         WHERE b.service_id = s.id AND p.status = 'completed')
FROM trading_services s
ON CONFLICT (service_id) DO UPDATE SET
    bookings_total = EXCLUDED.bookings_total,
    revenue_total = EXCLUDED.revenue_total
"#;

/// Per-domain syncs run in this fixed order by `full_sync`
const FULL_SYNC_ORDER: [SyncDomain; 6] = [
    SyncDomain::Users,
    SyncDomain::Workshops,
    SyncDomain::Content,
    SyncDomain::Revenue,
    SyncDomain::Newsletters,
    SyncDomain::Services,
];

fn statement_for(domain: SyncDomain) -> &'static str {
    match domain {
        SyncDomain::Users => SYNC_USERS,
        SyncDomain::Workshops => SYNC_WORKSHOPS,
        SyncDomain::Content => SYNC_CONTENT,
        SyncDomain::Revenue => SYNC_REVENUE,
        SyncDomain::Newsletters => SYNC_NEWSLETTERS,
        SyncDomain::Services => SYNC_SERVICES,
        // All is dispatched before reaching here
        SyncDomain::All => unreachable!("no single statement for SyncDomain::All"),
    }
}

async fn sync_one(
    conn: &mut PgConnection,
    domain: SyncDomain,
) -> Result<DomainSyncResult, AnalyticsError> {
    let result = sqlx::query(statement_for(domain)).execute(conn).await?;
    let rows = result.rows_affected();
    tracing::debug!("Synced {} analytics: {} rows", domain.as_str(), rows);

    Ok(DomainSyncResult {
        domain: domain.as_str().to_string(),
        rows,
    })
}

/// Manager for batch analytics synchronization
///
/// Expected to run as a single exclusive batch job (scheduled or operator
/// invoked), not concurrently with itself.
#[derive(Clone)]
pub struct AnalyticsSyncManager {
    pool: PgPool,
}

impl AnalyticsSyncManager {
    /// Create a new AnalyticsSyncManager
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run the selected sync
    pub async fn run(&self, domain: SyncDomain) -> Result<Vec<DomainSyncResult>, AnalyticsError> {
        match domain {
            SyncDomain::All => self.full_sync().await,
            single => {
                let mut conn = self.pool.acquire().await?;
                let result = sync_one(&mut conn, single).await?;
                Ok(vec![result])
            }
        }
    }

    /// Sync every domain in the fixed order inside one transaction
    ///
    /// The transaction is the single scoped data-access session: the first
    /// failure aborts the remainder, rolls everything back and propagates.
    /// There is no partial-completion tracking; a re-run recomputes from
    /// scratch.
    pub async fn full_sync(&self) -> Result<Vec<DomainSyncResult>, AnalyticsError> {
        let mut tx = self.pool.begin().await?;

        let mut results = Vec::with_capacity(FULL_SYNC_ORDER.len());
        for domain in FULL_SYNC_ORDER {
            results.push(sync_one(&mut tx, domain).await?);
        }

        tx.commit().await?;

        let total: u64 = results.iter().map(|r| r.rows).sum();
        tracing::info!("Full analytics sync completed: {} rows", total);

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_parsing() {
        assert_eq!("all".parse::<SyncDomain>().unwrap(), SyncDomain::All);
        assert_eq!("Users".parse::<SyncDomain>().unwrap(), SyncDomain::Users);
        assert_eq!(
            "newsletters".parse::<SyncDomain>().unwrap(),
            SyncDomain::Newsletters
        );
        assert!("payments".parse::<SyncDomain>().is_err());
        assert!("".parse::<SyncDomain>().is_err());
    }

    #[test]
    fn test_full_sync_order_is_fixed() {
        let names: Vec<&str> = FULL_SYNC_ORDER.iter().map(|d| d.as_str()).collect();
        assert_eq!(
            names,
            ["users", "workshops", "content", "revenue", "newsletters", "services"]
        );
    }
}
