//! # Dashboard Stats
//!
//! Read-only aggregates for the admin dashboard: counts, today's takings,
//! the low-stock feed and the latest sales. Each figure is a single query;
//! the snapshot is assembled from them without a transaction, slight skew
//! between figures is acceptable for a dashboard.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::product::ProductRepository;
use crate::repository::sale::SaleRepository;
use hemline_core::{Money, Product, Sale, LOW_STOCK_THRESHOLD};

/// A point-in-time snapshot of the figures the dashboard shows.
#[derive(Debug, Clone)]
pub struct DashboardStats {
    /// Total products in the catalog.
    pub total_products: i64,

    /// Total customer records.
    pub total_customers: i64,

    /// Number of sales dated today (UTC).
    pub today_sales_count: i64,

    /// Revenue from today's sales, in cents.
    pub today_sales_cents: i64,

    /// Products below the low-stock threshold, lowest first.
    pub low_stock: Vec<Product>,

    /// Most recent sales, newest first.
    pub recent_sales: Vec<Sale>,
}

impl DashboardStats {
    /// Today's revenue as Money.
    #[inline]
    pub fn today_sales(&self) -> Money {
        Money::from_cents(self.today_sales_cents)
    }
}

/// Repository for dashboard aggregate queries.
#[derive(Debug, Clone)]
pub struct StatsRepository {
    pool: SqlitePool,
}

impl StatsRepository {
    /// Creates a new StatsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StatsRepository { pool }
    }

    /// Builds the dashboard snapshot.
    pub async fn dashboard(&self) -> DbResult<DashboardStats> {
        debug!("Building dashboard snapshot");

        let products = ProductRepository::new(self.pool.clone());
        let sales = SaleRepository::new(self.pool.clone());

        let total_products = products.count().await?;
        let total_customers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;
        let (today_sales_count, today_sales_cents) = sales.today_totals().await?;
        let low_stock = products.low_stock(LOW_STOCK_THRESHOLD).await?;
        let recent_sales = sales.list_recent(10).await?;

        Ok(DashboardStats {
            total_products,
            total_customers,
            today_sales_count,
            today_sales_cents,
            low_stock,
            recent_sales,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::test_util::{seed_product, test_db};

    #[tokio::test]
    async fn test_dashboard_empty_database() {
        let db = test_db().await;

        let stats = db.stats().dashboard().await.unwrap();
        assert_eq!(stats.total_products, 0);
        assert_eq!(stats.total_customers, 0);
        assert_eq!(stats.today_sales_count, 0);
        assert_eq!(stats.today_sales_cents, 0);
        assert!(stats.low_stock.is_empty());
        assert!(stats.recent_sales.is_empty());
    }

    #[tokio::test]
    async fn test_dashboard_reflects_activity() {
        let db = test_db().await;

        let scarce = seed_product(&db, "Scarce", 1000, 3).await;
        seed_product(&db, "Plenty", 2000, 40).await;
        db.customers()
            .create("Amina Khan", None, None, None)
            .await
            .unwrap();

        let sale = db.sales().create_sale("staff-1", None).await.unwrap();
        db.sales().add_item(&sale.id, &scarce.id, 2).await.unwrap();

        let stats = db.stats().dashboard().await.unwrap();
        assert_eq!(stats.total_products, 2);
        assert_eq!(stats.total_customers, 1);
        assert_eq!(stats.today_sales_count, 1);
        assert_eq!(stats.today_sales_cents, 2000);
        assert_eq!(stats.today_sales().to_string(), "$20.00");

        assert_eq!(stats.low_stock.len(), 1);
        assert_eq!(stats.low_stock[0].name, "Scarce");

        assert_eq!(stats.recent_sales.len(), 1);
        assert_eq!(stats.recent_sales[0].total_amount_cents, 2000);
    }
}
