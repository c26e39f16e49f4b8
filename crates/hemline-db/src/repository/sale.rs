//! # Sale Repository
//!
//! Database operations for sales and their line items.
//!
//! ## Sale Aggregate Invariant
//! `sales.total_amount_cents` equals the sum of `unit_price_cents * quantity`
//! over the sale's items immediately after every committed operation. Every
//! item mutation updates the total and the stock ledger inside one
//! transaction: either all of it commits or none of it does.
//!
//! ## Snapshot Pattern
//! The unit price is copied from the product onto the line at add time and
//! never updated again. Historical sales stay accurate when product prices
//! change later.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::ledger;
use crate::repository::generate_id;
use hemline_core::{validation::validate_quantity, CoreError, Sale, SaleItem};

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Creates a new empty sale for the given staff user.
    ///
    /// Total starts at zero and the sale has no stock effect until items
    /// are added. `customer_id` is optional (walk-in sales).
    pub async fn create_sale(
        &self,
        user_id: &str,
        customer_id: Option<&str>,
    ) -> DbResult<Sale> {
        let sale = Sale {
            id: generate_id(),
            user_id: user_id.to_string(),
            customer_id: customer_id.map(str::to_string),
            date: Utc::now(),
            total_amount_cents: 0,
        };

        debug!(id = %sale.id, user_id = %user_id, "Creating sale");

        sqlx::query(
            r#"
            INSERT INTO sales (id, user_id, customer_id, date, total_amount_cents)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.user_id)
        .bind(&sale.customer_id)
        .bind(sale.date)
        .bind(sale.total_amount_cents)
        .execute(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Adds a line item to a sale.
    ///
    /// One atomic unit of work:
    /// 1. reserve the stock (fails with `InsufficientStock`, no mutation)
    /// 2. snapshot the product's current unit price
    /// 3. insert the item
    /// 4. add the line total to the sale total
    ///
    /// If any step after the reservation fails, the whole transaction rolls
    /// back and the stock is restored.
    ///
    /// ## Errors
    /// - `Domain(Validation(_))` - quantity is zero or negative
    /// - `Domain(SaleNotFound)` - no such sale
    /// - `Domain(ProductNotFound)` / `Domain(InsufficientStock)` - from the
    ///   ledger reserve
    pub async fn add_item(
        &self,
        sale_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> DbResult<SaleItem> {
        // Rejected before any lock is taken.
        validate_quantity(quantity)?;

        debug!(sale_id = %sale_id, product_id = %product_id, quantity = %quantity, "Adding sale item");

        let mut tx = self.pool.begin().await?;

        let sale_exists: Option<String> = sqlx::query_scalar("SELECT id FROM sales WHERE id = ?1")
            .bind(sale_id)
            .fetch_optional(&mut *tx)
            .await?;
        if sale_exists.is_none() {
            return Err(DbError::Domain(CoreError::SaleNotFound(
                sale_id.to_string(),
            )));
        }

        ledger::reserve_stock(&mut tx, product_id, quantity).await?;

        // The reserve succeeded, so the product row exists; read the price
        // under the same transaction for the frozen snapshot.
        let unit_price_cents: i64 =
            sqlx::query_scalar("SELECT price_cents FROM products WHERE id = ?1")
                .bind(product_id)
                .fetch_one(&mut *tx)
                .await?;

        let item = SaleItem {
            id: generate_id(),
            sale_id: sale_id.to_string(),
            product_id: product_id.to_string(),
            quantity,
            unit_price_cents,
            created_at: Utc::now(),
        };
        let line_total_cents = item.total().cents();

        sqlx::query(
            r#"
            INSERT INTO sale_items (id, sale_id, product_id, quantity, unit_price_cents, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&item.id)
        .bind(&item.sale_id)
        .bind(&item.product_id)
        .bind(item.quantity)
        .bind(item.unit_price_cents)
        .bind(item.created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE sales SET total_amount_cents = total_amount_cents + ?2 WHERE id = ?1",
        )
        .bind(sale_id)
        .bind(line_total_cents)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(sale_id = %sale_id, item_id = %item.id, line_total = %line_total_cents, "Sale item added");

        Ok(item)
    }

    /// Removes a line item from a sale, the exact inverse of [`add_item`].
    ///
    /// One atomic unit of work: release the reserved stock back to the
    /// product, back the line total out of the sale total (clamped at zero,
    /// the total is never persisted negative), delete the item.
    ///
    /// ## Errors
    /// - `Domain(SaleItemNotFound)` - the item does not exist or belongs to
    ///   a different sale
    ///
    /// [`add_item`]: SaleRepository::add_item
    pub async fn remove_item(&self, sale_id: &str, item_id: &str) -> DbResult<()> {
        debug!(sale_id = %sale_id, item_id = %item_id, "Removing sale item");

        let mut tx = self.pool.begin().await?;

        let item: Option<SaleItem> = sqlx::query_as(
            r#"
            SELECT id, sale_id, product_id, quantity, unit_price_cents, created_at
            FROM sale_items
            WHERE id = ?1 AND sale_id = ?2
            "#,
        )
        .bind(item_id)
        .bind(sale_id)
        .fetch_optional(&mut *tx)
        .await?;

        let item = item.ok_or_else(|| {
            DbError::Domain(CoreError::SaleItemNotFound {
                sale_id: sale_id.to_string(),
                item_id: item_id.to_string(),
            })
        })?;

        ledger::release_stock(&mut tx, &item.product_id, item.quantity).await?;

        // MAX(..., 0) clamps against accumulated drift; a consistent total
        // is never affected by it.
        sqlx::query(
            "UPDATE sales SET total_amount_cents = MAX(total_amount_cents - ?2, 0) WHERE id = ?1",
        )
        .bind(sale_id)
        .bind(item.total().cents())
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM sale_items WHERE id = ?1")
            .bind(item_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(sale_id = %sale_id, item_id = %item_id, "Sale item removed");

        Ok(())
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale: Option<Sale> = sqlx::query_as(
            "SELECT id, user_id, customer_id, date, total_amount_cents FROM sales WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets all items for a sale, oldest first.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items: Vec<SaleItem> = sqlx::query_as(
            r#"
            SELECT id, sale_id, product_id, quantity, unit_price_cents, created_at
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists the most recent sales, newest first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<Sale>> {
        let sales: Vec<Sale> = sqlx::query_as(
            r#"
            SELECT id, user_id, customer_id, date, total_amount_cents
            FROM sales
            ORDER BY date DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Returns (count, total cents) for sales dated today (UTC).
    pub async fn today_totals(&self) -> DbResult<(i64, i64)> {
        // Timestamps are stored ISO-8601, so a date prefix match selects
        // the UTC day.
        let today_prefix = format!("{}%", Utc::now().format("%Y-%m-%d"));

        let row: (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(total_amount_cents), 0)
            FROM sales
            WHERE date LIKE ?1
            "#,
        )
        .bind(today_prefix)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Returns (count, total cents) across all sales.
    pub async fn summary(&self) -> DbResult<(i64, i64)> {
        let row: (i64, i64) =
            sqlx::query_as("SELECT COUNT(*), COALESCE(SUM(total_amount_cents), 0) FROM sales")
                .fetch_one(&self.pool)
                .await?;

        Ok(row)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
