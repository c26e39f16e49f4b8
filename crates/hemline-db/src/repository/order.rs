//! # Order Repository
//!
//! Database operations for customer self-service orders.
//!
//! An order is a single-product, single-step purchase: placing it reads the
//! product, reserves the stock and freezes the total in one transaction.
//! The stock debit goes through the same ledger primitive as the sale path,
//! so the no-oversell guarantee is uniform across both.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::ledger;
use crate::repository::generate_id;
use hemline_core::{
    validation::validate_quantity, CoreError, Money, Order, OrderStatus,
};

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Places an order for the given customer user.
    ///
    /// One atomic unit of work: read the product price, reserve the stock,
    /// insert the order with status `Pending` and
    /// `total_price = unit_price * quantity` frozen at placement. On
    /// insufficient stock nothing is mutated.
    ///
    /// ## Errors
    /// - `Domain(Validation(_))` - quantity is zero or negative
    /// - `Domain(ProductNotFound)` - no such product
    /// - `Domain(InsufficientStock)` - stock does not cover the request
    pub async fn place_order(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: i64,
        phone: Option<&str>,
        address: Option<&str>,
    ) -> DbResult<Order> {
        // Rejected before any lock is taken.
        validate_quantity(quantity)?;

        debug!(user_id = %user_id, product_id = %product_id, quantity = %quantity, "Placing order");

        let mut tx = self.pool.begin().await?;

        let price_cents: Option<i64> =
            sqlx::query_scalar("SELECT price_cents FROM products WHERE id = ?1")
                .bind(product_id)
                .fetch_optional(&mut *tx)
                .await?;

        let price_cents = price_cents.ok_or_else(|| {
            DbError::Domain(CoreError::ProductNotFound(product_id.to_string()))
        })?;

        ledger::reserve_stock(&mut tx, product_id, quantity).await?;

        let order = Order {
            id: generate_id(),
            product_id: product_id.to_string(),
            user_id: user_id.to_string(),
            quantity,
            total_price_cents: Money::from_cents(price_cents)
                .multiply_quantity(quantity)
                .cents(),
            date_ordered: Utc::now(),
            address: address.map(str::to_string),
            phone: phone.map(str::to_string),
            status: OrderStatus::Pending,
        };

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, product_id, user_id, quantity, total_price_cents,
                date_ordered, address, phone, status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&order.id)
        .bind(&order.product_id)
        .bind(&order.user_id)
        .bind(order.quantity)
        .bind(order.total_price_cents)
        .bind(order.date_ordered)
        .bind(&order.address)
        .bind(&order.phone)
        .bind(order.status)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(order_id = %order.id, total = %order.total_price(), "Order placed");

        Ok(order)
    }

    /// Updates an order's status from a caller-supplied string.
    ///
    /// The value is validated against the enumerated set before any database
    /// work; unknown values fail with `InvalidStatus`. There is no transition
    /// graph: any status may move to any other.
    pub async fn update_status(&self, order_id: &str, new_status: &str) -> DbResult<()> {
        let status = OrderStatus::parse(new_status).map_err(DbError::Domain)?;
        self.set_status(order_id, status).await
    }

    /// Sets an order's status to an already-validated value.
    pub async fn set_status(&self, order_id: &str, status: OrderStatus) -> DbResult<()> {
        debug!(order_id = %order_id, status = %status, "Updating order status");

        let result = sqlx::query("UPDATE orders SET status = ?2 WHERE id = ?1")
            .bind(order_id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::Domain(CoreError::OrderNotFound(
                order_id.to_string(),
            )));
        }

        Ok(())
    }

    /// Gets an order by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order: Option<Order> = sqlx::query_as(
            r#"
            SELECT id, product_id, user_id, quantity, total_price_cents,
                   date_ordered, address, phone, status
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Lists all orders, newest first.
    pub async fn list_all(&self) -> DbResult<Vec<Order>> {
        let orders: Vec<Order> = sqlx::query_as(
            r#"
            SELECT id, product_id, user_id, quantity, total_price_cents,
                   date_ordered, address, phone, status
            FROM orders
            ORDER BY date_ordered DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Lists a user's orders, newest first.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<Order>> {
        let orders: Vec<Order> = sqlx::query_as(
            r#"
            SELECT id, product_id, user_id, quantity, total_price_cents,
                   date_ordered, address, phone, status
            FROM orders
            WHERE user_id = ?1
            ORDER BY date_ordered DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{seed_product, test_db};
    use hemline_core::CoreError;

    #[tokio::test]
    async fn test_place_order_freezes_total_and_debits_stock() {
        // Cap, price 10.00, stock 2. Ordering 2 totals 20.00 and empties
        // the stock; the next order of 1 fails.
        let db = test_db().await;
        let product = seed_product(&db, "Cap", 1000, 2).await;

        let order = db
            .orders()
            .place_order("user-1", &product.id, 2, Some("0712000000"), None)
            .await
            .unwrap();
        assert_eq!(order.total_price_cents, 2000);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.phone.as_deref(), Some("0712000000"));

        let reloaded = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(reloaded.quantity, 0);

        let err = db
            .orders()
            .place_order("user-2", &product.id, 1, None, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock { .. })
        ));
    }

    #[tokio::test]
    async fn test_place_order_insufficient_stock_leaves_quantity_unchanged() {
        let db = test_db().await;
        let product = seed_product(&db, "Cap", 1000, 3).await;

        let err = db
            .orders()
            .place_order("user-1", &product.id, 5, None, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock {
                available: 3,
                requested: 5,
                ..
            })
        ));

        let reloaded = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(reloaded.quantity, 3);
        assert!(db.orders().list_for_user("user-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_place_order_rejects_invalid_quantity() {
        let db = test_db().await;
        let product = seed_product(&db, "Cap", 1000, 3).await;

        for bad in [0, -1] {
            let err = db
                .orders()
                .place_order("user-1", &product.id, bad, None, None)
                .await
                .unwrap_err();
            assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
        }
    }

    #[tokio::test]
    async fn test_place_order_unknown_product() {
        let db = test_db().await;

        let err = db
            .orders()
            .place_order("user-1", "no-such-id", 1, None, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::ProductNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_order_total_frozen_across_price_change() {
        let db = test_db().await;
        let mut product = seed_product(&db, "Cap", 1000, 5).await;

        let order = db
            .orders()
            .place_order("user-1", &product.id, 2, None, None)
            .await
            .unwrap();

        product.price_cents = 1500;
        db.products().update(&product).await.unwrap();

        // Any later save path leaves the placed order's total alone.
        db.orders()
            .update_status(&order.id, "processing")
            .await
            .unwrap();

        let reloaded = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(reloaded.total_price_cents, 2000);
    }

    #[tokio::test]
    async fn test_update_status_accepts_every_value_in_any_order() {
        // Flat enum, no transition graph: walk the statuses in an order a
        // guarded lifecycle would never allow.
        let db = test_db().await;
        let product = seed_product(&db, "Cap", 1000, 5).await;
        let order = db
            .orders()
            .place_order("user-1", &product.id, 1, None, None)
            .await
            .unwrap();

        for status in ["delivered", "pending", "cancelled", "shipped", "processing"] {
            db.orders().update_status(&order.id, status).await.unwrap();
            let reloaded = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
            assert_eq!(reloaded.status.as_str(), status);
        }
    }

    #[tokio::test]
    async fn test_update_status_rejects_unknown_value() {
        let db = test_db().await;
        let product = seed_product(&db, "Cap", 1000, 5).await;
        let order = db
            .orders()
            .place_order("user-1", &product.id, 1, None, None)
            .await
            .unwrap();

        let err = db
            .orders()
            .update_status(&order.id, "returned")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::InvalidStatus(_))));

        let reloaded = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(reloaded.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_update_status_unknown_order() {
        let db = test_db().await;

        let err = db
            .orders()
            .update_status("no-such-id", "shipped")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::OrderNotFound(_))));
    }

    #[tokio::test]
    async fn test_list_for_user_filters_and_sorts() {
        let db = test_db().await;
        let product = seed_product(&db, "Cap", 1000, 10).await;

        db.orders()
            .place_order("user-a", &product.id, 1, None, None)
            .await
            .unwrap();
        db.orders()
            .place_order("user-b", &product.id, 1, None, None)
            .await
            .unwrap();
        db.orders()
            .place_order("user-a", &product.id, 2, None, None)
            .await
            .unwrap();

        let mine = db.orders().list_for_user("user-a").await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|o| o.user_id == "user-a"));
        assert!(mine[0].date_ordered >= mine[1].date_ordered);

        assert_eq!(db.orders().list_all().await.unwrap().len(), 3);
    }
}
