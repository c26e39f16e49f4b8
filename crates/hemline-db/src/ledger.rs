//! # Inventory Ledger
//!
//! Single authority for `products.quantity`. Every debit and credit to
//! on-hand stock, whether it comes from the sale path or the order path,
//! runs through the two primitives in this module so the no-oversell
//! guarantee is uniform.
//!
//! ## Oversell Prevention
//! ```text
//! Two carts race on a product with quantity = 1:
//!
//!   Tx A: UPDATE products SET quantity = quantity - 1
//!         WHERE id = ?1 AND quantity >= 1          → 1 row, commit
//!   Tx B: same statement                           → 0 rows
//!         SELECT quantity (same tx) → 0            → InsufficientStock
//!
//! The check and the decrement are one atomic statement, and SQLite
//! serializes writers, so exactly one reservation wins. Never both
//! (oversell), never neither.
//! ```
//!
//! Both functions take `&mut SqliteConnection` rather than the pool: they are
//! building blocks that only make sense inside a caller-owned transaction,
//! together with the item insert / delete and total update they accompany.
//! If the surrounding transaction rolls back, the stock mutation rolls back
//! with it.

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{DbError, DbResult};
use hemline_core::{validation::validate_quantity, CoreError};

/// Debits `quantity` units of stock from a product, atomically.
///
/// Verifies `quantity <= products.quantity` and decrements in a single
/// conditional UPDATE. On shortfall, fails with
/// [`CoreError::InsufficientStock`] carrying the available count read under
/// the same transaction, and mutates nothing.
///
/// ## Errors
/// - `Domain(Validation(_))` - quantity is zero or negative (checked before
///   any database work)
/// - `Domain(ProductNotFound)` - no such product
/// - `Domain(InsufficientStock)` - stock does not cover the request
pub async fn reserve_stock(
    conn: &mut SqliteConnection,
    product_id: &str,
    quantity: i64,
) -> DbResult<()> {
    validate_quantity(quantity)?;

    debug!(product_id = %product_id, quantity = %quantity, "Reserving stock");

    let now = Utc::now();

    // Check-then-decrement as one atomic statement. The WHERE predicate is
    // the stock check; zero rows affected means the product is missing or
    // the stock is short.
    let result = sqlx::query(
        r#"
        UPDATE products
        SET quantity = quantity - ?2, updated_at = ?3
        WHERE id = ?1 AND quantity >= ?2
        "#,
    )
    .bind(product_id)
    .bind(quantity)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        // Distinguish missing product from shortfall, still inside the
        // caller's transaction so the count we report is the one the
        // decrement saw.
        let available: Option<i64> =
            sqlx::query_scalar("SELECT quantity FROM products WHERE id = ?1")
                .bind(product_id)
                .fetch_optional(&mut *conn)
                .await?;

        return Err(match available {
            None => DbError::Domain(CoreError::ProductNotFound(product_id.to_string())),
            Some(available) => DbError::Domain(CoreError::InsufficientStock {
                product_id: product_id.to_string(),
                available,
                requested: quantity,
            }),
        });
    }

    Ok(())
}

/// Credits `quantity` units of stock back to a product.
///
/// Used when a sale item is removed and when inventory is received. There is
/// no business-level upper bound on stock, but the counter must not wrap:
/// an overflowing credit fails with [`CoreError::StockOverflow`].
///
/// ## Errors
/// - `Domain(Validation(_))` - quantity is zero or negative
/// - `Domain(ProductNotFound)` - no such product
/// - `Domain(StockOverflow)` - credit would overflow the counter
pub async fn release_stock(
    conn: &mut SqliteConnection,
    product_id: &str,
    quantity: i64,
) -> DbResult<()> {
    validate_quantity(quantity)?;

    debug!(product_id = %product_id, quantity = %quantity, "Releasing stock");

    let current: Option<i64> = sqlx::query_scalar("SELECT quantity FROM products WHERE id = ?1")
        .bind(product_id)
        .fetch_optional(&mut *conn)
        .await?;

    let current = current
        .ok_or_else(|| DbError::Domain(CoreError::ProductNotFound(product_id.to_string())))?;

    let new_quantity = current.checked_add(quantity).ok_or_else(|| {
        DbError::Domain(CoreError::StockOverflow {
            product_id: product_id.to_string(),
        })
    })?;

    let now = Utc::now();

    sqlx::query("UPDATE products SET quantity = ?2, updated_at = ?3 WHERE id = ?1")
        .bind(product_id)
        .bind(new_quantity)
        .bind(now)
        .execute(&mut *conn)
        .await?;

    Ok(())
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
    async fn test_reserve_decrements_stock() {
        let db = test_db().await;
        let product = seed_product(&db, "Cap", 1000, 5).await;

        let mut tx = db.pool().begin().await.unwrap();
        reserve_stock(&mut tx, &product.id, 3).await.unwrap();
        tx.commit().await.unwrap();

        let reloaded = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(reloaded.quantity, 2);
    }

    #[tokio::test]
    async fn test_reserve_fails_on_shortfall_without_mutation() {
        let db = test_db().await;
        let product = seed_product(&db, "Cap", 1000, 2).await;

        let mut tx = db.pool().begin().await.unwrap();
        let err = reserve_stock(&mut tx, &product.id, 3).await.unwrap_err();
        tx.commit().await.unwrap();

        match err {
            DbError::Domain(CoreError::InsufficientStock {
                available,
                requested,
                ..
            }) => {
                assert_eq!(available, 2);
                assert_eq!(requested, 3);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        let reloaded = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(reloaded.quantity, 2);
    }

    #[tokio::test]
    async fn test_reserve_exact_stock_to_zero() {
        let db = test_db().await;
        let product = seed_product(&db, "Cap", 1000, 2).await;

        let mut tx = db.pool().begin().await.unwrap();
        reserve_stock(&mut tx, &product.id, 2).await.unwrap();
        tx.commit().await.unwrap();

        let reloaded = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(reloaded.quantity, 0);
    }

    #[tokio::test]
    async fn test_reserve_unknown_product() {
        let db = test_db().await;

        let mut tx = db.pool().begin().await.unwrap();
        let err = reserve_stock(&mut tx, "no-such-id", 1).await.unwrap_err();

        assert!(matches!(
            err,
            DbError::Domain(CoreError::ProductNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_reserve_rejects_non_positive_quantity_before_db_work() {
        let db = test_db().await;
        let product = seed_product(&db, "Cap", 1000, 5).await;

        let mut tx = db.pool().begin().await.unwrap();
        for bad in [0, -1] {
            let err = reserve_stock(&mut tx, &product.id, bad).await.unwrap_err();
            assert!(matches!(
                err,
                DbError::Domain(CoreError::Validation(_))
            ));
        }
        tx.commit().await.unwrap();

        let reloaded = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(reloaded.quantity, 5);
    }

    #[tokio::test]
    async fn test_release_credits_stock() {
        let db = test_db().await;
        let product = seed_product(&db, "Cap", 1000, 2).await;

        let mut tx = db.pool().begin().await.unwrap();
        release_stock(&mut tx, &product.id, 3).await.unwrap();
        tx.commit().await.unwrap();

        let reloaded = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(reloaded.quantity, 5);
    }

    #[tokio::test]
    async fn test_rollback_restores_reservation() {
        let db = test_db().await;
        let product = seed_product(&db, "Cap", 1000, 5).await;

        let mut tx = db.pool().begin().await.unwrap();
        reserve_stock(&mut tx, &product.id, 3).await.unwrap();
        // Dropping the transaction without commit rolls it back.
        drop(tx);

        let reloaded = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(reloaded.quantity, 5);
    }
}
