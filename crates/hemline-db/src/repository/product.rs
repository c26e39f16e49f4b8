//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! Catalog CRUD lives here; stock debits and credits do NOT. Anything that
//! changes `quantity` in response to a sale or order goes through the
//! [ledger](crate::ledger) inside the owning operation's transaction. The
//! one stock mutation this repository exposes is [`restock`], the receiving
//! path, and it routes through the ledger's credit primitive too.
//!
//! [`restock`]: ProductRepository::restock

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::ledger;
use crate::repository::generate_id;
use hemline_core::{
    validation::{validate_name, validate_price_cents, validate_search_query},
    Product,
};

const PRODUCT_COLUMNS: &str =
    "id, name, category_id, price_cents, quantity, image, created_at, updated_at";

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Creates a new product.
    ///
    /// Name and price are validated; initial quantity may be zero but not
    /// negative (also enforced by the schema CHECK).
    pub async fn create(
        &self,
        name: &str,
        category_id: Option<&str>,
        price_cents: i64,
        quantity: i64,
        image: Option<&str>,
    ) -> DbResult<Product> {
        validate_name(name)?;
        validate_price_cents(price_cents)?;
        if quantity < 0 {
            return Err(hemline_core::ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: 0,
                max: i64::MAX,
            }
            .into());
        }

        let now = Utc::now();
        let product = Product {
            id: generate_id(),
            name: name.trim().to_string(),
            category_id: category_id.map(str::to_string),
            price_cents,
            quantity,
            image: image.map(str::to_string),
            created_at: now,
            updated_at: now,
        };

        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (id, name, category_id, price_cents, quantity, image, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category_id)
        .bind(product.price_cents)
        .bind(product.quantity)
        .bind(&product.image)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product: Option<Product> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Updates a product's catalog fields (name, category, price, image).
    ///
    /// `quantity` is deliberately NOT written here: stock belongs to the
    /// ledger and racing a full-row write against a reservation would lose
    /// one of the two.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        validate_name(&product.name)?;
        validate_price_cents(product.price_cents)?;

        debug!(id = %product.id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                category_id = ?3,
                price_cents = ?4,
                image = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.category_id)
        .bind(product.price_cents)
        .bind(&product.image)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Credits received inventory onto a product.
    ///
    /// The receiving counterpart of a sale: routed through the ledger so
    /// the overflow guard applies here too.
    pub async fn restock(&self, id: &str, quantity: i64) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        ledger::release_stock(&mut tx, id, quantity).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Lists products, newest first.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Product>> {
        let products: Vec<Product> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Lists products in a category, newest first.
    pub async fn list_by_category(&self, category_id: &str) -> DbResult<Vec<Product>> {
        let products: Vec<Product> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE category_id = ?1 ORDER BY created_at DESC"
        ))
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Searches products by name substring, case-insensitive.
    ///
    /// Empty queries return the most recent products.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = validate_search_query(query)?;

        if query.is_empty() {
            return self.list(limit).await;
        }

        debug!(query = %query, limit = %limit, "Searching products");

        let pattern = format!("%{}%", query);

        let products: Vec<Product> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE name LIKE ?1 ORDER BY name LIMIT ?2"
        ))
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Lists products with stock below the threshold, lowest first.
    ///
    /// The admin dashboard's restock feed.
    pub async fn low_stock(&self, threshold: i64) -> DbResult<Vec<Product>> {
        let products: Vec<Product> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE quantity < ?1 ORDER BY quantity, name"
        ))
        .bind(threshold)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Deletes a product.
    ///
    /// Fails with a foreign key violation while historical sale items still
    /// reference it (ON DELETE RESTRICT); the product's orders are removed
    /// with it (ON DELETE CASCADE).
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts total products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{seed_product, test_db};
    use hemline_core::{CoreError, LOW_STOCK_THRESHOLD};

    #[tokio::test]
    async fn test_create_and_get() {
        let db = test_db().await;

        let product = db
            .products()
            .create("Denim Jacket", None, 4999, 10, None)
            .await
            .unwrap();

        let reloaded = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(reloaded.name, "Denim Jacket");
        assert_eq!(reloaded.price_cents, 4999);
        assert_eq!(reloaded.quantity, 10);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_input() {
        let db = test_db().await;
        let products = db.products();

        assert!(products.create("", None, 100, 1, None).await.is_err());
        assert!(products.create("Cap", None, -1, 1, None).await.is_err());
        assert!(products.create("Cap", None, 100, -1, None).await.is_err());
    }

    #[tokio::test]
    async fn test_update_does_not_touch_quantity() {
        let db = test_db().await;
        let mut product = seed_product(&db, "Cap", 1000, 5).await;

        product.price_cents = 1500;
        product.quantity = 999; // stale in-memory value, must be ignored
        db.products().update(&product).await.unwrap();

        let reloaded = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(reloaded.price_cents, 1500);
        assert_eq!(reloaded.quantity, 5);
    }

    #[tokio::test]
    async fn test_restock_credits_quantity() {
        let db = test_db().await;
        let product = seed_product(&db, "Cap", 1000, 2).await;

        db.products().restock(&product.id, 8).await.unwrap();

        let reloaded = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(reloaded.quantity, 10);
    }

    #[tokio::test]
    async fn test_restock_unknown_product() {
        let db = test_db().await;
        let err = db.products().restock("no-such-id", 5).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::ProductNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_search_matches_substring() {
        let db = test_db().await;
        seed_product(&db, "Blue Cap", 1000, 5).await;
        seed_product(&db, "Red Cap", 1000, 5).await;
        seed_product(&db, "Trousers", 2000, 5).await;

        let results = db.products().search("cap", 20).await.unwrap();
        assert_eq!(results.len(), 2);

        let all = db.products().search("", 20).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_low_stock_feed() {
        let db = test_db().await;
        seed_product(&db, "Scarce", 1000, 2).await;
        seed_product(&db, "Plenty", 1000, 50).await;

        let low = db.products().low_stock(LOW_STOCK_THRESHOLD).await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].name, "Scarce");
    }

    #[tokio::test]
    async fn test_delete_blocked_by_sale_history() {
        let db = test_db().await;
        let product = seed_product(&db, "Cap", 1000, 5).await;
        let sale = db.sales().create_sale("staff-1", None).await.unwrap();
        db.sales().add_item(&sale.id, &product.id, 1).await.unwrap();

        let err = db.products().delete(&product.id).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }
}
