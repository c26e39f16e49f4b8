//! # Customer Repository
//!
//! CRUD and lookup for customer records. Reference data only; nothing here
//! participates in the inventory ledger.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use hemline_core::{
    validation::{validate_name, validate_search_query},
    Customer,
};

const CUSTOMER_COLUMNS: &str = "id, name, phone, email, address, created_at";

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Creates a new customer record.
    pub async fn create(
        &self,
        name: &str,
        phone: Option<&str>,
        email: Option<&str>,
        address: Option<&str>,
    ) -> DbResult<Customer> {
        validate_name(name)?;

        let customer = Customer {
            id: generate_id(),
            name: name.trim().to_string(),
            phone: phone.map(str::to_string),
            email: email.map(str::to_string),
            address: address.map(str::to_string),
            created_at: Utc::now(),
        };

        debug!(id = %customer.id, name = %customer.name, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (id, name, phone, email, address, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer: Option<Customer> = sqlx::query_as(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Updates a customer's contact details.
    pub async fn update(&self, customer: &Customer) -> DbResult<()> {
        validate_name(&customer.name)?;

        debug!(id = %customer.id, "Updating customer");

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = ?2,
                phone = ?3,
                email = ?4,
                address = ?5
            WHERE id = ?1
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(&customer.address)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", &customer.id));
        }

        Ok(())
    }

    /// Lists customers, newest first.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Customer>> {
        let customers: Vec<Customer> = sqlx::query_as(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY created_at DESC LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Searches customers by name or phone substring.
    ///
    /// Empty queries return the most recent customers.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Customer>> {
        let query = validate_search_query(query)?;

        if query.is_empty() {
            return self.list(limit).await;
        }

        debug!(query = %query, "Searching customers");

        let pattern = format!("%{}%", query);

        let customers: Vec<Customer> = sqlx::query_as(&format!(
            r#"
            SELECT {CUSTOMER_COLUMNS} FROM customers
            WHERE name LIKE ?1 OR phone LIKE ?1
            ORDER BY name
            LIMIT ?2
            "#
        ))
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Deletes a customer.
    ///
    /// The customer's sales survive with their `customer_id` cleared
    /// (ON DELETE SET NULL); sales history is never destroyed by customer
    /// cleanup.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting customer");

        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }

    /// Counts total customers.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
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

    #[tokio::test]
    async fn test_create_update_get() {
        let db = test_db().await;

        let mut customer = db
            .customers()
            .create("Amina Khan", Some("0712345678"), None, None)
            .await
            .unwrap();

        customer.email = Some("amina@example.com".to_string());
        db.customers().update(&customer).await.unwrap();

        let reloaded = db
            .customers()
            .get_by_id(&customer.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.email.as_deref(), Some("amina@example.com"));
        assert_eq!(reloaded.phone.as_deref(), Some("0712345678"));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_name() {
        let db = test_db().await;
        assert!(db.customers().create("  ", None, None, None).await.is_err());
    }

    #[tokio::test]
    async fn test_search_by_name_or_phone() {
        let db = test_db().await;
        let customers = db.customers();

        customers
            .create("Amina Khan", Some("0712345678"), None, None)
            .await
            .unwrap();
        customers
            .create("Bilal Ahmed", Some("0399887766"), None, None)
            .await
            .unwrap();

        let by_name = customers.search("amina", 10).await.unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].name, "Amina Khan");

        let by_phone = customers.search("0399", 10).await.unwrap();
        assert_eq!(by_phone.len(), 1);
        assert_eq!(by_phone[0].name, "Bilal Ahmed");

        assert_eq!(customers.search("", 10).await.unwrap().len(), 2);
        assert!(customers.search("zzz", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_detaches_sales() {
        let db = test_db().await;
        let customer = db
            .customers()
            .create("Amina Khan", None, None, None)
            .await
            .unwrap();
        let product = seed_product(&db, "Cap", 1000, 5).await;

        let sale = db
            .sales()
            .create_sale("staff-1", Some(&customer.id))
            .await
            .unwrap();
        db.sales().add_item(&sale.id, &product.id, 2).await.unwrap();

        db.customers().delete(&customer.id).await.unwrap();

        let reloaded = db.sales().get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(reloaded.customer_id, None);
        assert_eq!(reloaded.total_amount_cents, 2000);
    }

    #[tokio::test]
    async fn test_count() {
        let db = test_db().await;
        assert_eq!(db.customers().count().await.unwrap(), 0);
        db.customers()
            .create("Amina Khan", None, None, None)
            .await
            .unwrap();
        assert_eq!(db.customers().count().await.unwrap(), 1);
    }
}
