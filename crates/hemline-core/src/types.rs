//! # Domain Types
//!
//! Core domain types used throughout Hemline.
//!
//! ## Entity Relationships
//! ```text
//! Category 1──N Product (nullable; clearing a category keeps its products)
//! Product  1──N SaleItem, 1──N Order
//! Customer 0..1──N Sale
//! Sale     1──N SaleItem (cascade delete)
//! User     1──N Sale, 1──N Order (opaque user ids, supplied by the caller)
//! ```
//!
//! ## Identity
//! Every entity carries a UUID v4 string `id`, generated before insert.
//! User identity is an opaque string reference; this crate never validates
//! or resolves it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::money::Money;

// =============================================================================
// Category
// =============================================================================

/// A product category (e.g., T-shirts, Trousers, Shoes).
///
/// Names are unique and non-empty. Deleting a category clears the category
/// reference on its products; it never deletes the products themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
///
/// `quantity` is the on-hand stock count and the single source of truth for
/// availability. It is never allowed to go negative: every debit runs through
/// the inventory ledger, which checks before decrementing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Optional category reference.
    pub category_id: Option<String>,

    /// Unit price in cents (non-negative).
    pub price_cents: i64,

    /// On-hand stock count (non-negative).
    pub quantity: i64,

    /// Opaque reference to a stored image, if any. Storage and URL
    /// normalization are a presentation concern.
    pub image: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks whether the requested quantity is coverable by current stock.
    ///
    /// A convenience pre-check only. The authoritative check happens inside
    /// the ledger's atomic reserve, under the same transaction that debits.
    #[inline]
    pub fn can_cover(&self, quantity: i64) -> bool {
        quantity > 0 && self.quantity >= quantity
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer record. Pure reference data, no invariants beyond identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Sale
// =============================================================================

/// A point-of-sale transaction recorded by staff: a header plus line items.
///
/// Invariant: `total_amount_cents` equals the sum of the line totals of its
/// items immediately after every committed operation, never just eventually.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,

    /// Staff user that recorded the sale (opaque reference).
    pub user_id: String,

    /// Optional customer the sale is attributed to.
    pub customer_id: Option<String>,

    pub date: DateTime<Utc>,

    /// Running total of line totals, in cents. Non-negative.
    pub total_amount_cents: i64,
}

impl Sale {
    /// Returns the sale total as Money.
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// One line within a sale: a product, quantity, and frozen unit price.
///
/// `unit_price_cents` is snapshotted from the product at the time the line is
/// added and is immutable thereafter. Later changes to the product's price
/// must NOT affect historical sales.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,

    /// Quantity sold (positive).
    pub quantity: i64,

    /// Unit price in cents at time of sale (frozen snapshot).
    pub unit_price_cents: i64,

    pub created_at: DateTime<Utc>,
}

impl SaleItem {
    /// Returns the frozen unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Line total: frozen unit price times quantity. Pure function.
    #[inline]
    pub fn total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Status lifecycle of a customer order.
///
/// This is a flat enum, not a guarded state machine: any status may move to
/// any other. Validation only rejects values outside the enumerated set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// All statuses, in declaration order.
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// Canonical lowercase name, as stored in the database.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Parses a status value, case-insensitively.
    ///
    /// Values outside the enumerated set fail with
    /// [`CoreError::InvalidStatus`]. This is the validation gate for
    /// caller-supplied status strings; it runs before any database work.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(CoreError::InvalidStatus(value.to_string())),
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Order
// =============================================================================

/// A single-product, self-service purchase placed by an end customer.
///
/// `total_price_cents` is computed once at placement from the product price
/// read under the same transaction that reserves the stock, and is frozen
/// thereafter (same snapshot policy as [`SaleItem`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,
    pub product_id: String,

    /// Customer user that placed the order (opaque reference).
    pub user_id: String,

    /// Quantity ordered (positive, defaults to 1 at the API boundary).
    pub quantity: i64,

    /// Total price in cents, frozen at placement.
    pub total_price_cents: i64,

    pub date_ordered: DateTime<Utc>,

    /// Delivery address, if provided.
    pub address: Option<String>,

    /// Contact phone number, if provided.
    pub phone: Option<String>,

    pub status: OrderStatus,
}

impl Order {
    /// Returns the frozen order total as Money.
    #[inline]
    pub fn total_price(&self) -> Money {
        Money::from_cents(self.total_price_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sale_item_total_uses_frozen_price() {
        let item = SaleItem {
            id: "i1".to_string(),
            sale_id: "s1".to_string(),
            product_id: "p1".to_string(),
            quantity: 3,
            unit_price_cents: 1000,
            created_at: Utc::now(),
        };
        assert_eq!(item.total().cents(), 3000);
    }

    #[test]
    fn test_product_can_cover() {
        let product = Product {
            id: "p1".to_string(),
            name: "Cap".to_string(),
            category_id: None,
            price_cents: 1000,
            quantity: 5,
            image: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(product.can_cover(5));
        assert!(!product.can_cover(6));
        assert!(!product.can_cover(0));
        assert!(!product.can_cover(-1));
    }

    #[test]
    fn test_order_status_parse() {
        assert_eq!(OrderStatus::parse("pending").unwrap(), OrderStatus::Pending);
        assert_eq!(OrderStatus::parse("Shipped").unwrap(), OrderStatus::Shipped);
        assert_eq!(
            OrderStatus::parse("  CANCELLED ").unwrap(),
            OrderStatus::Cancelled
        );

        let err = OrderStatus::parse("returned").unwrap_err();
        assert!(matches!(err, CoreError::InvalidStatus(_)));
    }

    #[test]
    fn test_order_status_round_trips_through_str() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::parse(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn test_order_status_default() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_order_serializes_status_snake_case() {
        let order = Order {
            id: "o1".to_string(),
            product_id: "p1".to_string(),
            user_id: "u1".to_string(),
            quantity: 2,
            total_price_cents: 2000,
            date_ordered: Utc::now(),
            address: None,
            phone: None,
            status: OrderStatus::Pending,
        };
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["total_price_cents"], 2000);
    }
}
