//! # Error Types
//!
//! Domain-specific error types for hemline-core.
//!
//! ## Error Hierarchy
//! ```text
//! hemline-core errors (this file)
//! ├── CoreError        - Business rule violations (recoverable, caller-visible)
//! └── ValidationError  - Input validation failures
//!
//! hemline-db errors (separate crate)
//! └── DbError          - Database operation failures, wraps CoreError
//!
//! Flow: ValidationError → CoreError → DbError → presentation layer
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (id, counts, etc.)
//! 3. Errors are enum variants, never String
//! 4. Recoverable conditions (insufficient stock, invalid status) are typed
//!    results, never exceptions used for control flow

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These represent business rule violations or missing references. They are
/// user-facing validation failures, not system faults: the presentation layer
/// decides display text, the core only returns the typed condition.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Referenced product does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Requested quantity exceeds on-hand stock.
    ///
    /// No mutation occurs when this is returned: the reservation that
    /// detected the shortfall is rolled back with its whole transaction.
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// Referenced sale does not exist.
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// Sale item does not exist or does not belong to the given sale.
    #[error("Sale item {item_id} not found in sale {sale_id}")]
    SaleItemNotFound { sale_id: String, item_id: String },

    /// Referenced order does not exist.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Referenced customer does not exist.
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// Referenced category does not exist.
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    /// Status value outside the enumerated set.
    #[error("Invalid order status: '{0}'")]
    InvalidStatus(String),

    /// Crediting stock would overflow the quantity counter.
    ///
    /// Stock has no business-level upper bound, but the counter must not
    /// wrap. Practically unreachable with i64, still a typed failure.
    #[error("Stock quantity overflow for product {product_id}")]
    StockOverflow { product_id: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when caller input doesn't meet requirements. Used for early
/// validation before business logic runs and before any lock is taken.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
