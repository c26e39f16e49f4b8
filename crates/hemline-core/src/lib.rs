//! # hemline-core: Pure Business Logic for Hemline
//!
//! Hemline is a small clothing-retail management system: a product/category
//! catalog, customer records, staff-recorded sales with line items, and a
//! customer self-service order flow with stock deduction.
//!
//! This crate is the heart of the system. It contains the business rules as
//! pure functions and types with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │              Presentation layer (HTTP / CLI / admin UI)         │
//! │   translates typed results into user-facing responses          │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────▼───────────────────────────────────┐
//! │                  hemline-db (Database Layer)                    │
//! │   SQLite repositories, inventory ledger, transactional ops     │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────▼───────────────────────────────────┐
//! │               ★ hemline-core (THIS CRATE) ★                     │
//! │                                                                 │
//! │   types        money        error         validation           │
//! │   Product      Money        CoreError     rules/checks         │
//! │   Sale/Order   line math    Validation                         │
//! │                                                                 │
//! │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, SaleItem, Order, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: deterministic, same input = same output
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all monetary values are in cents (i64)
//! 4. **Explicit Errors**: all errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity accepted for a single sale line or order.
///
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 9_999;

/// Stock level below which a product is reported in the low-stock feed.
pub const LOW_STOCK_THRESHOLD: i64 = 10;
