//! # Repository Modules
//!
//! One repository per aggregate. Plain CRUD repositories (category, product,
//! customer) run single-statement operations against the pool; the sale and
//! order repositories also host the transactional operations that mutate
//! stock and totals together through the [ledger](crate::ledger).

pub mod category;
pub mod customer;
pub mod order;
pub mod product;
pub mod sale;

use uuid::Uuid;

/// Generates a new entity ID (UUID v4).
pub(crate) fn generate_id() -> String {
    Uuid::new_v4().to_string()
}
