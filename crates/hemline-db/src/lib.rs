//! # hemline-db: SQLite Persistence for Hemline
//!
//! Storage layer for the Hemline retail system: connection pool, embedded
//! migrations, per-aggregate repositories and the inventory ledger that keeps
//! stock counts consistent under concurrent writes.
//!
//! ## Architecture
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     Database (pool.rs)                   │
//! │   pool setup, WAL mode, migrations, repository access    │
//! └───────┬──────────┬──────────┬──────────┬────────┬────────┘
//!         │          │          │          │        │
//!    categories  products  customers    sales    orders
//!         │          │          │          │        │
//!         │          └──────────┼───── ledger.rs ───┘
//!         │                     │   (atomic stock debit/credit,
//!         │                     │    shared by sale and order paths)
//!         └────────── stats.rs ─┘
//! ```
//!
//! ## Transactional Operations
//! Sale item add/remove and order placement mutate stock and money together.
//! Each runs as one SQLite transaction; the ledger primitives take a
//! `&mut SqliteConnection` so they compose into the caller's transaction
//! instead of opening their own.
//!
//! ## Error Handling
//! Business conditions (insufficient stock, unknown ids, invalid status)
//! surface as [`DbError::Domain`] wrapping the typed core error; SQLite
//! constraint failures are mapped onto [`DbError::UniqueViolation`] and
//! [`DbError::ForeignKeyViolation`].

pub mod error;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod stats;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::category::CategoryRepository;
pub use repository::customer::CustomerRepository;
pub use repository::order::OrderRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
pub use stats::{DashboardStats, StatsRepository};

// =============================================================================
// Test Utilities
// =============================================================================
