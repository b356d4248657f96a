//! # corner-db: Persistence Layer for Corner POS
//!
//! This crate provides database access and the operational services for the
//! Corner POS system. It uses SQLite for local storage with sqlx for async
//! operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Corner POS Data Flow                              │
//! │                                                                         │
//! │  Shell (CLI / future UI)                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     corner-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────────┐   ┌───────────────┐   ┌──────────────────┐  │   │
//! │  │   │   Services   │   │  Repositories │   │  Database        │  │   │
//! │  │   │ (service/)   │──►│ (repository/) │──►│  (pool.rs)       │  │   │
//! │  │   │              │   │               │   │                  │  │   │
//! │  │   │ PointOfSale  │   │ CategoryRepo  │   │ SqlitePool       │  │   │
//! │  │   │ BackOffice   │   │ ProductRepo   │   │ Migrations       │  │   │
//! │  │   │              │   │ InvoiceRepo.. │   │ (embedded)       │  │   │
//! │  │   └──────────────┘   └───────────────┘   └──────────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   ./corner.db (WAL mode, foreign keys on)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (per table / concern)
//! - [`service`] - Register and back-office workflows on top of repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use corner_db::{Database, DbConfig, PointOfSale};
//! use corner_core::AppConfig;
//!
//! let db = Database::new(DbConfig::new("./corner.db")).await?;
//!
//! let mut register = PointOfSale::new(db, AppConfig::from_env());
//! register.login("admin", "admin123").await?;
//! register.add_to_cart(&product_id, 3).await?;
//! let sale = register.checkout(PaymentMethod::Cash, Money::zero()).await?;
//! println!("{}", register.receipt_for(&sale.invoice.id).await?);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::customer::CustomerRepository;
pub use repository::invoice::InvoiceRepository;
pub use repository::product::{NewProduct, ProductRepository};
pub use repository::stock::StockRepository;
pub use repository::user::{NewUser, UserRepository};

// Service re-exports
pub use service::backoffice::BackOffice;
pub use service::pos::{CartView, PointOfSale};
