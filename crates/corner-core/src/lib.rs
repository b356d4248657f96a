//! # corner-core: Pure Business Logic for Corner POS
//!
//! This crate is the **heart** of Corner POS. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Corner POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Register / Back-Office Shell                    │   │
//! │  │    Search ──► Cart ──► Checkout ──► Receipt ──► Reports        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               corner-db (Services + Repositories)               │   │
//! │  │    PointOfSale, BackOffice, InvoiceRepository, StockRepository │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ corner-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐  │   │
//! │  │   │  types   │ │  money   │ │   cart   │ │ validation       │  │   │
//! │  │   │ Product  │ │  Money   │ │   Cart   │ │ rules            │  │   │
//! │  │   │ Invoice  │ │ TaxRate  │ │ CartLine │ │ checks           │  │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────────────┘  │   │
//! │  │   ┌──────────┐ ┌──────────┐                                    │   │
//! │  │   │  config  │ │ receipt  │                                    │   │
//! │  │   │ AppConfig│ │ renderer │                                    │   │
//! │  │   └──────────┘ └──────────┘                                    │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Customer, Invoice, User, etc.)
//! - [`money`] - Money and TaxRate with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//! - [`cart`] - In-progress sale with price snapshots
//! - [`config`] - Store identity and currency formatting
//! - [`receipt`] - Plain-text receipt and report rendering
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use corner_core::money::{Money, TaxRate};
//!
//! // Create money from cents (never from floats!)
//! let price = Money::from_cents(299); // $2.99
//!
//! // Three cartons of milk
//! let subtotal = price.multiply_quantity(3);
//! assert_eq!(subtotal.cents(), 897);
//!
//! // 10% tax, half-up rounding
//! let tax = subtotal.calculate_tax(TaxRate::from_bps(1000));
//! assert_eq!(tax.cents(), 90);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod config;
pub mod error;
pub mod money;
pub mod receipt;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use corner_core::Money` instead of
// `use corner_core::money::Money`

pub use cart::{Cart, CartLine, CartTotals};
pub use config::AppConfig;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, TaxRate};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart
///
/// ## Business Reason
/// Prevents runaway carts and ensures reasonable transaction sizes.
/// Can be made configurable per-store in future versions.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single item in cart
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
/// Configurable per-store in future versions.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Default sales tax rate in basis points (10.00%)
///
/// ## Why a constant?
/// The store runs a single flat rate applied at checkout. It can be
/// overridden through [`AppConfig`] without touching any call site.
pub const DEFAULT_TAX_RATE_BPS: u32 = 1000;
