//! # Domain Types
//!
//! Core domain types used throughout Corner POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Invoice     │   │  StockMovement  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  category_id    │   │  invoice_number │   │  product_id     │       │
//! │  │  price_cents    │   │  total_cents    │   │  quantity_change│       │
//! │  │  stock_quantity │   │  payment_method │   │  kind           │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Role       │   │  PaymentMethod  │   │   StockStatus   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Cashier        │   │  Cash           │   │  InStock        │       │
//! │  │  Manager        │   │  Card           │   │  LowStock       │       │
//! │  │  Admin          │   │  Mobile         │   │  OutOfStock     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Entities have:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID where one exists (invoice_number, username, phone) -
//!   human-readable, used for lookups

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

// =============================================================================
// Role
// =============================================================================

/// Authorization role of a user account.
///
/// ## Hierarchy
/// Variant order defines privilege: `Cashier < Manager < Admin`, so role
/// checks are simple comparisons (`role >= Role::Manager`).
///
/// - **Cashier**: sell, look up products and customers
/// - **Manager**: everything a cashier can, plus catalog and stock writes
/// - **Admin**: everything, plus user account management
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Cashier,
    Manager,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Cashier => write!(f, "cashier"),
            Role::Manager => write!(f, "manager"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

// =============================================================================
// Category
// =============================================================================

/// A product category (Groceries, Dairy, Beverages, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name, unique across the store.
    pub name: String,

    /// Optional free-text description.
    pub description: Option<String>,

    /// When the category was created.
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    /// Optional description for product details.
    pub description: Option<String>,

    /// Category this product belongs to.
    pub category_id: String,

    /// Selling price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Cost in cents (for stock valuation and margins).
    pub cost_cents: i64,

    /// Cached stock counter. The stock_movements ledger is the source of
    /// truth; this counter changes in the same transaction as every ledger
    /// write, so the two never diverge.
    pub stock_quantity: i64,

    /// Threshold below which the product appears on the low-stock report.
    pub reorder_level: i64,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the selling price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the unit cost as a Money type.
    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_cents(self.cost_cents)
    }

    /// Classifies the current stock level.
    ///
    /// ## Rules
    /// - 0 (or below) → OutOfStock
    /// - above 0 but below reorder_level → LowStock
    /// - otherwise → InStock
    pub fn stock_status(&self) -> StockStatus {
        if self.stock_quantity <= 0 {
            StockStatus::OutOfStock
        } else if self.stock_quantity < self.reorder_level {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }
}

/// Stock level classification for inventory views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockStatus::InStock => write!(f, "In Stock"),
            StockStatus::LowStock => write!(f, "Low Stock"),
            StockStatus::OutOfStock => write!(f, "Out of Stock"),
        }
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A registered customer. Walk-in sales carry no customer at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Customer name.
    pub name: String,

    /// Phone number - unique, the primary lookup key at the register.
    pub phone: String,

    /// Optional email address.
    pub email: Option<String>,

    /// Optional postal address.
    pub address: Option<String>,

    /// When the customer was registered.
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// User
// =============================================================================

/// A user account with credentials.
///
/// Never serialized: the stored argon2 hash must not leave this layer.
/// The credential-free [`UserIdentity`] is the outward projection.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Login name, unique across the store.
    pub username: String,

    /// Argon2 PHC string (embeds its own salt).
    pub password_hash: String,

    /// Display name shown on receipts.
    pub full_name: String,

    /// Authorization role.
    pub role: Role,

    /// Optional email address.
    pub email: Option<String>,

    /// Set by each successful authentication.
    pub last_login_at: Option<DateTime<Utc>>,

    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// The credential-free identity returned by authentication and threaded
/// through every operation as the acting user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub role: Role,
}

impl From<&User> for UserIdentity {
    fn from(user: &User) -> Self {
        UserIdentity {
            id: user.id.clone(),
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
        }
    }
}

// =============================================================================
// Payment Method / Status
// =============================================================================

/// How an invoice was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Credit or debit card on an external terminal.
    Card,
    /// Mobile wallet payment.
    Mobile,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "Cash"),
            PaymentMethod::Card => write!(f, "Card"),
            PaymentMethod::Mobile => write!(f, "Mobile"),
        }
    }
}

/// Settlement state of an invoice. Checkout settles immediately, so
/// `Paid` is the only state a sale can reach; there is no refund flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Paid => write!(f, "Paid"),
        }
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// A finalized sale. Written exactly once by the checkout transaction,
/// never updated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Invoice {
    pub id: String,

    /// Human-facing number: `INV-YYYYMMDD-NNNN`, gap-free per day.
    pub invoice_number: String,

    /// Registered customer, or None for a walk-in sale.
    pub customer_id: Option<String>,

    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,

    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,

    /// The cashier who rang the sale up.
    pub created_by: String,

    pub created_at: DateTime<Utc>,
}

impl Invoice {
    /// Returns the pre-tax subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    /// Returns the tax amount as Money.
    #[inline]
    pub fn tax(&self) -> Money {
        Money::from_cents(self.tax_cents)
    }

    /// Returns the discount amount as Money.
    #[inline]
    pub fn discount(&self) -> Money {
        Money::from_cents(self.discount_cents)
    }

    /// Returns the final charged amount as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Invoice Item
// =============================================================================

/// A line item on an invoice.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InvoiceItem {
    pub id: String,
    pub invoice_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    /// Quantity sold.
    pub quantity: i64,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// Line total before tax (unit_price × quantity).
    pub line_total_cents: i64,
}

impl InvoiceItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

/// An invoice with everything a receipt needs: items plus resolved
/// customer and cashier names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceDetail {
    pub invoice: Invoice,
    pub items: Vec<InvoiceItem>,
    /// Resolved customer name, None for walk-in sales.
    pub customer_name: Option<String>,
    /// Resolved cashier display name.
    pub cashier_name: String,
}

// =============================================================================
// Stock Movements
// =============================================================================

/// Why a stock level changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Opening balance written when a product is first stocked.
    Initial,
    /// Goods received from a supplier.
    Purchase,
    /// Sold through checkout; references the invoice.
    Sale,
    /// Manual correction (damage, shrinkage, recount).
    Adjustment,
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovementKind::Initial => write!(f, "initial"),
            MovementKind::Purchase => write!(f, "purchase"),
            MovementKind::Sale => write!(f, "sale"),
            MovementKind::Adjustment => write!(f, "adjustment"),
        }
    }
}

/// One append-only ledger entry. The sum of `quantity_change` over a
/// product's entries always equals its cached `stock_quantity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockMovement {
    pub id: String,
    pub product_id: String,
    /// Signed delta: positive for goods in, negative for goods out.
    pub quantity_change: i64,
    pub kind: MovementKind,
    /// Invoice id for sale movements, otherwise None.
    pub reference_id: Option<String>,
    /// The user who caused the movement.
    pub created_by: String,
    /// Optional audit note ("damaged in transit", "recount", ...).
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Reporting Types
// =============================================================================

/// One invoice row in a sales report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SalesReportRow {
    pub invoice_number: String,
    pub created_at: DateTime<Utc>,
    /// Resolved customer name, None for walk-in sales.
    pub customer_name: Option<String>,
    /// Number of line items on the invoice.
    pub item_count: i64,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
}

/// Aggregate totals over a sales report range.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SalesSummary {
    pub invoice_count: i64,
    /// Sum of invoice totals (after tax and discount).
    pub gross_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    /// gross / count, zero when the range is empty.
    pub average_cents: i64,
}

/// A sales report over an inclusive date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesReport {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub rows: Vec<SalesReportRow>,
    pub summary: SalesSummary,
}

/// One product in a best-sellers ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TopProductRow {
    pub product_id: String,
    pub name: String,
    pub units_sold: i64,
    pub revenue_cents: i64,
}

/// One category in a sales-by-category breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CategorySalesRow {
    pub category_id: String,
    pub name: String,
    pub units_sold: i64,
    pub revenue_cents: i64,
}

/// One product row in the inventory overview report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockOverviewRow {
    pub name: String,
    pub category_name: String,
    pub stock_quantity: i64,
    pub reorder_level: i64,
    /// stock_quantity × cost, the capital sitting on the shelf.
    pub valuation_cents: i64,
}

impl StockOverviewRow {
    /// Classifies the row the same way [`Product::stock_status`] does.
    pub fn status(&self) -> StockStatus {
        if self.stock_quantity <= 0 {
            StockStatus::OutOfStock
        } else if self.stock_quantity < self.reorder_level {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_product(stock: i64, reorder: i64) -> Product {
        Product {
            id: "p1".to_string(),
            name: "Milk (1L)".to_string(),
            description: None,
            category_id: "c1".to_string(),
            price_cents: 299,
            cost_cents: 210,
            stock_quantity: stock,
            reorder_level: reorder,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_role_ordering() {
        assert!(Role::Cashier < Role::Manager);
        assert!(Role::Manager < Role::Admin);
        assert!(Role::Admin >= Role::Manager);
    }

    #[test]
    fn test_stock_status_classification() {
        assert_eq!(test_product(0, 10).stock_status(), StockStatus::OutOfStock);
        assert_eq!(test_product(5, 10).stock_status(), StockStatus::LowStock);
        assert_eq!(test_product(10, 10).stock_status(), StockStatus::InStock);
        assert_eq!(test_product(50, 10).stock_status(), StockStatus::InStock);
    }

    #[test]
    fn test_identity_strips_credentials() {
        let user = User {
            id: "u1".to_string(),
            username: "admin".to_string(),
            password_hash: "$argon2id$...".to_string(),
            full_name: "Administrator".to_string(),
            role: Role::Admin,
            email: None,
            last_login_at: None,
            created_at: Utc::now(),
        };
        let identity = UserIdentity::from(&user);
        let json = serde_json::to_string(&identity).unwrap();
        assert!(!json.contains("argon2"));
        assert_eq!(identity.role, Role::Admin);
    }

    #[test]
    fn test_payment_method_display() {
        assert_eq!(PaymentMethod::Cash.to_string(), "Cash");
        assert_eq!(PaymentMethod::Card.to_string(), "Card");
        assert_eq!(PaymentMethod::Mobile.to_string(), "Mobile");
    }

    #[test]
    fn test_invoice_money_helpers() {
        let invoice = Invoice {
            id: "i1".to_string(),
            invoice_number: "INV-20250515-0001".to_string(),
            customer_id: None,
            subtotal_cents: 897,
            tax_cents: 90,
            discount_cents: 0,
            total_cents: 987,
            payment_method: PaymentMethod::Cash,
            payment_status: PaymentStatus::Paid,
            created_by: "u1".to_string(),
            created_at: Utc::now(),
        };
        assert_eq!(invoice.subtotal() + invoice.tax() - invoice.discount(), invoice.total());
    }
}
