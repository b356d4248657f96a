//! # Invoice Repository
//!
//! Checkout and everything downstream of it: invoice storage, receipt
//! hydration, and sales reporting.
//!
//! ## The Checkout Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_invoice runs as ONE SQLite transaction:                        │
//! │                                                                         │
//! │    1. Reject an empty cart or an out-of-range discount (no txn yet)    │
//! │    2. BEGIN                                                             │
//! │    3. Resolve the cashier; a deleted account cannot sell               │
//! │    4. Resolve the customer, if the sale names one                      │
//! │    5. Re-check every line against LIVE stock (the cart only saw an     │
//! │       advisory snapshot)                                               │
//! │    6. Derive the next INV-YYYYMMDD-NNNN number inside the txn          │
//! │    7. INSERT the invoice header                                        │
//! │    8. Per line: INSERT the item, append a negative sale movement to    │
//! │       the ledger, update the cached stock counter                      │
//! │    9. COMMIT                                                            │
//! │                                                                         │
//! │  Any failure before COMMIT rolls the whole sale back: no invoice,      │
//! │  no items, no movements, counters untouched.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Invoices are immutable once written. There is no update path, only
//! reads and aggregations.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use corner_core::{
    Cart, CategorySalesRow, CoreError, Invoice, InvoiceDetail, InvoiceItem, Money, MovementKind,
    PaymentMethod, PaymentStatus, SalesReport, SalesReportRow, SalesSummary, StockMovement,
    TaxRate, TopProductRow,
};

use crate::error::{DbError, DbResult};
use crate::repository::stock;

/// Columns selected for every Invoice row.
const INVOICE_COLUMNS: &str = r#"
    id, invoice_number, customer_id,
    subtotal_cents, tax_cents, discount_cents, total_cents,
    payment_method, payment_status, created_by, created_at
"#;

/// Columns selected for every InvoiceItem row.
const ITEM_COLUMNS: &str = r#"
    id, invoice_id, product_id, name_snapshot, quantity, unit_price_cents, line_total_cents
"#;

/// Repository for invoices and sales reporting.
///
/// ## Usage
/// ```rust,ignore
/// let repo = InvoiceRepository::new(pool);
///
/// let detail = repo
///     .create_invoice(&cart, None, PaymentMethod::Cash, Money::zero(), tax_rate, &cashier.id)
///     .await?;
/// println!("rang up {}", detail.invoice.invoice_number);
/// ```
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    /// Finalizes a sale.
    ///
    /// See the module docs for the full transaction; the short version is
    /// that either every effect of the sale lands or none of them do.
    ///
    /// ## Errors
    /// * `EmptyCart` - Nothing to sell
    /// * `InvalidDiscount` - Discount negative or above the subtotal
    /// * `Unauthorized` - `created_by` does not name an existing user
    /// * `NotFound` - Named customer or a cart product no longer exists
    /// * `OutOfStock` - Live stock below a line's quantity
    pub async fn create_invoice(
        &self,
        cart: &Cart,
        customer_id: Option<&str>,
        payment_method: PaymentMethod,
        discount: Money,
        tax_rate: TaxRate,
        created_by: &str,
    ) -> DbResult<InvoiceDetail> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        let subtotal = cart.subtotal();
        if discount.is_negative() || discount > subtotal {
            return Err(CoreError::InvalidDiscount { discount, subtotal }.into());
        }

        let mut tx = self.pool.begin().await?;

        let cashier_name: Option<String> =
            sqlx::query_scalar("SELECT full_name FROM users WHERE id = ?1")
                .bind(created_by)
                .fetch_optional(&mut *tx)
                .await?;
        let cashier_name = match cashier_name {
            Some(name) => name,
            None => return Err(CoreError::Unauthorized.into()),
        };

        let customer_name = match customer_id {
            Some(cid) => {
                let name: Option<String> =
                    sqlx::query_scalar("SELECT name FROM customers WHERE id = ?1")
                        .bind(cid)
                        .fetch_optional(&mut *tx)
                        .await?;
                match name {
                    Some(name) => Some(name),
                    None => return Err(DbError::not_found("Customer", cid)),
                }
            }
            None => None,
        };

        // The cart's stock checks were advisory; this one is binding.
        for line in cart.lines() {
            let stock: Option<i64> =
                sqlx::query_scalar("SELECT stock_quantity FROM products WHERE id = ?1")
                    .bind(&line.product_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            let stock = match stock {
                Some(stock) => stock,
                None => return Err(DbError::not_found("Product", &line.product_id)),
            };
            if stock < line.quantity {
                return Err(CoreError::OutOfStock {
                    name: line.name.clone(),
                    requested: line.quantity,
                    available: stock,
                }
                .into());
            }
        }

        let tax = subtotal.calculate_tax(tax_rate);
        let total = subtotal + tax - discount;

        let now = Utc::now();
        let invoice_number = next_invoice_number(&mut tx, now).await?;

        let invoice = Invoice {
            id: Uuid::new_v4().to_string(),
            invoice_number,
            customer_id: customer_id.map(|s| s.to_string()),
            subtotal_cents: subtotal.cents(),
            tax_cents: tax.cents(),
            discount_cents: discount.cents(),
            total_cents: total.cents(),
            payment_method,
            payment_status: PaymentStatus::Paid,
            created_by: created_by.to_string(),
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, invoice_number, customer_id,
                subtotal_cents, tax_cents, discount_cents, total_cents,
                payment_method, payment_status, created_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&invoice.id)
        .bind(&invoice.invoice_number)
        .bind(&invoice.customer_id)
        .bind(invoice.subtotal_cents)
        .bind(invoice.tax_cents)
        .bind(invoice.discount_cents)
        .bind(invoice.total_cents)
        .bind(invoice.payment_method)
        .bind(invoice.payment_status)
        .bind(&invoice.created_by)
        .bind(invoice.created_at)
        .execute(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(cart.line_count());
        for line in cart.lines() {
            let item = InvoiceItem {
                id: Uuid::new_v4().to_string(),
                invoice_id: invoice.id.clone(),
                product_id: line.product_id.clone(),
                name_snapshot: line.name.clone(),
                quantity: line.quantity,
                unit_price_cents: line.unit_price_cents,
                line_total_cents: line.line_total_cents(),
            };

            sqlx::query(
                r#"
                INSERT INTO invoice_items (
                    id, invoice_id, product_id, name_snapshot,
                    quantity, unit_price_cents, line_total_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&item.id)
            .bind(&item.invoice_id)
            .bind(&item.product_id)
            .bind(&item.name_snapshot)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .bind(item.line_total_cents)
            .execute(&mut *tx)
            .await?;

            let movement = StockMovement {
                id: Uuid::new_v4().to_string(),
                product_id: line.product_id.clone(),
                quantity_change: -line.quantity,
                kind: MovementKind::Sale,
                reference_id: Some(invoice.id.clone()),
                created_by: created_by.to_string(),
                notes: None,
                created_at: now,
            };
            stock::insert_movement(&mut tx, &movement).await?;
            stock::apply_delta(&mut tx, &line.product_id, -line.quantity, now).await?;

            items.push(item);
        }

        tx.commit().await?;

        info!(
            invoice_number = %invoice.invoice_number,
            total_cents = %invoice.total_cents,
            lines = items.len(),
            "Sale finalized"
        );

        Ok(InvoiceDetail {
            invoice,
            items,
            customer_name,
            cashier_name,
        })
    }

    /// Gets an invoice with items and resolved names, by ID.
    pub async fn get(&self, id: &str) -> DbResult<InvoiceDetail> {
        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match invoice {
            Some(invoice) => self.hydrate(invoice).await,
            None => Err(DbError::not_found("Invoice", id)),
        }
    }

    /// Gets an invoice by its human-facing number.
    pub async fn get_by_number(&self, invoice_number: &str) -> DbResult<InvoiceDetail> {
        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE invoice_number = ?1"
        ))
        .bind(invoice_number)
        .fetch_optional(&self.pool)
        .await?;

        match invoice {
            Some(invoice) => self.hydrate(invoice).await,
            None => Err(DbError::not_found("Invoice", invoice_number)),
        }
    }

    /// Most recent invoice headers, newest first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<Invoice>> {
        let invoices = sqlx::query_as::<_, Invoice>(&format!(
            r#"
            SELECT {INVOICE_COLUMNS} FROM invoices
            ORDER BY created_at DESC, invoice_number DESC
            LIMIT ?1
            "#
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(invoices)
    }

    /// Builds a sales report over an inclusive date range.
    ///
    /// A reversed range matches nothing and yields an empty report.
    pub async fn sales_report(&self, from: NaiveDate, to: NaiveDate) -> DbResult<SalesReport> {
        let rows = sqlx::query_as::<_, SalesReportRow>(
            r#"
            SELECT
                i.invoice_number,
                i.created_at,
                c.name AS customer_name,
                COUNT(ii.id) AS item_count,
                i.subtotal_cents,
                i.tax_cents,
                i.discount_cents,
                i.total_cents,
                i.payment_method
            FROM invoices i
            LEFT JOIN customers c ON c.id = i.customer_id
            LEFT JOIN invoice_items ii ON ii.invoice_id = i.id
            WHERE date(i.created_at) BETWEEN ?1 AND ?2
            GROUP BY i.id
            ORDER BY i.created_at, i.invoice_number
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        let summary = summarize(&rows);

        debug!(from = %from, to = %to, invoices = rows.len(), "Sales report built");

        Ok(SalesReport {
            from,
            to,
            rows,
            summary,
        })
    }

    /// Aggregate totals for a single day.
    pub async fn daily_summary(&self, date: NaiveDate) -> DbResult<SalesSummary> {
        Ok(self.sales_report(date, date).await?.summary)
    }

    /// Best sellers over a date range, ranked by units sold.
    ///
    /// `MIN(name_snapshot)` picks one stable name per product in case it
    /// was renamed mid-range.
    pub async fn top_products(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        limit: u32,
    ) -> DbResult<Vec<TopProductRow>> {
        let rows = sqlx::query_as::<_, TopProductRow>(
            r#"
            SELECT
                ii.product_id,
                MIN(ii.name_snapshot) AS name,
                SUM(ii.quantity) AS units_sold,
                SUM(ii.line_total_cents) AS revenue_cents
            FROM invoice_items ii
            INNER JOIN invoices i ON i.id = ii.invoice_id
            WHERE date(i.created_at) BETWEEN ?1 AND ?2
            GROUP BY ii.product_id
            ORDER BY units_sold DESC, revenue_cents DESC
            LIMIT ?3
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Sales grouped by category over a date range, highest revenue first.
    ///
    /// Sold products cannot be deleted, so every item row still joins to
    /// its product and category.
    pub async fn sales_by_category(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DbResult<Vec<CategorySalesRow>> {
        let rows = sqlx::query_as::<_, CategorySalesRow>(
            r#"
            SELECT
                c.id AS category_id,
                c.name,
                SUM(ii.quantity) AS units_sold,
                SUM(ii.line_total_cents) AS revenue_cents
            FROM invoice_items ii
            INNER JOIN products p ON p.id = ii.product_id
            INNER JOIN categories c ON c.id = p.category_id
            INNER JOIN invoices i ON i.id = ii.invoice_id
            WHERE date(i.created_at) BETWEEN ?1 AND ?2
            GROUP BY c.id
            ORDER BY revenue_cents DESC, units_sold DESC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Counts total invoices (for diagnostics and seeding).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invoices")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn hydrate(&self, invoice: Invoice) -> DbResult<InvoiceDetail> {
        let items = sqlx::query_as::<_, InvoiceItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM invoice_items WHERE invoice_id = ?1 ORDER BY rowid"
        ))
        .bind(&invoice.id)
        .fetch_all(&self.pool)
        .await?;

        let customer_name: Option<String> = match &invoice.customer_id {
            Some(cid) => {
                sqlx::query_scalar("SELECT name FROM customers WHERE id = ?1")
                    .bind(cid)
                    .fetch_optional(&self.pool)
                    .await?
            }
            None => None,
        };

        let cashier_name: Option<String> =
            sqlx::query_scalar("SELECT full_name FROM users WHERE id = ?1")
                .bind(&invoice.created_by)
                .fetch_optional(&self.pool)
                .await?;
        let cashier_name =
            cashier_name.ok_or_else(|| DbError::not_found("User", &invoice.created_by))?;

        Ok(InvoiceDetail {
            invoice,
            items,
            customer_name,
            cashier_name,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Derives the next invoice number for the day, inside the checkout
/// transaction so two concurrent sales cannot claim the same one.
async fn next_invoice_number(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    now: DateTime<Utc>,
) -> DbResult<String> {
    let prefix = format!("INV-{}-", now.format("%Y%m%d"));

    // LENGTH ordering keeps the sequence correct past 9999 sales a day
    let last: Option<String> = sqlx::query_scalar(
        r#"
        SELECT invoice_number FROM invoices
        WHERE invoice_number LIKE ?1
        ORDER BY LENGTH(invoice_number) DESC, invoice_number DESC
        LIMIT 1
        "#,
    )
    .bind(format!("{}%", prefix))
    .fetch_optional(&mut **tx)
    .await?;

    let next = last
        .as_deref()
        .and_then(|n| n.rsplit('-').next())
        .and_then(|n| n.parse::<u32>().ok())
        .unwrap_or(0)
        + 1;

    Ok(format!("{}{:04}", prefix, next))
}

fn summarize(rows: &[SalesReportRow]) -> SalesSummary {
    let invoice_count = rows.len() as i64;
    let gross_cents: i64 = rows.iter().map(|r| r.total_cents).sum();
    let tax_cents: i64 = rows.iter().map(|r| r.tax_cents).sum();
    let discount_cents: i64 = rows.iter().map(|r| r.discount_cents).sum();
    let average_cents = if invoice_count > 0 {
        gross_cents / invoice_count
    } else {
        0
    };

    SalesSummary {
        invoice_count,
        gross_cents,
        tax_cents,
        discount_cents,
        average_cents,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
