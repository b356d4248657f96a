//! # Document Rendering
//!
//! Pure text rendering of receipts and reports. No files, no printers:
//! callers get a `String` and decide where it goes.
//!
//! ## Receipt Layout (42 columns)
//! ```text
//! ┌──────────────────────────────────────────┐
//! │              Corner Market               │
//! │             123 Main Street              │
//! │              City, Country               │
//! │ ════════════════════════════════════════ │
//! │                 RECEIPT                  │
//! │ Invoice: INV-20250515-0001               │
//! │ Date:    2025-05-15 14:32                │
//! │ Cashier: Administrator                   │
//! │ Customer: Walk-in Customer               │
//! │ ──────────────────────────────────────── │
//! │ Item                 Qty   Price   Total │
//! │ Milk (1L)              3   $2.99   $8.97 │
//! │ ──────────────────────────────────────── │
//! │                        Subtotal:   $8.97 │
//! │                        Tax:        $0.90 │
//! │                        Total:      $9.87 │
//! │ ════════════════════════════════════════ │
//! │ Payment Method: Cash                     │
//! │        Thank you for your purchase!      │
//! └──────────────────────────────────────────┘
//! ```
//!
//! The discount row appears only when a discount was actually applied.
//! Report documents use a fixed 72-column layout instead of the receipt
//! width, since they target full-width paper.

use chrono::Utc;

use crate::config::AppConfig;
use crate::money::Money;
use crate::types::{InvoiceDetail, SalesReport, StockOverviewRow};

/// Column width for report documents (receipts use `AppConfig::receipt_width`).
const REPORT_WIDTH: usize = 72;

// =============================================================================
// Receipt
// =============================================================================

/// Renders a printable receipt for a finalized invoice.
///
/// ## Layout
/// - Store identity block (name, address, phone, email)
/// - Invoice number, timestamp, cashier
/// - Customer name, or "Walk-in Customer" when the sale had none
/// - Line items: name, quantity, unit price, line total
/// - Subtotal, tax, discount (only when non-zero), final total
/// - Payment method and status, thank-you footer
pub fn render_receipt(detail: &InvoiceDetail, config: &AppConfig) -> String {
    let width = config.receipt_width;
    let invoice = &detail.invoice;
    let mut out = String::new();

    // Store identity block
    push_centered(&mut out, &config.store_name, width);
    for line in &config.store_address {
        push_centered(&mut out, line, width);
    }
    push_centered(&mut out, &format!("Phone: {}", config.store_phone), width);
    push_centered(&mut out, &format!("Email: {}", config.store_email), width);

    push_rule(&mut out, '=', width);
    push_centered(&mut out, "RECEIPT", width);
    out.push_str(&format!("Invoice: {}\n", invoice.invoice_number));
    out.push_str(&format!(
        "Date:    {}\n",
        invoice.created_at.format("%Y-%m-%d %H:%M")
    ));
    out.push_str(&format!("Cashier: {}\n", detail.cashier_name));
    let customer = detail
        .customer_name
        .as_deref()
        .unwrap_or("Walk-in Customer");
    out.push_str(&format!("Customer: {}\n", customer));

    // Line items
    push_rule(&mut out, '-', width);
    let name_col = width.saturating_sub(22);
    out.push_str(&format!(
        "{:<name_col$}{:>4}{:>8}{:>10}\n",
        "Item", "Qty", "Price", "Total"
    ));
    for item in &detail.items {
        out.push_str(&format!(
            "{:<name_col$}{:>4}{:>8}{:>10}\n",
            truncate(&item.name_snapshot, name_col),
            item.quantity,
            config.format_currency(item.unit_price()),
            config.format_currency(item.line_total()),
        ));
    }

    // Totals block
    push_rule(&mut out, '-', width);
    push_total_row(&mut out, "Subtotal:", invoice.subtotal(), config, width);
    push_total_row(&mut out, "Tax:", invoice.tax(), config, width);
    if !invoice.discount().is_zero() {
        push_total_row(&mut out, "Discount:", invoice.discount(), config, width);
    }
    push_total_row(&mut out, "Total:", invoice.total(), config, width);

    // Payment + footer
    push_rule(&mut out, '=', width);
    out.push_str(&format!("Payment Method: {}\n", invoice.payment_method));
    out.push_str(&format!("Payment Status: {}\n", invoice.payment_status));
    out.push('\n');
    push_centered(&mut out, "Thank you for your purchase!", width);

    out
}

// =============================================================================
// Sales Report
// =============================================================================

/// Renders a printable sales report over a date range.
///
/// ## Layout
/// - Store name, report title with the inclusive date range
/// - One row per invoice: number, date, customer, items, total, payment
/// - Summary block: invoice count, gross, tax, discount, average sale
/// - Generation timestamp footer
pub fn render_sales_report(report: &SalesReport, config: &AppConfig) -> String {
    let width = REPORT_WIDTH;
    let mut out = String::new();

    push_centered(&mut out, &config.store_name, width);
    push_centered(
        &mut out,
        &format!("Sales Report: {} to {}", report.from, report.to),
        width,
    );

    push_rule(&mut out, '=', width);
    out.push_str(&format!(
        "{:<18}{:<12}{:<19}{:>5}{:>11}{:>7}\n",
        "Invoice", "Date", "Customer", "Items", "Total", "Pay"
    ));
    push_rule(&mut out, '-', width);
    for row in &report.rows {
        let customer = row.customer_name.as_deref().unwrap_or("Walk-in Customer");
        out.push_str(&format!(
            "{:<18}{:<12}{:<19}{:>5}{:>11}{:>7}\n",
            truncate(&row.invoice_number, 17),
            row.created_at.format("%Y-%m-%d"),
            truncate(customer, 18),
            row.item_count,
            config.format_currency(Money::from_cents(row.total_cents)),
            row.payment_method,
        ));
    }

    push_rule(&mut out, '=', width);
    let summary = &report.summary;
    out.push_str(&format!("Total Invoices: {}\n", summary.invoice_count));
    out.push_str(&format!(
        "Total Sales:    {}\n",
        config.format_currency(Money::from_cents(summary.gross_cents))
    ));
    out.push_str(&format!(
        "Total Tax:      {}\n",
        config.format_currency(Money::from_cents(summary.tax_cents))
    ));
    out.push_str(&format!(
        "Total Discount: {}\n",
        config.format_currency(Money::from_cents(summary.discount_cents))
    ));
    out.push_str(&format!(
        "Average Sale:   {}\n",
        config.format_currency(Money::from_cents(summary.average_cents))
    ));

    out.push('\n');
    out.push_str(&format!(
        "Report generated on: {}\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S")
    ));

    out
}

// =============================================================================
// Inventory Report
// =============================================================================

/// Renders a printable inventory overview.
///
/// One row per product: name, category, shelf count, reorder level,
/// status classification, and stock valuation at cost.
pub fn render_inventory_report(rows: &[StockOverviewRow], config: &AppConfig) -> String {
    let width = REPORT_WIDTH;
    let mut out = String::new();

    push_centered(&mut out, &config.store_name, width);
    push_centered(&mut out, "Inventory Report", width);

    push_rule(&mut out, '=', width);
    out.push_str(&format!(
        "{:<22}{:<14}{:>6}{:>8}{:<12}{:>10}\n",
        "Product", "Category", "Stock", "Reorder", "  Status", "Value"
    ));
    push_rule(&mut out, '-', width);

    let mut total_valuation = 0i64;
    for row in rows {
        total_valuation += row.valuation_cents;
        out.push_str(&format!(
            "{:<22}{:<14}{:>6}{:>8}{:<12}{:>10}\n",
            truncate(&row.name, 21),
            truncate(&row.category_name, 13),
            row.stock_quantity,
            row.reorder_level,
            format!("  {}", row.status()),
            config.format_currency(Money::from_cents(row.valuation_cents)),
        ));
    }

    push_rule(&mut out, '=', width);
    out.push_str(&format!("Products:        {}\n", rows.len()));
    out.push_str(&format!(
        "Stock Valuation: {}\n",
        config.format_currency(Money::from_cents(total_valuation))
    ));

    out
}

// =============================================================================
// Layout Helpers
// =============================================================================

fn push_centered(out: &mut String, text: &str, width: usize) {
    let len = text.chars().count();
    let pad = width.saturating_sub(len) / 2;
    out.push_str(&" ".repeat(pad));
    out.push_str(text);
    out.push('\n');
}

fn push_rule(out: &mut String, ch: char, width: usize) {
    out.extend(std::iter::repeat(ch).take(width));
    out.push('\n');
}

fn push_total_row(out: &mut String, label: &str, amount: Money, config: &AppConfig, width: usize) {
    let row = format!("{:<10}{:>10}", label, config.format_currency(amount));
    out.push_str(&format!("{:>width$}\n", row));
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        Invoice, InvoiceItem, PaymentMethod, PaymentStatus, SalesReportRow, SalesSummary,
    };
    use chrono::{NaiveDate, TimeZone, Utc};

    fn milk_detail(discount_cents: i64, customer_name: Option<&str>) -> InvoiceDetail {
        let created_at = Utc.with_ymd_and_hms(2025, 5, 15, 14, 32, 0).unwrap();
        InvoiceDetail {
            invoice: Invoice {
                id: "inv-1".to_string(),
                invoice_number: "INV-20250515-0001".to_string(),
                customer_id: customer_name.map(|_| "cust-1".to_string()),
                subtotal_cents: 897,
                tax_cents: 90,
                discount_cents,
                total_cents: 897 + 90 - discount_cents,
                payment_method: PaymentMethod::Cash,
                payment_status: PaymentStatus::Paid,
                created_by: "u1".to_string(),
                created_at,
            },
            items: vec![InvoiceItem {
                id: "item-1".to_string(),
                invoice_id: "inv-1".to_string(),
                product_id: "p1".to_string(),
                name_snapshot: "Milk (1L)".to_string(),
                quantity: 3,
                unit_price_cents: 299,
                line_total_cents: 897,
            }],
            customer_name: customer_name.map(|n| n.to_string()),
            cashier_name: "Administrator".to_string(),
        }
    }

    #[test]
    fn test_receipt_walk_in() {
        let receipt = render_receipt(&milk_detail(0, None), &AppConfig::default());

        assert!(receipt.contains("Corner Market"));
        assert!(receipt.contains("RECEIPT"));
        assert!(receipt.contains("INV-20250515-0001"));
        assert!(receipt.contains("Customer: Walk-in Customer"));
        assert!(receipt.contains("Milk (1L)"));
        assert!(receipt.contains("$8.97"));
        assert!(receipt.contains("$0.90"));
        assert!(receipt.contains("$9.87"));
        assert!(receipt.contains("Payment Method: Cash"));
        assert!(receipt.contains("Thank you for your purchase!"));

        // No discount was applied, so no discount row
        assert!(!receipt.contains("Discount"));
    }

    #[test]
    fn test_receipt_discount_row_only_when_nonzero() {
        let receipt = render_receipt(&milk_detail(100, None), &AppConfig::default());
        assert!(receipt.contains("Discount:"));
        assert!(receipt.contains("$8.87")); // 897 + 90 - 100
    }

    #[test]
    fn test_receipt_named_customer() {
        let receipt = render_receipt(&milk_detail(0, Some("Jane Doe")), &AppConfig::default());
        assert!(receipt.contains("Customer: Jane Doe"));
        assert!(!receipt.contains("Walk-in Customer"));
    }

    #[test]
    fn test_receipt_long_names_truncated_to_width() {
        let mut detail = milk_detail(0, None);
        detail.items[0].name_snapshot = "X".repeat(80);
        let config = AppConfig::default();
        let receipt = render_receipt(&detail, &config);

        for line in receipt.lines() {
            assert!(
                line.chars().count() <= config.receipt_width,
                "line wider than receipt: {line:?}"
            );
        }
    }

    #[test]
    fn test_sales_report_rendering() {
        let created_at = Utc.with_ymd_and_hms(2025, 5, 15, 10, 0, 0).unwrap();
        let report = SalesReport {
            from: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            to: NaiveDate::from_ymd_opt(2025, 5, 31).unwrap(),
            rows: vec![SalesReportRow {
                invoice_number: "INV-20250515-0001".to_string(),
                created_at,
                customer_name: None,
                item_count: 1,
                subtotal_cents: 897,
                tax_cents: 90,
                discount_cents: 0,
                total_cents: 987,
                payment_method: PaymentMethod::Cash,
            }],
            summary: SalesSummary {
                invoice_count: 1,
                gross_cents: 987,
                tax_cents: 90,
                discount_cents: 0,
                average_cents: 987,
            },
        };

        let doc = render_sales_report(&report, &AppConfig::default());
        assert!(doc.contains("Sales Report: 2025-05-01 to 2025-05-31"));
        assert!(doc.contains("Walk-in Customer"));
        assert!(doc.contains("Total Invoices: 1"));
        assert!(doc.contains("Average Sale:   $9.87"));
    }

    #[test]
    fn test_sales_report_ends_with_generation_footer() {
        // Even a report with no sales carries the footer
        let report = SalesReport {
            from: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            to: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            rows: vec![],
            summary: SalesSummary::default(),
        };

        let doc = render_sales_report(&report, &AppConfig::default());
        let last = doc.lines().last().unwrap();
        assert!(
            last.starts_with("Report generated on: "),
            "document ends with: {last:?}"
        );
    }

    #[test]
    fn test_inventory_report_rendering() {
        let rows = vec![
            StockOverviewRow {
                name: "Milk (1L)".to_string(),
                category_name: "Dairy".to_string(),
                stock_quantity: 3,
                reorder_level: 10,
                valuation_cents: 630,
            },
            StockOverviewRow {
                name: "Rice (5kg)".to_string(),
                category_name: "Groceries".to_string(),
                stock_quantity: 0,
                reorder_level: 10,
                valuation_cents: 0,
            },
        ];

        let doc = render_inventory_report(&rows, &AppConfig::default());
        assert!(doc.contains("Inventory Report"));
        assert!(doc.contains("Low Stock"));
        assert!(doc.contains("Out of Stock"));
        assert!(doc.contains("Stock Valuation: $6.30"));
    }
}
