//! # Cart
//!
//! The in-progress sale: lines with frozen prices plus an optional
//! customer selection. Nothing here touches storage; stock checks against
//! the passed-in `Product` are advisory only, and the checkout transaction
//! re-validates everything against live data.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cart Operations                                  │
//! │                                                                         │
//! │  Register Action            Cart Change                                 │
//! │  ───────────────            ───────────                                 │
//! │                                                                         │
//! │  Scan Product ────────────► add_line()        lines.push / merge qty   │
//! │                                                                         │
//! │  Change Quantity ─────────► update_quantity() line.qty = n (0 removes) │
//! │                                                                         │
//! │  Remove Line ─────────────► remove_line()     retain (no-op if absent) │
//! │                                                                         │
//! │  Select Customer ─────────► set_customer()    customer = Some(c)       │
//! │                                                                         │
//! │  New Sale ────────────────► clear()           lines + customer gone    │
//! │                                                                         │
//! │  NOTE: The cart never reserves stock. Two carts can both hold the      │
//! │        last carton of milk; the first checkout wins, the second gets   │
//! │        OutOfStock from the commit-time re-check.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Customer, Product};
use crate::validation;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

// =============================================================================
// Cart Line
// =============================================================================

/// A line in the cart.
///
/// ## Design Notes
/// - `product_id`: Reference to the product (for the commit-time re-read)
/// - `name` / `unit_price_cents`: Frozen copies of product data at the
///   moment of adding. A price change in the catalog after that moment
///   does not reprice lines already in the cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    /// Product ID (UUID)
    pub product_id: String,

    /// Product name at time of adding (frozen)
    pub name: String,

    /// Price in cents at time of adding (frozen)
    /// This is critical: we lock in the price when added to cart
    pub unit_price_cents: i64,

    /// Quantity in cart
    pub quantity: i64,

    /// When this line was added to cart
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Creates a new cart line from a product and quantity.
    ///
    /// ## Price Freezing
    /// The price is captured at this moment. If the product price
    /// changes in the catalog, this cart line retains the original price.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price_cents: product.price_cents,
            quantity,
            added_at: Utc::now(),
        }
    }

    /// Calculates the line total (unit price × quantity).
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents * self.quantity
    }

    /// Returns the line total as Money.
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents())
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The in-progress sale.
///
/// ## Invariants
/// - Lines are unique by `product_id` (adding the same product merges)
/// - Every line quantity is in 1..=999
/// - At most 100 distinct lines
/// - The cart computes no tax: checkout applies the single configured
///   rate to the whole pre-discount subtotal
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Cart {
    /// Lines in the cart
    lines: Vec<CartLine>,

    /// Customer attached to this sale, None for walk-in
    customer: Option<Customer>,

    /// When the cart was created/last cleared
    pub created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            customer: None,
            created_at: Utc::now(),
        }
    }

    /// Adds a product to the cart or merges into an existing line.
    ///
    /// ## Behavior
    /// - Quantity must be positive and within the per-line cap
    /// - The cumulative quantity (existing line + new) is checked against
    ///   the product's current shelf count; exceeding it is `OutOfStock`
    /// - Merging keeps the line's ORIGINAL snapshot price, even if the
    ///   product passed in carries a newer price
    pub fn add_line(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        validation::validate_quantity(quantity)?;

        let existing_qty = self
            .lines
            .iter()
            .find(|l| l.product_id == product.id)
            .map(|l| l.quantity)
            .unwrap_or(0);
        let requested = existing_qty + quantity;

        if requested > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested,
                max: MAX_ITEM_QUANTITY,
            });
        }

        // Advisory check against the shelf count the caller just read.
        // The checkout transaction re-validates against live data.
        if requested > product.stock_quantity {
            return Err(CoreError::OutOfStock {
                name: product.name.clone(),
                requested,
                available: product.stock_quantity,
            });
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            line.quantity = requested;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        self.lines.push(CartLine::from_product(product, quantity));
        Ok(())
    }

    /// Sets the quantity of a product's line.
    ///
    /// ## Behavior
    /// - Quantity of zero (or below) removes the line
    /// - Otherwise the quantity is overwritten after a stock check
    /// - If the product has no line yet, one is created at its current price
    pub fn update_quantity(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 {
            self.remove_line(&product.id);
            return Ok(());
        }

        validation::validate_quantity(quantity)?;

        if quantity > product.stock_quantity {
            return Err(CoreError::OutOfStock {
                name: product.name.clone(),
                requested: quantity,
                available: product.stock_quantity,
            });
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            line.quantity = quantity;
        } else {
            self.lines.push(CartLine::from_product(product, quantity));
        }
        Ok(())
    }

    /// Removes a line by product ID.
    ///
    /// Removing a product that is not in the cart is a no-op, so callers
    /// can retry freely.
    pub fn remove_line(&mut self, product_id: &str) {
        self.lines.retain(|l| l.product_id != product_id);
    }

    /// Attaches a customer to this sale.
    pub fn set_customer(&mut self, customer: Customer) {
        self.customer = Some(customer);
    }

    /// Detaches the customer, turning this back into a walk-in sale.
    pub fn detach_customer(&mut self) {
        self.customer = None;
    }

    /// Returns the attached customer, if any.
    pub fn customer(&self) -> Option<&Customer> {
        self.customer.as_ref()
    }

    /// Clears the cart: lines AND the customer selection.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.customer = None;
        self.created_at = Utc::now();
    }

    /// Returns the lines for display and checkout.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Returns the number of distinct lines in the cart.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the total units across all lines.
    pub fn total_units(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Calculates the subtotal in cents (before tax and discount).
    pub fn subtotal_cents(&self) -> i64 {
        self.lines.iter().map(|l| l.line_total_cents()).sum()
    }

    /// Returns the subtotal as Money.
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents())
    }

    /// Checks if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Cart totals summary for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartTotals {
    pub line_count: usize,
    pub total_units: i64,
    pub subtotal_cents: i64,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            line_count: cart.line_count(),
            total_units: cart.total_units(),
            subtotal_cents: cart.subtotal_cents(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_product(id: &str, price_cents: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            description: None,
            category_id: "cat".to_string(),
            price_cents,
            cost_cents: 0,
            stock_quantity: stock,
            reorder_level: 5,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn test_customer() -> Customer {
        Customer {
            id: "cust-1".to_string(),
            name: "Jane Doe".to_string(),
            phone: "5551234567".to_string(),
            email: None,
            address: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_line() {
        let mut cart = Cart::new();
        let product = test_product("1", 999, 50); // $9.99

        cart.add_line(&product, 2).unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total_units(), 2);
        assert_eq!(cart.subtotal_cents(), 1998); // $19.98
    }

    #[test]
    fn test_add_same_product_merges_at_original_price() {
        let mut cart = Cart::new();
        let product = test_product("1", 299, 50);

        cart.add_line(&product, 2).unwrap();

        // Catalog price changed between scans
        let mut repriced = product.clone();
        repriced.price_cents = 399;
        cart.add_line(&repriced, 1).unwrap();

        // Still one line, three units, all at the ORIGINAL 299
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total_units(), 3);
        assert_eq!(cart.subtotal_cents(), 897);
    }

    #[test]
    fn test_add_rejects_non_positive_quantity() {
        let mut cart = Cart::new();
        let product = test_product("1", 299, 50);

        assert!(matches!(
            cart.add_line(&product, 0),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            cart.add_line(&product, -3),
            Err(CoreError::Validation(_))
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_beyond_stock_is_out_of_stock() {
        let mut cart = Cart::new();
        let product = test_product("1", 299, 10);

        cart.add_line(&product, 7).unwrap();

        // 7 already held + 4 more = 11 > 10 on the shelf
        let err = cart.add_line(&product, 4).unwrap_err();
        match err {
            CoreError::OutOfStock {
                requested,
                available,
                ..
            } => {
                assert_eq!(requested, 11);
                assert_eq!(available, 10);
            }
            other => panic!("expected OutOfStock, got {other:?}"),
        }
        // The existing line is untouched
        assert_eq!(cart.total_units(), 7);
    }

    #[test]
    fn test_add_zero_stock_product_is_out_of_stock() {
        let mut cart = Cart::new();
        let product = test_product("1", 299, 0);

        assert!(matches!(
            cart.add_line(&product, 1),
            Err(CoreError::OutOfStock { .. })
        ));
    }

    #[test]
    fn test_merge_respects_quantity_cap() {
        let mut cart = Cart::new();
        let product = test_product("1", 100, 100_000);

        cart.add_line(&product, 600).unwrap();
        assert!(matches!(
            cart.add_line(&product, 600),
            Err(CoreError::QuantityTooLarge { .. })
        ));
    }

    #[test]
    fn test_line_cap() {
        let mut cart = Cart::new();
        for i in 0..100 {
            let product = test_product(&format!("p{i}"), 100, 50);
            cart.add_line(&product, 1).unwrap();
        }

        let overflow = test_product("p100", 100, 50);
        assert!(matches!(
            cart.add_line(&overflow, 1),
            Err(CoreError::CartTooLarge { .. })
        ));
    }

    #[test]
    fn test_update_quantity_zero_removes() {
        let mut cart = Cart::new();
        let product = test_product("1", 299, 50);

        cart.add_line(&product, 2).unwrap();
        cart.update_quantity(&product, 0).unwrap();

        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_overwrites() {
        let mut cart = Cart::new();
        let product = test_product("1", 299, 50);

        cart.add_line(&product, 2).unwrap();
        cart.update_quantity(&product, 9).unwrap();

        assert_eq!(cart.total_units(), 9);
        assert_eq!(cart.subtotal_cents(), 299 * 9);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut cart = Cart::new();
        let product = test_product("1", 299, 50);

        cart.add_line(&product, 1).unwrap();
        cart.remove_line("1");
        cart.remove_line("1"); // second remove is a no-op
        cart.remove_line("never-existed");

        assert!(cart.is_empty());
    }

    #[test]
    fn test_clear_detaches_customer() {
        let mut cart = Cart::new();
        let product = test_product("1", 299, 50);

        cart.add_line(&product, 1).unwrap();
        cart.set_customer(test_customer());
        assert!(cart.customer().is_some());

        cart.clear();
        assert!(cart.is_empty());
        assert!(cart.customer().is_none());
    }

    #[test]
    fn test_totals_summary() {
        let mut cart = Cart::new();
        cart.add_line(&test_product("1", 299, 50), 3).unwrap();
        cart.add_line(&test_product("2", 199, 50), 2).unwrap();

        let totals = CartTotals::from(&cart);
        assert_eq!(totals.line_count, 2);
        assert_eq!(totals.total_units, 5);
        assert_eq!(totals.subtotal_cents, 897 + 398);
    }
}
