//! # Point of Sale Service
//!
//! The register: one logged-in cashier, one in-progress cart, checkout.
//!
//! ## A Sale, End to End
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   login ──► search / add_to_cart ──► (attach_customer) ──► checkout    │
//! │                                                              │          │
//! │                                  receipt_for ◄── InvoiceDetail          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cart lives in memory on this struct; nothing about the sale
//! touches the database until `checkout`, which hands the whole cart to
//! the one checkout transaction. A failed checkout leaves the cart
//! intact so the cashier can drop a line and try again.

use tracing::{debug, info};

use corner_core::{
    receipt, AppConfig, Cart, CartLine, CartTotals, CoreError, Customer, InvoiceDetail, Money,
    PaymentMethod, Product, UserIdentity,
};

use crate::error::{DbError, DbResult};
use crate::pool::Database;

/// Results per search; a register screen shows one page.
const SEARCH_LIMIT: u32 = 20;

/// Snapshot of the register's cart for display.
#[derive(Debug, Clone)]
pub struct CartView {
    pub lines: Vec<CartLine>,
    /// Customer attached to the sale, if any.
    pub customer: Option<Customer>,
    pub totals: CartTotals,
}

/// The register-facing service.
///
/// ## Usage
/// ```rust,ignore
/// let mut pos = PointOfSale::new(db, AppConfig::from_env());
///
/// pos.login("cashier", "cashier123").await?;
/// pos.add_to_cart(&milk_id, 2).await?;
/// let detail = pos.checkout(PaymentMethod::Cash, Money::zero()).await?;
/// println!("{}", pos.receipt_for(&detail.invoice.id).await?);
/// ```
#[derive(Debug)]
pub struct PointOfSale {
    db: Database,
    config: AppConfig,
    cart: Cart,
    session: Option<UserIdentity>,
}

impl PointOfSale {
    /// Creates a register with no session and an empty cart.
    pub fn new(db: Database, config: AppConfig) -> Self {
        PointOfSale {
            db,
            config,
            cart: Cart::new(),
            session: None,
        }
    }

    /// Logs a user in, replacing any existing session.
    pub async fn login(&mut self, username: &str, password: &str) -> DbResult<UserIdentity> {
        let identity = self.db.users().authenticate(username, password).await?;

        info!(username = %identity.username, role = %identity.role, "Signed in at the register");

        self.session = Some(identity.clone());
        Ok(identity)
    }

    /// Logs out. Abandons the in-progress sale; whoever signs in next
    /// starts from an empty cart.
    pub fn logout(&mut self) {
        if let Some(user) = self.session.take() {
            debug!(username = %user.username, "Signed out of the register");
        }
        self.cart.clear();
    }

    /// The logged-in user, if any.
    pub fn current_user(&self) -> Option<&UserIdentity> {
        self.session.as_ref()
    }

    /// Searches the catalog by name for the register display.
    pub async fn search_products(&self, term: &str) -> DbResult<Vec<Product>> {
        self.require_session()?;
        self.db.products().search(term, SEARCH_LIMIT).await
    }

    /// Adds a product to the cart, merging into an existing line.
    pub async fn add_to_cart(&mut self, product_id: &str, quantity: i64) -> DbResult<CartTotals> {
        self.require_session()?;

        let product = self.db.products().get(product_id).await?;
        self.cart.add_line(&product, quantity)?;

        debug!(product = %product.name, quantity = %quantity, "Added to cart");
        Ok(CartTotals::from(&self.cart))
    }

    /// Overwrites a line's quantity; zero removes the line.
    pub async fn update_cart_line(
        &mut self,
        product_id: &str,
        quantity: i64,
    ) -> DbResult<CartTotals> {
        self.require_session()?;

        let product = self.db.products().get(product_id).await?;
        self.cart.update_quantity(&product, quantity)?;

        Ok(CartTotals::from(&self.cart))
    }

    /// Removes a line from the cart. No-op if the product is not in it.
    pub fn remove_from_cart(&mut self, product_id: &str) -> DbResult<CartTotals> {
        self.require_session()?;
        self.cart.remove_line(product_id);
        Ok(CartTotals::from(&self.cart))
    }

    /// Empties the cart and drops the customer selection.
    pub fn clear_cart(&mut self) -> DbResult<()> {
        self.require_session()?;
        self.cart.clear();
        Ok(())
    }

    /// Attaches a customer to the sale, looked up by phone first and by
    /// ID as a fallback.
    pub async fn attach_customer(&mut self, key: &str) -> DbResult<Customer> {
        self.require_session()?;

        let customers = self.db.customers();
        let customer = match customers.find_by_phone(key).await {
            Ok(customer) => customer,
            Err(DbError::NotFound { .. }) => customers.get(key).await?,
            Err(err) => return Err(err),
        };

        debug!(customer = %customer.name, "Customer attached to sale");

        self.cart.set_customer(customer.clone());
        Ok(customer)
    }

    /// Turns the sale back into a walk-in.
    pub fn detach_customer(&mut self) -> DbResult<()> {
        self.require_session()?;
        self.cart.detach_customer();
        Ok(())
    }

    /// Snapshot of the cart for the register display.
    pub fn cart_view(&self) -> CartView {
        CartView {
            lines: self.cart.lines().to_vec(),
            customer: self.cart.customer().cloned(),
            totals: CartTotals::from(&self.cart),
        }
    }

    /// Finalizes the sale through the checkout transaction.
    ///
    /// The cart is cleared only when the sale lands; on any error it is
    /// left as it was.
    pub async fn checkout(
        &mut self,
        payment_method: PaymentMethod,
        discount: Money,
    ) -> DbResult<InvoiceDetail> {
        let user = self.require_session()?.clone();
        let customer_id = self.cart.customer().map(|c| c.id.clone());

        let detail = self
            .db
            .invoices()
            .create_invoice(
                &self.cart,
                customer_id.as_deref(),
                payment_method,
                discount,
                self.config.tax_rate(),
                &user.id,
            )
            .await?;

        self.cart.clear();

        Ok(detail)
    }

    /// Renders the printable receipt for a finalized sale.
    pub async fn receipt_for(&self, invoice_id: &str) -> DbResult<String> {
        self.require_session()?;

        let detail = self.db.invoices().get(invoice_id).await?;
        Ok(receipt::render_receipt(&detail, &self.config))
    }

    fn require_session(&self) -> DbResult<&UserIdentity> {
        self.session
            .as_ref()
            .ok_or_else(|| CoreError::Unauthorized.into())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
