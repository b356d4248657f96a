//! # Back Office Service
//!
//! The office desk: catalog and customer upkeep, stock intake and
//! corrections, printable reports, and account management.
//!
//! Every write passes the logged-in identity down to the owning
//! repository, which applies the role ladder (Manager for catalog and
//! stock, Admin for accounts). Report generation is gated here at
//! Manager because it spans several repositories and none of them owns
//! it.

use chrono::NaiveDate;
use tracing::info;

use corner_core::{
    receipt, AppConfig, Category, CategorySalesRow, CoreError, Customer, Product, Role,
    SalesReport, SalesSummary, StockMovement, TopProductRow, UserIdentity,
};

use crate::error::DbResult;
use crate::pool::Database;
use crate::repository::product::NewProduct;
use crate::repository::require_role;
use crate::repository::user::NewUser;

/// The office-facing service.
///
/// ## Usage
/// ```rust,ignore
/// let mut office = BackOffice::new(db, AppConfig::from_env());
///
/// office.login("manager", "manager123").await?;
/// office.receive_stock(&milk_id, 24, Some("PO-1182")).await?;
/// println!("{}", office.inventory_report().await?);
/// ```
#[derive(Debug)]
pub struct BackOffice {
    db: Database,
    config: AppConfig,
    session: Option<UserIdentity>,
}

impl BackOffice {
    /// Creates a back office with no session.
    pub fn new(db: Database, config: AppConfig) -> Self {
        BackOffice {
            db,
            config,
            session: None,
        }
    }

    /// Logs a user in, replacing any existing session.
    pub async fn login(&mut self, username: &str, password: &str) -> DbResult<UserIdentity> {
        let identity = self.db.users().authenticate(username, password).await?;

        info!(username = %identity.username, role = %identity.role, "Signed in to the back office");

        self.session = Some(identity.clone());
        Ok(identity)
    }

    /// Logs out.
    pub fn logout(&mut self) {
        self.session = None;
    }

    /// The logged-in user, if any.
    pub fn current_user(&self) -> Option<&UserIdentity> {
        self.session.as_ref()
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    pub async fn create_category(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> DbResult<Category> {
        let user = self.require_session()?;
        self.db.categories().create(user, name, description).await
    }

    pub async fn update_category(
        &self,
        id: &str,
        name: &str,
        description: Option<&str>,
    ) -> DbResult<Category> {
        let user = self.require_session()?;
        self.db.categories().update(user, id, name, description).await
    }

    pub async fn delete_category(&self, id: &str) -> DbResult<()> {
        let user = self.require_session()?;
        self.db.categories().delete(user, id).await
    }

    pub async fn list_categories(&self) -> DbResult<Vec<Category>> {
        self.require_session()?;
        self.db.categories().list().await
    }

    pub async fn create_product(&self, new: NewProduct) -> DbResult<Product> {
        let user = self.require_session()?;
        self.db.products().create(user, new).await
    }

    pub async fn update_product(&self, product: &Product) -> DbResult<()> {
        let user = self.require_session()?;
        self.db.products().update(user, product).await
    }

    pub async fn update_price(&self, product_id: &str, price_cents: i64) -> DbResult<()> {
        let user = self.require_session()?;
        self.db.products().update_price(user, product_id, price_cents).await
    }

    pub async fn delete_product(&self, id: &str) -> DbResult<()> {
        let user = self.require_session()?;
        self.db.products().delete(user, id).await
    }

    pub async fn search_products(&self, term: &str, limit: u32) -> DbResult<Vec<Product>> {
        self.require_session()?;
        self.db.products().search(term, limit).await
    }

    pub async fn list_products(&self) -> DbResult<Vec<Product>> {
        self.require_session()?;
        self.db.products().list().await
    }

    // =========================================================================
    // Stock
    // =========================================================================

    pub async fn receive_stock(
        &self,
        product_id: &str,
        quantity: i64,
        notes: Option<&str>,
    ) -> DbResult<StockMovement> {
        let user = self.require_session()?;
        self.db.stock().receive_stock(user, product_id, quantity, notes).await
    }

    pub async fn adjust_stock(
        &self,
        product_id: &str,
        quantity_change: i64,
        notes: Option<&str>,
    ) -> DbResult<StockMovement> {
        let user = self.require_session()?;
        self.db
            .stock()
            .adjust_stock(user, product_id, quantity_change, notes)
            .await
    }

    pub async fn stock_history(&self, product_id: &str) -> DbResult<Vec<StockMovement>> {
        self.require_session()?;
        self.db.stock().history(product_id).await
    }

    pub async fn recent_movements(&self, limit: u32) -> DbResult<Vec<StockMovement>> {
        self.require_session()?;
        self.db.stock().recent(limit).await
    }

    // =========================================================================
    // Reports
    // =========================================================================

    /// Products that need reordering.
    pub async fn low_stock_report(&self) -> DbResult<Vec<Product>> {
        self.require_manager()?;
        self.db.products().low_stock().await
    }

    /// Printable inventory overview with shelf valuation.
    pub async fn inventory_report(&self) -> DbResult<String> {
        self.require_manager()?;

        let rows = self.db.products().stock_overview().await?;
        Ok(receipt::render_inventory_report(&rows, &self.config))
    }

    /// Sales over an inclusive date range, as data.
    pub async fn sales_report(&self, from: NaiveDate, to: NaiveDate) -> DbResult<SalesReport> {
        self.require_manager()?;
        self.db.invoices().sales_report(from, to).await
    }

    /// Sales over an inclusive date range, as a printable document.
    pub async fn sales_report_document(&self, from: NaiveDate, to: NaiveDate) -> DbResult<String> {
        self.require_manager()?;

        let report = self.db.invoices().sales_report(from, to).await?;
        Ok(receipt::render_sales_report(&report, &self.config))
    }

    /// Aggregate totals for one day.
    pub async fn daily_summary(&self, date: NaiveDate) -> DbResult<SalesSummary> {
        self.require_manager()?;
        self.db.invoices().daily_summary(date).await
    }

    /// Best sellers over a date range.
    pub async fn top_products(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        limit: u32,
    ) -> DbResult<Vec<TopProductRow>> {
        self.require_manager()?;
        self.db.invoices().top_products(from, to, limit).await
    }

    /// Sales grouped by category over a date range.
    pub async fn sales_by_category(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DbResult<Vec<CategorySalesRow>> {
        self.require_manager()?;
        self.db.invoices().sales_by_category(from, to).await
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    pub async fn create_user(&self, new: NewUser) -> DbResult<UserIdentity> {
        let user = self.require_session()?;
        self.db.users().create(user, new).await
    }

    pub async fn update_user(
        &self,
        user_id: &str,
        full_name: &str,
        role: Role,
        email: Option<String>,
    ) -> DbResult<()> {
        let user = self.require_session()?;
        self.db.users().update(user, user_id, full_name, role, email).await
    }

    pub async fn delete_user(&self, user_id: &str) -> DbResult<()> {
        let user = self.require_session()?;
        self.db.users().delete(user, user_id).await
    }

    pub async fn list_users(&self) -> DbResult<Vec<UserIdentity>> {
        self.require_session()?;
        self.db.users().list().await
    }

    /// Changes the logged-in user's own password.
    pub async fn change_password(&self, current: &str, new_password: &str) -> DbResult<()> {
        let user = self.require_session()?;
        self.db.users().change_password(&user.id, current, new_password).await
    }

    // =========================================================================
    // Customers
    // =========================================================================

    pub async fn create_customer(
        &self,
        name: &str,
        phone: &str,
        email: Option<String>,
        address: Option<String>,
    ) -> DbResult<Customer> {
        self.require_session()?;
        self.db.customers().create(name, phone, email, address).await
    }

    pub async fn update_customer(&self, customer: &Customer) -> DbResult<()> {
        self.require_session()?;
        self.db.customers().update(customer).await
    }

    pub async fn delete_customer(&self, id: &str) -> DbResult<()> {
        self.require_session()?;
        self.db.customers().delete(id).await
    }

    pub async fn search_customers(&self, term: &str, limit: u32) -> DbResult<Vec<Customer>> {
        self.require_session()?;
        self.db.customers().search(term, limit).await
    }

    pub async fn list_customers(&self) -> DbResult<Vec<Customer>> {
        self.require_session()?;
        self.db.customers().list().await
    }

    fn require_session(&self) -> DbResult<&UserIdentity> {
        self.session
            .as_ref()
            .ok_or_else(|| CoreError::Unauthorized.into())
    }

    fn require_manager(&self) -> DbResult<&UserIdentity> {
        let user = self.require_session()?;
        require_role(user, Role::Manager)?;
        Ok(user)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;

    /// A back office over a store with admin, manager, and cashier accounts.
    async fn office() -> BackOffice {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let boot = UserIdentity {
            id: "boot".to_string(),
            username: "boot".to_string(),
            full_name: "Bootstrap".to_string(),
            role: Role::Admin,
        };
        for (username, role) in [
            ("admin", Role::Admin),
            ("manager", Role::Manager),
            ("cashier", Role::Cashier),
        ] {
            db.users()
                .create(
                    &boot,
                    NewUser {
                        username: username.to_string(),
                        password: format!("{}123", username),
                        full_name: format!("The {}", username),
                        role,
                        email: None,
                    },
                )
                .await
                .unwrap();
        }

        BackOffice::new(db, AppConfig::default())
    }

    #[tokio::test]
    async fn test_logged_out_is_unauthorized() {
        let office = office().await;

        let err = office.list_products().await.unwrap_err();
        assert_eq!(err.to_string(), "Unauthorized");
    }

    #[tokio::test]
    async fn test_catalog_writes_respect_the_role_ladder() {
        let mut office = office().await;

        office.login("cashier", "cashier123").await.unwrap();
        let err = office.create_category("Dairy", None).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::PermissionDenied {
                required: Role::Manager
            })
        ));

        office.login("manager", "manager123").await.unwrap();
        let category = office.create_category("Dairy", None).await.unwrap();
        assert_eq!(category.name, "Dairy");
        assert_eq!(office.list_categories().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_stock_flow_and_reports() {
        let mut office = office().await;
        office.login("manager", "manager123").await.unwrap();

        let category = office.create_category("Dairy", None).await.unwrap();
        let milk = office
            .create_product(NewProduct {
                name: "Milk (1L)".to_string(),
                description: None,
                category_id: category.id,
                price_cents: 299,
                cost_cents: 210,
                reorder_level: 15,
            })
            .await
            .unwrap();

        office.receive_stock(&milk.id, 24, Some("PO-1182")).await.unwrap();
        office.adjust_stock(&milk.id, -20, Some("Damaged")).await.unwrap();

        let history = office.stock_history(&milk.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(office.recent_movements(1).await.unwrap().len(), 1);

        // 4 on the shelf against a reorder level of 15
        let low = office.low_stock_report().await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].stock_quantity, 4);

        let doc = office.inventory_report().await.unwrap();
        assert!(doc.contains("Inventory Report"));
        assert!(doc.contains("Milk (1L)"));
    }

    #[tokio::test]
    async fn test_reports_are_manager_only() {
        let mut office = office().await;
        office.login("cashier", "cashier123").await.unwrap();

        let err = office.inventory_report().await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::PermissionDenied {
                required: Role::Manager
            })
        ));

        office.login("manager", "manager123").await.unwrap();
        let today = Utc::now().date_naive();
        let doc = office.sales_report_document(today, today).await.unwrap();
        assert!(doc.contains("Sales Report:"));

        let summary = office.daily_summary(today).await.unwrap();
        assert_eq!(summary.invoice_count, 0);
        assert!(office.top_products(today, today, 5).await.unwrap().is_empty());
        assert!(office.sales_by_category(today, today).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_account_management_is_admin_only() {
        let mut office = office().await;

        office.login("manager", "manager123").await.unwrap();
        let err = office
            .create_user(NewUser {
                username: "newbie".to_string(),
                password: "newbie123".to_string(),
                full_name: "New Cashier".to_string(),
                role: Role::Cashier,
                email: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::PermissionDenied {
                required: Role::Admin
            })
        ));

        office.login("admin", "admin123").await.unwrap();
        let newbie = office
            .create_user(NewUser {
                username: "newbie".to_string(),
                password: "newbie123".to_string(),
                full_name: "New Cashier".to_string(),
                role: Role::Cashier,
                email: None,
            })
            .await
            .unwrap();
        assert_eq!(office.list_users().await.unwrap().len(), 4);

        office.delete_user(&newbie.id).await.unwrap();
        assert_eq!(office.list_users().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_change_own_password() {
        let mut office = office().await;
        office.login("cashier", "cashier123").await.unwrap();

        office.change_password("cashier123", "till-secret").await.unwrap();

        let err = office.login("cashier", "cashier123").await.unwrap_err();
        assert_eq!(err.to_string(), "Unauthorized");
        office.login("cashier", "till-secret").await.unwrap();
    }

    #[tokio::test]
    async fn test_customer_book_open_to_all_roles() {
        let mut office = office().await;
        office.login("cashier", "cashier123").await.unwrap();

        let ayesha = office
            .create_customer("Ayesha Khan", "0300-1234567", None, None)
            .await
            .unwrap();

        let hits = office.search_customers("khan", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, ayesha.id);

        office.delete_customer(&ayesha.id).await.unwrap();
        assert!(office.list_customers().await.unwrap().is_empty());
    }
}
