//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! ## Key Operations
//! - CRUD with validation and role gates
//! - Case-insensitive name search for the register
//! - Inventory views: low stock, out of stock, valuation overview
//!
//! ## Stock Columns
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  products.stock_quantity is a CACHED COUNTER.                          │
//! │                                                                         │
//! │  The stock_movements ledger is the source of truth; every ledger       │
//! │  write updates this counter in the same transaction (StockRepository,  │
//! │  InvoiceRepository). Nothing else may touch it, which is why this      │
//! │  repository's update() does not carry a stock field.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use corner_core::{
    validation, CoreError, Product, Role, StockOverviewRow, UserIdentity, ValidationError,
};

use crate::error::{DbError, DbResult};
use crate::repository::require_role;

/// Columns selected for every Product row.
const PRODUCT_COLUMNS: &str = r#"
    id, name, description, category_id,
    price_cents, cost_cents, stock_quantity, reorder_level,
    created_at, updated_at
"#;

/// Input for creating a product.
///
/// Stock is absent on purpose: shelf quantity only ever changes through
/// the stock ledger, starting with an `initial` movement.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub category_id: String,
    pub price_cents: i64,
    pub cost_cents: i64,
    pub reorder_level: i64,
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// // Search products at the register
/// let results = repo.search("milk", 20).await?;
///
/// // Get by ID
/// let product = repo.get("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Creates a new product in the catalog.
    ///
    /// ## Errors
    /// * `PermissionDenied` - Acting role below Manager
    /// * `Validation` - Name empty, price or cost negative
    /// * `NotFound` - Category does not exist
    pub async fn create(&self, acting: &UserIdentity, new: NewProduct) -> DbResult<Product> {
        require_role(acting, Role::Manager)?;
        validation::validate_name("name", &new.name).map_err(CoreError::from)?;
        validation::validate_price_cents(new.price_cents).map_err(CoreError::from)?;
        validation::validate_price_cents(new.cost_cents).map_err(CoreError::from)?;
        if new.reorder_level < 0 {
            return Err(CoreError::from(ValidationError::OutOfRange {
                field: "reorder_level".to_string(),
                min: 0,
                max: i64::MAX,
            })
            .into());
        }

        let category_exists: Option<String> =
            sqlx::query_scalar("SELECT id FROM categories WHERE id = ?1")
                .bind(&new.category_id)
                .fetch_optional(&self.pool)
                .await?;
        if category_exists.is_none() {
            return Err(DbError::not_found("Category", &new.category_id));
        }

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: new.name.trim().to_string(),
            description: new.description,
            category_id: new.category_id,
            price_cents: new.price_cents,
            cost_cents: new.cost_cents,
            stock_quantity: 0,
            reorder_level: new.reorder_level,
            created_at: now,
            updated_at: now,
        };

        debug!(name = %product.name, "Creating product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, description, category_id,
                price_cents, cost_cents, stock_quantity, reorder_level,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category_id)
        .bind(product.price_cents)
        .bind(product.cost_cents)
        .bind(product.stock_quantity)
        .bind(product.reorder_level)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Updates a product's catalog fields.
    ///
    /// The stock counter is deliberately not part of this statement; it
    /// belongs to the ledger.
    pub async fn update(&self, acting: &UserIdentity, product: &Product) -> DbResult<()> {
        require_role(acting, Role::Manager)?;
        validation::validate_name("name", &product.name).map_err(CoreError::from)?;
        validation::validate_price_cents(product.price_cents).map_err(CoreError::from)?;
        validation::validate_price_cents(product.cost_cents).map_err(CoreError::from)?;

        debug!(id = %product.id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                description = ?3,
                category_id = ?4,
                price_cents = ?5,
                cost_cents = ?6,
                reorder_level = ?7,
                updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category_id)
        .bind(product.price_cents)
        .bind(product.cost_cents)
        .bind(product.reorder_level)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Updates only the selling price.
    ///
    /// Carts that already hold this product keep their snapshot price.
    pub async fn update_price(
        &self,
        acting: &UserIdentity,
        id: &str,
        price_cents: i64,
    ) -> DbResult<()> {
        require_role(acting, Role::Manager)?;
        validation::validate_price_cents(price_cents).map_err(CoreError::from)?;

        debug!(id = %id, price_cents = %price_cents, "Updating product price");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET price_cents = ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(price_cents)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Gets a product by its ID.
    pub async fn get(&self, id: &str) -> DbResult<Product> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        product.ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Lists all products ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Searches products by name.
    ///
    /// ## How It Works
    /// Case-insensitive substring match on the product name; an empty
    /// term lists the catalog up to `limit`. Good enough for a
    /// single-store catalog scanned from one register.
    pub async fn search(&self, term: &str, limit: u32) -> DbResult<Vec<Product>> {
        let term = validation::validate_search_term(term).map_err(CoreError::from)?;

        debug!(term = %term, limit = %limit, "Searching products");

        if term.is_empty() {
            let products = sqlx::query_as::<_, Product>(&format!(
                "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name LIMIT ?1"
            ))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
            return Ok(products);
        }

        let pattern = format!("%{}%", term);

        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE name LIKE ?1 ORDER BY name LIMIT ?2"
        ))
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Deletes a product.
    ///
    /// ## Errors
    /// * `StillReferenced` - The product appears on invoices or in the
    ///   stock ledger; sale history must stay reconstructible
    /// * `NotFound` - No such product
    pub async fn delete(&self, acting: &UserIdentity, id: &str) -> DbResult<()> {
        require_role(acting, Role::Manager)?;

        let invoice_refs: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM invoice_items WHERE product_id = ?1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        let ledger_refs: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM stock_movements WHERE product_id = ?1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        if invoice_refs > 0 || ledger_refs > 0 {
            return Err(DbError::still_referenced("Product", id));
        }

        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Products above zero stock but below their reorder level.
    pub async fn low_stock(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS} FROM products
            WHERE stock_quantity > 0 AND stock_quantity < reorder_level
            ORDER BY stock_quantity, name
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Products with nothing left on the shelf.
    pub async fn out_of_stock(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE stock_quantity <= 0 ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Inventory overview rows: every product with its category name and
    /// the capital sitting on the shelf (stock × cost).
    pub async fn stock_overview(&self) -> DbResult<Vec<StockOverviewRow>> {
        let rows = sqlx::query_as::<_, StockOverviewRow>(
            r#"
            SELECT
                p.name,
                c.name AS category_name,
                p.stock_quantity,
                p.reorder_level,
                p.stock_quantity * p.cost_cents AS valuation_cents
            FROM products p
            INNER JOIN categories c ON c.id = p.category_id
            ORDER BY p.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Counts total products (for diagnostics and seeding).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use corner_core::MovementKind;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn manager() -> UserIdentity {
        UserIdentity {
            id: "mgr-1".to_string(),
            username: "manager".to_string(),
            full_name: "Store Manager".to_string(),
            role: Role::Manager,
        }
    }

    /// Ledger rows reference a real user row, so movements need one.
    async fn seed_manager(db: &Database) -> UserIdentity {
        let boot = UserIdentity {
            id: "boot".to_string(),
            username: "boot".to_string(),
            full_name: "Bootstrap".to_string(),
            role: Role::Admin,
        };
        db.users()
            .create(
                &boot,
                crate::repository::user::NewUser {
                    username: "stockmgr".to_string(),
                    password: "stockmgr123".to_string(),
                    full_name: "Stock Manager".to_string(),
                    role: Role::Manager,
                    email: None,
                },
            )
            .await
            .unwrap()
    }

    async fn seed_category(db: &Database, name: &str) -> String {
        db.categories()
            .create(&manager(), name, None)
            .await
            .unwrap()
            .id
    }

    fn new_product(category_id: &str, name: &str, price_cents: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: None,
            category_id: category_id.to_string(),
            price_cents,
            cost_cents: price_cents * 7 / 10,
            reorder_level: 10,
        }
    }

    #[tokio::test]
    async fn test_create_starts_with_zero_stock() {
        let db = test_db().await;
        let category = seed_category(&db, "Dairy").await;

        let product = db
            .products()
            .create(&manager(), new_product(&category, "Milk (1L)", 299))
            .await
            .unwrap();

        assert_eq!(product.stock_quantity, 0);
        assert_eq!(db.products().get(&product.id).await.unwrap().price_cents, 299);
    }

    #[tokio::test]
    async fn test_create_requires_existing_category() {
        let db = test_db().await;

        let err = db
            .products()
            .create(&manager(), new_product("ghost-category", "Milk (1L)", 299))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_negative_price_rejected() {
        let db = test_db().await;
        let category = seed_category(&db, "Dairy").await;

        let err = db
            .products()
            .create(&manager(), new_product(&category, "Milk (1L)", -1))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let db = test_db().await;
        let category = seed_category(&db, "Dairy").await;
        let repo = db.products();

        repo.create(&manager(), new_product(&category, "Milk (1L)", 299))
            .await
            .unwrap();
        repo.create(&manager(), new_product(&category, "Butter (500g)", 450))
            .await
            .unwrap();

        let hits = repo.search("milk", 20).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Milk (1L)");

        // Empty term lists the catalog
        let all = repo.search("  ", 20).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_update_price_keeps_other_fields() {
        let db = test_db().await;
        let category = seed_category(&db, "Dairy").await;
        let repo = db.products();

        let product = repo
            .create(&manager(), new_product(&category, "Milk (1L)", 299))
            .await
            .unwrap();
        repo.update_price(&manager(), &product.id, 329).await.unwrap();

        let reloaded = repo.get(&product.id).await.unwrap();
        assert_eq!(reloaded.price_cents, 329);
        assert_eq!(reloaded.name, "Milk (1L)");
    }

    #[tokio::test]
    async fn test_delete_with_ledger_history_is_blocked() {
        let db = test_db().await;
        let mgr = seed_manager(&db).await;
        let category = seed_category(&db, "Dairy").await;

        let product = db
            .products()
            .create(&manager(), new_product(&category, "Milk (1L)", 299))
            .await
            .unwrap();
        db.stock()
            .record_movement(
                &mgr,
                &product.id,
                10,
                MovementKind::Initial,
                None,
                Some("Opening stock"),
            )
            .await
            .unwrap();

        let err = db
            .products()
            .delete(&manager(), &product.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::StillReferenced { .. }));
        assert!(db.products().get(&product.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_fresh_product_succeeds() {
        let db = test_db().await;
        let category = seed_category(&db, "Dairy").await;

        let product = db
            .products()
            .create(&manager(), new_product(&category, "Milk (1L)", 299))
            .await
            .unwrap();
        db.products().delete(&manager(), &product.id).await.unwrap();

        assert!(matches!(
            db.products().get(&product.id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_inventory_views_classify_by_reorder_level() {
        let db = test_db().await;
        let mgr = seed_manager(&db).await;
        let category = seed_category(&db, "Dairy").await;
        let repo = db.products();

        let healthy = repo
            .create(&manager(), new_product(&category, "Milk (1L)", 299))
            .await
            .unwrap();
        let low = repo
            .create(&manager(), new_product(&category, "Butter (500g)", 450))
            .await
            .unwrap();
        let empty = repo
            .create(&manager(), new_product(&category, "Cream (250ml)", 380))
            .await
            .unwrap();

        let stock = db.stock();
        stock
            .record_movement(&mgr, &healthy.id, 50, MovementKind::Initial, None, None)
            .await
            .unwrap();
        stock
            .record_movement(&mgr, &low.id, 4, MovementKind::Initial, None, None)
            .await
            .unwrap();
        // "empty" gets no stock at all

        let low_rows = repo.low_stock().await.unwrap();
        assert_eq!(low_rows.len(), 1);
        assert_eq!(low_rows[0].name, "Butter (500g)");

        let out_rows = repo.out_of_stock().await.unwrap();
        assert_eq!(out_rows.len(), 1);
        assert_eq!(out_rows[0].id, empty.id);

        let overview = repo.stock_overview().await.unwrap();
        assert_eq!(overview.len(), 3);
        let milk = overview.iter().find(|r| r.name == "Milk (1L)").unwrap();
        assert_eq!(milk.category_name, "Dairy");
        // 50 units at cost 209 (299 * 7 / 10)
        assert_eq!(milk.valuation_cents, 50 * 209);
    }
}
