//! # Category Repository
//!
//! Database operations for product categories.
//!
//! ## Rules
//! - Category names are unique across the store
//! - A category with products cannot be deleted
//! - Writes require a Manager or Admin acting user

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use corner_core::{validation, Category, CoreError, Role, UserIdentity};

use crate::error::{DbError, DbResult};
use crate::repository::require_role;

/// Repository for category database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = CategoryRepository::new(pool);
/// let dairy = repo.create(&acting, "Dairy", Some("Milk, cheese, yogurt")).await?;
/// let all = repo.list().await?;
/// ```
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Creates a new category.
    ///
    /// ## Arguments
    /// * `acting` - Acting user, must be Manager or Admin
    /// * `name` - Category name, unique across the store
    /// * `description` - Optional free text
    ///
    /// ## Errors
    /// * `PermissionDenied` - Acting role below Manager
    /// * `UniqueViolation` - Name already taken
    pub async fn create(
        &self,
        acting: &UserIdentity,
        name: &str,
        description: Option<&str>,
    ) -> DbResult<Category> {
        require_role(acting, Role::Manager)?;
        validation::validate_name("name", name).map_err(CoreError::from)?;

        let name = name.trim();

        // Friendly duplicate message; the UNIQUE index remains the backstop
        let existing: Option<String> =
            sqlx::query_scalar("SELECT id FROM categories WHERE name = ?1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;
        if existing.is_some() {
            return Err(DbError::duplicate("category name", name));
        }

        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: description.map(str::to_string),
            created_at: Utc::now(),
        };

        debug!(name = %category.name, "Creating category");

        sqlx::query(
            r#"
            INSERT INTO categories (id, name, description, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.created_at)
        .execute(&self.pool)
        .await?;

        Ok(category)
    }

    /// Updates a category's name and description.
    pub async fn update(
        &self,
        acting: &UserIdentity,
        id: &str,
        name: &str,
        description: Option<&str>,
    ) -> DbResult<Category> {
        require_role(acting, Role::Manager)?;
        validation::validate_name("name", name).map_err(CoreError::from)?;

        let name = name.trim();

        debug!(id = %id, "Updating category");

        let result = sqlx::query(
            r#"
            UPDATE categories SET name = ?2, description = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        self.get(id).await
    }

    /// Gets a category by its ID.
    pub async fn get(&self, id: &str) -> DbResult<Category> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, description, created_at
            FROM categories
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        category.ok_or_else(|| DbError::not_found("Category", id))
    }

    /// Lists all categories ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, description, created_at
            FROM categories
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Deletes a category.
    ///
    /// ## Errors
    /// * `StillReferenced` - One or more products belong to this category
    /// * `NotFound` - No such category
    pub async fn delete(&self, acting: &UserIdentity, id: &str) -> DbResult<()> {
        require_role(acting, Role::Manager)?;

        let product_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE category_id = ?1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        if product_count > 0 {
            return Err(DbError::still_referenced("Category", id));
        }

        debug!(id = %id, "Deleting category");

        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        Ok(())
    }

    /// Counts categories (for diagnostics and seeding).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
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

    fn cashier() -> UserIdentity {
        UserIdentity {
            id: "csh-1".to_string(),
            username: "cashier".to_string(),
            full_name: "Register One".to_string(),
            role: Role::Cashier,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = test_db().await;
        let repo = db.categories();

        let created = repo
            .create(&manager(), "Dairy", Some("Milk, cheese, yogurt"))
            .await
            .unwrap();
        let fetched = repo.get(&created.id).await.unwrap();

        assert_eq!(fetched.name, "Dairy");
        assert_eq!(fetched.description.as_deref(), Some("Milk, cheese, yogurt"));
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let db = test_db().await;
        let repo = db.categories();

        repo.create(&manager(), "Beverages", None).await.unwrap();
        let err = repo.create(&manager(), "Beverages", None).await.unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_cashier_cannot_write() {
        let db = test_db().await;
        let repo = db.categories();

        let err = repo.create(&cashier(), "Snacks", None).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::PermissionDenied {
                required: Role::Manager
            })
        ));
    }

    #[tokio::test]
    async fn test_list_is_name_ordered() {
        let db = test_db().await;
        let repo = db.categories();

        repo.create(&manager(), "Snacks", None).await.unwrap();
        repo.create(&manager(), "Bakery", None).await.unwrap();
        repo.create(&manager(), "Dairy", None).await.unwrap();

        let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Bakery", "Dairy", "Snacks"]);
    }

    #[tokio::test]
    async fn test_update_renames() {
        let db = test_db().await;
        let repo = db.categories();

        let created = repo.create(&manager(), "Grocery", None).await.unwrap();
        let updated = repo
            .update(&manager(), &created.id, "Groceries", Some("Staples"))
            .await
            .unwrap();

        assert_eq!(updated.name, "Groceries");
        assert_eq!(updated.description.as_deref(), Some("Staples"));
    }

    #[tokio::test]
    async fn test_delete_with_products_is_blocked() {
        let db = test_db().await;
        let repo = db.categories();

        let category = repo.create(&manager(), "Fruits", None).await.unwrap();
        db.products()
            .create(
                &manager(),
                crate::repository::product::NewProduct {
                    name: "Apples (1kg)".to_string(),
                    description: None,
                    category_id: category.id.clone(),
                    price_cents: 399,
                    cost_cents: 280,
                    reorder_level: 10,
                },
            )
            .await
            .unwrap();

        let err = repo.delete(&manager(), &category.id).await.unwrap_err();
        assert!(matches!(err, DbError::StillReferenced { .. }));

        // Category survives the failed delete
        assert!(repo.get(&category.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_unknown_is_not_found() {
        let db = test_db().await;
        let err = db
            .categories()
            .delete(&manager(), "no-such-id")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
