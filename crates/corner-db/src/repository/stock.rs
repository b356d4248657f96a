//! # Stock Repository
//!
//! The append-only stock ledger and the movement operations over it.
//!
//! ## Ledger Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every change to shelf quantity is a signed row in stock_movements:    │
//! │                                                                         │
//! │    initial     opening balance when a product first gets stock         │
//! │    purchase    goods received from a supplier (positive)               │
//! │    sale        written by checkout, references the invoice (negative)  │
//! │    adjustment  recount, damage, theft (either sign)                    │
//! │                                                                         │
//! │  products.stock_quantity is the cached running sum. Both change in     │
//! │  one transaction, so SUM(quantity_change) always equals the counter.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `record_movement` itself puts no floor on the result; a manager fixing
//! a miscounted ledger may legitimately pass through negative. The
//! `adjust_stock` entry point used by the back office does enforce the
//! floor.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use corner_core::{
    validation, CoreError, MovementKind, Role, StockMovement, UserIdentity, ValidationError,
    MAX_ITEM_QUANTITY,
};

use crate::error::{DbError, DbResult};
use crate::repository::require_role;

/// Columns selected for every StockMovement row.
const MOVEMENT_COLUMNS: &str = r#"
    id, product_id, quantity_change, kind, reference_id, created_by, notes, created_at
"#;

/// Repository for the stock ledger.
///
/// ## Usage
/// ```rust,ignore
/// let repo = StockRepository::new(pool);
///
/// // Goods arrived from the supplier
/// repo.receive_stock(&manager, &product_id, 24, Some("PO-1182")).await?;
///
/// // Shelf recount came up two short
/// repo.adjust_stock(&manager, &product_id, -2, Some("Damaged in storage")).await?;
/// ```
#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: SqlitePool,
}

impl StockRepository {
    /// Creates a new StockRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockRepository { pool }
    }

    /// Appends a movement to the ledger and updates the cached counter,
    /// both in one transaction.
    ///
    /// A zero delta is rejected; it would be a no-op row in the ledger.
    ///
    /// ## Errors
    /// * `PermissionDenied` - Acting role below Manager
    /// * `NotFound` - No such product
    pub async fn record_movement(
        &self,
        acting: &UserIdentity,
        product_id: &str,
        quantity_change: i64,
        kind: MovementKind,
        reference_id: Option<&str>,
        notes: Option<&str>,
    ) -> DbResult<StockMovement> {
        require_role(acting, Role::Manager)?;
        if quantity_change == 0 {
            return Err(CoreError::from(ValidationError::InvalidFormat {
                field: "quantity_change".to_string(),
                reason: "movement delta cannot be zero".to_string(),
            })
            .into());
        }

        let mut tx = self.pool.begin().await?;

        let exists: Option<i64> =
            sqlx::query_scalar("SELECT stock_quantity FROM products WHERE id = ?1")
                .bind(product_id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Err(DbError::not_found("Product", product_id));
        }

        let movement = StockMovement {
            id: Uuid::new_v4().to_string(),
            product_id: product_id.to_string(),
            quantity_change,
            kind,
            reference_id: reference_id.map(|s| s.to_string()),
            created_by: acting.id.clone(),
            notes: notes.map(|s| s.to_string()),
            created_at: Utc::now(),
        };

        debug!(
            product_id = %product_id,
            delta = %quantity_change,
            kind = ?kind,
            "Recording stock movement"
        );

        insert_movement(&mut tx, &movement).await?;
        apply_delta(&mut tx, product_id, quantity_change, movement.created_at).await?;

        tx.commit().await?;

        Ok(movement)
    }

    /// Records goods received from a supplier.
    ///
    /// ## Errors
    /// * `Validation` - Quantity not in 1..=999
    pub async fn receive_stock(
        &self,
        acting: &UserIdentity,
        product_id: &str,
        quantity: i64,
        notes: Option<&str>,
    ) -> DbResult<StockMovement> {
        validation::validate_quantity(quantity).map_err(CoreError::from)?;

        self.record_movement(
            acting,
            product_id,
            quantity,
            MovementKind::Purchase,
            None,
            notes,
        )
        .await
    }

    /// Records a manual correction after a recount, damage, or theft.
    ///
    /// Unlike the raw `record_movement`, the result may not go below
    /// zero: the shelf cannot hold negative goods.
    ///
    /// ## Errors
    /// * `PermissionDenied` - Acting role below Manager
    /// * `NotFound` - No such product
    /// * `Validation` - Delta zero, or the result would be negative
    pub async fn adjust_stock(
        &self,
        acting: &UserIdentity,
        product_id: &str,
        quantity_change: i64,
        notes: Option<&str>,
    ) -> DbResult<StockMovement> {
        require_role(acting, Role::Manager)?;
        if quantity_change == 0 {
            return Err(CoreError::from(ValidationError::InvalidFormat {
                field: "quantity_change".to_string(),
                reason: "adjustment cannot be zero".to_string(),
            })
            .into());
        }

        let mut tx = self.pool.begin().await?;

        let stock: Option<i64> =
            sqlx::query_scalar("SELECT stock_quantity FROM products WHERE id = ?1")
                .bind(product_id)
                .fetch_optional(&mut *tx)
                .await?;
        let stock = stock.ok_or_else(|| DbError::not_found("Product", product_id))?;

        if stock + quantity_change < 0 {
            return Err(CoreError::from(ValidationError::OutOfRange {
                field: "quantity_change".to_string(),
                min: -stock,
                max: MAX_ITEM_QUANTITY,
            })
            .into());
        }

        let movement = StockMovement {
            id: Uuid::new_v4().to_string(),
            product_id: product_id.to_string(),
            quantity_change,
            kind: MovementKind::Adjustment,
            reference_id: None,
            created_by: acting.id.clone(),
            notes: notes.map(|s| s.to_string()),
            created_at: Utc::now(),
        };

        debug!(
            product_id = %product_id,
            delta = %quantity_change,
            remaining = %(stock + quantity_change),
            "Adjusting stock"
        );

        insert_movement(&mut tx, &movement).await?;
        apply_delta(&mut tx, product_id, quantity_change, movement.created_at).await?;

        tx.commit().await?;

        Ok(movement)
    }

    /// Current cached shelf quantity for a product.
    pub async fn current_stock(&self, product_id: &str) -> DbResult<i64> {
        let stock: Option<i64> =
            sqlx::query_scalar("SELECT stock_quantity FROM products WHERE id = ?1")
                .bind(product_id)
                .fetch_optional(&self.pool)
                .await?;

        stock.ok_or_else(|| DbError::not_found("Product", product_id))
    }

    /// Sums the ledger for a product.
    ///
    /// Always equals [`current_stock`](Self::current_stock); the pair
    /// exists so callers can audit that the counter never drifted.
    pub async fn ledger_total(&self, product_id: &str) -> DbResult<i64> {
        // Distinguish "no movements yet" from "no such product"
        self.current_stock(product_id).await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(quantity_change), 0) FROM stock_movements WHERE product_id = ?1",
        )
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    /// Full movement history for a product, oldest first.
    pub async fn history(&self, product_id: &str) -> DbResult<Vec<StockMovement>> {
        self.current_stock(product_id).await?;

        let movements = sqlx::query_as::<_, StockMovement>(&format!(
            r#"
            SELECT {MOVEMENT_COLUMNS} FROM stock_movements
            WHERE product_id = ?1
            ORDER BY created_at, id
            "#
        ))
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Most recent movements across all products, newest first.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(&format!(
            r#"
            SELECT {MOVEMENT_COLUMNS} FROM stock_movements
            ORDER BY created_at DESC, id DESC
            LIMIT ?1
            "#
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================
// Also used by the checkout transaction: every ledger write in the crate
// goes through this pair so the movement row and the cached counter can
// never diverge.

pub(crate) async fn insert_movement(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    movement: &StockMovement,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO stock_movements (
            id, product_id, quantity_change, kind, reference_id, created_by, notes, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&movement.id)
    .bind(&movement.product_id)
    .bind(movement.quantity_change)
    .bind(movement.kind)
    .bind(&movement.reference_id)
    .bind(&movement.created_by)
    .bind(&movement.notes)
    .bind(movement.created_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

pub(crate) async fn apply_delta(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    product_id: &str,
    quantity_change: i64,
    at: chrono::DateTime<Utc>,
) -> DbResult<()> {
    sqlx::query(
        r#"
        UPDATE products SET stock_quantity = stock_quantity + ?2, updated_at = ?3
        WHERE id = ?1
        "#,
    )
    .bind(product_id)
    .bind(quantity_change)
    .bind(at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::product::NewProduct;
    use crate::repository::user::NewUser;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
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
                NewUser {
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

    async fn seed_product(db: &Database, acting: &UserIdentity) -> String {
        let category = db
            .categories()
            .create(acting, "Dairy", None)
            .await
            .unwrap();
        db.products()
            .create(
                acting,
                NewProduct {
                    name: "Milk (1L)".to_string(),
                    description: None,
                    category_id: category.id,
                    price_cents: 299,
                    cost_cents: 210,
                    reorder_level: 15,
                },
            )
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_movement_updates_cached_counter() {
        let db = test_db().await;
        let mgr = seed_manager(&db).await;
        let product_id = seed_product(&db, &mgr).await;
        let repo = db.stock();

        repo.record_movement(&mgr, &product_id, 50, MovementKind::Initial, None, None)
            .await
            .unwrap();
        assert_eq!(repo.current_stock(&product_id).await.unwrap(), 50);

        repo.record_movement(&mgr, &product_id, -8, MovementKind::Adjustment, None, None)
            .await
            .unwrap();
        assert_eq!(repo.current_stock(&product_id).await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_ledger_sum_matches_counter() {
        let db = test_db().await;
        let mgr = seed_manager(&db).await;
        let product_id = seed_product(&db, &mgr).await;
        let repo = db.stock();

        repo.record_movement(&mgr, &product_id, 30, MovementKind::Initial, None, None)
            .await
            .unwrap();
        repo.receive_stock(&mgr, &product_id, 24, Some("PO-1182"))
            .await
            .unwrap();
        repo.adjust_stock(&mgr, &product_id, -3, Some("Damaged in storage"))
            .await
            .unwrap();

        let counter = repo.current_stock(&product_id).await.unwrap();
        let ledger = repo.ledger_total(&product_id).await.unwrap();
        assert_eq!(counter, 51);
        assert_eq!(ledger, counter);
    }

    #[tokio::test]
    async fn test_receive_rejects_non_positive_quantity() {
        let db = test_db().await;
        let mgr = seed_manager(&db).await;
        let product_id = seed_product(&db, &mgr).await;

        let err = db
            .stock()
            .receive_stock(&mgr, &product_id, 0, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));

        let err = db
            .stock()
            .receive_stock(&mgr, &product_id, -5, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_adjust_cannot_take_shelf_negative() {
        let db = test_db().await;
        let mgr = seed_manager(&db).await;
        let product_id = seed_product(&db, &mgr).await;
        let repo = db.stock();

        repo.record_movement(&mgr, &product_id, 5, MovementKind::Initial, None, None)
            .await
            .unwrap();

        let err = repo
            .adjust_stock(&mgr, &product_id, -6, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));

        // Counter and ledger untouched by the rejected adjustment
        assert_eq!(repo.current_stock(&product_id).await.unwrap(), 5);
        assert_eq!(repo.ledger_total(&product_id).await.unwrap(), 5);

        // Draining to exactly zero is fine
        repo.adjust_stock(&mgr, &product_id, -5, None).await.unwrap();
        assert_eq!(repo.current_stock(&product_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_zero_delta_rejected() {
        let db = test_db().await;
        let mgr = seed_manager(&db).await;
        let product_id = seed_product(&db, &mgr).await;

        let err = db
            .stock()
            .adjust_stock(&mgr, &product_id, 0, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::InvalidFormat { .. }))
        ));
    }

    #[tokio::test]
    async fn test_cashier_cannot_touch_the_ledger() {
        let db = test_db().await;
        let mgr = seed_manager(&db).await;
        let product_id = seed_product(&db, &mgr).await;
        let cashier = UserIdentity {
            id: "cash-1".to_string(),
            username: "cashier".to_string(),
            full_name: "Till Cashier".to_string(),
            role: Role::Cashier,
        };

        let err = db
            .stock()
            .receive_stock(&cashier, &product_id, 10, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::PermissionDenied {
                required: Role::Manager
            })
        ));
    }

    #[tokio::test]
    async fn test_history_is_oldest_first() {
        let db = test_db().await;
        let mgr = seed_manager(&db).await;
        let product_id = seed_product(&db, &mgr).await;
        let repo = db.stock();

        repo.record_movement(&mgr, &product_id, 30, MovementKind::Initial, None, None)
            .await
            .unwrap();
        repo.receive_stock(&mgr, &product_id, 12, None).await.unwrap();
        repo.adjust_stock(&mgr, &product_id, -1, None).await.unwrap();

        let history = repo.history(&product_id).await.unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].kind, MovementKind::Initial);
        assert_eq!(history[2].kind, MovementKind::Adjustment);

        let recent = repo.recent(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].kind, MovementKind::Adjustment);
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let db = test_db().await;
        let mgr = seed_manager(&db).await;

        let err = db
            .stock()
            .record_movement(&mgr, "ghost", 10, MovementKind::Initial, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        assert!(matches!(
            db.stock().current_stock("ghost").await.unwrap_err(),
            DbError::NotFound { .. }
        ));
        assert!(matches!(
            db.stock().ledger_total("ghost").await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }
}
