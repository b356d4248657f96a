//! # Customer Repository
//!
//! Database operations for the customer book.
//!
//! ## Key Operations
//! - Register walk-in customers from the till (no role gate; the service
//!   layer still requires a logged-in session)
//! - Phone lookup, the primary key cashiers actually type
//! - Search across name and phone
//!
//! Phone numbers are unique: the register attaches customers by phone,
//! and two records answering to the same number would make that lookup
//! ambiguous.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use corner_core::{validation, CoreError, Customer};

use crate::error::{DbError, DbResult};

/// Columns selected for every Customer row.
const CUSTOMER_COLUMNS: &str = "id, name, phone, email, address, created_at";

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Registers a new customer.
    ///
    /// ## Errors
    /// * `Validation` - Name empty or phone malformed
    /// * `UniqueViolation` - Phone already belongs to another customer
    pub async fn create(
        &self,
        name: &str,
        phone: &str,
        email: Option<String>,
        address: Option<String>,
    ) -> DbResult<Customer> {
        validation::validate_name("name", name).map_err(CoreError::from)?;
        validation::validate_phone(phone).map_err(CoreError::from)?;

        let phone = phone.trim();

        let taken: Option<String> = sqlx::query_scalar("SELECT id FROM customers WHERE phone = ?1")
            .bind(phone)
            .fetch_optional(&self.pool)
            .await?;
        if taken.is_some() {
            return Err(DbError::duplicate("customer phone", phone));
        }

        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            phone: phone.to_string(),
            email,
            address,
            created_at: Utc::now(),
        };

        debug!(name = %customer.name, phone = %customer.phone, "Registering customer");

        sqlx::query(
            r#"
            INSERT INTO customers (id, name, phone, email, address, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Updates a customer's contact details.
    pub async fn update(&self, customer: &Customer) -> DbResult<()> {
        validation::validate_name("name", &customer.name).map_err(CoreError::from)?;
        validation::validate_phone(&customer.phone).map_err(CoreError::from)?;

        let taken: Option<String> =
            sqlx::query_scalar("SELECT id FROM customers WHERE phone = ?1 AND id != ?2")
                .bind(customer.phone.trim())
                .bind(&customer.id)
                .fetch_optional(&self.pool)
                .await?;
        if taken.is_some() {
            return Err(DbError::duplicate("customer phone", &customer.phone));
        }

        debug!(id = %customer.id, "Updating customer");

        let result = sqlx::query(
            r#"
            UPDATE customers SET name = ?2, phone = ?3, email = ?4, address = ?5
            WHERE id = ?1
            "#,
        )
        .bind(&customer.id)
        .bind(customer.name.trim())
        .bind(customer.phone.trim())
        .bind(&customer.email)
        .bind(&customer.address)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", &customer.id));
        }

        Ok(())
    }

    /// Gets a customer by ID.
    pub async fn get(&self, id: &str) -> DbResult<Customer> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        customer.ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Looks a customer up by exact phone number.
    ///
    /// This is the lookup the register uses when attaching a customer to
    /// a sale.
    pub async fn find_by_phone(&self, phone: &str) -> DbResult<Customer> {
        let phone = phone.trim();

        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE phone = ?1"
        ))
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;

        customer.ok_or_else(|| DbError::not_found("Customer", phone))
    }

    /// Searches customers by name or phone substring.
    pub async fn search(&self, term: &str, limit: u32) -> DbResult<Vec<Customer>> {
        let term = validation::validate_search_term(term).map_err(CoreError::from)?;

        if term.is_empty() {
            return self.list_limited(limit).await;
        }

        let pattern = format!("%{}%", term);

        let customers = sqlx::query_as::<_, Customer>(&format!(
            r#"
            SELECT {CUSTOMER_COLUMNS} FROM customers
            WHERE name LIKE ?1 OR phone LIKE ?1
            ORDER BY name
            LIMIT ?2
            "#
        ))
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Lists all customers ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    async fn list_limited(&self, limit: u32) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY name LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Deletes a customer.
    ///
    /// ## Errors
    /// * `StillReferenced` - The customer appears on past invoices
    /// * `NotFound` - No such customer
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let invoice_refs: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM invoices WHERE customer_id = ?1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        if invoice_refs > 0 {
            return Err(DbError::still_referenced("Customer", id));
        }

        debug!(id = %id, "Deleting customer");

        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }

    /// Counts total customers (for diagnostics and seeding).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
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

    #[tokio::test]
    async fn test_create_and_find_by_phone() {
        let db = test_db().await;
        let repo = db.customers();

        let created = repo
            .create("Ayesha Khan", "0300-1234567", None, None)
            .await
            .unwrap();

        let found = repo.find_by_phone("0300-1234567").await.unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.name, "Ayesha Khan");

        let miss = repo.find_by_phone("0300-0000000").await.unwrap_err();
        assert!(matches!(miss, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_duplicate_phone_rejected() {
        let db = test_db().await;
        let repo = db.customers();

        repo.create("Ayesha Khan", "0300-1234567", None, None)
            .await
            .unwrap();
        let err = repo
            .create("Bilal Ahmed", "0300-1234567", None, None)
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_update_rejects_taken_phone() {
        let db = test_db().await;
        let repo = db.customers();

        repo.create("Ayesha Khan", "0300-1234567", None, None)
            .await
            .unwrap();
        let mut bilal = repo
            .create("Bilal Ahmed", "0321-7654321", None, None)
            .await
            .unwrap();

        bilal.phone = "0300-1234567".to_string();
        let err = repo.update(&bilal).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        // Keeping his own number is fine
        bilal.phone = "0321-7654321".to_string();
        bilal.email = Some("bilal@example.com".to_string());
        repo.update(&bilal).await.unwrap();
        assert_eq!(
            repo.get(&bilal.id).await.unwrap().email.as_deref(),
            Some("bilal@example.com")
        );
    }

    #[tokio::test]
    async fn test_search_matches_name_or_phone() {
        let db = test_db().await;
        let repo = db.customers();

        repo.create("Ayesha Khan", "0300-1234567", None, None)
            .await
            .unwrap();
        repo.create("Bilal Ahmed", "0321-7654321", None, None)
            .await
            .unwrap();

        let by_name = repo.search("khan", 10).await.unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].name, "Ayesha Khan");

        let by_phone = repo.search("0321", 10).await.unwrap();
        assert_eq!(by_phone.len(), 1);
        assert_eq!(by_phone[0].name, "Bilal Ahmed");
    }

    #[tokio::test]
    async fn test_delete_without_history_succeeds() {
        let db = test_db().await;
        let repo = db.customers();

        let customer = repo
            .create("Ayesha Khan", "0300-1234567", None, None)
            .await
            .unwrap();
        repo.delete(&customer.id).await.unwrap();

        assert!(matches!(
            repo.get(&customer.id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
        assert!(matches!(
            repo.delete(&customer.id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }
}
