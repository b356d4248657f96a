//! # User Repository
//!
//! Accounts, authentication, and the role ladder.
//!
//! ## Key Operations
//! - Admin-only account management
//! - Login with argon2 verification (bumps `last_login_at`)
//! - Self-service password change, authorized by the current password
//!
//! ## Account Safety Rails
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  The store must never lock itself out or lose its audit trail:         │
//! │                                                                         │
//! │  - The last admin account cannot be deleted or demoted (LastAdmin)     │
//! │  - Users who created invoices or stock movements cannot be deleted     │
//! │    (StillReferenced); disable by changing the password instead         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Raw [`corner_core::User`] rows (with their password hashes) never leave
//! this module; every public operation returns the credential-free
//! [`UserIdentity`].

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, warn};
use uuid::Uuid;

use corner_core::{validation, CoreError, Role, User, UserIdentity};

use crate::error::{DbError, DbResult};
use crate::repository::require_role;

/// Columns selected for every User row.
const USER_COLUMNS: &str = r#"
    id, username, password_hash, full_name, role, email, last_login_at, created_at
"#;

/// Input for creating a user account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub role: Role,
    pub email: Option<String>,
}

/// Repository for user accounts and authentication.
///
/// ## Usage
/// ```rust,ignore
/// let repo = UserRepository::new(pool);
///
/// let me = repo.authenticate("admin", "admin123").await?;
/// assert_eq!(me.role, Role::Admin);
/// ```
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Creates a new user account.
    ///
    /// ## Errors
    /// * `PermissionDenied` - Acting role below Admin
    /// * `Validation` - Username, password, or name rejected
    /// * `UniqueViolation` - Username already taken
    pub async fn create(&self, acting: &UserIdentity, new: NewUser) -> DbResult<UserIdentity> {
        require_role(acting, Role::Admin)?;
        validation::validate_username(&new.username).map_err(CoreError::from)?;
        validation::validate_password(&new.password).map_err(CoreError::from)?;
        validation::validate_name("full_name", &new.full_name).map_err(CoreError::from)?;

        let username = new.username.trim().to_string();

        let taken: Option<String> = sqlx::query_scalar("SELECT id FROM users WHERE username = ?1")
            .bind(&username)
            .fetch_optional(&self.pool)
            .await?;
        if taken.is_some() {
            return Err(DbError::duplicate("username", &username));
        }

        let password_hash = hash_password(&new.password)?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            username,
            password_hash,
            full_name: new.full_name.trim().to_string(),
            role: new.role,
            email: new.email,
            last_login_at: None,
            created_at: Utc::now(),
        };

        debug!(username = %user.username, role = ?user.role, "Creating user");

        sqlx::query(
            r#"
            INSERT INTO users (
                id, username, password_hash, full_name, role, email, last_login_at, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(user.role)
        .bind(&user.email)
        .bind(user.last_login_at)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(UserIdentity::from(&user))
    }

    /// Verifies credentials and returns the user's identity.
    ///
    /// Bumps `last_login_at` on success.
    ///
    /// ## Errors
    /// * `Unauthorized` - Unknown username or wrong password; the two are
    ///   indistinguishable on purpose
    pub async fn authenticate(&self, username: &str, password: &str) -> DbResult<UserIdentity> {
        let username = username.trim();

        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        let user = match user {
            Some(user) if verify_password(password, &user.password_hash) => user,
            _ => {
                warn!(username = %username, "Authentication failed");
                return Err(CoreError::Unauthorized.into());
            }
        };

        sqlx::query("UPDATE users SET last_login_at = ?2 WHERE id = ?1")
            .bind(&user.id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        debug!(username = %user.username, "User authenticated");
        Ok(UserIdentity::from(&user))
    }

    /// Changes a user's own password.
    ///
    /// No role gate: knowing the current password is the authorization.
    ///
    /// ## Errors
    /// * `NotFound` - No such user
    /// * `Unauthorized` - Current password wrong
    /// * `Validation` - New password too short
    pub async fn change_password(
        &self,
        user_id: &str,
        current: &str,
        new_password: &str,
    ) -> DbResult<()> {
        let user = self.fetch(user_id).await?;

        if !verify_password(current, &user.password_hash) {
            warn!(user_id = %user_id, "Password change rejected");
            return Err(CoreError::Unauthorized.into());
        }
        validation::validate_password(new_password).map_err(CoreError::from)?;

        let password_hash = hash_password(new_password)?;

        sqlx::query("UPDATE users SET password_hash = ?2 WHERE id = ?1")
            .bind(user_id)
            .bind(&password_hash)
            .execute(&self.pool)
            .await?;

        debug!(user_id = %user_id, "Password changed");
        Ok(())
    }

    /// Updates a user's profile and role.
    ///
    /// ## Errors
    /// * `PermissionDenied` - Acting role below Admin
    /// * `NotFound` - No such user
    /// * `LastAdmin` - Demoting the only remaining admin
    pub async fn update(
        &self,
        acting: &UserIdentity,
        user_id: &str,
        full_name: &str,
        role: Role,
        email: Option<String>,
    ) -> DbResult<()> {
        require_role(acting, Role::Admin)?;
        validation::validate_name("full_name", full_name).map_err(CoreError::from)?;

        let target = self.fetch(user_id).await?;

        if target.role == Role::Admin && role != Role::Admin && self.admin_count().await? <= 1 {
            return Err(DbError::LastAdmin);
        }

        debug!(user_id = %user_id, role = ?role, "Updating user");

        sqlx::query("UPDATE users SET full_name = ?2, role = ?3, email = ?4 WHERE id = ?1")
            .bind(user_id)
            .bind(full_name.trim())
            .bind(role)
            .bind(&email)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Gets a user's identity by ID.
    pub async fn get(&self, id: &str) -> DbResult<UserIdentity> {
        let user = self.fetch(id).await?;
        Ok(UserIdentity::from(&user))
    }

    /// Lists all user identities ordered by username.
    pub async fn list(&self) -> DbResult<Vec<UserIdentity>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY username"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(users.iter().map(UserIdentity::from).collect())
    }

    /// Deletes a user account.
    ///
    /// ## Errors
    /// * `PermissionDenied` - Acting role below Admin
    /// * `NotFound` - No such user
    /// * `StillReferenced` - The user created invoices or stock movements
    /// * `LastAdmin` - Deleting the only remaining admin
    pub async fn delete(&self, acting: &UserIdentity, user_id: &str) -> DbResult<()> {
        require_role(acting, Role::Admin)?;

        let target = self.fetch(user_id).await?;

        let invoice_refs: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM invoices WHERE created_by = ?1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        let ledger_refs: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM stock_movements WHERE created_by = ?1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        if invoice_refs > 0 || ledger_refs > 0 {
            return Err(DbError::still_referenced("User", user_id));
        }

        if target.role == Role::Admin && self.admin_count().await? <= 1 {
            return Err(DbError::LastAdmin);
        }

        debug!(user_id = %user_id, username = %target.username, "Deleting user");

        sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Counts total users (for diagnostics and seeding).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn fetch(&self, id: &str) -> DbResult<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        user.ok_or_else(|| DbError::not_found("User", id))
    }

    async fn admin_count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = ?1")
            .bind(Role::Admin)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Hashes a password with argon2id and a fresh random salt.
fn hash_password(password: &str) -> DbResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DbError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Verifies a password against a stored PHC string.
///
/// A malformed stored hash counts as a failed verification; the login
/// prompt cannot do anything smarter with it.
fn verify_password(password: &str, stored: &str) -> bool {
    let parsed = match PasswordHash::new(stored) {
        Ok(hash) => hash,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

// =============================================================================
// Unit Tests
// =============================================================================
