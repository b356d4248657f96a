//! # Repository Module
//!
//! Database repository implementations for Corner POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Service call                                                          │
//! │       │                                                                 │
//! │       │  db.products().search("milk", 20)                              │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── search(&self, query, limit)                                       │
//! │  ├── get(&self, id)                                                    │
//! │  ├── create(&self, acting, new)                                        │
//! │  └── update(&self, acting, product)                                    │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Write operations take the acting user's identity and check its role   │
//! │  before touching the database. Reads are open to any caller; the       │
//! │  service layer decides who may even reach them.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`category::CategoryRepository`] - Category CRUD
//! - [`product::ProductRepository`] - Product CRUD, search, inventory views
//! - [`customer::CustomerRepository`] - Customer CRUD and phone lookup
//! - [`user::UserRepository`] - Accounts, authentication, password changes
//! - [`stock::StockRepository`] - Append-only stock ledger + cached counter
//! - [`invoice::InvoiceRepository`] - The checkout transaction and reporting

pub mod category;
pub mod customer;
pub mod invoice;
pub mod product;
pub mod stock;
pub mod user;

use corner_core::{CoreError, Role, UserIdentity};

use crate::error::{DbError, DbResult};

/// Checks that the acting user's role meets the operation's requirement.
///
/// ## Rules
/// Roles are ordered `Cashier < Manager < Admin`; a higher role always
/// satisfies a lower requirement.
pub(crate) fn require_role(acting: &UserIdentity, required: Role) -> DbResult<()> {
    if acting.role >= required {
        Ok(())
    } else {
        Err(DbError::Domain(CoreError::PermissionDenied { required }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(role: Role) -> UserIdentity {
        UserIdentity {
            id: "u1".to_string(),
            username: "test".to_string(),
            full_name: "Test User".to_string(),
            role,
        }
    }

    #[test]
    fn test_require_role_hierarchy() {
        assert!(require_role(&identity(Role::Admin), Role::Manager).is_ok());
        assert!(require_role(&identity(Role::Manager), Role::Manager).is_ok());

        let err = require_role(&identity(Role::Cashier), Role::Manager).unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::PermissionDenied {
                required: Role::Manager
            })
        ));
    }
}
