//! # Service Layer
//!
//! Session-holding facades the application shell talks to.
//!
//! ## Two Counters, Two Services
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PointOfSale   the register: login, cart, checkout, receipts           │
//! │  BackOffice    the office desk: catalog, stock, reports, accounts      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both services hold the logged-in [`corner_core::UserIdentity`] and
//! thread it into every repository call, so role checks happen exactly
//! once, in the repository that owns the data. The services themselves
//! only enforce that SOMEONE is logged in (plus the Manager gate on
//! report generation, which has no single owning repository).

pub mod backoffice;
pub mod pos;
