//! `ledgerly-store` — SQLite-backed transactional store.
//!
//! One [`Store`] value owns a connection pool over a single database file
//! (or an in-memory database for tests). Every multi-row write runs inside
//! one transaction: a constraint violation rolls the whole operation back
//! and surfaces as a `DomainError`, leaving prior state unchanged.

mod error;
mod rows;
mod schema;
mod store;

mod customer_orders;
mod customers;
mod documents;
mod invoices;
mod lots;
mod products;
mod purchase_orders;
mod suppliers;

pub use customers::ImportSummary;
pub use store::Store;
