//! `ledgerly-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no storage concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod price;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{
    CustomerId, CustomerOrderId, DocumentId, InvoiceId, LotId, ProductId, PurchaseOrderId,
    SupplierId,
};
pub use price::Price;
