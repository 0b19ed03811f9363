//! `ledgerly-products` — the product catalog.

pub mod product;

pub use product::{NewProduct, Product, ProductUpdate};
