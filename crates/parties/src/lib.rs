//! `ledgerly-parties` — counterparties and the issuing company.
//!
//! Suppliers, customers, the issuer's own profile, and the address-resolution
//! protocol that populates order address fields from a trusted source.

pub mod address;
pub mod company;
pub mod customer;
pub mod supplier;

pub use address::{Address, AddressSource, ResolvedAddress, resolve_address};
pub use company::CompanyProfile;
pub use customer::{Customer, CustomerUpdate, NewCustomer};
pub use supplier::{NewSupplier, Supplier, SupplierUpdate};
