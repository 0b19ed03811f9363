//! Strongly-typed record identifiers used across the ledger.
//!
//! Identifiers wrap the store's integer rowid. Keeping a distinct newtype per
//! entity prevents, say, a `SupplierId` from ever being passed where a
//! `CustomerId` is expected.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

macro_rules! impl_record_id {
    ($t:ident, $name:literal) => {
        #[doc = concat!("Identifier of a stored ", $name, " record.")]
        #[derive(
            Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $t(i64);

        impl $t {
            /// Wrap a raw store rowid.
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $t {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let id = i64::from_str(s)
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Ok(Self(id))
            }
        }
    };
}

impl_record_id!(SupplierId, "supplier");
impl_record_id!(CustomerId, "customer");
impl_record_id!(ProductId, "product");
impl_record_id!(LotId, "product lot");
impl_record_id!(PurchaseOrderId, "purchase order");
impl_record_id!(CustomerOrderId, "customer order");
impl_record_id!(InvoiceId, "invoice");
impl_record_id!(DocumentId, "document");
