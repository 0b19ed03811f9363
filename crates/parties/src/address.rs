//! Postal addresses and the address-resolution protocol.
//!
//! Order address fields can be filled from one of several trusted sources:
//! typed in manually, copied from the issuing company's profile, or copied
//! from a counterparty's stored profile. Resolution has to distinguish three
//! outcomes that a plain `Option<String>` cannot express:
//!
//! - "use this value" ([`ResolvedAddress::Value`]),
//! - "the caller still has to collect free text" ([`ResolvedAddress::Manual`]),
//! - "change nothing" ([`ResolvedAddress::KeepCurrent`]).
//!
//! Collapsing these would let an edit flow silently clobber an existing
//! address with an empty one.

use serde::{Deserialize, Serialize};

use ledgerly_core::{DomainError, DomainResult};

use crate::company::CompanyProfile;
use crate::customer::Customer;

/// A postal address. Every field is optional; blank fields are silently
/// dropped when the address is formatted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
}

fn non_blank(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl Address {
    pub fn is_empty(&self) -> bool {
        non_blank(&self.line1).is_none()
            && non_blank(&self.line2).is_none()
            && non_blank(&self.city).is_none()
            && non_blank(&self.state).is_none()
            && non_blank(&self.zip).is_none()
            && non_blank(&self.country).is_none()
    }

    /// Canonical multi-line block: optional name line, address lines,
    /// "city, state zip" line, country line. Blank fields are omitted
    /// rather than rendered as empty lines.
    pub fn format_block(&self, name: Option<&str>) -> String {
        let mut lines: Vec<String> = Vec::new();

        if let Some(name) = name.map(str::trim).filter(|s| !s.is_empty()) {
            lines.push(name.to_string());
        }
        if let Some(line1) = non_blank(&self.line1) {
            lines.push(line1.to_string());
        }
        if let Some(line2) = non_blank(&self.line2) {
            lines.push(line2.to_string());
        }

        let mut locality = String::new();
        if let Some(city) = non_blank(&self.city) {
            locality.push_str(city);
        }
        if let Some(state) = non_blank(&self.state) {
            if !locality.is_empty() {
                locality.push_str(", ");
            }
            locality.push_str(state);
        }
        if let Some(zip) = non_blank(&self.zip) {
            if !locality.is_empty() {
                locality.push(' ');
            }
            locality.push_str(zip);
        }
        if !locality.is_empty() {
            lines.push(locality);
        }

        if let Some(country) = non_blank(&self.country) {
            lines.push(country.to_string());
        }

        lines.join("\n")
    }
}

/// Where an order address field should be populated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressSource {
    /// The operator will type the address in.
    Manual,
    /// Copy from the issuing company's profile.
    IssuerProfile,
    /// Copy from a chosen counterparty's stored shipping address.
    CounterpartyProfile,
    /// Leave whatever value the field already holds.
    KeepCurrent,
}

/// Outcome of address resolution. See the module docs for why this is
/// three-state rather than a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolvedAddress {
    /// Caller must separately collect free text.
    Manual,
    /// Use this formatted address block.
    Value(String),
    /// Caller must preserve whatever value already exists.
    KeepCurrent,
}

impl ResolvedAddress {
    /// Apply the resolution to an order field. Returns `true` when the caller
    /// still owes manual input for the field; `KeepCurrent` never overwrites.
    pub fn apply_to(self, field: &mut Option<String>) -> bool {
        match self {
            ResolvedAddress::Manual => true,
            ResolvedAddress::Value(value) => {
                *field = Some(value);
                false
            }
            ResolvedAddress::KeepCurrent => false,
        }
    }
}

/// Resolve an address field from the selected source.
///
/// Pure and idempotent: resolving the same source against unchanged profile
/// data yields an identical result. Counterparty selection is the caller's
/// concern; by the time this runs a chosen [`Customer`] must be supplied for
/// [`AddressSource::CounterpartyProfile`].
pub fn resolve_address(
    source: AddressSource,
    issuer: &CompanyProfile,
    counterparty: Option<&Customer>,
) -> DomainResult<ResolvedAddress> {
    match source {
        AddressSource::Manual => Ok(ResolvedAddress::Manual),
        AddressSource::KeepCurrent => Ok(ResolvedAddress::KeepCurrent),
        AddressSource::IssuerProfile => Ok(ResolvedAddress::Value(issuer.address_block())),
        AddressSource::CounterpartyProfile => {
            let customer = counterparty.ok_or_else(|| {
                DomainError::validation("counterparty source requires a chosen customer")
            })?;
            Ok(ResolvedAddress::Value(customer.shipping_block()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customer::NewCustomer;
    use ledgerly_core::CustomerId;

    fn issuer() -> CompanyProfile {
        CompanyProfile {
            company_name: "Test Company".to_string(),
            address: Address {
                line1: Some("HQ Addr 1".to_string()),
                line2: None,
                city: Some("HQ City".to_string()),
                state: None,
                zip: None,
                country: Some("HQ Country".to_string()),
            },
            phone: None,
            email: None,
            website: None,
            irs_employer_id: None,
            state_seller_id: None,
            sales_license: None,
        }
    }

    fn customer() -> Customer {
        let mut c = Customer::from_new(
            CustomerId::new(1),
            NewCustomer {
                name: "Test Customer".to_string(),
                ..NewCustomer::default()
            },
        );
        c.shipping = Address {
            line1: Some("123 Cust St".to_string()),
            city: Some("Cust City".to_string()),
            country: Some("USA".to_string()),
            ..Address::default()
        };
        c
    }

    #[test]
    fn issuer_block_drops_blank_fields() {
        let block = resolve_address(AddressSource::IssuerProfile, &issuer(), None).unwrap();
        match block {
            ResolvedAddress::Value(text) => {
                assert_eq!(text, "Test Company\nHQ Addr 1\nHQ City\nHQ Country");
            }
            _ => panic!("Expected Value resolution"),
        }
    }

    #[test]
    fn issuer_resolution_is_idempotent() {
        let company = issuer();
        let first = resolve_address(AddressSource::IssuerProfile, &company, None).unwrap();
        let second = resolve_address(AddressSource::IssuerProfile, &company, None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn counterparty_formats_shipping_address() {
        let cust = customer();
        let resolved =
            resolve_address(AddressSource::CounterpartyProfile, &issuer(), Some(&cust)).unwrap();
        match resolved {
            ResolvedAddress::Value(text) => {
                assert_eq!(text, "Test Customer\n123 Cust St\nCust City\nUSA");
            }
            _ => panic!("Expected Value resolution"),
        }
    }

    #[test]
    fn counterparty_without_choice_is_rejected() {
        let err =
            resolve_address(AddressSource::CounterpartyProfile, &issuer(), None).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error"),
        }
    }

    #[test]
    fn keep_current_never_clobbers_existing_value() {
        let resolved = resolve_address(AddressSource::KeepCurrent, &issuer(), None).unwrap();
        let mut field = Some("123 Main St".to_string());
        let wants_manual = resolved.apply_to(&mut field);
        assert!(!wants_manual);
        assert_eq!(field.as_deref(), Some("123 Main St"));
    }

    #[test]
    fn manual_leaves_field_and_requests_input() {
        let resolved = resolve_address(AddressSource::Manual, &issuer(), None).unwrap();
        let mut field = Some("old".to_string());
        assert!(resolved.apply_to(&mut field));
        assert_eq!(field.as_deref(), Some("old"));
    }

    #[test]
    fn locality_line_handles_partial_fields() {
        let addr = Address {
            city: Some("Springfield".to_string()),
            zip: Some("62704".to_string()),
            ..Address::default()
        };
        assert_eq!(addr.format_block(None), "Springfield 62704");

        let addr = Address {
            state: Some("IL".to_string()),
            ..Address::default()
        };
        assert_eq!(addr.format_block(None), "IL");
    }

    #[test]
    fn empty_address_formats_to_empty_string() {
        let addr = Address::default();
        assert!(addr.is_empty());
        assert_eq!(addr.format_block(None), "");
    }
}
