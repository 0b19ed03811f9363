//! The issuing company's profile.
//!
//! A single value describing the business operating the ledger. It is passed
//! explicitly into the flows that need it (address resolution, document
//! hand-off) rather than looked up through any process-wide state, so tests
//! can supply different issuers freely. Order flows never mutate it.

use serde::{Deserialize, Serialize};

use crate::address::Address;

/// Profile of the issuing business.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub company_name: String,
    pub address: Address,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    /// Federal employer identification number.
    pub irs_employer_id: Option<String>,
    /// State-issued seller identification.
    pub state_seller_id: Option<String>,
    /// Sales license number.
    pub sales_license: Option<String>,
}

impl CompanyProfile {
    /// Canonical multi-line address block used as an order address source.
    pub fn address_block(&self) -> String {
        self.address.format_block(Some(&self.company_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_block_starts_with_company_name() {
        let profile = CompanyProfile {
            company_name: "Acme Trading Co".to_string(),
            address: Address {
                line1: Some("1 Warehouse Way".to_string()),
                city: Some("Oakland".to_string()),
                state: Some("CA".to_string()),
                zip: Some("94601".to_string()),
                country: Some("USA".to_string()),
                ..Address::default()
            },
            ..CompanyProfile::default()
        };

        assert_eq!(
            profile.address_block(),
            "Acme Trading Co\n1 Warehouse Way\nOakland, CA 94601\nUSA"
        );
    }
}
