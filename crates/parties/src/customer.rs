//! Customer records.

use serde::{Deserialize, Serialize};

use ledgerly_core::{CustomerId, DomainError, DomainResult, Entity};

use crate::address::Address;

/// A customer: identity, a shipping/billing address pair, and two email
/// roles (operational and billing).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    /// Operational email + the display name it is addressed to.
    pub email: Option<String>,
    pub email_name: Option<String>,
    /// Billing email + display name.
    pub billing_email: Option<String>,
    pub billing_email_name: Option<String>,
    pub shipping: Address,
    pub billing: Address,
}

impl Customer {
    pub fn from_new(id: CustomerId, new: NewCustomer) -> Self {
        Self {
            id,
            name: new.name,
            contact_name: new.contact_name,
            phone: new.phone,
            email: new.email,
            email_name: new.email_name,
            billing_email: new.billing_email,
            billing_email_name: new.billing_email_name,
            shipping: new.shipping,
            billing: new.billing,
        }
    }

    /// Canonical shipping-address block used by the address-resolution
    /// protocol when this customer is chosen as the counterparty source.
    pub fn shipping_block(&self) -> String {
        self.shipping.format_block(Some(&self.name))
    }

    /// Apply an edit. Absent fields keep their current value.
    pub fn apply_update(&mut self, update: CustomerUpdate) -> DomainResult<()> {
        if let Some(name) = update.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("customer name cannot be empty"));
            }
            self.name = name;
        }
        if let Some(contact_name) = update.contact_name {
            self.contact_name = Some(contact_name);
        }
        if let Some(phone) = update.phone {
            self.phone = Some(phone);
        }
        if let Some(email) = update.email {
            self.email = Some(email);
        }
        if let Some(email_name) = update.email_name {
            self.email_name = Some(email_name);
        }
        if let Some(billing_email) = update.billing_email {
            self.billing_email = Some(billing_email);
        }
        if let Some(billing_email_name) = update.billing_email_name {
            self.billing_email_name = Some(billing_email_name);
        }
        if let Some(shipping) = update.shipping {
            self.shipping = shipping;
        }
        if let Some(billing) = update.billing {
            self.billing = billing;
        }
        Ok(())
    }
}

impl Entity for Customer {
    type Id = CustomerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input for creating a customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub email_name: Option<String>,
    pub billing_email: Option<String>,
    pub billing_email_name: Option<String>,
    pub shipping: Address,
    pub billing: Address,
}

impl NewCustomer {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("customer name cannot be empty"));
        }
        Ok(())
    }
}

/// Edit patch; `None` fields keep the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub email_name: Option<String>,
    pub billing_email: Option<String>,
    pub billing_email_name: Option<String>,
    pub shipping: Option<Address>,
    pub billing: Option<Address>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipping_block_uses_customer_name() {
        let mut customer = Customer::from_new(
            CustomerId::new(7),
            NewCustomer {
                name: "Test CO Customer".to_string(),
                ..NewCustomer::default()
            },
        );
        customer.shipping = Address {
            line1: Some("123 Test St".to_string()),
            city: Some("Test City".to_string()),
            state: Some("TS".to_string()),
            zip: Some("12345".to_string()),
            country: Some("TestLand".to_string()),
            ..Address::default()
        };

        assert_eq!(
            customer.shipping_block(),
            "Test CO Customer\n123 Test St\nTest City, TS 12345\nTestLand"
        );
    }

    #[test]
    fn update_can_change_each_email_role_independently() {
        let mut customer = Customer::from_new(
            CustomerId::new(1),
            NewCustomer {
                name: "Acme".to_string(),
                email: Some("ops@acme.test".to_string()),
                billing_email: Some("ap@acme.test".to_string()),
                ..NewCustomer::default()
            },
        );

        customer
            .apply_update(CustomerUpdate {
                billing_email: Some("invoices@acme.test".to_string()),
                ..CustomerUpdate::default()
            })
            .unwrap();

        assert_eq!(customer.email.as_deref(), Some("ops@acme.test"));
        assert_eq!(customer.billing_email.as_deref(), Some("invoices@acme.test"));
    }
}
