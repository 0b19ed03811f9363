//! Supplier records.

use serde::{Deserialize, Serialize};

use ledgerly_core::{DomainError, DomainResult, Entity, SupplierId};

use crate::address::Address;

/// A supplier: identity, a physical/billing address pair, and free-text notes.
///
/// Referenced by products (optional) and purchase orders (required); the store
/// refuses to delete a supplier while either reference exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub tax_id: Option<String>,
    pub physical: Address,
    pub billing: Address,
    pub notes: Option<String>,
}

impl Supplier {
    pub fn from_new(id: SupplierId, new: NewSupplier) -> Self {
        Self {
            id,
            name: new.name,
            contact_name: new.contact_name,
            email: new.email,
            phone: new.phone,
            tax_id: new.tax_id,
            physical: new.physical,
            billing: new.billing,
            notes: new.notes,
        }
    }

    /// Apply an edit. Absent fields keep their current value ("blank keeps
    /// current" convention); fields can be changed but never cleared.
    pub fn apply_update(&mut self, update: SupplierUpdate) -> DomainResult<()> {
        if let Some(name) = update.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("supplier name cannot be empty"));
            }
            self.name = name;
        }
        if let Some(contact_name) = update.contact_name {
            self.contact_name = Some(contact_name);
        }
        if let Some(email) = update.email {
            self.email = Some(email);
        }
        if let Some(phone) = update.phone {
            self.phone = Some(phone);
        }
        if let Some(tax_id) = update.tax_id {
            self.tax_id = Some(tax_id);
        }
        if let Some(physical) = update.physical {
            self.physical = physical;
        }
        if let Some(billing) = update.billing {
            self.billing = billing;
        }
        if let Some(notes) = update.notes {
            self.notes = Some(notes);
        }
        Ok(())
    }
}

impl Entity for Supplier {
    type Id = SupplierId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input for creating a supplier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSupplier {
    pub name: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub tax_id: Option<String>,
    pub physical: Address,
    pub billing: Address,
    pub notes: Option<String>,
}

impl NewSupplier {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("supplier name cannot be empty"));
        }
        Ok(())
    }
}

/// Edit patch; `None` fields keep the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierUpdate {
    pub name: Option<String>,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub tax_id: Option<String>,
    pub physical: Option<Address>,
    pub billing: Option<Address>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_name_on_create() {
        let new = NewSupplier {
            name: "   ".to_string(),
            ..NewSupplier::default()
        };
        match new.validate().unwrap_err() {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error"),
        }
    }

    #[test]
    fn update_keeps_unspecified_fields() {
        let mut supplier = Supplier::from_new(
            SupplierId::new(1),
            NewSupplier {
                name: "Old Name".to_string(),
                email: Some("old@example.com".to_string()),
                ..NewSupplier::default()
            },
        );

        supplier
            .apply_update(SupplierUpdate {
                name: Some("New Name".to_string()),
                ..SupplierUpdate::default()
            })
            .unwrap();

        assert_eq!(supplier.name, "New Name");
        assert_eq!(supplier.email.as_deref(), Some("old@example.com"));
    }

    #[test]
    fn update_rejects_blank_name() {
        let mut supplier = Supplier::from_new(
            SupplierId::new(1),
            NewSupplier {
                name: "Keep Me".to_string(),
                ..NewSupplier::default()
            },
        );

        let err = supplier
            .apply_update(SupplierUpdate {
                name: Some("".to_string()),
                ..SupplierUpdate::default()
            })
            .unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error"),
        }
        assert_eq!(supplier.name, "Keep Me");
    }
}
