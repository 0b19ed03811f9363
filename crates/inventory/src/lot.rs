//! Product lot records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ledgerly_core::{DomainError, DomainResult, Entity, LotId, ProductId};

/// A physical receipt batch for one product.
///
/// Quantity never goes below zero; a lot at zero is exhausted and drops out
/// of the active set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductLot {
    pub id: LotId,
    pub product_id: ProductId,
    pub lot_number: String,
    pub quantity: i64,
    /// Cost at receipt.
    pub cost_price: f64,
    pub date_received: Option<DateTime<Utc>>,
    pub production_date: Option<DateTime<Utc>>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ProductLot {
    /// Active lot: still has stock on hand.
    pub fn is_active(&self) -> bool {
        self.quantity > 0
    }

    /// Set the remaining quantity (receipt correction or consumption).
    pub fn set_quantity(&mut self, quantity: i64) -> DomainResult<()> {
        if quantity < 0 {
            return Err(DomainError::invariant("lot quantity cannot go negative"));
        }
        self.quantity = quantity;
        Ok(())
    }
}

impl Entity for ProductLot {
    type Id = LotId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input for receiving a lot against a product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewLot {
    pub lot_number: String,
    pub quantity: i64,
    pub cost_price: f64,
    pub date_received: Option<DateTime<Utc>>,
    pub production_date: Option<DateTime<Utc>>,
    pub expiration_date: Option<DateTime<Utc>>,
}

impl NewLot {
    pub fn validate(&self) -> DomainResult<()> {
        if self.lot_number.trim().is_empty() {
            return Err(DomainError::validation("lot number cannot be empty"));
        }
        if self.quantity < 0 {
            return Err(DomainError::validation("lot quantity cannot be negative"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lot(quantity: i64) -> ProductLot {
        ProductLot {
            id: LotId::new(1),
            product_id: ProductId::new(1),
            lot_number: "LOT-001".to_string(),
            quantity,
            cost_price: 5.0,
            date_received: None,
            production_date: None,
            expiration_date: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn zero_quantity_lot_is_exhausted() {
        assert!(lot(10).is_active());
        assert!(!lot(0).is_active());
    }

    #[test]
    fn quantity_cannot_go_negative() {
        let mut l = lot(5);
        let err = l.set_quantity(-1).unwrap_err();
        match err {
            DomainError::InvariantViolation(_) => {}
            _ => panic!("Expected InvariantViolation"),
        }
        assert_eq!(l.quantity, 5);
    }

    #[test]
    fn new_lot_requires_lot_number() {
        let new = NewLot {
            quantity: 3,
            ..NewLot::default()
        };
        assert!(new.validate().is_err());
    }
}
