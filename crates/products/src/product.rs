//! Product records.

use serde::{Deserialize, Serialize};

use ledgerly_core::{DomainError, DomainResult, Entity, Price, ProductId, SupplierId};

/// A catalog product.
///
/// Prices are [`Price`] values so a not-yet-negotiated "TBD" survives storage
/// and behaves as zero wherever arithmetic consumes it. Deleting a product
/// cascades to its inventory lots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    /// Unique stock-keeping unit.
    pub sku: String,
    /// Optional secondary catalog code, distinct from the SKU.
    pub sku_number: Option<String>,
    /// Short display name.
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub unit_price: Price,
    pub cost_price: Price,
    pub reorder_level: i64,
    pub is_active: bool,
    pub supplier_id: Option<SupplierId>,
}

impl Product {
    pub fn from_new(id: ProductId, new: NewProduct) -> Self {
        Self {
            id,
            sku: new.sku,
            sku_number: new.sku_number,
            name: new.name,
            description: new.description,
            category: new.category,
            unit_price: new.unit_price,
            cost_price: new.cost_price,
            reorder_level: new.reorder_level,
            is_active: new.is_active,
            supplier_id: new.supplier_id,
        }
    }

    /// Name for listings and line-item defaults; falls back to the SKU.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().filter(|n| !n.trim().is_empty()).unwrap_or(&self.sku)
    }

    /// Apply an edit. Absent fields keep their current value.
    pub fn apply_update(&mut self, update: ProductUpdate) -> DomainResult<()> {
        if let Some(sku) = update.sku {
            if sku.trim().is_empty() {
                return Err(DomainError::validation("sku cannot be empty"));
            }
            self.sku = sku;
        }
        if let Some(sku_number) = update.sku_number {
            self.sku_number = Some(sku_number);
        }
        if let Some(name) = update.name {
            self.name = Some(name);
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(category) = update.category {
            self.category = Some(category);
        }
        if let Some(unit_price) = update.unit_price {
            self.unit_price = unit_price;
        }
        if let Some(cost_price) = update.cost_price {
            self.cost_price = cost_price;
        }
        if let Some(reorder_level) = update.reorder_level {
            self.reorder_level = reorder_level;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        if let Some(supplier_id) = update.supplier_id {
            self.supplier_id = Some(supplier_id);
        }
        Ok(())
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input for creating a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub sku: String,
    pub sku_number: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub unit_price: Price,
    pub cost_price: Price,
    pub reorder_level: i64,
    pub is_active: bool,
    pub supplier_id: Option<SupplierId>,
}

impl Default for NewProduct {
    fn default() -> Self {
        Self {
            sku: String::new(),
            sku_number: None,
            name: None,
            description: None,
            category: None,
            unit_price: Price::default(),
            cost_price: Price::default(),
            reorder_level: 0,
            is_active: true,
            supplier_id: None,
        }
    }
}

impl NewProduct {
    pub fn validate(&self) -> DomainResult<()> {
        if self.sku.trim().is_empty() {
            return Err(DomainError::validation("sku cannot be empty"));
        }
        Ok(())
    }
}

/// Edit patch; `None` fields keep the current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub sku: Option<String>,
    pub sku_number: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub unit_price: Option<Price>,
    pub cost_price: Option<Price>,
    pub reorder_level: Option<i64>,
    pub is_active: Option<bool>,
    pub supplier_id: Option<SupplierId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_falls_back_to_sku() {
        let product = Product::from_new(
            ProductId::new(1),
            NewProduct {
                sku: "RAW-001".to_string(),
                ..NewProduct::default()
            },
        );
        assert_eq!(product.display_name(), "RAW-001");

        let named = Product::from_new(
            ProductId::new(2),
            NewProduct {
                sku: "RAW-002".to_string(),
                name: Some("Citric Acid".to_string()),
                ..NewProduct::default()
            },
        );
        assert_eq!(named.display_name(), "Citric Acid");
    }

    #[test]
    fn tbd_prices_are_preserved_and_zero_valued() {
        let product = Product::from_new(
            ProductId::new(3),
            NewProduct {
                sku: "TEST-TBD-001".to_string(),
                unit_price: Price::parse("TBD"),
                cost_price: Price::parse("TBD"),
                ..NewProduct::default()
            },
        );
        assert!(product.unit_price.is_pending());
        assert_eq!(product.unit_price.amount(), 0.0);
        assert_eq!(product.unit_price.to_string(), "TBD");
    }

    #[test]
    fn rejects_blank_sku() {
        let new = NewProduct::default();
        match new.validate().unwrap_err() {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error"),
        }
    }
}
