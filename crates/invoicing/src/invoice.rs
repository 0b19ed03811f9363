//! Invoices.
//!
//! An invoice owns its own line copies: conversion from a customer order
//! copies the line data over, so later edits to the order do not leak into
//! an already-issued invoice.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use ledgerly_core::{CustomerOrderId, DomainError, DomainResult, Entity, InvoiceId, ProductId};
use ledgerly_products::Product;
use ledgerly_sales::CustomerOrder;

/// Invoice kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceKind {
    Proforma,
    Commercial,
}

impl InvoiceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceKind::Proforma => "Proforma",
            InvoiceKind::Commercial => "Commercial",
        }
    }
}

impl core::fmt::Display for InvoiceKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Proforma" => Ok(InvoiceKind::Proforma),
            "Commercial" => Ok(InvoiceKind::Commercial),
            other => Err(DomainError::validation(format!("unknown invoice kind: {other}"))),
        }
    }
}

/// An invoice line. `total` is the snapshot `qty * unit_price` taken when
/// the line was created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub line_no: u32,
    pub description: String,
    pub qty: i64,
    pub unit_price: f64,
    pub total: f64,
}

/// Input for one invoice line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewInvoiceLine {
    pub description: String,
    pub qty: i64,
    pub unit_price: f64,
}

impl NewInvoiceLine {
    pub fn validate(&self) -> DomainResult<()> {
        if self.description.trim().is_empty() {
            return Err(DomainError::validation("invoice line description is required"));
        }
        if self.qty <= 0 {
            return Err(DomainError::validation("line quantity must be positive"));
        }
        Ok(())
    }
}

/// An invoice with its line sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub kind: InvoiceKind,
    pub date: DateTime<Utc>,
    /// Set when the invoice was converted from a customer order.
    pub customer_order_id: Option<CustomerOrderId>,
    pub lines: Vec<InvoiceLine>,
}

impl Invoice {
    pub fn from_draft(id: InvoiceId, draft: InvoiceDraft) -> DomainResult<Self> {
        draft.validate()?;
        let lines = draft
            .lines
            .into_iter()
            .enumerate()
            .map(|(i, line)| InvoiceLine {
                line_no: i as u32 + 1,
                total: line.unit_price * line.qty as f64,
                description: line.description,
                qty: line.qty,
                unit_price: line.unit_price,
            })
            .collect();
        Ok(Self {
            id,
            kind: draft.kind,
            date: draft.date,
            customer_order_id: draft.customer_order_id,
            lines,
        })
    }

    /// Sum of the stored line totals.
    pub fn total(&self) -> f64 {
        self.lines.iter().map(|l| l.total).sum()
    }
}

impl Entity for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input for creating an invoice. Rejected when it has no lines or a line
/// has a blank description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    pub kind: InvoiceKind,
    pub date: DateTime<Utc>,
    pub customer_order_id: Option<CustomerOrderId>,
    pub lines: Vec<NewInvoiceLine>,
}

impl InvoiceDraft {
    pub fn new(kind: InvoiceKind) -> Self {
        Self {
            kind,
            date: Utc::now(),
            customer_order_id: None,
            lines: Vec::new(),
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.lines.is_empty() {
            return Err(DomainError::validation("invoice must have at least one line"));
        }
        for line in &self.lines {
            line.validate()?;
        }
        Ok(())
    }
}

/// Build an invoice draft from a customer order's lines.
///
/// Each order line becomes an invoice line at the order's snapshot price.
/// The description falls back through the line override, then the product's
/// display name, then the bare product id.
pub fn draft_from_customer_order(
    order: &CustomerOrder,
    products: &HashMap<ProductId, Product>,
    kind: InvoiceKind,
) -> DomainResult<InvoiceDraft> {
    let lines = order
        .lines
        .iter()
        .map(|line| {
            let description = line
                .description
                .clone()
                .filter(|d| !d.trim().is_empty())
                .or_else(|| {
                    products
                        .get(&line.product_id)
                        .map(|p| p.display_name().to_string())
                })
                .unwrap_or_else(|| format!("Product {}", line.product_id));
            NewInvoiceLine {
                description,
                qty: line.qty,
                unit_price: line.selling_price,
            }
        })
        .collect();
    let draft = InvoiceDraft {
        kind,
        date: Utc::now(),
        customer_order_id: Some(order.id),
        lines,
    };
    draft.validate()?;
    Ok(draft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerly_core::{CustomerId, Price};
    use ledgerly_products::NewProduct;
    use ledgerly_sales::{CustomerOrderDraft, NewCustomerOrderLine};

    fn product(id: i64, sku: &str, name: Option<&str>, unit_price: f64) -> Product {
        Product::from_new(
            ProductId::new(id),
            NewProduct {
                sku: sku.to_string(),
                name: name.map(str::to_string),
                unit_price: Price::Known(unit_price),
                ..NewProduct::default()
            },
        )
    }

    fn order_with(lines: Vec<NewCustomerOrderLine>) -> CustomerOrder {
        let mut draft = CustomerOrderDraft::new(CustomerId::new(1));
        draft.lines = lines;
        CustomerOrder::from_draft(CustomerOrderId::new(5), draft).unwrap()
    }

    #[test]
    fn empty_draft_is_rejected() {
        let draft = InvoiceDraft::new(InvoiceKind::Commercial);
        match draft.validate().unwrap_err() {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error"),
        }
    }

    #[test]
    fn blank_description_is_rejected() {
        let mut draft = InvoiceDraft::new(InvoiceKind::Proforma);
        draft.lines.push(NewInvoiceLine {
            description: "  ".to_string(),
            qty: 1,
            unit_price: 1.0,
        });
        assert!(draft.validate().is_err());
    }

    #[test]
    fn line_totals_snapshot_qty_times_unit_price() {
        let mut draft = InvoiceDraft::new(InvoiceKind::Commercial);
        draft.lines.push(NewInvoiceLine {
            description: "Citric Acid 25kg".to_string(),
            qty: 4,
            unit_price: 31.25,
        });
        let invoice = Invoice::from_draft(InvoiceId::new(1), draft).unwrap();
        assert_eq!(invoice.lines[0].total, 125.0);
        assert_eq!(invoice.total(), 125.0);
    }

    #[test]
    fn conversion_copies_order_lines_and_links_the_order() {
        let acid = product(1, "RAW-001", Some("Citric Acid"), 31.25);
        let unnamed = product(2, "RAW-002", None, 10.0);
        let products: HashMap<_, _> =
            [(acid.id, acid.clone()), (unnamed.id, unnamed.clone())].into();

        let order = order_with(vec![
            NewCustomerOrderLine::from_product(&acid, 4),
            NewCustomerOrderLine {
                description: Some("Special pack".to_string()),
                ..NewCustomerOrderLine::from_product(&unnamed, 2)
            },
        ]);

        let draft =
            draft_from_customer_order(&order, &products, InvoiceKind::Commercial).unwrap();
        assert_eq!(draft.customer_order_id, Some(order.id));
        assert_eq!(draft.lines[0].description, "Citric Acid");
        assert_eq!(draft.lines[0].unit_price, 31.25);
        assert_eq!(draft.lines[1].description, "Special pack");

        let invoice = Invoice::from_draft(InvoiceId::new(1), draft).unwrap();
        assert_eq!(invoice.total(), 4.0 * 31.25 + 2.0 * 10.0);
    }

    #[test]
    fn conversion_falls_back_to_sku_then_product_id() {
        let unnamed = product(2, "RAW-002", None, 10.0);
        let products: HashMap<_, _> = [(unnamed.id, unnamed.clone())].into();
        let order = order_with(vec![
            NewCustomerOrderLine::from_product(&unnamed, 1),
            NewCustomerOrderLine {
                product_id: ProductId::new(42),
                description: None,
                qty: 1,
                unit: None,
                selling_price: 1.0,
            },
        ]);

        let draft = draft_from_customer_order(&order, &products, InvoiceKind::Proforma).unwrap();
        assert_eq!(draft.lines[0].description, "RAW-002");
        assert_eq!(draft.lines[1].description, "Product 42");
    }
}
