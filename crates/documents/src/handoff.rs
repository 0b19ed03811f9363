//! Renderer hand-off contract.
//!
//! Everything a document renderer needs, assembled ahead of time: header
//! fields defaulted to displayable text, per-line strings with fall-backs
//! applied, and money already formatted. Renderers lay out; they never
//! compute. That keeps a PDF and a spreadsheet rendering of the same order
//! byte-for-byte agreed on every figure.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use ledgerly_accounting::format_amount;
use ledgerly_core::ProductId;
use ledgerly_parties::{CompanyProfile, Customer, Supplier};
use ledgerly_products::Product;
use ledgerly_purchasing::PurchaseOrder;
use ledgerly_sales::CustomerOrder;

/// Why a renderer could not produce an artifact.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The rendering backend is not installed or not usable on this host.
    #[error("renderer unavailable: {0}")]
    Unavailable(String),
    /// A required template file is missing.
    #[error("template missing: {0}")]
    TemplateMissing(String),
    #[error("render io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Produces a document artifact from pre-assembled order data, returning
/// the path of the file written.
pub trait DocumentRenderer {
    fn render_purchase_order(
        &self,
        order: &RenderablePurchaseOrder,
    ) -> Result<PathBuf, RenderError>;

    fn render_customer_order(
        &self,
        order: &RenderableCustomerOrder,
    ) -> Result<PathBuf, RenderError>;
}

/// One display-ready line. `description` and `unit` are never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderLine {
    pub line_no: u32,
    pub description: String,
    pub qty: i64,
    pub unit: String,
    /// Unit price, two decimal places.
    pub unit_price: String,
    /// Line amount, two decimal places.
    pub amount: String,
}

fn line_description(
    override_text: &Option<String>,
    product_id: ProductId,
    products: &HashMap<ProductId, Product>,
) -> String {
    override_text
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .or_else(|| products.get(&product_id).map(|p| p.display_name().to_string()))
        .unwrap_or_else(|| format!("Product {product_id}"))
}

fn line_unit(unit: &Option<String>) -> String {
    unit.as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .unwrap_or("ea")
        .to_string()
}

/// A purchase order flattened for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderablePurchaseOrder {
    pub po_number: String,
    pub date: String,
    pub status: String,
    pub currency: String,
    pub payment_terms: String,
    pub shipping_method: String,
    pub incoterm: String,
    pub issuer_block: String,
    pub vendor_block: String,
    /// Falls back to the issuer's own address block when the order carries
    /// no ship-to snapshot.
    pub ship_to_block: String,
    pub lines: Vec<RenderLine>,
    pub subtotal: String,
    pub shipping_cost: String,
    pub tax_amount: String,
    pub discount_amount: String,
    pub grand_total: String,
    pub notes: String,
}

impl RenderablePurchaseOrder {
    pub fn assemble(
        order: &PurchaseOrder,
        supplier: &Supplier,
        issuer: &CompanyProfile,
        products: &HashMap<ProductId, Product>,
    ) -> Self {
        let totals = order.totals();
        let lines = order
            .lines
            .iter()
            .map(|line| RenderLine {
                line_no: line.line_no,
                description: line_description(&line.description, line.product_id, products),
                qty: line.qty,
                unit: line_unit(&line.unit),
                unit_price: format_amount(line.cost),
                amount: format_amount(line.line_total()),
            })
            .collect();
        Self {
            po_number: order.po_number.clone().unwrap_or_default(),
            date: order.date.format("%Y-%m-%d").to_string(),
            status: order.status.to_string(),
            currency: order.currency.clone(),
            payment_terms: order.payment_terms.clone().unwrap_or_default(),
            shipping_method: order.shipping_method.clone().unwrap_or_default(),
            incoterm: order.incoterm.clone().unwrap_or_default(),
            issuer_block: issuer.address_block(),
            vendor_block: supplier.physical.format_block(Some(&supplier.name)),
            ship_to_block: order
                .ship_to_address
                .clone()
                .filter(|a| !a.trim().is_empty())
                .unwrap_or_else(|| issuer.address_block()),
            lines,
            subtotal: format_amount(totals.subtotal),
            shipping_cost: format_amount(order.shipping_cost),
            tax_amount: format_amount(order.tax_amount),
            discount_amount: format_amount(order.discount_amount),
            grand_total: format_amount(totals.grand_total),
            notes: order.notes.clone().unwrap_or_default(),
        }
    }
}

/// A customer order flattened for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderableCustomerOrder {
    pub invoice_number: String,
    pub po_number: String,
    pub date: String,
    pub status: String,
    pub issuer_block: String,
    /// Falls back to the customer's stored billing address.
    pub bill_to_block: String,
    /// Falls back to the customer's stored shipping address.
    pub ship_to_block: String,
    pub tracking_terms: String,
    pub lines: Vec<RenderLine>,
    pub subtotal: String,
    pub shipping: String,
    pub discount: String,
    pub credit: String,
    pub total_due: String,
    pub amount_paid: String,
    pub balance_due: String,
    pub notes: String,
}

impl RenderableCustomerOrder {
    pub fn assemble(
        order: &CustomerOrder,
        customer: &Customer,
        issuer: &CompanyProfile,
        products: &HashMap<ProductId, Product>,
    ) -> Self {
        let totals = order.totals();
        let lines = order
            .lines
            .iter()
            .map(|line| RenderLine {
                line_no: line.line_no,
                description: line_description(&line.description, line.product_id, products),
                qty: line.qty,
                unit: line_unit(&line.unit),
                unit_price: format_amount(line.selling_price),
                amount: format_amount(line.amount),
            })
            .collect();
        Self {
            invoice_number: order.invoice_number.clone().unwrap_or_default(),
            po_number: order.po_number.clone().unwrap_or_default(),
            date: order.date.format("%Y-%m-%d").to_string(),
            status: order.status.to_string(),
            issuer_block: issuer.address_block(),
            bill_to_block: order
                .bill_to_address
                .clone()
                .filter(|a| !a.trim().is_empty())
                .unwrap_or_else(|| customer.billing.format_block(Some(&customer.name))),
            ship_to_block: order
                .ship_to_address
                .clone()
                .filter(|a| !a.trim().is_empty())
                .unwrap_or_else(|| customer.shipping_block()),
            tracking_terms: order.tracking_terms.clone().unwrap_or_default(),
            lines,
            subtotal: format_amount(totals.subtotal),
            shipping: format_amount(order.shipping),
            discount: format_amount(order.discount),
            credit: format_amount(order.credit),
            total_due: format_amount(totals.total_due),
            amount_paid: format_amount(order.amount_paid),
            balance_due: format_amount(totals.balance_due),
            notes: order.notes.clone().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerly_core::{CustomerId, CustomerOrderId, Price, PurchaseOrderId, SupplierId};
    use ledgerly_parties::{Address, NewCustomer, NewSupplier};
    use ledgerly_products::NewProduct;
    use ledgerly_purchasing::{NewPurchaseOrderLine, PurchaseOrderDraft};
    use ledgerly_sales::{CustomerOrderDraft, NewCustomerOrderLine};

    fn issuer() -> CompanyProfile {
        CompanyProfile {
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
        }
    }

    fn supplier() -> Supplier {
        Supplier::from_new(
            SupplierId::new(1),
            NewSupplier {
                name: "Raw Goods Inc".to_string(),
                physical: Address {
                    line1: Some("9 Dock Rd".to_string()),
                    city: Some("Tacoma".to_string()),
                    country: Some("USA".to_string()),
                    ..Address::default()
                },
                ..NewSupplier::default()
            },
        )
    }

    fn acid() -> Product {
        Product::from_new(
            ProductId::new(1),
            NewProduct {
                sku: "RAW-001".to_string(),
                name: Some("Citric Acid".to_string()),
                unit_price: Price::Known(31.25),
                cost_price: Price::Known(12.50),
                ..NewProduct::default()
            },
        )
    }

    fn purchase_order() -> PurchaseOrder {
        let mut draft = PurchaseOrderDraft::new(SupplierId::new(1));
        draft.po_number = Some("PO-2025-001".to_string());
        draft.shipping_cost = 1500.0;
        draft.tax_amount = 25.0;
        draft.discount_amount = 50.0;
        draft.lines = vec![NewPurchaseOrderLine::from_product(&acid(), 100)];
        PurchaseOrder::from_draft(PurchaseOrderId::new(1), draft).unwrap()
    }

    #[test]
    fn purchase_order_totals_are_preformatted() {
        let products: HashMap<_, _> = [(acid().id, acid())].into();
        let view =
            RenderablePurchaseOrder::assemble(&purchase_order(), &supplier(), &issuer(), &products);
        assert_eq!(view.subtotal, "1250.00");
        assert_eq!(view.grand_total, "2725.00");
        assert_eq!(view.lines[0].amount, "1250.00");
    }

    #[test]
    fn line_text_falls_back_to_product_name_and_ea_unit() {
        let products: HashMap<_, _> = [(acid().id, acid())].into();
        let view =
            RenderablePurchaseOrder::assemble(&purchase_order(), &supplier(), &issuer(), &products);
        assert_eq!(view.lines[0].description, "Citric Acid");
        assert_eq!(view.lines[0].unit, "ea");
    }

    #[test]
    fn unknown_product_still_gets_non_empty_description() {
        let view = RenderablePurchaseOrder::assemble(
            &purchase_order(),
            &supplier(),
            &issuer(),
            &HashMap::new(),
        );
        assert_eq!(view.lines[0].description, "Product 1");
    }

    #[test]
    fn missing_ship_to_falls_back_to_issuer_block() {
        let products = HashMap::new();
        let view =
            RenderablePurchaseOrder::assemble(&purchase_order(), &supplier(), &issuer(), &products);
        assert_eq!(view.ship_to_block, issuer().address_block());

        let mut order = purchase_order();
        order.ship_to_address = Some("Elsewhere\n1 Other St".to_string());
        let view = RenderablePurchaseOrder::assemble(&order, &supplier(), &issuer(), &products);
        assert_eq!(view.ship_to_block, "Elsewhere\n1 Other St");
    }

    #[test]
    fn customer_order_blocks_fall_back_to_stored_profile() {
        let mut customer = Customer::from_new(
            CustomerId::new(1),
            NewCustomer {
                name: "Best Beverages".to_string(),
                ..NewCustomer::default()
            },
        );
        customer.shipping = Address {
            line1: Some("77 Bottling Ave".to_string()),
            city: Some("Reno".to_string()),
            ..Address::default()
        };

        let mut draft = CustomerOrderDraft::new(customer.id);
        draft.lines = vec![NewCustomerOrderLine::from_product(&acid(), 4)];
        draft.shipping = 10.0;
        let order = CustomerOrder::from_draft(CustomerOrderId::new(1), draft).unwrap();

        let view =
            RenderableCustomerOrder::assemble(&order, &customer, &issuer(), &HashMap::new());
        assert_eq!(view.ship_to_block, "Best Beverages\n77 Bottling Ave\nReno");
        assert_eq!(view.subtotal, "125.00");
        assert_eq!(view.total_due, "135.00");
        assert_eq!(view.balance_due, "135.00");
    }
}
