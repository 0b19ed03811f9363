//! Purchase order records and lifecycle.

use chrono::{DateTime, Utc};
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use ledgerly_accounting::{PurchaseTotals, purchase_order_totals};
use ledgerly_core::{DomainError, DomainResult, Entity, ProductId, PurchaseOrderId, SupplierId};
use ledgerly_products::Product;

/// Purchase order status lifecycle.
///
/// Forward chain `Draft -> Sent -> Accepted -> Received -> Closed`;
/// `Cancelled` is terminal and reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PurchaseOrderStatus {
    Draft,
    Sent,
    Accepted,
    Received,
    Closed,
    Cancelled,
}

impl PurchaseOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseOrderStatus::Draft => "Draft",
            PurchaseOrderStatus::Sent => "Sent",
            PurchaseOrderStatus::Accepted => "Accepted",
            PurchaseOrderStatus::Received => "Received",
            PurchaseOrderStatus::Closed => "Closed",
            PurchaseOrderStatus::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PurchaseOrderStatus::Closed | PurchaseOrderStatus::Cancelled)
    }

    pub fn can_transition_to(&self, next: PurchaseOrderStatus) -> bool {
        use PurchaseOrderStatus::*;
        matches!(
            (*self, next),
            (Draft, Sent) | (Sent, Accepted) | (Accepted, Received) | (Received, Closed)
        ) || (next == Cancelled && !self.is_terminal())
    }
}

impl core::fmt::Display for PurchaseOrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PurchaseOrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Draft" => Ok(PurchaseOrderStatus::Draft),
            "Sent" => Ok(PurchaseOrderStatus::Sent),
            "Accepted" => Ok(PurchaseOrderStatus::Accepted),
            "Received" => Ok(PurchaseOrderStatus::Received),
            "Closed" => Ok(PurchaseOrderStatus::Closed),
            "Cancelled" => Ok(PurchaseOrderStatus::Cancelled),
            other => Err(DomainError::validation(format!(
                "unknown purchase order status: {other}"
            ))),
        }
    }
}

/// A purchase order line.
///
/// `cost` is the unit cost captured when the line was added; the line total
/// is `cost * qty` and is not revised by later product price edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrderLine {
    /// 1-based position; insertion order is meaningful for display.
    pub line_no: u32,
    pub product_id: ProductId,
    /// Override of the product display name.
    pub description: Option<String>,
    pub qty: i64,
    /// e.g. kg, lb, ea.
    pub unit: Option<String>,
    pub cost: f64,
    /// e.g. "20kg Paper Sacks".
    pub packing_structure: Option<String>,
    pub quantity_received: i64,
    pub received_date: Option<DateTime<Utc>>,
}

impl PurchaseOrderLine {
    pub fn line_total(&self) -> f64 {
        self.cost * self.qty as f64
    }
}

/// Input for one line of a purchase order draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPurchaseOrderLine {
    pub product_id: ProductId,
    pub description: Option<String>,
    pub qty: i64,
    pub unit: Option<String>,
    pub cost: f64,
    pub packing_structure: Option<String>,
}

impl NewPurchaseOrderLine {
    /// Line priced from the product's cost price ("TBD" costs as zero).
    pub fn from_product(product: &Product, qty: i64) -> Self {
        Self {
            product_id: product.id,
            description: None,
            qty,
            unit: None,
            cost: product.cost_price.amount(),
            packing_structure: None,
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.qty <= 0 {
            return Err(DomainError::validation("line quantity must be positive"));
        }
        Ok(())
    }
}

/// A purchase order with its ordered line sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: PurchaseOrderId,
    pub supplier_id: SupplierId,
    /// Unique across all purchase orders when present (e.g. "PO-2025-001").
    pub po_number: Option<String>,
    pub date: DateTime<Utc>,
    pub status: PurchaseOrderStatus,
    pub created_by: Option<String>,
    pub approved_by: Option<String>,
    /// Vendor quote/invoice reference.
    pub vendor_reference: Option<String>,
    pub expected_date: Option<DateTime<Utc>>,
    pub currency: String,
    /// e.g. "Net 30".
    pub payment_terms: Option<String>,
    pub discount_amount: f64,
    pub shipping_cost: f64,
    pub tax_amount: f64,
    /// Full ship-to address snapshot.
    pub ship_to_address: Option<String>,
    pub shipping_method: Option<String>,
    pub incoterm: Option<String>,
    pub port_of_destination: Option<String>,
    pub consignee: Option<String>,
    pub notify_party: Option<String>,
    pub tc_party: Option<String>,
    pub notes: Option<String>,
    pub lines: Vec<PurchaseOrderLine>,
}

impl PurchaseOrder {
    /// Materialize a validated draft; lines keep their supplied order and
    /// are numbered from 1.
    pub fn from_draft(id: PurchaseOrderId, draft: PurchaseOrderDraft) -> DomainResult<Self> {
        draft.validate()?;
        let lines = draft
            .lines
            .into_iter()
            .enumerate()
            .map(|(i, line)| PurchaseOrderLine {
                line_no: i as u32 + 1,
                product_id: line.product_id,
                description: line.description,
                qty: line.qty,
                unit: line.unit,
                cost: line.cost,
                packing_structure: line.packing_structure,
                quantity_received: 0,
                received_date: None,
            })
            .collect();
        Ok(Self {
            id,
            supplier_id: draft.supplier_id,
            po_number: draft.po_number,
            date: draft.date,
            status: PurchaseOrderStatus::Draft,
            created_by: draft.created_by,
            approved_by: draft.approved_by,
            vendor_reference: draft.vendor_reference,
            expected_date: draft.expected_date,
            currency: draft.currency,
            payment_terms: draft.payment_terms,
            discount_amount: draft.discount_amount,
            shipping_cost: draft.shipping_cost,
            tax_amount: draft.tax_amount,
            ship_to_address: draft.ship_to_address,
            shipping_method: draft.shipping_method,
            incoterm: draft.incoterm,
            port_of_destination: draft.port_of_destination,
            consignee: draft.consignee,
            notify_party: draft.notify_party,
            tc_party: draft.tc_party,
            notes: draft.notes,
            lines,
        })
    }

    pub fn totals(&self) -> PurchaseTotals {
        purchase_order_totals(
            self.lines.iter().map(PurchaseOrderLine::line_total),
            self.shipping_cost,
            self.tax_amount,
            self.discount_amount,
        )
    }

    /// Enforced status transition.
    pub fn transition_to(&mut self, next: PurchaseOrderStatus) -> DomainResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::invariant(format!(
                "cannot move purchase order from {} to {}",
                self.status, next
            )));
        }
        if next == PurchaseOrderStatus::Closed && self.lines.is_empty() {
            return Err(DomainError::validation("cannot close an order without lines"));
        }
        self.status = next;
        Ok(())
    }

    /// Record goods received against a line. Accumulates, never exceeding
    /// the ordered quantity, and stamps the receipt date.
    pub fn record_receipt(
        &mut self,
        line_no: u32,
        qty: i64,
        received: DateTime<Utc>,
    ) -> DomainResult<()> {
        if qty <= 0 {
            return Err(DomainError::validation("received quantity must be positive"));
        }
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.line_no == line_no)
            .ok_or(DomainError::NotFound)?;
        if line.quantity_received + qty > line.qty {
            return Err(DomainError::invariant(format!(
                "receipt would exceed ordered quantity on line {line_no}"
            )));
        }
        line.quantity_received += qty;
        line.received_date = Some(received);
        Ok(())
    }

    /// Apply a header edit. Absent fields keep their current value; status
    /// changes go through [`PurchaseOrder::transition_to`] instead.
    pub fn apply_update(&mut self, update: PurchaseOrderUpdate) -> DomainResult<()> {
        if let Some(po_number) = update.po_number {
            if po_number.trim().is_empty() {
                return Err(DomainError::validation("po_number cannot be blank"));
            }
            self.po_number = Some(po_number);
        }
        if let Some(date) = update.date {
            self.date = date;
        }
        if let Some(created_by) = update.created_by {
            self.created_by = Some(created_by);
        }
        if let Some(approved_by) = update.approved_by {
            self.approved_by = Some(approved_by);
        }
        if let Some(vendor_reference) = update.vendor_reference {
            self.vendor_reference = Some(vendor_reference);
        }
        if let Some(expected_date) = update.expected_date {
            self.expected_date = Some(expected_date);
        }
        if let Some(currency) = update.currency {
            self.currency = currency;
        }
        if let Some(payment_terms) = update.payment_terms {
            self.payment_terms = Some(payment_terms);
        }
        if let Some(discount_amount) = update.discount_amount {
            self.discount_amount = discount_amount;
        }
        if let Some(shipping_cost) = update.shipping_cost {
            self.shipping_cost = shipping_cost;
        }
        if let Some(tax_amount) = update.tax_amount {
            self.tax_amount = tax_amount;
        }
        if let Some(ship_to_address) = update.ship_to_address {
            self.ship_to_address = Some(ship_to_address);
        }
        if let Some(shipping_method) = update.shipping_method {
            self.shipping_method = Some(shipping_method);
        }
        if let Some(incoterm) = update.incoterm {
            self.incoterm = Some(incoterm);
        }
        if let Some(port_of_destination) = update.port_of_destination {
            self.port_of_destination = Some(port_of_destination);
        }
        if let Some(consignee) = update.consignee {
            self.consignee = Some(consignee);
        }
        if let Some(notify_party) = update.notify_party {
            self.notify_party = Some(notify_party);
        }
        if let Some(tc_party) = update.tc_party {
            self.tc_party = Some(tc_party);
        }
        if let Some(notes) = update.notes {
            self.notes = Some(notes);
        }
        Ok(())
    }
}

impl Entity for PurchaseOrder {
    type Id = PurchaseOrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input for creating a purchase order. Rejected before persistence when it
/// has no lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrderDraft {
    pub supplier_id: SupplierId,
    pub po_number: Option<String>,
    pub date: DateTime<Utc>,
    pub created_by: Option<String>,
    pub approved_by: Option<String>,
    pub vendor_reference: Option<String>,
    pub expected_date: Option<DateTime<Utc>>,
    pub currency: String,
    pub payment_terms: Option<String>,
    pub discount_amount: f64,
    pub shipping_cost: f64,
    pub tax_amount: f64,
    pub ship_to_address: Option<String>,
    pub shipping_method: Option<String>,
    pub incoterm: Option<String>,
    pub port_of_destination: Option<String>,
    pub consignee: Option<String>,
    pub notify_party: Option<String>,
    pub tc_party: Option<String>,
    pub notes: Option<String>,
    pub lines: Vec<NewPurchaseOrderLine>,
}

impl PurchaseOrderDraft {
    pub fn new(supplier_id: SupplierId) -> Self {
        Self {
            supplier_id,
            po_number: None,
            date: Utc::now(),
            created_by: None,
            approved_by: None,
            vendor_reference: None,
            expected_date: None,
            currency: "USD".to_string(),
            payment_terms: None,
            discount_amount: 0.0,
            shipping_cost: 0.0,
            tax_amount: 0.0,
            ship_to_address: None,
            shipping_method: None,
            incoterm: None,
            port_of_destination: None,
            consignee: None,
            notify_party: None,
            tc_party: None,
            notes: None,
            lines: Vec::new(),
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.lines.is_empty() {
            return Err(DomainError::validation(
                "purchase order must have at least one line",
            ));
        }
        for line in &self.lines {
            line.validate()?;
        }
        Ok(())
    }
}

/// Header edit patch; `None` fields keep the current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrderUpdate {
    pub po_number: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
    pub approved_by: Option<String>,
    pub vendor_reference: Option<String>,
    pub expected_date: Option<DateTime<Utc>>,
    pub currency: Option<String>,
    pub payment_terms: Option<String>,
    pub discount_amount: Option<f64>,
    pub shipping_cost: Option<f64>,
    pub tax_amount: Option<f64>,
    pub ship_to_address: Option<String>,
    pub shipping_method: Option<String>,
    pub incoterm: Option<String>,
    pub port_of_destination: Option<String>,
    pub consignee: Option<String>,
    pub notify_party: Option<String>,
    pub tc_party: Option<String>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerly_core::Price;
    use ledgerly_products::NewProduct;

    fn draft_with_lines(lines: Vec<NewPurchaseOrderLine>) -> PurchaseOrderDraft {
        let mut draft = PurchaseOrderDraft::new(SupplierId::new(1));
        draft.lines = lines;
        draft
    }

    fn line(qty: i64, cost: f64) -> NewPurchaseOrderLine {
        NewPurchaseOrderLine {
            product_id: ProductId::new(1),
            description: None,
            qty,
            unit: None,
            cost,
            packing_structure: None,
        }
    }

    #[test]
    fn empty_draft_is_rejected() {
        let draft = draft_with_lines(Vec::new());
        match draft.validate().unwrap_err() {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error"),
        }
    }

    #[test]
    fn totals_combine_shipping_tax_and_discount() {
        let mut draft = draft_with_lines(vec![line(100, 12.50)]);
        draft.shipping_cost = 1500.0;
        draft.tax_amount = 25.0;
        draft.discount_amount = 50.0;

        let order = PurchaseOrder::from_draft(PurchaseOrderId::new(1), draft).unwrap();
        let totals = order.totals();
        assert_eq!(totals.subtotal, 1250.0);
        assert_eq!(totals.grand_total, 2725.0);
    }

    #[test]
    fn line_totals_are_snapshots_of_cost_times_qty() {
        let draft = draft_with_lines(vec![line(3, 4.0), line(2, 10.0)]);
        let order = PurchaseOrder::from_draft(PurchaseOrderId::new(1), draft).unwrap();
        assert_eq!(order.lines[0].line_no, 1);
        assert_eq!(order.lines[0].line_total(), 12.0);
        assert_eq!(order.lines[1].line_total(), 20.0);
    }

    #[test]
    fn from_product_prices_tbd_as_zero() {
        let product = ledgerly_products::Product::from_new(
            ProductId::new(9),
            NewProduct {
                sku: "TBD-SKU".to_string(),
                cost_price: Price::parse("TBD"),
                ..NewProduct::default()
            },
        );
        let new_line = NewPurchaseOrderLine::from_product(&product, 5);
        assert_eq!(new_line.cost, 0.0);

        let order = PurchaseOrder::from_draft(
            PurchaseOrderId::new(1),
            draft_with_lines(vec![new_line]),
        )
        .unwrap();
        assert_eq!(order.lines[0].line_total(), 0.0);
    }

    #[test]
    fn forward_chain_is_enforced() {
        let draft = draft_with_lines(vec![line(1, 1.0)]);
        let mut order = PurchaseOrder::from_draft(PurchaseOrderId::new(1), draft).unwrap();

        // Draft cannot jump straight to Accepted.
        let err = order.transition_to(PurchaseOrderStatus::Accepted).unwrap_err();
        match err {
            DomainError::InvariantViolation(_) => {}
            _ => panic!("Expected InvariantViolation"),
        }

        order.transition_to(PurchaseOrderStatus::Sent).unwrap();
        order.transition_to(PurchaseOrderStatus::Accepted).unwrap();
        order.transition_to(PurchaseOrderStatus::Received).unwrap();
        order.transition_to(PurchaseOrderStatus::Closed).unwrap();
        assert!(order.status.is_terminal());
    }

    #[test]
    fn cancel_is_reachable_from_any_non_terminal_state() {
        let draft = draft_with_lines(vec![line(1, 1.0)]);
        let mut order = PurchaseOrder::from_draft(PurchaseOrderId::new(1), draft).unwrap();
        order.transition_to(PurchaseOrderStatus::Sent).unwrap();
        order.transition_to(PurchaseOrderStatus::Cancelled).unwrap();

        // No transition out of a terminal state.
        let err = order.transition_to(PurchaseOrderStatus::Sent).unwrap_err();
        match err {
            DomainError::InvariantViolation(_) => {}
            _ => panic!("Expected InvariantViolation"),
        }
    }

    #[test]
    fn receipt_accumulates_but_cannot_exceed_ordered_qty() {
        let draft = draft_with_lines(vec![line(10, 2.0)]);
        let mut order = PurchaseOrder::from_draft(PurchaseOrderId::new(1), draft).unwrap();

        order.record_receipt(1, 6, Utc::now()).unwrap();
        order.record_receipt(1, 4, Utc::now()).unwrap();
        assert_eq!(order.lines[0].quantity_received, 10);
        assert!(order.lines[0].received_date.is_some());

        let err = order.record_receipt(1, 1, Utc::now()).unwrap_err();
        match err {
            DomainError::InvariantViolation(_) => {}
            _ => panic!("Expected InvariantViolation"),
        }
    }

    #[test]
    fn update_keeps_unspecified_header_fields() {
        let mut draft = draft_with_lines(vec![line(1, 1.0)]);
        draft.payment_terms = Some("Net 30".to_string());
        let mut order = PurchaseOrder::from_draft(PurchaseOrderId::new(1), draft).unwrap();

        order
            .apply_update(PurchaseOrderUpdate {
                incoterm: Some("FOB".to_string()),
                ..PurchaseOrderUpdate::default()
            })
            .unwrap();

        assert_eq!(order.incoterm.as_deref(), Some("FOB"));
        assert_eq!(order.payment_terms.as_deref(), Some("Net 30"));
    }

    #[test]
    fn status_strings_round_trip() {
        for status in [
            PurchaseOrderStatus::Draft,
            PurchaseOrderStatus::Sent,
            PurchaseOrderStatus::Accepted,
            PurchaseOrderStatus::Received,
            PurchaseOrderStatus::Closed,
            PurchaseOrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<PurchaseOrderStatus>().unwrap(), status);
        }
    }
}
