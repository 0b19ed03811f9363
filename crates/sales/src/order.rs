//! Customer order records and lifecycle.

use chrono::{DateTime, Utc};
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use ledgerly_accounting::{CustomerTotals, customer_order_totals};
use ledgerly_core::{CustomerId, CustomerOrderId, DomainError, DomainResult, Entity, ProductId};
use ledgerly_products::Product;

/// Customer order status lifecycle.
///
/// `Pending -> Invoiced` on conversion, `Pending -> Cancelled` on
/// cancellation; both targets are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomerOrderStatus {
    Pending,
    Invoiced,
    Cancelled,
}

impl CustomerOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerOrderStatus::Pending => "Pending",
            CustomerOrderStatus::Invoiced => "Invoiced",
            CustomerOrderStatus::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, CustomerOrderStatus::Pending)
    }

    pub fn can_transition_to(&self, next: CustomerOrderStatus) -> bool {
        matches!(self, CustomerOrderStatus::Pending) && next != CustomerOrderStatus::Pending
    }
}

impl core::fmt::Display for CustomerOrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CustomerOrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(CustomerOrderStatus::Pending),
            "Invoiced" => Ok(CustomerOrderStatus::Invoiced),
            "Cancelled" => Ok(CustomerOrderStatus::Cancelled),
            other => Err(DomainError::validation(format!(
                "unknown customer order status: {other}"
            ))),
        }
    }
}

/// A customer order line.
///
/// `amount` is the snapshot `qty * selling_price` taken when the line was
/// appended; later product price edits do not revise it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerOrderLine {
    /// 1-based position; insertion order is meaningful for display.
    pub line_no: u32,
    pub product_id: ProductId,
    pub description: Option<String>,
    pub qty: i64,
    pub unit: Option<String>,
    pub selling_price: f64,
    /// Snapshot of `qty * selling_price` at append time.
    pub amount: f64,
}

/// Input for one line of a customer order draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCustomerOrderLine {
    pub product_id: ProductId,
    pub description: Option<String>,
    pub qty: i64,
    pub unit: Option<String>,
    pub selling_price: f64,
}

impl NewCustomerOrderLine {
    /// Line priced from the product's unit price ("TBD" sells for zero).
    pub fn from_product(product: &Product, qty: i64) -> Self {
        Self {
            product_id: product.id,
            description: None,
            qty,
            unit: None,
            selling_price: product.unit_price.amount(),
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.qty <= 0 {
            return Err(DomainError::validation("line quantity must be positive"));
        }
        Ok(())
    }
}

/// A customer order with its ordered line sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerOrder {
    pub id: CustomerOrderId,
    pub customer_id: CustomerId,
    /// Invoice number reserved for this order; unique when present.
    pub invoice_number: Option<String>,
    /// Customer's own purchase order reference.
    pub po_number: Option<String>,
    pub date: DateTime<Utc>,
    pub status: CustomerOrderStatus,
    pub credit: f64,
    pub discount: f64,
    pub amount_paid: f64,
    pub shipping: f64,
    /// Free-form carrier and terms text.
    pub tracking_terms: Option<String>,
    /// Full bill-to address snapshot.
    pub bill_to_address: Option<String>,
    /// Full ship-to address snapshot.
    pub ship_to_address: Option<String>,
    pub notes: Option<String>,
    pub lines: Vec<CustomerOrderLine>,
}

impl CustomerOrder {
    /// Materialize a validated draft; each line snapshots its amount and
    /// lines are numbered from 1.
    pub fn from_draft(id: CustomerOrderId, draft: CustomerOrderDraft) -> DomainResult<Self> {
        draft.validate()?;
        let lines = draft
            .lines
            .into_iter()
            .enumerate()
            .map(|(i, line)| CustomerOrderLine {
                line_no: i as u32 + 1,
                product_id: line.product_id,
                description: line.description,
                qty: line.qty,
                unit: line.unit,
                selling_price: line.selling_price,
                amount: line.selling_price * line.qty as f64,
            })
            .collect();
        Ok(Self {
            id,
            customer_id: draft.customer_id,
            invoice_number: draft.invoice_number,
            po_number: draft.po_number,
            date: draft.date,
            status: CustomerOrderStatus::Pending,
            credit: draft.credit,
            discount: draft.discount,
            amount_paid: draft.amount_paid,
            shipping: draft.shipping,
            tracking_terms: draft.tracking_terms,
            bill_to_address: draft.bill_to_address,
            ship_to_address: draft.ship_to_address,
            notes: draft.notes,
            lines,
        })
    }

    /// Totals over the stored line amount snapshots.
    pub fn totals(&self) -> CustomerTotals {
        customer_order_totals(
            self.lines.iter().map(|l| l.amount),
            self.shipping,
            self.discount,
            self.credit,
            self.amount_paid,
        )
    }

    /// Enforced status transition.
    pub fn transition_to(&mut self, next: CustomerOrderStatus) -> DomainResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::invariant(format!(
                "cannot move customer order from {} to {}",
                self.status, next
            )));
        }
        if next == CustomerOrderStatus::Invoiced && self.lines.is_empty() {
            return Err(DomainError::validation("cannot invoice an order without lines"));
        }
        self.status = next;
        Ok(())
    }

    /// Record a payment against the order. Overpayment is allowed and shows
    /// up as a negative balance due.
    pub fn record_payment(&mut self, amount: f64) -> DomainResult<()> {
        if !(amount > 0.0) {
            return Err(DomainError::validation("payment amount must be positive"));
        }
        self.amount_paid += amount;
        Ok(())
    }

    /// Apply a header edit. Absent fields keep their current value; status
    /// changes go through [`CustomerOrder::transition_to`] instead.
    pub fn apply_update(&mut self, update: CustomerOrderUpdate) -> DomainResult<()> {
        if let Some(invoice_number) = update.invoice_number {
            if invoice_number.trim().is_empty() {
                return Err(DomainError::validation("invoice_number cannot be blank"));
            }
            self.invoice_number = Some(invoice_number);
        }
        if let Some(po_number) = update.po_number {
            self.po_number = Some(po_number);
        }
        if let Some(date) = update.date {
            self.date = date;
        }
        if let Some(credit) = update.credit {
            self.credit = credit;
        }
        if let Some(discount) = update.discount {
            self.discount = discount;
        }
        if let Some(amount_paid) = update.amount_paid {
            self.amount_paid = amount_paid;
        }
        if let Some(shipping) = update.shipping {
            self.shipping = shipping;
        }
        if let Some(tracking_terms) = update.tracking_terms {
            self.tracking_terms = Some(tracking_terms);
        }
        if let Some(bill_to_address) = update.bill_to_address {
            self.bill_to_address = Some(bill_to_address);
        }
        if let Some(ship_to_address) = update.ship_to_address {
            self.ship_to_address = Some(ship_to_address);
        }
        if let Some(notes) = update.notes {
            self.notes = Some(notes);
        }
        Ok(())
    }
}

impl Entity for CustomerOrder {
    type Id = CustomerOrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input for creating a customer order. Rejected before persistence when it
/// has no lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerOrderDraft {
    pub customer_id: CustomerId,
    pub invoice_number: Option<String>,
    pub po_number: Option<String>,
    pub date: DateTime<Utc>,
    pub credit: f64,
    pub discount: f64,
    pub amount_paid: f64,
    pub shipping: f64,
    pub tracking_terms: Option<String>,
    pub bill_to_address: Option<String>,
    pub ship_to_address: Option<String>,
    pub notes: Option<String>,
    pub lines: Vec<NewCustomerOrderLine>,
}

impl CustomerOrderDraft {
    pub fn new(customer_id: CustomerId) -> Self {
        Self {
            customer_id,
            invoice_number: None,
            po_number: None,
            date: Utc::now(),
            credit: 0.0,
            discount: 0.0,
            amount_paid: 0.0,
            shipping: 0.0,
            tracking_terms: None,
            bill_to_address: None,
            ship_to_address: None,
            notes: None,
            lines: Vec::new(),
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.lines.is_empty() {
            return Err(DomainError::validation(
                "customer order must have at least one line",
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
pub struct CustomerOrderUpdate {
    pub invoice_number: Option<String>,
    pub po_number: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub credit: Option<f64>,
    pub discount: Option<f64>,
    pub amount_paid: Option<f64>,
    pub shipping: Option<f64>,
    pub tracking_terms: Option<String>,
    pub bill_to_address: Option<String>,
    pub ship_to_address: Option<String>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerly_core::Price;
    use ledgerly_products::NewProduct;

    fn draft_with_lines(lines: Vec<NewCustomerOrderLine>) -> CustomerOrderDraft {
        let mut draft = CustomerOrderDraft::new(CustomerId::new(1));
        draft.lines = lines;
        draft
    }

    fn line(qty: i64, selling_price: f64) -> NewCustomerOrderLine {
        NewCustomerOrderLine {
            product_id: ProductId::new(1),
            description: None,
            qty,
            unit: None,
            selling_price,
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
    fn line_amounts_snapshot_at_append_time() {
        let product = Product::from_new(
            ProductId::new(7),
            NewProduct {
                sku: "WIDGET".to_string(),
                unit_price: Price::Known(4.0),
                ..NewProduct::default()
            },
        );
        let new_line = NewCustomerOrderLine::from_product(&product, 3);
        let order = CustomerOrder::from_draft(
            CustomerOrderId::new(1),
            draft_with_lines(vec![new_line]),
        )
        .unwrap();
        assert_eq!(order.lines[0].amount, 12.0);

        // A later price edit does not revise the stored amount.
        let mut priced = product;
        priced.unit_price = Price::Known(99.0);
        assert_eq!(order.lines[0].amount, 12.0);
        assert_eq!(order.totals().subtotal, 12.0);
    }

    #[test]
    fn totals_subtract_discount_credit_and_payments() {
        let mut draft = draft_with_lines(vec![line(2, 50.0), line(1, 25.0)]);
        draft.shipping = 10.0;
        draft.discount = 5.0;
        draft.credit = 20.0;
        let mut order = CustomerOrder::from_draft(CustomerOrderId::new(1), draft).unwrap();
        order.record_payment(30.0).unwrap();

        let totals = order.totals();
        assert_eq!(totals.subtotal, 125.0);
        assert_eq!(totals.total_due, 110.0);
        assert_eq!(totals.balance_due, 80.0);
    }

    #[test]
    fn payments_accumulate_and_may_overpay() {
        let draft = draft_with_lines(vec![line(1, 10.0)]);
        let mut order = CustomerOrder::from_draft(CustomerOrderId::new(1), draft).unwrap();
        order.record_payment(6.0).unwrap();
        order.record_payment(6.0).unwrap();
        assert_eq!(order.amount_paid, 12.0);
        assert_eq!(order.totals().balance_due, -2.0);
    }

    #[test]
    fn rejects_non_positive_payment() {
        let draft = draft_with_lines(vec![line(1, 10.0)]);
        let mut order = CustomerOrder::from_draft(CustomerOrderId::new(1), draft).unwrap();
        assert!(order.record_payment(0.0).is_err());
        assert!(order.record_payment(-5.0).is_err());
    }

    #[test]
    fn pending_moves_to_invoiced_or_cancelled_only_once() {
        let draft = draft_with_lines(vec![line(1, 10.0)]);
        let mut order = CustomerOrder::from_draft(CustomerOrderId::new(1), draft).unwrap();

        order.transition_to(CustomerOrderStatus::Invoiced).unwrap();
        let err = order.transition_to(CustomerOrderStatus::Cancelled).unwrap_err();
        match err {
            DomainError::InvariantViolation(_) => {}
            _ => panic!("Expected InvariantViolation"),
        }

        let draft = draft_with_lines(vec![line(1, 10.0)]);
        let mut order = CustomerOrder::from_draft(CustomerOrderId::new(2), draft).unwrap();
        order.transition_to(CustomerOrderStatus::Cancelled).unwrap();
        assert!(order.status.is_terminal());
    }

    #[test]
    fn status_strings_round_trip() {
        for status in [
            CustomerOrderStatus::Pending,
            CustomerOrderStatus::Invoiced,
            CustomerOrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<CustomerOrderStatus>().unwrap(), status);
        }
    }
}
