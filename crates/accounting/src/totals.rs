//! Order total calculation.
//!
//! Pure computation over line amounts plus header-level adjustments. Inputs
//! are taken as given: a negative discount, credit, or tax passes through
//! unvalidated. Internal accumulation keeps full f64 precision; rounding to
//! two decimal places happens only through [`format_amount`] at the display
//! boundary.

use serde::{Deserialize, Serialize};

/// Shared "subtotal plus charges minus reductions" accumulator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    subtotal: f64,
    charges: f64,
    reductions: f64,
}

impl Totals {
    /// Start from a sequence of line amounts.
    pub fn over<I>(line_amounts: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        Self {
            subtotal: line_amounts.into_iter().sum(),
            charges: 0.0,
            reductions: 0.0,
        }
    }

    /// Add an additive header charge (shipping, tax).
    pub fn charge(mut self, amount: f64) -> Self {
        self.charges += amount;
        self
    }

    /// Add a subtractive header reduction (discount, credit).
    pub fn reduce(mut self, amount: f64) -> Self {
        self.reductions += amount;
        self
    }

    pub fn subtotal(&self) -> f64 {
        self.subtotal
    }

    pub fn total(&self) -> f64 {
        self.subtotal + self.charges - self.reductions
    }
}

/// Computed purchase-order money fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PurchaseTotals {
    pub subtotal: f64,
    pub grand_total: f64,
}

/// `grand_total = subtotal + shipping_cost + tax_amount - discount_amount`
/// where `subtotal` is the sum of `cost * qty` per line.
pub fn purchase_order_totals<I>(
    line_amounts: I,
    shipping_cost: f64,
    tax_amount: f64,
    discount_amount: f64,
) -> PurchaseTotals
where
    I: IntoIterator<Item = f64>,
{
    let totals = Totals::over(line_amounts)
        .charge(shipping_cost)
        .charge(tax_amount)
        .reduce(discount_amount);
    PurchaseTotals {
        subtotal: totals.subtotal(),
        grand_total: totals.total(),
    }
}

/// Computed customer-order money fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CustomerTotals {
    pub subtotal: f64,
    pub total_due: f64,
    pub balance_due: f64,
}

/// `total_due = subtotal + shipping - discount - credit` over the stored
/// line amounts, and `balance_due = total_due - amount_paid`.
pub fn customer_order_totals<I>(
    line_amounts: I,
    shipping: f64,
    discount: f64,
    credit: f64,
    amount_paid: f64,
) -> CustomerTotals
where
    I: IntoIterator<Item = f64>,
{
    let totals = Totals::over(line_amounts)
        .charge(shipping)
        .reduce(discount)
        .reduce(credit);
    let total_due = totals.total();
    CustomerTotals {
        subtotal: totals.subtotal(),
        total_due,
        balance_due: total_due - amount_paid,
    }
}

/// Render a monetary amount with two decimal places. Display-time only; the
/// stored values keep full precision.
pub fn format_amount(amount: f64) -> String {
    format!("{amount:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purchase_order_round_trip() {
        // 100 x 12.50 with shipping 1500, tax 25, discount 50.
        let totals = purchase_order_totals([100.0 * 12.50], 1500.0, 25.0, 50.0);
        assert_eq!(format_amount(totals.subtotal), "1250.00");
        assert_eq!(format_amount(totals.grand_total), "2725.00");
    }

    #[test]
    fn customer_order_balance_subtracts_payments() {
        let totals = customer_order_totals([50.0, 25.0], 10.0, 5.0, 20.0, 30.0);
        assert_eq!(totals.subtotal, 75.0);
        assert_eq!(totals.total_due, 60.0);
        assert_eq!(totals.balance_due, 30.0);
    }

    #[test]
    fn empty_order_has_zero_subtotal() {
        let totals = purchase_order_totals(std::iter::empty(), 0.0, 0.0, 0.0);
        assert_eq!(totals.subtotal, 0.0);
        assert_eq!(totals.grand_total, 0.0);
    }

    #[test]
    fn negative_adjustments_pass_through_unvalidated() {
        // Known laxity: a negative discount behaves as a surcharge.
        let totals = purchase_order_totals([100.0], 0.0, 0.0, -10.0);
        assert_eq!(totals.grand_total, 110.0);
    }

    #[test]
    fn formatting_rounds_only_at_display_time() {
        let totals = customer_order_totals([0.105, 0.105], 0.0, 0.0, 0.0, 0.0);
        assert_eq!(totals.subtotal, 0.105 + 0.105);
        assert_eq!(format_amount(totals.subtotal), "0.21");
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        // Both order kinds are instances of the same charge/reduce shape.
        #[test]
        fn po_and_co_agree_on_shared_shape(
            lines in proptest::collection::vec(0.0f64..10_000.0, 0..10),
            charge in 0.0f64..1_000.0,
            reduction in 0.0f64..1_000.0,
        ) {
            let po = purchase_order_totals(lines.iter().copied(), charge, 0.0, reduction);
            let co = customer_order_totals(lines.iter().copied(), charge, reduction, 0.0, 0.0);
            prop_assert_eq!(po.subtotal, co.subtotal);
            prop_assert_eq!(po.grand_total, co.total_due);
        }

        #[test]
        fn zero_adjustments_leave_subtotal(
            lines in proptest::collection::vec(0.0f64..10_000.0, 0..10),
        ) {
            let totals = Totals::over(lines.iter().copied());
            prop_assert_eq!(totals.total(), totals.subtotal());
        }
    }
}
