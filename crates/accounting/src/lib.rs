//! `ledgerly-accounting` — money totals for both order kinds.
//!
//! Purchase orders and customer orders share one formula shape (additive
//! charges minus subtractive reductions) but keep their own adjustment
//! vocabularies (tax vs. credit), so each is a thin instance over [`Totals`]
//! rather than a literal duplicate.

pub mod totals;

pub use totals::{
    CustomerTotals, PurchaseTotals, Totals, customer_order_totals, format_amount,
    purchase_order_totals,
};
