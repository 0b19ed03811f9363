//! On-hand and FIFO views over a product's lots.
//!
//! Read-only: these functions never mutate lots and tolerate an empty slice.

use crate::lot::ProductLot;

/// Total on-hand quantity: the sum over active lots (quantity > 0).
pub fn on_hand(lots: &[ProductLot]) -> i64 {
    lots.iter().filter(|l| l.is_active()).map(|l| l.quantity).sum()
}

/// Active lots in FIFO consumption order.
///
/// Ascending by `date_received`; a lot with no receipt date sorts earliest so
/// the ordering stays total. Ties break by lot id ascending (insertion order).
pub fn fifo_sequence(lots: &[ProductLot]) -> Vec<&ProductLot> {
    let mut active: Vec<&ProductLot> = lots.iter().filter(|l| l.is_active()).collect();
    active.sort_by_key(|l| (l.date_received, l.id));
    active
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use ledgerly_core::{LotId, ProductId};

    fn lot(id: i64, quantity: i64, received_days_ago: Option<i64>) -> ProductLot {
        ProductLot {
            id: LotId::new(id),
            product_id: ProductId::new(1),
            lot_number: format!("LOT-{id:03}"),
            quantity,
            cost_price: 1.0,
            date_received: received_days_ago.map(|d| Utc::now() - Duration::days(d)),
            production_date: None,
            expiration_date: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn on_hand_sums_active_lots_only() {
        let lots = vec![lot(1, 10, Some(3)), lot(2, 0, Some(2)), lot(3, 7, Some(1))];
        assert_eq!(on_hand(&lots), 17);
    }

    #[test]
    fn on_hand_of_no_lots_is_zero() {
        assert_eq!(on_hand(&[]), 0);
        assert!(fifo_sequence(&[]).is_empty());
    }

    #[test]
    fn fifo_returns_oldest_receipt_first() {
        let lots = vec![lot(1, 5, Some(0)), lot(2, 5, Some(10))];
        let seq = fifo_sequence(&lots);
        assert_eq!(seq[0].id, LotId::new(2));
        assert_eq!(seq[1].id, LotId::new(1));
    }

    #[test]
    fn missing_receipt_date_sorts_earliest() {
        let lots = vec![lot(5, 5, Some(30)), lot(9, 5, None)];
        let seq = fifo_sequence(&lots);
        assert_eq!(seq[0].id, LotId::new(9));
    }

    #[test]
    fn ties_break_by_lot_id_ascending() {
        let received = Utc::now();
        let mut a = lot(4, 5, None);
        let mut b = lot(2, 5, None);
        a.date_received = Some(received);
        b.date_received = Some(received);
        let lots = vec![a, b];
        let seq = fifo_sequence(&lots);
        assert_eq!(seq[0].id, LotId::new(2));
        assert_eq!(seq[1].id, LotId::new(4));
    }

    #[test]
    fn exhausted_lots_are_excluded_from_fifo() {
        let lots = vec![lot(1, 0, Some(10)), lot(2, 3, Some(1))];
        let seq = fifo_sequence(&lots);
        assert_eq!(seq.len(), 1);
        assert_eq!(seq[0].id, LotId::new(2));
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ledgerly_core::{LotId, ProductId};
    use proptest::prelude::*;

    fn arb_lot(id: i64) -> impl Strategy<Value = ProductLot> {
        (0i64..500, proptest::option::of(0i64..1_000_000)).prop_map(move |(quantity, secs)| {
            ProductLot {
                id: LotId::new(id),
                product_id: ProductId::new(1),
                lot_number: format!("LOT-{id}"),
                quantity,
                cost_price: 1.0,
                date_received: secs.map(|s| Utc.timestamp_opt(s, 0).unwrap()),
                production_date: None,
                expiration_date: None,
                created_at: Utc::now(),
            }
        })
    }

    fn arb_lots() -> impl Strategy<Value = Vec<ProductLot>> {
        proptest::collection::vec(0i64..500, 0..20).prop_flat_map(|quantities| {
            quantities
                .into_iter()
                .enumerate()
                .map(|(i, _)| arb_lot(i as i64 + 1))
                .collect::<Vec<_>>()
        })
    }

    proptest! {
        #[test]
        fn on_hand_equals_sum_of_positive_quantities(lots in arb_lots()) {
            let expected: i64 = lots.iter().map(|l| l.quantity.max(0)).sum();
            prop_assert_eq!(on_hand(&lots), expected);
        }

        #[test]
        fn fifo_is_totally_ordered(lots in arb_lots()) {
            let seq = fifo_sequence(&lots);
            for pair in seq.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                prop_assert!((a.date_received, a.id) <= (b.date_received, b.id));
            }
        }
    }
}
