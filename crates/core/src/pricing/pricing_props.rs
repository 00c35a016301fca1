//! Property-based tests for line and bill arithmetic.
//!
//! - Line identities: subtotal, tax, and total reconcile for any input
//! - Bill identities: the grand total and round-off reconcile exactly
//! - Rounding bounds: round-off never exceeds half a currency unit

use khata_shared::types::money::round_to_unit;
use khata_shared::types::{ProductId, TaxRate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::line::{LineInput, price_line};
use super::totals::{BillDiscount, price_bill};

/// Strategy for unit prices between 0.01 and 10,000.00.
fn unit_price() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for quantities between 1 and 500.
fn quantity() -> impl Strategy<Value = i64> {
    1i64..500i64
}

/// Strategy over the GST slabs in actual use.
fn gst_rate() -> impl Strategy<Value = TaxRate> {
    prop_oneof![Just(0u32), Just(5), Just(12), Just(18), Just(28)]
        .prop_map(|slab| TaxRate::new(Decimal::from(slab)).unwrap())
}

/// Helper to build a line input with no discount.
fn make_line(quantity: i64, unit_price: Decimal, rate: TaxRate, inclusive: bool) -> LineInput {
    LineInput {
        product_id: ProductId::new(),
        description: "Prop item".to_string(),
        quantity,
        unit_price,
        discount: Decimal::ZERO,
        tax_rate: rate,
        tax_inclusive: inclusive,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // =========================================================================
    // Line identities
    // =========================================================================

    /// For any exclusive line, total = subtotal + tax and tax is non-negative.
    #[test]
    fn prop_exclusive_line_reconciles(
        qty in quantity(),
        price in unit_price(),
        rate in gst_rate(),
    ) {
        let line = price_line(&make_line(qty, price, rate, false)).unwrap();
        prop_assert_eq!(line.subtotal, price * Decimal::from(qty));
        prop_assert_eq!(line.total, line.subtotal + line.tax_amount);
        prop_assert!(line.tax_amount >= Decimal::ZERO);
    }

    /// For any inclusive line, the carved-out tax never exceeds the subtotal
    /// and the line total stays at the subtotal.
    #[test]
    fn prop_inclusive_line_reconciles(
        qty in quantity(),
        price in unit_price(),
        rate in gst_rate(),
    ) {
        let line = price_line(&make_line(qty, price, rate, true)).unwrap();
        prop_assert_eq!(line.total, line.subtotal);
        prop_assert!(line.tax_amount >= Decimal::ZERO);
        prop_assert!(line.tax_amount <= line.subtotal);
    }

    /// Any discount up to the line amount is accepted and lands exactly on
    /// the subtotal.
    #[test]
    fn prop_line_discount_lands_on_subtotal(
        qty in quantity(),
        price in unit_price(),
        rate in gst_rate(),
        discount_cents in 0i64..1_000_000i64,
    ) {
        let amount = price * Decimal::from(qty);
        let discount = Decimal::new(discount_cents, 2).min(amount);

        let mut input = make_line(qty, price, rate, false);
        input.discount = discount;

        let line = price_line(&input).unwrap();
        prop_assert_eq!(line.subtotal, amount - discount);
        prop_assert!(line.subtotal >= Decimal::ZERO);
    }

    // =========================================================================
    // Bill identities
    // =========================================================================

    /// The grand total is exactly the rounded sum and the round-off is the
    /// exact residue, bounded by half a unit.
    #[test]
    fn prop_bill_total_reconciles(
        qty in quantity(),
        price in unit_price(),
        rate in gst_rate(),
        inclusive in any::<bool>(),
        other_cents in 0i64..100_000i64,
    ) {
        let line = price_line(&make_line(qty, price, rate, inclusive)).unwrap();
        let other = Decimal::new(other_cents, 2);

        let totals = price_bill(std::slice::from_ref(&line), BillDiscount::NONE, other).unwrap();

        let unrounded = totals.subtotal - totals.discount + totals.tax_amount + other;
        prop_assert_eq!(totals.total, round_to_unit(unrounded));
        prop_assert_eq!(totals.round_off, totals.total - unrounded);
        prop_assert!(totals.round_off.abs() <= Decimal::new(5, 1));
    }

    /// A percentage discount resolves proportionally: 0% takes nothing and
    /// 100% takes the whole subtotal.
    #[test]
    fn prop_percent_discount_proportional(
        qty in quantity(),
        price in unit_price(),
        rate in gst_rate(),
    ) {
        let line = price_line(&make_line(qty, price, rate, false)).unwrap();

        let none = price_bill(std::slice::from_ref(&line), BillDiscount::Percent(Decimal::ZERO), Decimal::ZERO).unwrap();
        prop_assert_eq!(none.discount, Decimal::ZERO);

        let all = price_bill(std::slice::from_ref(&line), BillDiscount::Percent(Decimal::from(100)), Decimal::ZERO).unwrap();
        prop_assert_eq!(all.discount, all.subtotal);
    }

    /// Bill subtotal and tax are the exact sums of the line figures.
    #[test]
    fn prop_bill_sums_lines(
        qty_a in quantity(),
        qty_b in quantity(),
        price_a in unit_price(),
        price_b in unit_price(),
        rate in gst_rate(),
    ) {
        let lines = vec![
            price_line(&make_line(qty_a, price_a, rate, false)).unwrap(),
            price_line(&make_line(qty_b, price_b, rate, true)).unwrap(),
        ];

        let totals = price_bill(&lines, BillDiscount::NONE, Decimal::ZERO).unwrap();
        prop_assert_eq!(totals.subtotal, lines[0].subtotal + lines[1].subtotal);
        prop_assert_eq!(totals.tax_amount, lines[0].tax_amount + lines[1].tax_amount);
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use rust_decimal_macros::dec;

    /// The worked retail example: 2 x 100 at 18% exclusive with a 10%-off
    /// sibling bill.
    #[test]
    fn test_worked_example() {
        let line = price_line(&make_line(2, dec!(100), TaxRate::new(dec!(18)).unwrap(), false))
            .unwrap();
        assert_eq!(line.subtotal, dec!(200));
        assert_eq!(line.tax_amount, dec!(36.00));
        assert_eq!(line.total, dec!(236.00));

        let totals = price_bill(
            std::slice::from_ref(&line),
            BillDiscount::NONE,
            Decimal::ZERO,
        )
        .unwrap();
        assert_eq!(totals.total, dec!(236));
    }
}
