//! Property tests for credit entry arithmetic.
//!
//! The entry's derived amounts must stay consistent under any sequence
//! of payment attempts, and the status derivation must hold for any
//! date relative to the due date.

use chrono::{Duration, NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use khata_shared::types::{BillId, CreditEntryId};

use crate::billing::types::{BillKind, Payment, PaymentInput, PaymentMode};
use crate::credit::entry::{BillRef, CreditEntry, CreditStatus};
use crate::numbering::{DocumentKind, DocumentNumber};

fn make_entry(total: Decimal) -> CreditEntry {
    CreditEntry {
        id: CreditEntryId::new(),
        party_name: "Ramesh".to_string(),
        phone: "9876543210".to_string(),
        bill: BillRef {
            id: BillId::new(),
            number: DocumentNumber::compose(DocumentKind::Sale, 2025, 1, 6),
            kind: BillKind::Sale,
        },
        total_amount: total,
        payments: Vec::new(),
        due_date: NaiveDate::from_ymd_opt(2025, 7, 15).unwrap(),
        reminder_count: 0,
        last_reminder_at: None,
        opened_at: Utc::now(),
        notes: None,
    }
}

fn payment(amount: Decimal) -> Payment {
    PaymentInput::new(amount, PaymentMode::Cash).into_payment(Utc::now())
}

fn money() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn attempts() -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec(
        (1i64..200_000i64).prop_map(|cents| Decimal::new(cents, 2)),
        1..12,
    )
}

fn day_offset() -> impl Strategy<Value = i64> {
    -100i64..100i64
}

// ========== Conservation ==========

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Paid plus pending equals the total after every accepted payment.
    #[test]
    fn prop_paid_plus_pending_is_total(total in money(), amounts in attempts()) {
        let mut entry = make_entry(total);
        for amount in amounts {
            let _ = entry.try_add_payment(payment(amount));
            prop_assert_eq!(
                entry.paid_amount() + entry.pending_amount(),
                entry.total_amount
            );
        }
    }

    /// The payment list sums to exactly the derived paid amount.
    #[test]
    fn prop_payments_sum_to_paid(total in money(), amounts in attempts()) {
        let mut entry = make_entry(total);
        let mut accepted = Decimal::ZERO;
        for amount in amounts {
            if entry.try_add_payment(payment(amount)).is_ok() {
                accepted += amount;
            }
        }
        prop_assert_eq!(entry.paid_amount(), accepted);
    }
}

// ========== Overpayment ==========

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// No sequence of payments can push the paid amount past the total.
    #[test]
    fn prop_overpayment_never_accepted(total in money(), amounts in attempts()) {
        let mut entry = make_entry(total);
        for amount in amounts {
            let _ = entry.try_add_payment(payment(amount));
        }
        prop_assert!(entry.paid_amount() <= entry.total_amount);
    }

    /// A settled entry rejects every further payment.
    #[test]
    fn prop_settled_entry_rejects_payments(total in money(), extra in money()) {
        let mut entry = make_entry(total);
        entry.try_add_payment(payment(total)).unwrap();
        prop_assert!(entry.is_settled());
        prop_assert!(entry.try_add_payment(payment(extra)).is_err());
    }
}

// ========== Status derivation ==========

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any partial repayment pins the status to partial on every date.
    #[test]
    fn prop_partial_wins_over_due_date(
        total in (2i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2)),
        offset in day_offset(),
    ) {
        let mut entry = make_entry(total);
        entry.try_add_payment(payment(Decimal::new(1, 2))).unwrap();
        let today = entry.due_date + Duration::days(offset);
        prop_assert_eq!(entry.status(today), CreditStatus::Partial);
    }

    /// An untouched entry is overdue strictly after its due date and
    /// pending up to and including the due date itself.
    #[test]
    fn prop_untouched_status_follows_due_date(total in money(), offset in day_offset()) {
        let entry = make_entry(total);
        let today = entry.due_date + Duration::days(offset);
        let expected = if offset > 0 {
            CreditStatus::Overdue
        } else {
            CreditStatus::Pending
        };
        prop_assert_eq!(entry.status(today), expected);
    }
}

mod unit_tests {
    use super::*;

    #[test]
    fn test_exact_settlement_sequence() {
        // 500.00 settled in two installments.
        let mut entry = make_entry(Decimal::new(50_000, 2));
        entry
            .try_add_payment(payment(Decimal::new(20_000, 2)))
            .unwrap();
        entry
            .try_add_payment(payment(Decimal::new(30_000, 2)))
            .unwrap();
        assert!(entry.is_settled());
        assert_eq!(entry.paid_amount(), Decimal::new(50_000, 2));
        assert_eq!(entry.pending_amount(), Decimal::ZERO);
    }
}
