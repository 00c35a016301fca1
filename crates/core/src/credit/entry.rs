//! Credit (udhari) entries.
//!
//! An entry tracks the unpaid remainder of one finalized bill for one
//! identified party. Paid amount, pending amount and status are always
//! derived from the entry's total and payment list; a nightly sweep has
//! nothing to write back, it just reads the same derivation.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use khata_shared::types::{calendar, BillId, CreditEntryId};

use crate::billing::types::{BillKind, Payment};
use crate::numbering::DocumentNumber;

use super::error::CreditError;

/// Repayment state of a credit entry, derived on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditStatus {
    /// Fully settled.
    Paid,
    /// Partly repaid, regardless of the due date.
    Partial,
    /// Untouched and past its due date.
    Overdue,
    /// Untouched and not yet due.
    Pending,
}

impl CreditStatus {
    /// Stable lowercase name, matching the serialized form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::Partial => "partial",
            Self::Overdue => "overdue",
            Self::Pending => "pending",
        }
    }
}

impl std::fmt::Display for CreditStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The bill a credit entry was opened for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillRef {
    /// Bill id.
    pub id: BillId,
    /// Document number of the finalized bill.
    pub number: DocumentNumber,
    /// Sale or purchase.
    pub kind: BillKind,
}

/// One party's outstanding balance against one bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditEntry {
    /// Unique entry id.
    pub id: CreditEntryId,
    /// Party display name.
    pub party_name: String,
    /// Party contact number. Entries only open for reachable parties.
    pub phone: String,
    /// Bill this entry tracks.
    pub bill: BillRef,
    /// Full bill total the entry was opened with.
    pub total_amount: Decimal,
    /// Payments recorded so far, mirrored from the bill plus any
    /// recorded directly against the entry, oldest first.
    pub payments: Vec<Payment>,
    /// Date the pending amount falls due.
    pub due_date: NaiveDate,
    /// How many reminders were sent.
    pub reminder_count: u32,
    /// When the last reminder went out.
    pub last_reminder_at: Option<DateTime<Utc>>,
    /// When the entry was opened.
    pub opened_at: DateTime<Utc>,
    /// Free-form notes.
    pub notes: Option<String>,
}

impl CreditEntry {
    /// Sum of all recorded payments.
    #[must_use]
    pub fn paid_amount(&self) -> Decimal {
        self.payments.iter().map(|payment| payment.amount).sum()
    }

    /// Amount still owed, floored at zero.
    #[must_use]
    pub fn pending_amount(&self) -> Decimal {
        (self.total_amount - self.paid_amount()).max(Decimal::ZERO)
    }

    /// Whether nothing remains pending.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.pending_amount() == Decimal::ZERO
    }

    /// Status as of `today`.
    ///
    /// Partial repayment wins over the due date: a party who has paid
    /// something shows as `partial` even long past due.
    #[must_use]
    pub fn status(&self, today: NaiveDate) -> CreditStatus {
        let paid = self.paid_amount();
        if self.total_amount - paid <= Decimal::ZERO {
            CreditStatus::Paid
        } else if paid > Decimal::ZERO {
            CreditStatus::Partial
        } else if self.due_date < today {
            CreditStatus::Overdue
        } else {
            CreditStatus::Pending
        }
    }

    /// Days past due as of `today`; negative while not yet due.
    #[must_use]
    pub fn days_overdue(&self, today: NaiveDate) -> i64 {
        calendar::days_overdue(self.due_date, today)
    }

    /// Validates and appends a payment.
    ///
    /// Stores call this while holding their per-entry guard, which makes
    /// the pending-amount check and the append a single atomic step.
    ///
    /// # Errors
    ///
    /// Returns [`CreditError::NonPositivePayment`] or
    /// [`CreditError::Overpayment`]; the entry is unchanged then.
    pub fn try_add_payment(&mut self, payment: Payment) -> Result<(), CreditError> {
        if payment.amount <= Decimal::ZERO {
            return Err(CreditError::NonPositivePayment);
        }
        let pending = self.pending_amount();
        if payment.amount > pending {
            return Err(CreditError::Overpayment {
                attempted: payment.amount,
                pending,
            });
        }
        self.payments.push(payment);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::types::{PaymentInput, PaymentMode};
    use rust_decimal_macros::dec;

    fn make_entry(total: Decimal, due: NaiveDate) -> CreditEntry {
        CreditEntry {
            id: CreditEntryId::new(),
            party_name: "Ramesh".to_string(),
            phone: "9876543210".to_string(),
            bill: BillRef {
                id: BillId::new(),
                number: DocumentNumber::compose(crate::numbering::DocumentKind::Sale, 2025, 1, 6),
                kind: BillKind::Sale,
            },
            total_amount: total,
            payments: Vec::new(),
            due_date: due,
            reminder_count: 0,
            last_reminder_at: None,
            opened_at: Utc::now(),
            notes: None,
        }
    }

    fn pay(entry: &mut CreditEntry, amount: Decimal) -> Result<(), CreditError> {
        entry.try_add_payment(PaymentInput::new(amount, PaymentMode::Cash).into_payment(Utc::now()))
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_untouched_entry_is_pending_before_due() {
        let entry = make_entry(dec!(500), date(2025, 7, 15));
        assert_eq!(entry.status(date(2025, 7, 15)), CreditStatus::Pending);
        assert_eq!(entry.pending_amount(), dec!(500));
    }

    #[test]
    fn test_untouched_entry_goes_overdue_after_due() {
        let entry = make_entry(dec!(500), date(2025, 7, 15));
        assert_eq!(entry.status(date(2025, 7, 16)), CreditStatus::Overdue);
        assert_eq!(entry.days_overdue(date(2025, 7, 16)), 1);
    }

    #[test]
    fn test_partial_wins_over_overdue() {
        let mut entry = make_entry(dec!(500), date(2025, 7, 15));
        pay(&mut entry, dec!(100)).unwrap();
        assert_eq!(entry.status(date(2025, 9, 1)), CreditStatus::Partial);
    }

    #[test]
    fn test_settled_entry_is_paid() {
        let mut entry = make_entry(dec!(500), date(2025, 7, 15));
        pay(&mut entry, dec!(500)).unwrap();
        assert!(entry.is_settled());
        assert_eq!(entry.status(date(2025, 9, 1)), CreditStatus::Paid);
    }

    #[test]
    fn test_overpayment_rejected() {
        let mut entry = make_entry(dec!(500), date(2025, 7, 15));
        pay(&mut entry, dec!(400)).unwrap();
        let result = pay(&mut entry, dec!(101));
        assert!(matches!(
            result,
            Err(CreditError::Overpayment { pending, .. }) if pending == dec!(100)
        ));
        assert_eq!(entry.paid_amount(), dec!(400));
    }

    #[test]
    fn test_settled_entry_rejects_any_payment() {
        let mut entry = make_entry(dec!(500), date(2025, 7, 15));
        pay(&mut entry, dec!(500)).unwrap();
        assert!(matches!(
            pay(&mut entry, dec!(1)),
            Err(CreditError::Overpayment { .. })
        ));
    }

    #[test]
    fn test_non_positive_payment_rejected() {
        let mut entry = make_entry(dec!(500), date(2025, 7, 15));
        assert!(matches!(
            pay(&mut entry, Decimal::ZERO),
            Err(CreditError::NonPositivePayment)
        ));
        assert!(matches!(
            pay(&mut entry, dec!(-5)),
            Err(CreditError::NonPositivePayment)
        ));
    }

    #[test]
    fn test_days_overdue_negative_before_due() {
        let entry = make_entry(dec!(500), date(2025, 7, 15));
        assert_eq!(entry.days_overdue(date(2025, 7, 10)), -5);
    }
}
