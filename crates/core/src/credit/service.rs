//! Credit ledger operations.
//!
//! [`CreditLedger`] is the udhari-side counterpart of the billing
//! service: repayments, reminders and the nightly status sweep. It never
//! writes back to bills; a bill learns nothing from payments recorded
//! directly against its credit entry.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::info;

use khata_shared::types::{calendar, CreditEntryId};
use khata_shared::EngineConfig;

use crate::billing::types::PaymentInput;
use crate::events::{dispatch, DomainEvent, NotificationSink};

use super::entry::{CreditEntry, CreditStatus};
use super::error::CreditError;
use super::store::CreditStore;

/// Outcome of a bulk reminder sweep.
#[derive(Debug, Default)]
pub struct ReminderRun {
    /// Entries reminded.
    pub sent: usize,
    /// Entries that failed, with the cause.
    pub failed: Vec<(CreditEntryId, CreditError)>,
}

/// Operations over the book of open credit entries.
pub struct CreditLedger<'a, S, N> {
    store: &'a S,
    sink: &'a N,
    config: &'a EngineConfig,
}

impl<'a, S, N> CreditLedger<'a, S, N>
where
    S: CreditStore,
    N: NotificationSink,
{
    /// Builds a ledger over the given collaborators.
    pub const fn new(store: &'a S, sink: &'a N, config: &'a EngineConfig) -> Self {
        Self {
            store,
            sink,
            config,
        }
    }

    /// Records a repayment directly against a credit entry.
    ///
    /// Overpayment checks run inside the store guard. The linked bill is
    /// not updated.
    ///
    /// # Errors
    ///
    /// Returns [`CreditError::NotFound`], [`CreditError::NonPositivePayment`]
    /// or [`CreditError::Overpayment`].
    pub fn add_payment(
        &self,
        id: CreditEntryId,
        input: PaymentInput,
        now: DateTime<Utc>,
    ) -> Result<CreditEntry, CreditError> {
        let payment = input.into_payment(now);
        let amount = payment.amount;
        let entry = self.store.append_payment(id, payment)?;

        dispatch(
            self.sink,
            &[DomainEvent::PaymentReceived {
                bill_number: entry.bill.number.to_string(),
                party: entry.party_name.clone(),
                amount,
                pending: entry.pending_amount(),
            }],
        );
        info!(
            number = %entry.bill.number,
            amount = %amount,
            pending = %entry.pending_amount(),
            "credit repayment recorded"
        );
        Ok(entry)
    }

    /// Sends a payment reminder for one entry.
    ///
    /// The reminder count and timestamp are stamped even when the sink
    /// fails to deliver; delivery is best-effort.
    ///
    /// # Errors
    ///
    /// Returns [`CreditError::AlreadySettled`] for settled entries.
    pub fn send_reminder(
        &self,
        id: CreditEntryId,
        now: DateTime<Utc>,
    ) -> Result<CreditEntry, CreditError> {
        let entry = self.store.record_reminder(id, now)?;

        dispatch(
            self.sink,
            &[DomainEvent::PaymentReminder {
                bill_number: entry.bill.number.to_string(),
                party: entry.party_name.clone(),
                phone: entry.phone.clone(),
                pending: entry.pending_amount(),
                due_date: entry.due_date,
            }],
        );
        info!(
            number = %entry.bill.number,
            party = entry.party_name,
            reminder_count = entry.reminder_count,
            "payment reminder sent"
        );
        Ok(entry)
    }

    /// Reminds every unsettled entry past its due date, partial payers
    /// included. Entries that fail do not stop the rest.
    pub fn send_bulk_reminders(&self, now: DateTime<Utc>) -> ReminderRun {
        let today = calendar::business_date(now, self.config.billing.timezone);
        let mut run = ReminderRun::default();
        for entry in self.store.outstanding() {
            if entry.due_date >= today {
                continue;
            }
            match self.send_reminder(entry.id, now) {
                Ok(_) => run.sent += 1,
                Err(err) => run.failed.push((entry.id, err)),
            }
        }
        info!(
            sent = run.sent,
            failed = run.failed.len(),
            "bulk reminder sweep finished"
        );
        run
    }

    /// Derives the status of every entry as of the business date.
    ///
    /// Statuses are never stored, so the nightly sweep is a pure read:
    /// running it twice, or never, changes nothing.
    #[must_use]
    pub fn reconcile(&self, now: DateTime<Utc>) -> Vec<(CreditEntryId, CreditStatus)> {
        let today = calendar::business_date(now, self.config.billing.timezone);
        self.store
            .all()
            .into_iter()
            .map(|entry| (entry.id, entry.status(today)))
            .collect()
    }

    /// Total amount pending across all open entries.
    #[must_use]
    pub fn outstanding_total(&self) -> Decimal {
        self.store
            .outstanding()
            .iter()
            .map(CreditEntry::pending_amount)
            .sum()
    }

    /// Amount one party still owes across all their entries.
    #[must_use]
    pub fn party_outstanding(&self, phone: &str) -> Decimal {
        self.store
            .by_party_phone(phone)
            .iter()
            .map(CreditEntry::pending_amount)
            .sum()
    }
}
