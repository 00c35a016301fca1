//! Storage capability for credit entries.

use chrono::{DateTime, NaiveDate, Utc};

use khata_shared::types::{BillId, CreditEntryId};

use crate::billing::types::Payment;

use super::entry::{CreditEntry, CreditStatus};
use super::error::CreditError;

/// Persistence seam for the credit ledger.
///
/// Mutating operations are atomic per entry: validation and write happen
/// under one per-entry guard so concurrent payments can never push an
/// entry past its total.
pub trait CreditStore {
    /// Inserts a new entry.
    ///
    /// # Errors
    ///
    /// Returns [`CreditError::Conflict`] when the id is already present.
    fn insert(&self, entry: CreditEntry) -> Result<(), CreditError>;

    /// Fetches an entry by id.
    ///
    /// # Errors
    ///
    /// Returns [`CreditError::NotFound`].
    fn get(&self, id: CreditEntryId) -> Result<CreditEntry, CreditError>;

    /// Validates and appends a payment under the per-entry guard.
    ///
    /// Returns the updated entry.
    ///
    /// # Errors
    ///
    /// Returns [`CreditError::NotFound`], [`CreditError::NonPositivePayment`]
    /// or [`CreditError::Overpayment`].
    fn append_payment(&self, id: CreditEntryId, payment: Payment)
        -> Result<CreditEntry, CreditError>;

    /// Stamps reminder metadata under the per-entry guard.
    ///
    /// Bumps the reminder count and records `at` as the last reminder
    /// time. Returns the updated entry.
    ///
    /// # Errors
    ///
    /// Returns [`CreditError::AlreadySettled`] for settled entries.
    fn record_reminder(
        &self,
        id: CreditEntryId,
        at: DateTime<Utc>,
    ) -> Result<CreditEntry, CreditError>;

    /// Snapshot of every entry, unordered.
    fn all(&self) -> Vec<CreditEntry>;

    /// The entry opened for a bill, if any.
    fn find_by_bill(&self, bill: BillId) -> Option<CreditEntry>;

    /// Entries that still have a pending amount.
    fn outstanding(&self) -> Vec<CreditEntry> {
        self.all()
            .into_iter()
            .filter(|entry| !entry.is_settled())
            .collect()
    }

    /// Entries overdue as of `today`.
    fn overdue(&self, today: NaiveDate) -> Vec<CreditEntry> {
        self.all()
            .into_iter()
            .filter(|entry| entry.status(today) == CreditStatus::Overdue)
            .collect()
    }

    /// All entries for one party phone number.
    fn by_party_phone(&self, phone: &str) -> Vec<CreditEntry> {
        self.all()
            .into_iter()
            .filter(|entry| entry.phone == phone)
            .collect()
    }
}
