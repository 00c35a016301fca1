//! DashMap-backed credit ledger book.

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;
use tracing::debug;

use khata_core::billing::Payment;
use khata_core::credit::{CreditEntry, CreditError, CreditStore};
use khata_shared::types::{BillId, CreditEntryId};

use crate::registry::{decode, decode_id, EntityKind, RegistryError, RestoreTarget};

/// In-memory credit ledger book.
///
/// Payment appends validate and write inside one map entry guard, which
/// is the per-entry atomicity [`CreditStore`] asks for.
#[derive(Debug, Default)]
pub struct MemoryCreditBook {
    entries: DashMap<CreditEntryId, CreditEntry>,
}

impl MemoryCreditBook {
    /// Creates an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries, settled included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the book holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CreditStore for MemoryCreditBook {
    fn insert(&self, entry: CreditEntry) -> Result<(), CreditError> {
        match self.entries.entry(entry.id) {
            Entry::Occupied(_) => Err(CreditError::Conflict),
            Entry::Vacant(slot) => {
                slot.insert(entry);
                Ok(())
            }
        }
    }

    fn get(&self, id: CreditEntryId) -> Result<CreditEntry, CreditError> {
        self.entries
            .get(&id)
            .map(|kv| kv.value().clone())
            .ok_or(CreditError::NotFound(id))
    }

    fn append_payment(
        &self,
        id: CreditEntryId,
        payment: Payment,
    ) -> Result<CreditEntry, CreditError> {
        let mut entry = self.entries.get_mut(&id).ok_or(CreditError::NotFound(id))?;
        entry.try_add_payment(payment)?;
        debug!(
            party = %entry.party_name,
            pending = %entry.pending_amount(),
            "credit payment appended"
        );
        Ok(entry.clone())
    }

    fn record_reminder(
        &self,
        id: CreditEntryId,
        at: DateTime<Utc>,
    ) -> Result<CreditEntry, CreditError> {
        let mut entry = self.entries.get_mut(&id).ok_or(CreditError::NotFound(id))?;
        if entry.is_settled() {
            return Err(CreditError::AlreadySettled(id));
        }
        entry.reminder_count += 1;
        entry.last_reminder_at = Some(at);
        Ok(entry.clone())
    }

    fn all(&self) -> Vec<CreditEntry> {
        self.entries.iter().map(|kv| kv.value().clone()).collect()
    }

    fn find_by_bill(&self, bill: BillId) -> Option<CreditEntry> {
        self.entries
            .iter()
            .find(|kv| kv.value().bill.id == bill)
            .map(|kv| kv.value().clone())
    }
}

impl RestoreTarget for MemoryCreditBook {
    fn upsert(&self, record: Value) -> Result<(), RegistryError> {
        let entry: CreditEntry = decode(EntityKind::CreditEntry, record)?;
        self.entries.insert(entry.id, entry);
        Ok(())
    }

    fn remove(&self, id: &str) -> Result<bool, RegistryError> {
        let id: CreditEntryId = decode_id(id)?;
        Ok(self.entries.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use khata_core::billing::{BillKind, PaymentInput, PaymentMode};
    use khata_core::credit::BillRef;
    use khata_core::numbering::{DocumentKind, DocumentNumber};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

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
            due_date: NaiveDate::from_ymd_opt(2025, 7, 31).unwrap(),
            reminder_count: 0,
            last_reminder_at: None,
            opened_at: Utc::now(),
            notes: None,
        }
    }

    fn pay(amount: Decimal) -> Payment {
        PaymentInput::new(amount, PaymentMode::Upi).into_payment(Utc::now())
    }

    #[test]
    fn test_append_payment_validates_under_guard() {
        let book = MemoryCreditBook::new();
        let entry = make_entry(dec!(500));
        let id = entry.id;
        book.insert(entry).unwrap();

        book.append_payment(id, pay(dec!(450))).unwrap();
        assert!(matches!(
            book.append_payment(id, pay(dec!(100))),
            Err(CreditError::Overpayment { pending, .. }) if pending == dec!(50)
        ));
        assert_eq!(book.get(id).unwrap().paid_amount(), dec!(450));
    }

    #[test]
    fn test_record_reminder_stamps_metadata() {
        let book = MemoryCreditBook::new();
        let entry = make_entry(dec!(500));
        let id = entry.id;
        book.insert(entry).unwrap();

        let at = Utc::now();
        let updated = book.record_reminder(id, at).unwrap();
        assert_eq!(updated.reminder_count, 1);
        assert_eq!(updated.last_reminder_at, Some(at));

        book.append_payment(id, pay(dec!(500))).unwrap();
        assert!(matches!(
            book.record_reminder(id, Utc::now()),
            Err(CreditError::AlreadySettled(_))
        ));
    }

    #[test]
    fn test_find_by_bill() {
        let book = MemoryCreditBook::new();
        let entry = make_entry(dec!(500));
        let bill_id = entry.bill.id;
        let entry_id = entry.id;
        book.insert(entry).unwrap();

        assert_eq!(book.find_by_bill(bill_id).unwrap().id, entry_id);
        assert!(book.find_by_bill(BillId::new()).is_none());
    }

    #[test]
    fn test_outstanding_filters_settled() {
        let book = MemoryCreditBook::new();
        let open = make_entry(dec!(500));
        let open_id = open.id;
        let settled = make_entry(dec!(200));
        let settled_id = settled.id;
        book.insert(open).unwrap();
        book.insert(settled).unwrap();
        book.append_payment(settled_id, pay(dec!(200))).unwrap();

        let outstanding = book.outstanding();
        assert_eq!(outstanding.len(), 1);
        assert_eq!(outstanding[0].id, open_id);
    }
}
