//! DashMap-backed bill store.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;
use tracing::debug;

use khata_core::billing::{Bill, BillError, BillStore, HeaderPatch, Payment};
use khata_shared::types::BillId;

use crate::registry::{decode, decode_id, EntityKind, RegistryError, RestoreTarget};

/// In-memory bill store.
///
/// Payment appends validate and write inside one map entry guard, which
/// is the per-bill atomicity [`BillStore`] asks for. Draft removal uses
/// the same guard, so a finalize claim cannot race another.
#[derive(Debug, Default)]
pub struct MemoryBills {
    bills: DashMap<BillId, Bill>,
}

impl MemoryBills {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bills, drafts included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bills.len()
    }

    /// Whether the store holds no bills.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bills.is_empty()
    }
}

impl BillStore for MemoryBills {
    fn insert(&self, bill: Bill) -> Result<(), BillError> {
        match self.bills.entry(bill.id) {
            Entry::Occupied(_) => Err(BillError::Conflict),
            Entry::Vacant(slot) => {
                slot.insert(bill);
                Ok(())
            }
        }
    }

    fn get(&self, id: BillId) -> Result<Bill, BillError> {
        self.bills
            .get(&id)
            .map(|kv| kv.value().clone())
            .ok_or(BillError::NotFound(id))
    }

    fn append_payment(&self, id: BillId, payment: Payment) -> Result<Bill, BillError> {
        let mut bill = self.bills.get_mut(&id).ok_or(BillError::NotFound(id))?;
        bill.try_add_payment(payment)?;
        debug!(
            bill = bill.display_number(),
            paid = %bill.paid_amount(),
            "payment appended"
        );
        Ok(bill.clone())
    }

    fn amend_header(&self, id: BillId, patch: HeaderPatch) -> Result<Bill, BillError> {
        let mut bill = self.bills.get_mut(&id).ok_or(BillError::NotFound(id))?;
        if let Some(party) = patch.party {
            bill.party = party;
        }
        if let Some(notes) = patch.notes {
            bill.notes = Some(notes);
        }
        Ok(bill.clone())
    }

    fn replace_draft(&self, id: BillId, bill: Bill) -> Result<(), BillError> {
        let mut stored = self.bills.get_mut(&id).ok_or(BillError::NotFound(id))?;
        if !stored.is_draft {
            return Err(BillError::NotADraft(id));
        }
        *stored = bill;
        Ok(())
    }

    fn remove_draft(&self, id: BillId) -> Result<Bill, BillError> {
        match self.bills.entry(id) {
            Entry::Occupied(slot) if slot.get().is_draft => Ok(slot.remove()),
            Entry::Occupied(_) => Err(BillError::NotADraft(id)),
            Entry::Vacant(_) => Err(BillError::NotFound(id)),
        }
    }

    fn list(&self) -> Vec<Bill> {
        self.bills.iter().map(|kv| kv.value().clone()).collect()
    }
}

impl RestoreTarget for MemoryBills {
    fn upsert(&self, record: Value) -> Result<(), RegistryError> {
        let bill: Bill = decode(EntityKind::Bill, record)?;
        self.bills.insert(bill.id, bill);
        Ok(())
    }

    fn remove(&self, id: &str) -> Result<bool, RegistryError> {
        let id: BillId = decode_id(id)?;
        Ok(self.bills.remove(&id).is_some())
    }
}
