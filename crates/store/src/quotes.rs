//! DashMap-backed quotation store.

use chrono::NaiveDate;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;

use khata_core::quote::{Quotation, QuoteDecision, QuoteError, QuoteStore};
use khata_shared::types::QuotationId;

use crate::registry::{decode, decode_id, EntityKind, RegistryError, RestoreTarget};

/// In-memory quotation store.
///
/// Decisions validate and write inside one map entry guard, so two
/// concurrent conversions of the same quotation cannot both succeed.
#[derive(Debug, Default)]
pub struct MemoryQuotes {
    quotes: DashMap<QuotationId, Quotation>,
}

impl MemoryQuotes {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of quotations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// Whether the store holds no quotations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

impl QuoteStore for MemoryQuotes {
    fn insert(&self, quote: Quotation) -> Result<(), QuoteError> {
        match self.quotes.entry(quote.id) {
            Entry::Occupied(_) => Err(QuoteError::Conflict),
            Entry::Vacant(slot) => {
                slot.insert(quote);
                Ok(())
            }
        }
    }

    fn get(&self, id: QuotationId) -> Result<Quotation, QuoteError> {
        self.quotes
            .get(&id)
            .map(|kv| kv.value().clone())
            .ok_or(QuoteError::NotFound(id))
    }

    fn decide(
        &self,
        id: QuotationId,
        decision: QuoteDecision,
        today: NaiveDate,
    ) -> Result<Quotation, QuoteError> {
        let mut quote = self.quotes.get_mut(&id).ok_or(QuoteError::NotFound(id))?;
        quote.try_decide(decision, today)?;
        Ok(quote.clone())
    }

    fn list(&self) -> Vec<Quotation> {
        self.quotes.iter().map(|kv| kv.value().clone()).collect()
    }
}

impl RestoreTarget for MemoryQuotes {
    fn upsert(&self, record: Value) -> Result<(), RegistryError> {
        let quote: Quotation = decode(EntityKind::Quotation, record)?;
        self.quotes.insert(quote.id, quote);
        Ok(())
    }

    fn remove(&self, id: &str) -> Result<bool, RegistryError> {
        let id: QuotationId = decode_id(id)?;
        Ok(self.quotes.remove(&id).is_some())
    }
}
