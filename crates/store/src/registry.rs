//! Entity-kind registry for snapshot restore.
//!
//! A snapshot is a list of serialized records per entity kind. The
//! registry maps each kind to the live store that absorbs its records,
//! so a restore walks kinds generically instead of naming collections
//! in code. Embedders register their stores once at startup.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// The restorable entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Catalog products.
    Product,
    /// Bills, drafts included.
    Bill,
    /// Credit ledger entries.
    CreditEntry,
    /// Quotations.
    Quotation,
}

impl EntityKind {
    /// Every kind, in restore order. Products first: bills and credit
    /// entries reference them.
    pub const ALL: [Self; 4] = [Self::Product, Self::Bill, Self::CreditEntry, Self::Quotation];

    /// Stable snake_case name, matching the serialized form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Bill => "bill",
            Self::CreditEntry => "credit_entry",
            Self::Quotation => "quotation",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by restore operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No target registered for the kind.
    #[error("no restore target registered for {0}")]
    Unregistered(EntityKind),

    /// Record payload did not deserialize as the kind's type.
    #[error("malformed {kind} record: {reason}")]
    Malformed {
        /// Kind the record was submitted under.
        kind: EntityKind,
        /// Deserializer message.
        reason: String,
    },

    /// Id string did not parse as a UUID.
    #[error("malformed id: {0}")]
    BadId(String),
}

/// A collection that can absorb restored records.
///
/// Implemented by each store in this crate; an embedder with its own
/// persistence implements it there instead.
pub trait RestoreTarget {
    /// Inserts or replaces one record from its serialized form.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Malformed`] when the payload does not
    /// deserialize.
    fn upsert(&self, record: Value) -> Result<(), RegistryError>;

    /// Deletes one record by id. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::BadId`] when the id does not parse.
    fn remove(&self, id: &str) -> Result<bool, RegistryError>;
}

/// Outcome of a batch restore.
#[derive(Debug, Default)]
pub struct RestoreReport {
    /// Records applied.
    pub applied: usize,
    /// Records skipped, by input index.
    pub failed: Vec<(usize, RegistryError)>,
}

/// Maps entity kinds to live restore targets.
#[derive(Default)]
pub struct Registry<'a> {
    targets: HashMap<EntityKind, &'a dyn RestoreTarget>,
}

impl<'a> Registry<'a> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the live target for a kind, replacing any previous one.
    pub fn register(&mut self, kind: EntityKind, target: &'a dyn RestoreTarget) {
        self.targets.insert(kind, target);
    }

    /// Inserts or replaces one record.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Unregistered`] or the target's error.
    pub fn upsert(&self, kind: EntityKind, record: Value) -> Result<(), RegistryError> {
        self.target(kind)?.upsert(record)
    }

    /// Deletes one record by id. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Unregistered`] or the target's error.
    pub fn remove(&self, kind: EntityKind, id: &str) -> Result<bool, RegistryError> {
        self.target(kind)?.remove(id)
    }

    /// Absorbs a batch of records for one kind.
    ///
    /// A malformed record never aborts the batch; failures are
    /// warn-logged and reported back by input index.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Unregistered`] when no target is
    /// registered for the kind.
    pub fn restore(
        &self,
        kind: EntityKind,
        records: Vec<Value>,
    ) -> Result<RestoreReport, RegistryError> {
        let target = self.target(kind)?;
        let mut report = RestoreReport::default();
        for (index, record) in records.into_iter().enumerate() {
            match target.upsert(record) {
                Ok(()) => report.applied += 1,
                Err(err) => {
                    warn!(kind = kind.as_str(), index, error = %err, "skipping bad record");
                    report.failed.push((index, err));
                }
            }
        }
        Ok(report)
    }

    fn target(&self, kind: EntityKind) -> Result<&dyn RestoreTarget, RegistryError> {
        self.targets
            .get(&kind)
            .copied()
            .ok_or(RegistryError::Unregistered(kind))
    }
}

/// Decodes a record payload for `kind`.
pub(crate) fn decode<T: serde::de::DeserializeOwned>(
    kind: EntityKind,
    record: Value,
) -> Result<T, RegistryError> {
    serde_json::from_value(record).map_err(|err| RegistryError::Malformed {
        kind,
        reason: err.to_string(),
    })
}

/// Parses a typed id from its string form.
pub(crate) fn decode_id<T: std::str::FromStr>(id: &str) -> Result<T, RegistryError> {
    id.parse().map_err(|_| RegistryError::BadId(id.to_string()))
}
