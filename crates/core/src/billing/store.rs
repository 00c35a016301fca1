//! Storage capability for bills.

use khata_shared::types::BillId;

use super::error::BillError;
use super::types::{Bill, Party, Payment};

/// Header fields that may change after a bill exists.
///
/// Financial fields never appear here; lines, totals and payments are
/// immutable once a bill is finalized.
#[derive(Debug, Clone, Default)]
pub struct HeaderPatch {
    /// Replacement party details, if changing.
    pub party: Option<Party>,
    /// Replacement notes, if changing.
    pub notes: Option<String>,
}

/// Persistence seam for bills.
///
/// Mutating operations are atomic per bill: validation and write happen
/// under one per-bill guard so concurrent payments can never push a bill
/// past its total.
pub trait BillStore {
    /// Inserts a new bill.
    ///
    /// # Errors
    ///
    /// Returns [`BillError::Conflict`] when the id is already present.
    fn insert(&self, bill: Bill) -> Result<(), BillError>;

    /// Fetches a bill by id.
    ///
    /// # Errors
    ///
    /// Returns [`BillError::NotFound`].
    fn get(&self, id: BillId) -> Result<Bill, BillError>;

    /// Validates and appends a payment under the per-bill guard.
    ///
    /// Returns the updated bill.
    ///
    /// # Errors
    ///
    /// Returns [`BillError::NotFound`], [`BillError::NotFinalized`],
    /// [`BillError::NonPositivePayment`] or [`BillError::Overpayment`].
    fn append_payment(&self, id: BillId, payment: Payment) -> Result<Bill, BillError>;

    /// Applies a header patch. Returns the updated bill.
    ///
    /// # Errors
    ///
    /// Returns [`BillError::NotFound`].
    fn amend_header(&self, id: BillId, patch: HeaderPatch) -> Result<Bill, BillError>;

    /// Replaces a stored draft wholesale under the per-bill guard.
    ///
    /// # Errors
    ///
    /// Returns [`BillError::NotFound`] or, when the stored bill is no
    /// longer a draft, [`BillError::NotADraft`].
    fn replace_draft(&self, id: BillId, bill: Bill) -> Result<(), BillError>;

    /// Removes a draft and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`BillError::NotFound`] or [`BillError::NotADraft`].
    fn remove_draft(&self, id: BillId) -> Result<Bill, BillError>;

    /// Snapshot of every bill, unordered.
    fn list(&self) -> Vec<Bill>;
}
