//! Document number issuance.
//!
//! Every finalized document carries a number of the form
//! `<PREFIX><year><sequence>`, e.g. `BILL2025000042`. Sequences are
//! per kind and per business year, start at 1, and are handed out by a
//! [`SequenceSource`] that must be atomic: two concurrent callers never
//! see the same value and no value is ever skipped.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kinds of numbered documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Customer-facing sale bill.
    Sale,
    /// Supplier purchase record.
    Purchase,
    /// Price quotation.
    Quotation,
}

impl DocumentKind {
    /// Fixed number prefix for this kind.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Sale => "BILL",
            Self::Purchase => "PUR",
            Self::Quotation => "QUO",
        }
    }
}

/// Issues the next sequence value for a (kind, year) pair.
///
/// Implementations own the atomicity guarantee; callers simply format
/// whatever value comes back. Values within one pair are strictly
/// increasing and gapless.
pub trait SequenceSource {
    /// Returns the next unused sequence value, starting at 1.
    fn next_sequence(&self, kind: DocumentKind, year: i32) -> u64;
}

/// A fully formatted document number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentNumber(String);

impl DocumentNumber {
    /// Formats a number from its parts.
    ///
    /// The sequence is zero-padded to `pad_width` digits; values past
    /// the pad width simply widen the number instead of wrapping.
    #[must_use]
    pub fn compose(kind: DocumentKind, year: i32, sequence: u64, pad_width: usize) -> Self {
        Self(format!(
            "{}{}{:0width$}",
            kind.prefix(),
            year,
            sequence,
            width = pad_width
        ))
    }

    /// Borrows the formatted number.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Draws the next sequence from `source` and formats it.
pub fn next_number<S>(
    source: &S,
    kind: DocumentKind,
    year: i32,
    pad_width: usize,
) -> DocumentNumber
where
    S: SequenceSource + ?Sized,
{
    let sequence = source.next_sequence(kind, year);
    DocumentNumber::compose(kind, year, sequence, pad_width)
}
