//! Bill aggregate and payment records.
//!
//! A bill's paid amount, pending amount and payment status are always
//! derived from its totals and payment list. None of them is stored, so
//! they can never drift from the payments that back them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use khata_shared::types::{BillId, PaymentId};

use crate::numbering::{DocumentKind, DocumentNumber};
use crate::pricing::{BillTotals, PricedLine};
use crate::stock::StockDirection;

use super::error::BillError;

// ========== Kinds and modes ==========

/// Whether a bill records a sale to a customer or a purchase from a
/// supplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillKind {
    /// Customer sale; stock moves outward.
    Sale,
    /// Supplier purchase; stock moves inward.
    Purchase,
}

impl BillKind {
    /// Document number series this kind draws from.
    #[must_use]
    pub const fn document_kind(self) -> DocumentKind {
        match self {
            Self::Sale => DocumentKind::Sale,
            Self::Purchase => DocumentKind::Purchase,
        }
    }

    /// Stock direction implied by this kind.
    #[must_use]
    pub const fn stock_direction(self) -> StockDirection {
        match self {
            Self::Sale => StockDirection::Outward,
            Self::Purchase => StockDirection::Inward,
        }
    }
}

/// How a payment was tendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    /// Physical cash.
    Cash,
    /// UPI transfer.
    Upi,
    /// Debit or credit card.
    Card,
    /// Cheque.
    Cheque,
    /// Direct bank transfer.
    BankTransfer,
}

impl PaymentMode {
    /// Stable lowercase name, matching the serialized form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Upi => "upi",
            Self::Card => "card",
            Self::Cheque => "cheque",
            Self::BankTransfer => "bank_transfer",
        }
    }
}

impl std::fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ========== Parties and payments ==========

/// The customer or supplier a bill is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    /// Display name.
    pub name: String,
    /// Contact number; required for a bill to open a credit entry.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
}

impl Party {
    /// Returns the phone number if one is present and non-empty.
    #[must_use]
    pub fn contact_phone(&self) -> Option<&str> {
        self.phone.as_deref().filter(|phone| !phone.is_empty())
    }
}

/// A single recorded payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Unique payment id.
    pub id: PaymentId,
    /// Amount received.
    pub amount: Decimal,
    /// How it was tendered.
    pub mode: PaymentMode,
    /// When it was received.
    pub paid_at: DateTime<Utc>,
    /// External reference such as a UPI transaction id or cheque number.
    pub reference: Option<String>,
    /// Free-form remarks.
    pub remarks: Option<String>,
}

/// Caller-supplied fields for recording a payment.
#[derive(Debug, Clone)]
pub struct PaymentInput {
    /// Amount received.
    pub amount: Decimal,
    /// How it was tendered.
    pub mode: PaymentMode,
    /// External reference such as a UPI transaction id or cheque number.
    pub reference: Option<String>,
    /// Free-form remarks.
    pub remarks: Option<String>,
}

impl PaymentInput {
    /// Builds an input with just an amount and mode.
    #[must_use]
    pub const fn new(amount: Decimal, mode: PaymentMode) -> Self {
        Self {
            amount,
            mode,
            reference: None,
            remarks: None,
        }
    }

    /// Materializes the input into a payment record.
    #[must_use]
    pub fn into_payment(self, now: DateTime<Utc>) -> Payment {
        Payment {
            id: PaymentId::new(),
            amount: self.amount,
            mode: self.mode,
            paid_at: now,
            reference: self.reference,
            remarks: self.remarks,
        }
    }
}

// ========== Status ==========

/// Payment state of a bill, derived from totals and payments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Nothing remains pending.
    Paid,
    /// Something was paid, something remains.
    Partial,
    /// Nothing was paid yet.
    Pending,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Paid => "paid",
            Self::Partial => "partial",
            Self::Pending => "pending",
        })
    }
}

/// Derives the payment status from a total and the amount paid so far.
#[must_use]
pub fn derive_payment_status(total: Decimal, paid: Decimal) -> PaymentStatus {
    if total - paid <= Decimal::ZERO {
        PaymentStatus::Paid
    } else if paid > Decimal::ZERO {
        PaymentStatus::Partial
    } else {
        PaymentStatus::Pending
    }
}

// ========== Bill ==========

/// A sale or purchase bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    /// Unique bill id.
    pub id: BillId,
    /// Sale or purchase.
    pub kind: BillKind,
    /// Document number; `None` while the bill is a draft.
    pub number: Option<DocumentNumber>,
    /// Customer or supplier.
    pub party: Party,
    /// Priced lines.
    pub lines: Vec<PricedLine>,
    /// Bill-level totals.
    pub totals: BillTotals,
    /// Payments recorded so far, oldest first.
    pub payments: Vec<Payment>,
    /// Whether the bill is still a draft.
    pub is_draft: bool,
    /// When the bill was finalized, or created for drafts.
    pub issued_at: DateTime<Utc>,
    /// Free-form notes.
    pub notes: Option<String>,
}

impl Bill {
    /// Sum of all recorded payments.
    #[must_use]
    pub fn paid_amount(&self) -> Decimal {
        self.payments.iter().map(|payment| payment.amount).sum()
    }

    /// Amount still owed, floored at zero.
    #[must_use]
    pub fn pending_amount(&self) -> Decimal {
        (self.totals.total - self.paid_amount()).max(Decimal::ZERO)
    }

    /// Current payment status.
    #[must_use]
    pub fn payment_status(&self) -> PaymentStatus {
        derive_payment_status(self.totals.total, self.paid_amount())
    }

    /// Document number for display; drafts show as `DRAFT`.
    #[must_use]
    pub fn display_number(&self) -> &str {
        self.number.as_ref().map_or("DRAFT", DocumentNumber::as_str)
    }

    /// Validates and appends a payment.
    ///
    /// Stores call this while holding their per-bill guard, which makes
    /// the pending-amount check and the append a single atomic step.
    ///
    /// # Errors
    ///
    /// Returns [`BillError::NotFinalized`] for drafts,
    /// [`BillError::NonPositivePayment`] or [`BillError::Overpayment`];
    /// the bill is unchanged then.
    pub fn try_add_payment(&mut self, payment: Payment) -> Result<(), BillError> {
        if self.is_draft {
            return Err(BillError::NotFinalized(self.id));
        }
        if payment.amount <= Decimal::ZERO {
            return Err(BillError::NonPositivePayment);
        }
        let pending = self.pending_amount();
        if payment.amount > pending {
            return Err(BillError::Overpayment {
                attempted: payment.amount,
                pending,
            });
        }
        self.payments.push(payment);
        Ok(())
    }
}
