//! Billing error types.

use rust_decimal::Decimal;
use thiserror::Error;

use khata_shared::types::BillId;

use crate::catalog::CatalogError;
use crate::credit::CreditError;
use crate::pricing::PricingError;

/// Errors raised by billing operations.
#[derive(Debug, Error)]
pub enum BillError {
    // ========== Collaborators ==========
    /// Pricing rejected the line or bill inputs.
    #[error("pricing error: {0}")]
    Pricing(#[from] PricingError),

    /// Catalog lookup or stock movement failed.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// The linked credit entry rejected the operation.
    #[error("credit error: {0}")]
    Credit(#[from] CreditError),

    // ========== Lookup ==========
    /// No bill with this id.
    #[error("bill not found: {0}")]
    NotFound(BillId),

    /// Another writer touched the same record concurrently.
    #[error("conflicting concurrent update, retry the operation")]
    Conflict,

    // ========== Payments ==========
    /// Payment amounts must be strictly positive.
    #[error("payment amount must be positive")]
    NonPositivePayment,

    /// Payment exceeds what is still owed on the bill.
    #[error("payment of {attempted} exceeds pending amount {pending}")]
    Overpayment {
        /// Amount the caller tried to record.
        attempted: Decimal,
        /// Amount still pending on the bill.
        pending: Decimal,
    },

    // ========== Lifecycle ==========
    /// The operation requires a finalized bill but found a draft.
    #[error("bill is still a draft: {0}")]
    NotFinalized(BillId),

    /// A draft-to-final conversion hit a bill that is already final.
    #[error("bill is already finalized: {0}")]
    AlreadyFinalized(BillId),

    /// A draft-only operation hit a finalized bill.
    #[error("bill is not a draft: {0}")]
    NotADraft(BillId),

    /// Non-financial amendments are only allowed within the grace window.
    #[error("edit window closed for bill: {0}")]
    EditWindowClosed(BillId),
}

impl BillError {
    /// Returns a stable error code for API responses and logs.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Pricing(err) => err.error_code(),
            Self::Catalog(err) => err.error_code(),
            Self::Credit(err) => err.error_code(),
            Self::NotFound(_) => "BILL_NOT_FOUND",
            Self::Conflict => "BILL_CONFLICT",
            Self::NonPositivePayment => "NON_POSITIVE_PAYMENT",
            Self::Overpayment { .. } => "OVERPAYMENT",
            Self::NotFinalized(_) => "BILL_NOT_FINALIZED",
            Self::AlreadyFinalized(_) => "BILL_ALREADY_FINALIZED",
            Self::NotADraft(_) => "BILL_NOT_A_DRAFT",
            Self::EditWindowClosed(_) => "EDIT_WINDOW_CLOSED",
        }
    }

    /// Whether retrying the same call can succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Conflict => true,
            Self::Credit(err) => err.is_retryable(),
            _ => false,
        }
    }
}
