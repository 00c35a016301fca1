//! Credit ledger error types.

use rust_decimal::Decimal;
use thiserror::Error;

use khata_shared::types::CreditEntryId;

/// Errors raised by credit ledger operations.
#[derive(Debug, Error)]
pub enum CreditError {
    // ========== Lookup ==========
    /// No credit entry with this id.
    #[error("credit entry not found: {0}")]
    NotFound(CreditEntryId),

    /// An entry with this id already exists.
    #[error("credit entry already exists, retry the operation")]
    Conflict,

    // ========== Payments ==========
    /// Payment amounts must be strictly positive.
    #[error("payment amount must be positive")]
    NonPositivePayment,

    /// Payment exceeds what is still owed on the entry.
    #[error("payment of {attempted} exceeds pending amount {pending}")]
    Overpayment {
        /// Amount the caller tried to record.
        attempted: Decimal,
        /// Amount still pending on the entry.
        pending: Decimal,
    },

    // ========== Reminders ==========
    /// Reminders cannot be sent for settled entries.
    #[error("credit entry is already settled: {0}")]
    AlreadySettled(CreditEntryId),
}

impl CreditError {
    /// Returns a stable error code for API responses and logs.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "CREDIT_ENTRY_NOT_FOUND",
            Self::Conflict => "CREDIT_CONFLICT",
            Self::NonPositivePayment => "NON_POSITIVE_PAYMENT",
            Self::Overpayment { .. } => "OVERPAYMENT",
            Self::AlreadySettled(_) => "ALREADY_SETTLED",
        }
    }

    /// Whether retrying the same call can succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            CreditError::NotFound(CreditEntryId::new()).error_code(),
            "CREDIT_ENTRY_NOT_FOUND"
        );
        assert_eq!(
            CreditError::Overpayment {
                attempted: dec!(100),
                pending: dec!(50),
            }
            .error_code(),
            "OVERPAYMENT"
        );
        assert_eq!(
            CreditError::AlreadySettled(CreditEntryId::new()).error_code(),
            "ALREADY_SETTLED"
        );
    }

    #[test]
    fn test_only_conflict_is_retryable() {
        assert!(CreditError::Conflict.is_retryable());
        assert!(!CreditError::NonPositivePayment.is_retryable());
        assert!(!CreditError::AlreadySettled(CreditEntryId::new()).is_retryable());
    }
}
