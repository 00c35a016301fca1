//! Pricing validation errors.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised while pricing a line or a bill.
///
/// All of these reject bad input before any state is touched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// Quantity must be one or more.
    #[error("Quantity must be at least 1, got {0}")]
    NonPositiveQuantity(i64),

    /// Unit price below zero.
    #[error("Unit price cannot be negative, got {0}")]
    NegativeUnitPrice(Decimal),

    /// Line discount below zero.
    #[error("Line discount cannot be negative, got {0}")]
    NegativeDiscount(Decimal),

    /// Line discount larger than the line amount.
    #[error("Line discount {discount} exceeds line amount {amount}")]
    DiscountExceedsLine {
        /// The discount asked for.
        discount: Decimal,
        /// Quantity times unit price.
        amount: Decimal,
    },

    /// Bill discount percentage outside `0..=100`.
    #[error("Discount percent must be between 0 and 100, got {0}")]
    InvalidDiscountPercent(Decimal),

    /// Flat bill discount larger than the subtotal.
    #[error("Bill discount {discount} exceeds subtotal {subtotal}")]
    DiscountExceedsSubtotal {
        /// The discount asked for.
        discount: Decimal,
        /// Sum of line subtotals.
        subtotal: Decimal,
    },

    /// Other charges below zero.
    #[error("Other charges cannot be negative, got {0}")]
    NegativeOtherCharges(Decimal),

    /// A bill needs at least one line.
    #[error("Bill must contain at least one line")]
    EmptyBill,
}

impl PricingError {
    /// Returns the error code for callers that surface codes.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveQuantity(_) => "NON_POSITIVE_QUANTITY",
            Self::NegativeUnitPrice(_) => "NEGATIVE_UNIT_PRICE",
            Self::NegativeDiscount(_) => "NEGATIVE_DISCOUNT",
            Self::DiscountExceedsLine { .. } => "DISCOUNT_EXCEEDS_LINE",
            Self::InvalidDiscountPercent(_) => "INVALID_DISCOUNT_PERCENT",
            Self::DiscountExceedsSubtotal { .. } => "DISCOUNT_EXCEEDS_SUBTOTAL",
            Self::NegativeOtherCharges(_) => "NEGATIVE_OTHER_CHARGES",
            Self::EmptyBill => "EMPTY_BILL",
        }
    }
}
