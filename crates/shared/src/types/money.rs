//! Money rounding rules and the tax rate type.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Every amount in the engine is a `rust_decimal::Decimal`.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by monetary constructors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    /// Tax rate percentage outside `0..=100`.
    #[error("Tax rate must be between 0 and 100 percent, got {0}")]
    InvalidTaxRate(Decimal),
}

/// Rounds an amount half-up to two decimal places.
///
/// Line subtotals, tax amounts, and payment figures are kept at this
/// precision.
#[must_use]
pub fn round_to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds an amount half-up to the whole currency unit.
///
/// Bills settle in whole units; the difference is carried on the bill as
/// its round-off.
#[must_use]
pub fn round_to_unit(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Tax rate as a percentage, validated to `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct TaxRate(Decimal);

impl TaxRate {
    /// Zero percent.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a tax rate from a percentage.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::InvalidTaxRate` when the percentage is
    /// negative or above 100.
    pub fn new(percent: Decimal) -> Result<Self, MoneyError> {
        if percent < Decimal::ZERO || percent > Decimal::from(100) {
            return Err(MoneyError::InvalidTaxRate(percent));
        }
        Ok(Self(percent))
    }

    /// Returns the percentage.
    #[must_use]
    pub const fn as_percent(self) -> Decimal {
        self.0
    }

    /// Returns true for a zero rate.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Tax charged on top of a tax-exclusive subtotal.
    ///
    /// `subtotal * rate / 100`, unrounded.
    #[must_use]
    pub fn exclusive_tax(self, subtotal: Decimal) -> Decimal {
        subtotal * self.0 / Decimal::from(100)
    }

    /// Tax already contained in a tax-inclusive subtotal.
    ///
    /// `subtotal * rate / (100 + rate)`, unrounded.
    #[must_use]
    pub fn inclusive_tax(self, subtotal: Decimal) -> Decimal {
        subtotal * self.0 / (Decimal::from(100) + self.0)
    }
}

impl TryFrom<Decimal> for TaxRate {
    type Error = MoneyError;

    fn try_from(percent: Decimal) -> Result<Self, Self::Error> {
        Self::new(percent)
    }
}

impl From<TaxRate> for Decimal {
    fn from(rate: TaxRate) -> Self {
        rate.0
    }
}

impl std::fmt::Display for TaxRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}
