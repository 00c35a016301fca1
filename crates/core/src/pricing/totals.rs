//! Bill-level totals.
//!
//! The grand total is `subtotal - discount + tax + other charges`, rounded
//! half-up to the whole currency unit. The difference introduced by that
//! final rounding is carried on the bill as its round-off, so the printed
//! figures always reconcile.

use khata_shared::types::money::round_to_unit;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::PricingError;
use super::line::PricedLine;

/// Bill-level discount: a flat amount or a percentage of the subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillDiscount {
    /// Flat amount off the subtotal.
    Flat(Decimal),
    /// Percentage of the subtotal, `0..=100`.
    Percent(Decimal),
}

impl BillDiscount {
    /// No discount.
    pub const NONE: Self = Self::Flat(Decimal::ZERO);

    /// Resolves the discount to a concrete amount against a subtotal.
    ///
    /// # Errors
    ///
    /// Rejects negative or out-of-range inputs and flat discounts larger
    /// than the subtotal.
    pub fn resolve(self, subtotal: Decimal) -> Result<Decimal, PricingError> {
        match self {
            Self::Flat(amount) => {
                if amount < Decimal::ZERO {
                    return Err(PricingError::NegativeDiscount(amount));
                }
                if amount > subtotal {
                    return Err(PricingError::DiscountExceedsSubtotal {
                        discount: amount,
                        subtotal,
                    });
                }
                Ok(amount)
            }
            Self::Percent(percent) => {
                if percent < Decimal::ZERO || percent > Decimal::from(100) {
                    return Err(PricingError::InvalidDiscountPercent(percent));
                }
                Ok(subtotal * percent / Decimal::from(100))
            }
        }
    }
}

impl Default for BillDiscount {
    fn default() -> Self {
        Self::NONE
    }
}

/// Computed totals for a bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillTotals {
    /// Sum of line subtotals.
    pub subtotal: Decimal,
    /// Resolved bill-level discount amount.
    pub discount: Decimal,
    /// Sum of line tax amounts.
    pub tax_amount: Decimal,
    /// Freight, loading and similar charges (purchases).
    pub other_charges: Decimal,
    /// `total - unrounded total`; the half-up rounding residue.
    pub round_off: Decimal,
    /// The payable grand total, in whole currency units.
    pub total: Decimal,
}

/// Computes bill totals over priced lines.
///
/// # Errors
///
/// Rejects empty bills, out-of-range discounts, and negative other charges.
pub fn price_bill(
    lines: &[PricedLine],
    discount: BillDiscount,
    other_charges: Decimal,
) -> Result<BillTotals, PricingError> {
    if lines.is_empty() {
        return Err(PricingError::EmptyBill);
    }
    if other_charges < Decimal::ZERO {
        return Err(PricingError::NegativeOtherCharges(other_charges));
    }

    let subtotal: Decimal = lines.iter().map(|line| line.subtotal).sum();
    let tax_amount: Decimal = lines.iter().map(|line| line.tax_amount).sum();
    let discount = discount.resolve(subtotal)?;

    let unrounded = subtotal - discount + tax_amount + other_charges;
    let total = round_to_unit(unrounded);
    let round_off = total - unrounded;

    Ok(BillTotals {
        subtotal,
        discount,
        tax_amount,
        other_charges,
        round_off,
        total,
    })
}
