//! Line item arithmetic.
//!
//! A line is priced independently of the bill it lands on. The subtotal is
//! `quantity * unit_price - discount`; GST is derived from the subtotal
//! according to the product's inclusive/exclusive flag and rounded half-up
//! to the cent.

use khata_shared::types::{ProductId, TaxRate};
use khata_shared::types::money::round_to_cents;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::PricingError;

/// Input for pricing a single line.
#[derive(Debug, Clone)]
pub struct LineInput {
    /// The product being sold or bought.
    pub product_id: ProductId,
    /// Product name snapshot for the printed bill.
    pub description: String,
    /// Units billed, at least 1.
    pub quantity: i64,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Flat amount off this line.
    pub discount: Decimal,
    /// GST rate for this line.
    pub tax_rate: TaxRate,
    /// Whether `unit_price` already contains tax.
    pub tax_inclusive: bool,
}

/// A priced, immutable line as it appears on a bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedLine {
    /// The product billed.
    pub product_id: ProductId,
    /// Product name snapshot taken when the line was priced.
    pub description: String,
    /// Units billed.
    pub quantity: i64,
    /// Price per unit at billing time.
    pub unit_price: Decimal,
    /// Flat amount taken off this line.
    pub discount: Decimal,
    /// GST rate applied.
    pub tax_rate: TaxRate,
    /// Whether the unit price already contained tax.
    pub tax_inclusive: bool,
    /// `quantity * unit_price - discount`.
    pub subtotal: Decimal,
    /// GST amount for this line, rounded to the cent.
    pub tax_amount: Decimal,
    /// Amount the line adds to the bill before bill-level adjustments.
    pub total: Decimal,
}

/// Prices a single line.
///
/// For tax-inclusive lines the tax is carved out of the subtotal and the
/// line total stays at the subtotal; for tax-exclusive lines the tax is
/// added on top.
///
/// # Errors
///
/// Rejects non-positive quantities, negative prices or discounts, and
/// discounts that would push the subtotal below zero.
pub fn price_line(input: &LineInput) -> Result<PricedLine, PricingError> {
    if input.quantity < 1 {
        return Err(PricingError::NonPositiveQuantity(input.quantity));
    }
    if input.unit_price < Decimal::ZERO {
        return Err(PricingError::NegativeUnitPrice(input.unit_price));
    }
    if input.discount < Decimal::ZERO {
        return Err(PricingError::NegativeDiscount(input.discount));
    }

    let amount = input.unit_price * Decimal::from(input.quantity);
    if input.discount > amount {
        return Err(PricingError::DiscountExceedsLine {
            discount: input.discount,
            amount,
        });
    }

    let subtotal = amount - input.discount;
    let tax_amount = if input.tax_inclusive {
        round_to_cents(input.tax_rate.inclusive_tax(subtotal))
    } else {
        round_to_cents(input.tax_rate.exclusive_tax(subtotal))
    };
    let total = if input.tax_inclusive {
        subtotal
    } else {
        subtotal + tax_amount
    };

    Ok(PricedLine {
        product_id: input.product_id,
        description: input.description.clone(),
        quantity: input.quantity,
        unit_price: input.unit_price,
        discount: input.discount,
        tax_rate: input.tax_rate,
        tax_inclusive: input.tax_inclusive,
        subtotal,
        tax_amount,
        total,
    })
}
