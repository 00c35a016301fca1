//! Line and bill arithmetic.
//!
//! This module implements the money calculator:
//! - Line pricing with per-line discounts and inclusive/exclusive GST
//! - Bill totals with flat-or-percent discounts and other charges
//! - Half-up rounding to the whole currency unit with round-off carry
//! - Validation errors for out-of-range inputs
//!
//! Everything here is a pure function; no state, no collaborators.

pub mod error;
pub mod line;
pub mod totals;

#[cfg(test)]
mod pricing_props;

pub use error::PricingError;
pub use line::{LineInput, PricedLine, price_line};
pub use totals::{BillDiscount, BillTotals, price_bill};
