//! Product snapshot and the catalog capability.
//!
//! The engine never owns product master data. It consumes a narrow
//! capability that can fetch a product snapshot and apply conditional
//! stock deltas; the billing pipeline drives it through [`crate::stock`].

use khata_shared::types::{ProductId, TaxRate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Snapshot of a catalog product at validation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Stock-keeping unit code.
    pub sku: String,
    /// Last price paid to a supplier for one unit.
    pub purchase_price: Decimal,
    /// Default selling price for one unit.
    pub selling_price: Decimal,
    /// Maximum retail price printed on the pack.
    pub mrp: Decimal,
    /// Units on hand.
    pub stock: i64,
    /// Threshold at or below which the product counts as low on stock.
    pub min_stock: i64,
    /// GST rate applied to this product.
    pub tax_rate: TaxRate,
    /// Whether the selling price already contains tax.
    pub tax_inclusive: bool,
    /// Inactive products cannot be billed.
    pub is_active: bool,
    /// Unit label for display (pcs, kg, box).
    pub unit: String,
}

impl Product {
    /// Returns true when stock on hand is at or below the minimum level.
    #[must_use]
    pub fn is_low_on_stock(&self) -> bool {
        self.stock <= self.min_stock
    }
}

/// A single stock movement: positive delta for inward, negative for outward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockMove {
    /// The product to move.
    pub product_id: ProductId,
    /// Signed quantity delta.
    pub delta: i64,
}

/// Errors raised by the catalog capability.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Product does not exist.
    #[error("Product not found: {0}")]
    NotFound(ProductId),

    /// Product exists but is inactive.
    #[error("Product is inactive: {name}")]
    Inactive {
        /// The product ID.
        id: ProductId,
        /// The product name.
        name: String,
    },

    /// Outward move would take stock below zero.
    #[error("Insufficient stock for {name}. Available: {available}, requested: {requested}")]
    InsufficientStock {
        /// The product ID.
        id: ProductId,
        /// The product name.
        name: String,
        /// Units on hand at the time of the check.
        available: i64,
        /// Units the caller asked for.
        requested: i64,
    },
}

impl CatalogError {
    /// Returns the error code for callers that surface codes.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "PRODUCT_NOT_FOUND",
            Self::Inactive { .. } => "PRODUCT_INACTIVE",
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
        }
    }
}

/// The product-lookup and stock-mutation capability the engine consumes.
///
/// Implementations must make [`apply_stock_deltas`](Self::apply_stock_deltas)
/// all-or-nothing: either every move in the batch is applied, or none is and
/// an error describes the first violation. The conditional check (stock never
/// below zero, product active) must be atomic relative to concurrent callers.
pub trait ProductCatalog {
    /// Fetches a product snapshot.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` for an unknown ID.
    fn get(&self, id: ProductId) -> Result<Product, CatalogError>;

    /// Applies a batch of stock moves atomically and returns the updated
    /// snapshots in move order.
    ///
    /// # Errors
    ///
    /// Returns the first violation; no move is applied on error.
    fn apply_stock_deltas(&self, moves: &[StockMove]) -> Result<Vec<Product>, CatalogError>;

    /// Applies a single stock move.
    ///
    /// # Errors
    ///
    /// Same contract as [`apply_stock_deltas`](Self::apply_stock_deltas).
    fn apply_stock_delta(&self, product_id: ProductId, delta: i64) -> Result<Product, CatalogError> {
        let moves = [StockMove { product_id, delta }];
        let mut updated = self.apply_stock_deltas(&moves)?;
        Ok(updated.remove(0))
    }

    /// Records the latest supplier price paid for a product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` for an unknown ID.
    fn record_purchase_price(&self, id: ProductId, price: Decimal) -> Result<(), CatalogError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn make_product(stock: i64, min_stock: i64) -> Product {
        Product {
            id: ProductId::new(),
            name: "Sugar 1kg".to_string(),
            sku: "SUG-1".to_string(),
            purchase_price: dec!(38),
            selling_price: dec!(45),
            mrp: dec!(50),
            stock,
            min_stock,
            tax_rate: TaxRate::new(dec!(5)).unwrap(),
            tax_inclusive: false,
            is_active: true,
            unit: "pcs".to_string(),
        }
    }

    #[test]
    fn test_low_stock_boundary() {
        assert!(make_product(5, 5).is_low_on_stock());
        assert!(make_product(4, 5).is_low_on_stock());
        assert!(!make_product(6, 5).is_low_on_stock());
    }

    #[test]
    fn test_error_codes() {
        let id = ProductId::new();
        assert_eq!(CatalogError::NotFound(id).error_code(), "PRODUCT_NOT_FOUND");
        assert_eq!(
            CatalogError::InsufficientStock {
                id,
                name: "Sugar 1kg".to_string(),
                available: 1,
                requested: 2,
            }
            .error_code(),
            "INSUFFICIENT_STOCK"
        );
    }
}
