//! Stock reservation and atomic commit.
//!
//! Billing validates every line against product snapshots first (reserve),
//! then applies all deltas in one atomic catalog batch (commit). A bill
//! therefore never leaves stock half-moved: either the whole batch lands
//! or none of it does.

use tracing::debug;

use crate::catalog::{CatalogError, Product, ProductCatalog, StockMove};
use crate::events::DomainEvent;

/// Direction of a stock movement relative to the shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockDirection {
    /// Stock leaves the shop (sale).
    Outward,
    /// Stock enters the shop (purchase).
    Inward,
}

impl StockDirection {
    /// Converts a quantity into a signed delta for this direction.
    #[must_use]
    pub const fn signed(self, quantity: i64) -> i64 {
        match self {
            Self::Outward => -quantity,
            Self::Inward => quantity,
        }
    }
}

/// Stateless stock ledger over the catalog capability.
pub struct StockLedger;

impl StockLedger {
    /// Validates a prospective move against a product snapshot.
    ///
    /// Checks that the product is active and, for outward moves, that
    /// enough stock is on hand. Pure; commits nothing.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Inactive` or `CatalogError::InsufficientStock`.
    pub fn reserve(
        product: &Product,
        quantity: i64,
        direction: StockDirection,
    ) -> Result<(), CatalogError> {
        if !product.is_active {
            return Err(CatalogError::Inactive {
                id: product.id,
                name: product.name.clone(),
            });
        }
        if direction == StockDirection::Outward && product.stock < quantity {
            return Err(CatalogError::InsufficientStock {
                id: product.id,
                name: product.name.clone(),
                available: product.stock,
                requested: quantity,
            });
        }
        Ok(())
    }

    /// Commits a batch of moves atomically through the catalog.
    ///
    /// Returns the updated product snapshots in move order, plus a
    /// low-stock event for every outward move that left the product at or
    /// below its minimum level. The catalog re-checks every condition
    /// under its own guard, so a reservation that has since been
    /// invalidated by a concurrent bill fails here rather than oversell.
    ///
    /// # Errors
    ///
    /// Propagates the catalog's first violation; nothing is applied then.
    pub fn commit<C>(
        catalog: &C,
        moves: &[StockMove],
    ) -> Result<(Vec<Product>, Vec<DomainEvent>), CatalogError>
    where
        C: ProductCatalog + ?Sized,
    {
        let updated = catalog.apply_stock_deltas(moves)?;

        let events = moves
            .iter()
            .zip(&updated)
            .filter(|(movement, product)| movement.delta < 0 && product.is_low_on_stock())
            .map(|(_, product)| DomainEvent::LowStockCrossed {
                product_id: product.id,
                name: product.name.clone(),
                stock: product.stock,
                min_stock: product.min_stock,
            })
            .collect();

        debug!(moves = moves.len(), "stock batch committed");
        Ok((updated, events))
    }
}
