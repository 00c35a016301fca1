//! DashMap-backed product catalog.

use std::sync::{Mutex, PoisonError};

use dashmap::DashMap;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use khata_core::catalog::{CatalogError, Product, ProductCatalog, StockMove};
use khata_shared::types::ProductId;

use crate::registry::{decode, decode_id, EntityKind, RegistryError, RestoreTarget};

/// In-memory product catalog with conditional stock updates.
///
/// Stock commits take a single gate so a whole batch validates and
/// applies against one consistent view; every other operation touches
/// at most one per-product guard.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    products: DashMap<ProductId, Product>,
    stock_gate: Mutex<()>,
}

impl MemoryCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a product.
    pub fn upsert(&self, product: Product) {
        self.products.insert(product.id, product);
    }

    /// Removes a product. Returns whether it existed.
    pub fn remove(&self, id: ProductId) -> bool {
        self.products.remove(&id).is_some()
    }

    /// Snapshot of every product, unordered.
    #[must_use]
    pub fn all(&self) -> Vec<Product> {
        self.products.iter().map(|kv| kv.value().clone()).collect()
    }

    /// Products at or below their minimum stock level.
    #[must_use]
    pub fn low_on_stock(&self) -> Vec<Product> {
        self.products
            .iter()
            .filter(|kv| kv.value().is_low_on_stock())
            .map(|kv| kv.value().clone())
            .collect()
    }

    /// Number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog holds no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl ProductCatalog for MemoryCatalog {
    fn get(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.products
            .get(&id)
            .map(|kv| kv.value().clone())
            .ok_or(CatalogError::NotFound(id))
    }

    fn apply_stock_deltas(&self, moves: &[StockMove]) -> Result<Vec<Product>, CatalogError> {
        // One commit at a time, so validation stays true while applying.
        let _gate = self
            .stock_gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // Net out repeated products first: a bill with two lines of the
        // same product must validate against the combined movement.
        let mut net: Vec<(ProductId, i64)> = Vec::new();
        for movement in moves {
            match net.iter_mut().find(|(id, _)| *id == movement.product_id) {
                Some((_, delta)) => *delta += movement.delta,
                None => net.push((movement.product_id, movement.delta)),
            }
        }

        for (product_id, delta) in &net {
            let product = self
                .products
                .get(product_id)
                .ok_or(CatalogError::NotFound(*product_id))?;
            if !product.is_active {
                return Err(CatalogError::Inactive {
                    id: product.id,
                    name: product.name.clone(),
                });
            }
            if *delta < 0 && product.stock + *delta < 0 {
                return Err(CatalogError::InsufficientStock {
                    id: product.id,
                    name: product.name.clone(),
                    available: product.stock,
                    requested: -*delta,
                });
            }
        }

        for (product_id, delta) in &net {
            // Products were present above and nothing else removes them
            // while the gate is held.
            if let Some(mut product) = self.products.get_mut(product_id) {
                product.stock += delta;
                debug!(
                    product = %product.name,
                    delta,
                    stock = product.stock,
                    "stock moved"
                );
            }
        }

        let mut updated = Vec::with_capacity(moves.len());
        for movement in moves {
            let product = self
                .products
                .get(&movement.product_id)
                .ok_or(CatalogError::NotFound(movement.product_id))?;
            updated.push(product.clone());
        }
        Ok(updated)
    }

    fn record_purchase_price(&self, id: ProductId, price: Decimal) -> Result<(), CatalogError> {
        let mut product = self.products.get_mut(&id).ok_or(CatalogError::NotFound(id))?;
        product.purchase_price = price;
        Ok(())
    }
}

impl RestoreTarget for MemoryCatalog {
    fn upsert(&self, record: Value) -> Result<(), RegistryError> {
        let product: Product = decode(EntityKind::Product, record)?;
        self.products.insert(product.id, product);
        Ok(())
    }

    fn remove(&self, id: &str) -> Result<bool, RegistryError> {
        let id: ProductId = decode_id(id)?;
        Ok(self.products.remove(&id).is_some())
    }
}
