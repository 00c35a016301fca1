//! In-memory implementations of the engine's persistence capabilities.
//!
//! Every store here is a thin shell over [`dashmap::DashMap`]: the
//! map's per-key entry guards are the per-record locks the `khata-core`
//! atomicity contracts ask for. Embedders that outgrow process memory
//! implement the same traits over their database instead.
//!
//! This crate provides:
//! - `catalog` - product catalog with conditional stock updates
//! - `numbering` - gapless per-(kind, year) sequence counters
//! - `bills` - bill store with guarded payment appends
//! - `credit` - credit ledger book
//! - `quotes` - quotation store
//! - `registry` - entity-kind registry for snapshot restore

pub mod bills;
pub mod catalog;
pub mod credit;
pub mod numbering;
pub mod quotes;
pub mod registry;

pub use bills::MemoryBills;
pub use catalog::MemoryCatalog;
pub use credit::MemoryCreditBook;
pub use numbering::MemorySequences;
pub use quotes::MemoryQuotes;
pub use registry::{EntityKind, Registry, RegistryError, RestoreReport, RestoreTarget};
