//! Credit (udhari) ledger: per-bill outstanding balances.
//!
//! - `entry`: the credit entry with derived repayment state
//! - `service`: repayments, reminders and the nightly status sweep
//! - `store`: the persistence seam
//! - `error`: the credit error taxonomy

pub mod entry;
pub mod error;
pub mod service;
pub mod store;

#[cfg(test)]
mod credit_props;

pub use entry::{BillRef, CreditEntry, CreditStatus};
pub use error::CreditError;
pub use service::{CreditLedger, ReminderRun};
pub use store::CreditStore;
