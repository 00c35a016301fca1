//! Bill lifecycle: drafts, finalization, payments and amendments.
//!
//! - `types`: the bill aggregate with derived payment state
//! - `service`: the finalize / draft / payment pipeline
//! - `store`: the persistence seam
//! - `error`: the billing error taxonomy

pub mod error;
pub mod service;
pub mod store;
pub mod types;

pub use error::BillError;
pub use service::{BillInput, BillingService, FinalizeOutcome, LineSpec};
pub use store::{BillStore, HeaderPatch};
pub use types::{
    derive_payment_status, Bill, BillKind, Party, Payment, PaymentInput, PaymentMode, PaymentStatus,
};
