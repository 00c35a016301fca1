//! Domain events and the notification sink seam.
//!
//! Billing and credit operations collect events while they work and hand
//! them to a [`NotificationSink`] at the end. Delivery is best-effort:
//! a failing sink is logged and never fails the business operation that
//! produced the event.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use khata_shared::types::ProductId;

// ========== Events ==========

/// Events emitted by billing and credit operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// A sale left a product at or below its minimum stock level.
    LowStockCrossed {
        /// Product that crossed the threshold.
        product_id: ProductId,
        /// Product name for display.
        name: String,
        /// Stock on hand after the sale.
        stock: i64,
        /// Configured minimum level.
        min_stock: i64,
    },
    /// A payment was recorded against a bill.
    PaymentReceived {
        /// Bill the payment applies to.
        bill_number: String,
        /// Party who paid.
        party: String,
        /// Amount received.
        amount: Decimal,
        /// Amount still pending after this payment.
        pending: Decimal,
    },
    /// A reminder was requested for an outstanding credit entry.
    PaymentReminder {
        /// Bill the entry tracks.
        bill_number: String,
        /// Party who owes.
        party: String,
        /// Contact number the reminder goes to.
        phone: String,
        /// Amount still pending.
        pending: Decimal,
        /// Date the amount fell due.
        due_date: NaiveDate,
    },
}

impl DomainEvent {
    /// Stable lowercase kind for logging and routing.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::LowStockCrossed { .. } => "low_stock",
            Self::PaymentReceived { .. } => "payment_received",
            Self::PaymentReminder { .. } => "payment_reminder",
        }
    }
}

// ========== Sink ==========

/// Delivery failure reported by a notification sink.
#[derive(Debug, Error)]
#[error("notification sink failed: {reason}")]
pub struct SinkError {
    /// Sink-supplied failure description.
    pub reason: String,
}

impl SinkError {
    /// Builds a sink error from any displayable reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Outbound channel for domain events (SMS gateway, webhook, test probe).
pub trait NotificationSink {
    /// Delivers a single event.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] when the channel could not accept the event.
    fn deliver(&self, event: &DomainEvent) -> Result<(), SinkError>;
}

/// Sink that drops every event. Useful as a default collaborator.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn deliver(&self, _event: &DomainEvent) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Delivers a batch of events, logging failures instead of raising them.
///
/// Notification delivery never decides the fate of a committed business
/// operation. The sole caller-visible effect of a broken sink is a warning.
pub fn dispatch<N>(sink: &N, events: &[DomainEvent])
where
    N: NotificationSink + ?Sized,
{
    for event in events {
        if let Err(err) = sink.deliver(event) {
            warn!(kind = event.kind(), error = %err, "event delivery failed");
        }
    }
}
