//! Quotations: priced offers that can become bills.
//!
//! A quotation prices lines exactly like a sale but never touches
//! stock. It carries its own `QUO` number series, stays valid through a
//! configured window, and once accepted can be converted into a bill
//! input whose explicit overrides pin the quoted prices.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use khata_shared::types::{calendar, QuotationId};
use khata_shared::EngineConfig;

use crate::billing::service::{BillInput, LineSpec};
use crate::billing::types::{BillKind, Party, PaymentMode};
use crate::catalog::{CatalogError, ProductCatalog};
use crate::numbering::{next_number, DocumentKind, DocumentNumber, SequenceSource};
use crate::pricing::{
    price_bill, price_line, BillDiscount, BillTotals, LineInput, PricedLine, PricingError,
};

// ========== Types ==========

/// A recorded decision on a quotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteDecision {
    /// Party agreed to the quoted prices.
    Accepted,
    /// Party declined.
    Rejected,
    /// Accepted and turned into a bill.
    Converted,
}

/// Lifecycle state of a quotation, derived on read.
///
/// A recorded decision always wins; expiry only applies to undecided
/// quotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    /// Undecided and still valid.
    Open,
    /// Undecided and past its validity window.
    Expired,
    /// Accepted, awaiting conversion.
    Accepted,
    /// Declined.
    Rejected,
    /// Turned into a bill.
    Converted,
}

impl QuoteStatus {
    /// Stable lowercase name, matching the serialized form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Expired => "expired",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Converted => "converted",
        }
    }
}

impl std::fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A priced quotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quotation {
    /// Unique quotation id.
    pub id: QuotationId,
    /// Document number; quotations are numbered at creation.
    pub number: DocumentNumber,
    /// Party the offer is addressed to.
    pub party: Party,
    /// Priced lines.
    pub lines: Vec<PricedLine>,
    /// Bill-level totals.
    pub totals: BillTotals,
    /// Last day the offer stands.
    pub valid_until: NaiveDate,
    /// Recorded decision, if any.
    pub decision: Option<QuoteDecision>,
    /// When the quotation was issued.
    pub issued_at: DateTime<Utc>,
    /// Free-form notes.
    pub notes: Option<String>,
}

impl Quotation {
    /// Status as of `today`.
    #[must_use]
    pub fn status(&self, today: NaiveDate) -> QuoteStatus {
        match self.decision {
            Some(QuoteDecision::Accepted) => QuoteStatus::Accepted,
            Some(QuoteDecision::Rejected) => QuoteStatus::Rejected,
            Some(QuoteDecision::Converted) => QuoteStatus::Converted,
            None if today > self.valid_until => QuoteStatus::Expired,
            None => QuoteStatus::Open,
        }
    }

    /// Validates and records a decision.
    ///
    /// Stores call this while holding their per-quote guard. Accepting
    /// or rejecting requires an open quotation; converting requires a
    /// prior acceptance and survives expiry.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::Expired`], [`QuoteError::AlreadyDecided`]
    /// or [`QuoteError::NotAccepted`]; the quotation is unchanged then.
    pub fn try_decide(
        &mut self,
        decision: QuoteDecision,
        today: NaiveDate,
    ) -> Result<(), QuoteError> {
        match decision {
            QuoteDecision::Accepted | QuoteDecision::Rejected => match self.decision {
                Some(_) => Err(QuoteError::AlreadyDecided(self.id)),
                None if today > self.valid_until => Err(QuoteError::Expired(self.id)),
                None => {
                    self.decision = Some(decision);
                    Ok(())
                }
            },
            QuoteDecision::Converted => match self.decision {
                Some(QuoteDecision::Accepted) => {
                    self.decision = Some(QuoteDecision::Converted);
                    Ok(())
                }
                Some(QuoteDecision::Converted) => Err(QuoteError::AlreadyDecided(self.id)),
                _ => Err(QuoteError::NotAccepted(self.id)),
            },
        }
    }
}

/// Everything needed to issue a quotation.
#[derive(Debug, Clone)]
pub struct QuoteInput {
    /// Party the offer is addressed to.
    pub party: Party,
    /// Requested lines; same override semantics as billing.
    pub lines: Vec<LineSpec>,
    /// Bill-level discount.
    pub discount: BillDiscount,
    /// Delivery or packing charges added after the discount.
    pub other_charges: Decimal,
    /// Validity override in days; engine default when `None`.
    pub valid_days: Option<i64>,
    /// Free-form notes.
    pub notes: Option<String>,
}

// ========== Errors ==========

/// Errors raised by quotation operations.
#[derive(Debug, Error)]
pub enum QuoteError {
    /// Pricing rejected the line or bill inputs.
    #[error("pricing error: {0}")]
    Pricing(#[from] PricingError),

    /// Catalog lookup failed.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// No quotation with this id.
    #[error("quotation not found: {0}")]
    NotFound(QuotationId),

    /// A quotation with this id already exists.
    #[error("quotation already exists, retry the operation")]
    Conflict,

    /// The validity window has passed.
    #[error("quotation has expired: {0}")]
    Expired(QuotationId),

    /// A decision was already recorded.
    #[error("quotation already decided: {0}")]
    AlreadyDecided(QuotationId),

    /// Conversion requires a prior acceptance.
    #[error("quotation is not accepted: {0}")]
    NotAccepted(QuotationId),
}

impl QuoteError {
    /// Returns a stable error code for API responses and logs.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Pricing(err) => err.error_code(),
            Self::Catalog(err) => err.error_code(),
            Self::NotFound(_) => "QUOTE_NOT_FOUND",
            Self::Conflict => "QUOTE_CONFLICT",
            Self::Expired(_) => "QUOTE_EXPIRED",
            Self::AlreadyDecided(_) => "QUOTE_ALREADY_DECIDED",
            Self::NotAccepted(_) => "QUOTE_NOT_ACCEPTED",
        }
    }

    /// Whether retrying the same call can succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict)
    }
}

// ========== Store ==========

/// Persistence seam for quotations.
pub trait QuoteStore {
    /// Inserts a new quotation.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::Conflict`] when the id is already present.
    fn insert(&self, quote: Quotation) -> Result<(), QuoteError>;

    /// Fetches a quotation by id.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::NotFound`].
    fn get(&self, id: QuotationId) -> Result<Quotation, QuoteError>;

    /// Records a decision under the per-quote guard.
    ///
    /// Returns the updated quotation.
    ///
    /// # Errors
    ///
    /// Propagates the validation errors of
    /// [`Quotation::try_decide`]: `Expired`, `AlreadyDecided` or
    /// `NotAccepted`.
    fn decide(
        &self,
        id: QuotationId,
        decision: QuoteDecision,
        today: NaiveDate,
    ) -> Result<Quotation, QuoteError>;

    /// Snapshot of every quotation, unordered.
    fn list(&self) -> Vec<Quotation>;
}

// ========== Service ==========

/// Issues, decides and converts quotations.
pub struct QuoteService<'a, C, S, Q> {
    catalog: &'a C,
    sequences: &'a S,
    quotes: &'a Q,
    config: &'a EngineConfig,
}

impl<'a, C, S, Q> QuoteService<'a, C, S, Q>
where
    C: ProductCatalog,
    S: SequenceSource,
    Q: QuoteStore,
{
    /// Builds a service over the given collaborators.
    pub const fn new(
        catalog: &'a C,
        sequences: &'a S,
        quotes: &'a Q,
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            catalog,
            sequences,
            quotes,
            config,
        }
    }

    /// Prices and issues a quotation.
    ///
    /// Lines resolve against the catalog the way sale lines do, but no
    /// stock is checked or moved; a quotation is a promise of price,
    /// not of availability.
    ///
    /// # Errors
    ///
    /// Returns pricing or catalog failures; nothing is stored then.
    pub fn create(&self, input: QuoteInput, now: DateTime<Utc>) -> Result<Quotation, QuoteError> {
        let mut lines = Vec::with_capacity(input.lines.len());
        for spec in &input.lines {
            let product = self.catalog.get(spec.product_id)?;
            let line = price_line(&LineInput {
                product_id: product.id,
                description: product.name.clone(),
                quantity: spec.quantity,
                unit_price: spec.unit_price.unwrap_or(product.selling_price),
                discount: spec.discount,
                tax_rate: spec.tax_rate.unwrap_or(product.tax_rate),
                tax_inclusive: spec.tax_inclusive.unwrap_or(product.tax_inclusive),
            })?;
            lines.push(line);
        }
        let totals = price_bill(&lines, input.discount, input.other_charges)?;

        let year = calendar::business_year(now, self.config.billing.timezone);
        let number = next_number(
            self.sequences,
            DocumentKind::Quotation,
            year,
            self.config.billing.number_pad_width,
        );
        let days = input.valid_days.unwrap_or(self.config.quotes.valid_days);

        let quote = Quotation {
            id: QuotationId::new(),
            number,
            party: input.party,
            lines,
            totals,
            valid_until: calendar::due_date_after(now, self.config.billing.timezone, days),
            decision: None,
            issued_at: now,
            notes: input.notes,
        };
        self.quotes.insert(quote.clone())?;
        info!(
            number = quote.number.as_str(),
            total = %quote.totals.total,
            valid_until = %quote.valid_until,
            "quotation issued"
        );
        Ok(quote)
    }

    /// Records the party's acceptance.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::Expired`] past the validity window and
    /// [`QuoteError::AlreadyDecided`] after any prior decision.
    pub fn accept(&self, id: QuotationId, now: DateTime<Utc>) -> Result<Quotation, QuoteError> {
        let today = calendar::business_date(now, self.config.billing.timezone);
        let quote = self.quotes.decide(id, QuoteDecision::Accepted, today)?;
        info!(number = quote.number.as_str(), "quotation accepted");
        Ok(quote)
    }

    /// Records the party's rejection.
    ///
    /// # Errors
    ///
    /// Same rules as [`accept`](Self::accept).
    pub fn reject(&self, id: QuotationId, now: DateTime<Utc>) -> Result<Quotation, QuoteError> {
        let today = calendar::business_date(now, self.config.billing.timezone);
        let quote = self.quotes.decide(id, QuoteDecision::Rejected, today)?;
        info!(number = quote.number.as_str(), "quotation rejected");
        Ok(quote)
    }

    /// Marks an accepted quotation converted and returns the bill input
    /// that reproduces it.
    ///
    /// Quoted unit prices, discounts and tax carry over as explicit
    /// overrides, so catalog price changes after the quote cannot drift
    /// the converted bill. The quote is claimed first: two concurrent
    /// conversions cannot both produce a bill.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::NotAccepted`] unless the quotation was
    /// accepted, and [`QuoteError::AlreadyDecided`] when it was already
    /// converted.
    pub fn convert(&self, id: QuotationId, now: DateTime<Utc>) -> Result<BillInput, QuoteError> {
        let today = calendar::business_date(now, self.config.billing.timezone);
        let quote = self.quotes.decide(id, QuoteDecision::Converted, today)?;
        info!(number = quote.number.as_str(), "quotation converted");
        Ok(Self::bill_input_from(&quote))
    }

    fn bill_input_from(quote: &Quotation) -> BillInput {
        BillInput {
            kind: BillKind::Sale,
            party: quote.party.clone(),
            lines: quote
                .lines
                .iter()
                .map(|line| LineSpec {
                    product_id: line.product_id,
                    quantity: line.quantity,
                    unit_price: Some(line.unit_price),
                    discount: line.discount,
                    tax_rate: Some(line.tax_rate),
                    tax_inclusive: Some(line.tax_inclusive),
                })
                .collect(),
            discount: BillDiscount::Flat(quote.totals.discount),
            other_charges: quote.totals.other_charges,
            paid_amount: Decimal::ZERO,
            payment_mode: PaymentMode::Cash,
            due_days: None,
            notes: quote.notes.clone(),
        }
    }
}
