//! Billing pipeline.
//!
//! [`BillingService`] drives every bill lifecycle operation against the
//! collaborator seams: product catalog, sequence source, bill store,
//! credit store and notification sink. The service itself is stateless;
//! all state lives behind the seams, so one service value can be shared
//! freely or rebuilt per call site.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use tracing::{error, info};

use khata_shared::types::{calendar, BillId, CreditEntryId, ProductId, TaxRate};
use khata_shared::EngineConfig;

use crate::catalog::{Product, ProductCatalog, StockMove};
use crate::credit::entry::{BillRef, CreditEntry};
use crate::credit::store::CreditStore;
use crate::events::{dispatch, DomainEvent, NotificationSink};
use crate::numbering::{next_number, SequenceSource};
use crate::pricing::{price_bill, price_line, BillDiscount, LineInput, PricedLine};
use crate::stock::StockLedger;

use super::error::BillError;
use super::store::{BillStore, HeaderPatch};
use super::types::{Bill, BillKind, Party, PaymentInput, PaymentMode};

// ========== Inputs ==========

/// One requested line before pricing.
#[derive(Debug, Clone)]
pub struct LineSpec {
    /// Product to bill.
    pub product_id: ProductId,
    /// Units, at least 1.
    pub quantity: i64,
    /// Price override; defaults to the product's selling price on sales
    /// and its purchase price on purchases.
    pub unit_price: Option<Decimal>,
    /// Flat amount off this line.
    pub discount: Decimal,
    /// Tax override; defaults to the product's configured rate.
    pub tax_rate: Option<TaxRate>,
    /// Inclusive-tax override; defaults to the product's setting.
    pub tax_inclusive: Option<bool>,
}

impl LineSpec {
    /// A plain line that takes price and tax from the catalog.
    #[must_use]
    pub const fn new(product_id: ProductId, quantity: i64) -> Self {
        Self {
            product_id,
            quantity,
            unit_price: None,
            discount: Decimal::ZERO,
            tax_rate: None,
            tax_inclusive: None,
        }
    }
}

/// Everything needed to create a bill.
#[derive(Debug, Clone)]
pub struct BillInput {
    /// Sale or purchase.
    pub kind: BillKind,
    /// Customer or supplier.
    pub party: Party,
    /// Requested lines.
    pub lines: Vec<LineSpec>,
    /// Bill-level discount.
    pub discount: BillDiscount,
    /// Delivery or packing charges added after the discount.
    pub other_charges: Decimal,
    /// Amount received at the counter; zero for a fully-credit bill.
    pub paid_amount: Decimal,
    /// Mode of the counter payment.
    pub payment_mode: PaymentMode,
    /// Days until any pending amount falls due; engine default when `None`.
    pub due_days: Option<i64>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Result of finalizing a bill.
#[derive(Debug)]
pub struct FinalizeOutcome {
    /// The persisted bill.
    pub bill: Bill,
    /// Credit entry opened for the pending amount, if any.
    pub credit_entry: Option<CreditEntry>,
}

// ========== Service ==========

/// Orchestrates the bill lifecycle over the collaborator seams.
pub struct BillingService<'a, C, S, B, R, N> {
    catalog: &'a C,
    sequences: &'a S,
    bills: &'a B,
    credit: &'a R,
    sink: &'a N,
    config: &'a EngineConfig,
}

impl<'a, C, S, B, R, N> BillingService<'a, C, S, B, R, N>
where
    C: ProductCatalog,
    S: SequenceSource,
    B: BillStore,
    R: CreditStore,
    N: NotificationSink,
{
    /// Builds a service over the given collaborators.
    pub const fn new(
        catalog: &'a C,
        sequences: &'a S,
        bills: &'a B,
        credit: &'a R,
        sink: &'a N,
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            catalog,
            sequences,
            bills,
            credit,
            sink,
            config,
        }
    }

    /// Finalizes a bill in one pass:
    ///
    /// 1. Resolve every line against the catalog and price it
    /// 2. Price the bill-level totals
    /// 3. Reserve stock, then commit all movements in one atomic batch
    /// 4. Issue the document number for the business year
    /// 5. Persist the bill together with any counter payment
    /// 6. Open a credit entry when an identified party still owes
    /// 7. Dispatch low-stock notifications
    ///
    /// # Errors
    ///
    /// Validation failures reject the bill before any state changes.
    /// Stock is re-checked inside the atomic commit, so losing a race to
    /// a concurrent bill surfaces as `InsufficientStock` with nothing
    /// applied.
    pub fn finalize(
        &self,
        input: BillInput,
        now: DateTime<Utc>,
    ) -> Result<FinalizeOutcome, BillError> {
        if input.paid_amount < Decimal::ZERO {
            return Err(BillError::NonPositivePayment);
        }
        let (products, lines) = self.price_lines(input.kind, &input.lines)?;
        let totals = price_bill(&lines, input.discount, input.other_charges)?;
        Self::reserve_all(&products, &lines, input.kind)?;

        let direction = input.kind.stock_direction();
        let moves: Vec<StockMove> = lines
            .iter()
            .map(|line| StockMove {
                product_id: line.product_id,
                delta: direction.signed(line.quantity),
            })
            .collect();
        let (_, low_stock) = StockLedger::commit(self.catalog, &moves)?;

        if input.kind == BillKind::Purchase {
            for line in &lines {
                self.catalog
                    .record_purchase_price(line.product_id, line.unit_price)?;
            }
        }

        let year = calendar::business_year(now, self.config.billing.timezone);
        let number = next_number(
            self.sequences,
            input.kind.document_kind(),
            year,
            self.config.billing.number_pad_width,
        );

        let mut bill = Bill {
            id: BillId::new(),
            kind: input.kind,
            number: Some(number),
            party: input.party,
            lines,
            totals,
            payments: Vec::new(),
            is_draft: false,
            issued_at: now,
            notes: input.notes,
        };
        if input.paid_amount > Decimal::ZERO {
            bill.payments
                .push(PaymentInput::new(input.paid_amount, input.payment_mode).into_payment(now));
        }

        self.bills.insert(bill.clone())?;
        let credit_entry = self.open_credit_if_owed(&bill, input.due_days, now)?;

        dispatch(self.sink, &low_stock);
        info!(
            number = bill.display_number(),
            kind = ?bill.kind,
            total = %bill.totals.total,
            status = ?bill.payment_status(),
            "bill finalized"
        );
        Ok(FinalizeOutcome { bill, credit_entry })
    }

    /// Prices and stores a draft bill.
    ///
    /// Drafts validate stock availability but move nothing, carry no
    /// document number, and open no credit entry.
    ///
    /// # Errors
    ///
    /// Same validation as [`finalize`](Self::finalize).
    pub fn save_draft(&self, input: BillInput, now: DateTime<Utc>) -> Result<Bill, BillError> {
        let bill = self.build_draft(BillId::new(), input, now)?;
        self.bills.insert(bill.clone())?;
        info!(bill_id = %bill.id, total = %bill.totals.total, "draft saved");
        Ok(bill)
    }

    /// Re-prices and replaces a stored draft, keeping its id.
    ///
    /// # Errors
    ///
    /// Returns [`BillError::NotADraft`] when the bill was finalized in
    /// the meantime.
    pub fn update_draft(
        &self,
        id: BillId,
        input: BillInput,
        now: DateTime<Utc>,
    ) -> Result<Bill, BillError> {
        let bill = self.build_draft(id, input, now)?;
        self.bills.replace_draft(id, bill.clone())?;
        info!(bill_id = %id, total = %bill.totals.total, "draft updated");
        Ok(bill)
    }

    /// Converts a stored draft into a finalized bill.
    ///
    /// The draft is claimed out of the store first, so two concurrent
    /// conversions of the same draft cannot both move stock; the loser
    /// fails with [`BillError::AlreadyFinalized`]. Prices are not
    /// recomputed, the draft's lines and totals stand as saved. Stock,
    /// numbering and credit behave as in [`finalize`](Self::finalize).
    ///
    /// # Errors
    ///
    /// On a stock or catalog failure the draft is restored untouched and
    /// the cause is returned.
    pub fn finalize_draft(
        &self,
        id: BillId,
        due_days: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<FinalizeOutcome, BillError> {
        let draft = self.bills.remove_draft(id).map_err(|err| match err {
            BillError::NotADraft(id) => BillError::AlreadyFinalized(id),
            other => other,
        })?;

        match self.commit_claimed_draft(draft.clone(), due_days, now) {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                if let Err(restore) = self.bills.insert(draft) {
                    error!(
                        bill_id = %id,
                        error = %restore,
                        "draft restore failed after aborted finalize"
                    );
                }
                Err(err)
            }
        }
    }

    /// Records a payment against a finalized bill and mirrors it onto
    /// the bill's credit entry, if one is open.
    ///
    /// # Errors
    ///
    /// Overpayment and draft checks run inside the store guard.
    pub fn add_payment(
        &self,
        id: BillId,
        input: PaymentInput,
        now: DateTime<Utc>,
    ) -> Result<Bill, BillError> {
        let payment = input.into_payment(now);
        let bill = self.bills.append_payment(id, payment.clone())?;
        if let Some(entry) = self.credit.find_by_bill(id) {
            self.credit.append_payment(entry.id, payment.clone())?;
        }

        dispatch(
            self.sink,
            &[DomainEvent::PaymentReceived {
                bill_number: bill.display_number().to_string(),
                party: bill.party.name.clone(),
                amount: payment.amount,
                pending: bill.pending_amount(),
            }],
        );
        info!(
            number = bill.display_number(),
            amount = %payment.amount,
            status = ?bill.payment_status(),
            "payment recorded"
        );
        Ok(bill)
    }

    /// Amends non-financial header fields.
    ///
    /// Drafts may be amended at any time; finalized bills only within
    /// the configured grace window after issue.
    ///
    /// # Errors
    ///
    /// Returns [`BillError::EditWindowClosed`] past the window.
    pub fn amend_header(
        &self,
        id: BillId,
        patch: HeaderPatch,
        now: DateTime<Utc>,
    ) -> Result<Bill, BillError> {
        let bill = self.bills.get(id)?;
        if !bill.is_draft {
            let window = Duration::hours(self.config.billing.grace_window_hours);
            if now.signed_duration_since(bill.issued_at) > window {
                return Err(BillError::EditWindowClosed(id));
            }
        }
        self.bills.amend_header(id, patch)
    }

    /// Removes a draft. Finalized bills cannot be discarded.
    ///
    /// # Errors
    ///
    /// Returns [`BillError::NotADraft`] for finalized bills.
    pub fn discard_draft(&self, id: BillId) -> Result<Bill, BillError> {
        let bill = self.bills.remove_draft(id)?;
        info!(bill_id = %id, "draft discarded");
        Ok(bill)
    }

    // ========== Pipeline stages ==========

    /// Resolves each spec against the catalog and prices it.
    fn price_lines(
        &self,
        kind: BillKind,
        specs: &[LineSpec],
    ) -> Result<(Vec<Product>, Vec<PricedLine>), BillError> {
        let mut products = Vec::with_capacity(specs.len());
        let mut lines = Vec::with_capacity(specs.len());
        for spec in specs {
            let product = self.catalog.get(spec.product_id)?;
            let unit_price = spec.unit_price.unwrap_or(match kind {
                BillKind::Sale => product.selling_price,
                BillKind::Purchase => product.purchase_price,
            });
            let line = price_line(&LineInput {
                product_id: product.id,
                description: product.name.clone(),
                quantity: spec.quantity,
                unit_price,
                discount: spec.discount,
                tax_rate: spec.tax_rate.unwrap_or(product.tax_rate),
                tax_inclusive: spec.tax_inclusive.unwrap_or(product.tax_inclusive),
            })?;
            products.push(product);
            lines.push(line);
        }
        Ok((products, lines))
    }

    /// Checks every line against its product snapshot without moving
    /// anything.
    fn reserve_all(
        products: &[Product],
        lines: &[PricedLine],
        kind: BillKind,
    ) -> Result<(), BillError> {
        let direction = kind.stock_direction();
        for (product, line) in products.iter().zip(lines) {
            StockLedger::reserve(product, line.quantity, direction)?;
        }
        Ok(())
    }

    /// Prices an input and shapes it into an unsaved draft bill.
    fn build_draft(
        &self,
        id: BillId,
        input: BillInput,
        now: DateTime<Utc>,
    ) -> Result<Bill, BillError> {
        if input.paid_amount < Decimal::ZERO {
            return Err(BillError::NonPositivePayment);
        }
        let (products, lines) = self.price_lines(input.kind, &input.lines)?;
        let totals = price_bill(&lines, input.discount, input.other_charges)?;
        Self::reserve_all(&products, &lines, input.kind)?;

        let mut bill = Bill {
            id,
            kind: input.kind,
            number: None,
            party: input.party,
            lines,
            totals,
            payments: Vec::new(),
            is_draft: true,
            issued_at: now,
            notes: input.notes,
        };
        if input.paid_amount > Decimal::ZERO {
            bill.payments
                .push(PaymentInput::new(input.paid_amount, input.payment_mode).into_payment(now));
        }
        Ok(bill)
    }

    /// Finishes a draft that was already claimed out of the store.
    fn commit_claimed_draft(
        &self,
        mut bill: Bill,
        due_days: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<FinalizeOutcome, BillError> {
        let direction = bill.kind.stock_direction();
        let mut moves = Vec::with_capacity(bill.lines.len());
        for line in &bill.lines {
            let product = self.catalog.get(line.product_id)?;
            StockLedger::reserve(&product, line.quantity, direction)?;
            moves.push(StockMove {
                product_id: line.product_id,
                delta: direction.signed(line.quantity),
            });
        }
        let (_, low_stock) = StockLedger::commit(self.catalog, &moves)?;

        if bill.kind == BillKind::Purchase {
            for line in &bill.lines {
                self.catalog
                    .record_purchase_price(line.product_id, line.unit_price)?;
            }
        }

        let year = calendar::business_year(now, self.config.billing.timezone);
        bill.number = Some(next_number(
            self.sequences,
            bill.kind.document_kind(),
            year,
            self.config.billing.number_pad_width,
        ));
        bill.is_draft = false;
        bill.issued_at = now;

        self.bills.insert(bill.clone())?;
        let credit_entry = self.open_credit_if_owed(&bill, due_days, now)?;

        dispatch(self.sink, &low_stock);
        info!(
            number = bill.display_number(),
            kind = ?bill.kind,
            total = %bill.totals.total,
            "draft finalized"
        );
        Ok(FinalizeOutcome { bill, credit_entry })
    }

    /// Opens a credit entry when a finalized sale leaves a pending
    /// amount and the party can be reached by phone.
    fn open_credit_if_owed(
        &self,
        bill: &Bill,
        due_days: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<Option<CreditEntry>, BillError> {
        if bill.kind != BillKind::Sale || bill.pending_amount() == Decimal::ZERO {
            return Ok(None);
        }
        let Some(phone) = bill.party.contact_phone() else {
            return Ok(None);
        };
        let Some(number) = bill.number.clone() else {
            return Ok(None);
        };

        let days = due_days.unwrap_or(self.config.credit.default_due_days);
        let entry = CreditEntry {
            id: CreditEntryId::new(),
            party_name: bill.party.name.clone(),
            phone: phone.to_string(),
            bill: BillRef {
                id: bill.id,
                number,
                kind: bill.kind,
            },
            total_amount: bill.totals.total,
            payments: bill.payments.clone(),
            due_date: calendar::due_date_after(now, self.config.billing.timezone, days),
            reminder_count: 0,
            last_reminder_at: None,
            opened_at: now,
            notes: None,
        };
        self.credit.insert(entry.clone())?;
        info!(
            number = bill.display_number(),
            party = entry.party_name,
            pending = %entry.pending_amount(),
            due = %entry.due_date,
            "credit entry opened"
        );
        Ok(Some(entry))
    }
}
