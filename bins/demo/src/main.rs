//! Khata engine walkthrough.
//!
//! Seeds a small catalog, runs a day of billing (cash sale, credit
//! sale, supplier purchase, quotation), then jumps 45 days ahead to run
//! the reminder sweep and print the receivables aging report.
//!
//! Usage: cargo run --bin khata

use anyhow::Context;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use khata_core::aging::AgingReport;
use khata_core::billing::{
    BillInput, BillKind, BillStore, BillingService, LineSpec, Party, PaymentInput, PaymentMode,
};
use khata_core::catalog::{Product, ProductCatalog};
use khata_core::credit::{CreditLedger, CreditStore};
use khata_core::events::{DomainEvent, NotificationSink, SinkError};
use khata_core::pricing::BillDiscount;
use khata_core::quote::{QuoteInput, QuoteService};
use khata_shared::types::{calendar, ProductId, TaxRate};
use khata_shared::EngineConfig;
use khata_store::{
    EntityKind, MemoryBills, MemoryCatalog, MemoryCreditBook, MemoryQuotes, MemorySequences,
    Registry,
};

/// Prints every engine event. A real deployment pushes SMS or WhatsApp
/// from here.
struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn deliver(&self, event: &DomainEvent) -> Result<(), SinkError> {
        println!("  [notify/{}] {event:?}", event.kind());
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "khata=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = EngineConfig::load().context("loading configuration")?;
    tracing::info!(
        timezone = %config.billing.timezone,
        "khata walkthrough starting"
    );

    let catalog = MemoryCatalog::new();
    let sequences = MemorySequences::new();
    let bills = MemoryBills::new();
    let credit = MemoryCreditBook::new();
    let quotes = MemoryQuotes::new();
    let sink = ConsoleSink;

    let billing = BillingService::new(&catalog, &sequences, &bills, &credit, &sink, &config);
    let ledger = CreditLedger::new(&credit, &sink, &config);
    let quoting = QuoteService::new(&catalog, &sequences, &quotes, &config);

    println!("Seeding catalog...");
    let [sugar, oil, fan] = seed_catalog(&catalog, &config)?;

    let now = Utc::now();

    // A walk-in customer pays the full amount at the counter.
    println!("\n== Cash sale ==");
    let outcome = billing.finalize(
        BillInput {
            kind: BillKind::Sale,
            party: Party {
                name: "Walk-in".to_string(),
                phone: None,
                address: None,
            },
            lines: vec![LineSpec::new(sugar, 2), LineSpec::new(oil, 1)],
            discount: BillDiscount::NONE,
            other_charges: Decimal::ZERO,
            paid_amount: Decimal::ZERO,
            payment_mode: PaymentMode::Cash,
            due_days: None,
            notes: None,
        },
        now,
    )?;
    let bill = billing.add_payment(
        outcome.bill.id,
        PaymentInput::new(outcome.bill.totals.total, PaymentMode::Cash),
        now,
    )?;
    println!(
        "  {} total {} paid {} -> {}",
        bill.display_number(),
        bill.totals.total,
        bill.paid_amount(),
        bill.payment_status()
    );

    // A known customer takes a fan on part payment; the rest goes into
    // the khata against their phone number.
    println!("\n== Credit sale ==");
    let outcome = billing.finalize(
        BillInput {
            kind: BillKind::Sale,
            party: Party {
                name: "Ramesh".to_string(),
                phone: Some("9876543210".to_string()),
                address: Some("Shastri Nagar".to_string()),
            },
            lines: vec![LineSpec::new(fan, 1)],
            discount: BillDiscount::NONE,
            other_charges: Decimal::ZERO,
            paid_amount: dec!(500),
            payment_mode: PaymentMode::Upi,
            due_days: None,
            notes: None,
        },
        now,
    )?;
    println!(
        "  {} total {} pending {}",
        outcome.bill.display_number(),
        outcome.bill.totals.total,
        outcome.bill.pending_amount()
    );
    if let Some(entry) = &outcome.credit_entry {
        println!(
            "  khata entry for {} pending {} due {}",
            entry.party_name,
            entry.pending_amount(),
            entry.due_date
        );
    }

    // Restock sugar from the supplier; freight rides as other charges.
    println!("\n== Purchase ==");
    let outcome = billing.finalize(
        BillInput {
            kind: BillKind::Purchase,
            party: Party {
                name: "Mahavir Traders".to_string(),
                phone: None,
                address: None,
            },
            lines: vec![LineSpec::new(sugar, 50)],
            discount: BillDiscount::NONE,
            other_charges: dec!(120),
            paid_amount: Decimal::ZERO,
            payment_mode: PaymentMode::BankTransfer,
            due_days: None,
            notes: Some("monthly restock".to_string()),
        },
        now,
    )?;
    println!(
        "  {} total {} sugar stock now {}",
        outcome.bill.display_number(),
        outcome.bill.totals.total,
        catalog.get(sugar)?.stock
    );

    // A quotation for two fans: accepted, then converted at the quoted
    // prices even though the catalog price is free to move meanwhile.
    println!("\n== Quotation ==");
    let quote = quoting.create(
        QuoteInput {
            party: Party {
                name: "Suresh".to_string(),
                phone: Some("9123456780".to_string()),
                address: None,
            },
            lines: vec![LineSpec::new(fan, 2)],
            discount: BillDiscount::Percent(dec!(5)),
            other_charges: Decimal::ZERO,
            valid_days: None,
            notes: None,
        },
        now,
    )?;
    println!(
        "  {} total {} valid until {}",
        quote.number.as_str(),
        quote.totals.total,
        quote.valid_until
    );
    quoting.accept(quote.id, now)?;
    let converted = quoting.convert(quote.id, now)?;
    let outcome = billing.finalize(converted, now)?;
    println!(
        "  converted into {} pending {}",
        outcome.bill.display_number(),
        outcome.bill.pending_amount()
    );

    // Ramesh drops by and clears part of his khata.
    println!("\n== Khata payment ==");
    if let Some(entry) = credit.by_party_phone("9876543210").into_iter().next() {
        let entry = ledger.add_payment(
            entry.id,
            PaymentInput::new(dec!(1000), PaymentMode::Cash),
            now,
        )?;
        println!(
            "  {} now owes {} ({})",
            entry.party_name,
            entry.pending_amount(),
            entry.status(calendar::business_date(now, config.billing.timezone))
        );
    }

    // Six weeks later: everyone with a lapsed due date gets a reminder.
    let later = now + Duration::days(45);
    let later_today = calendar::business_date(later, config.billing.timezone);

    println!("\n== Reminder sweep (45 days on) ==");
    let run = ledger.send_bulk_reminders(later);
    println!("  reminded {} parties, {} failed", run.sent, run.failed.len());
    for (id, status) in ledger.reconcile(later) {
        let entry = credit.get(id)?;
        println!("  {} {} pending {}", entry.party_name, status, entry.pending_amount());
    }

    println!("\n== Receivables aging ==");
    let report = AgingReport::build(&credit.outstanding(), later_today);
    for row in &report.rows {
        println!("  {:>8}: {} entries, {}", row.bucket.label(), row.count, row.pending);
    }
    println!("  outstanding total {}", ledger.outstanding_total());

    // Snapshot and restore through the entity-kind registry.
    println!("\n== Snapshot restore ==");
    let snapshot: Vec<serde_json::Value> = bills
        .list()
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<_, _>>()
        .context("serializing bills")?;
    let restored = MemoryBills::new();
    let mut registry = Registry::new();
    registry.register(EntityKind::Bill, &restored);
    let report = registry.restore(EntityKind::Bill, snapshot)?;
    println!(
        "  restored {} bills ({} skipped), store now holds {}",
        report.applied,
        report.failed.len(),
        restored.len()
    );

    Ok(())
}

/// Seeds the walkthrough catalog and returns the product ids.
///
/// The fan carries no explicit rate, so it takes the engine's default
/// tax percentage from configuration.
fn seed_catalog(
    catalog: &MemoryCatalog,
    config: &EngineConfig,
) -> anyhow::Result<[ProductId; 3]> {
    let default_rate = TaxRate::new(config.billing.default_tax_percent)
        .context("default tax percent out of range")?;

    let sugar = Product {
        id: ProductId::new(),
        name: "Sugar 1kg".to_string(),
        sku: "SUG-1".to_string(),
        purchase_price: dec!(38),
        selling_price: dec!(45),
        mrp: dec!(50),
        stock: 40,
        min_stock: 10,
        tax_rate: TaxRate::new(dec!(5)).context("tax rate")?,
        tax_inclusive: false,
        is_active: true,
        unit: "kg".to_string(),
    };
    let oil = Product {
        id: ProductId::new(),
        name: "Fortune Oil 1L".to_string(),
        sku: "OIL-1".to_string(),
        purchase_price: dec!(165),
        selling_price: dec!(180),
        mrp: dec!(195),
        stock: 25,
        min_stock: 5,
        tax_rate: TaxRate::new(dec!(5)).context("tax rate")?,
        tax_inclusive: true,
        is_active: true,
        unit: "pcs".to_string(),
    };
    let fan = Product {
        id: ProductId::new(),
        name: "Ceiling Fan 56in".to_string(),
        sku: "FAN-56".to_string(),
        purchase_price: dec!(1900),
        selling_price: dec!(2200),
        mrp: dec!(2400),
        stock: 4,
        min_stock: 2,
        tax_rate: default_rate,
        tax_inclusive: false,
        is_active: true,
        unit: "pcs".to_string(),
    };

    let ids = [sugar.id, oil.id, fan.id];
    for product in [sugar, oil, fan] {
        println!(
            "  {} at {} ({}% GST)",
            product.name,
            product.selling_price,
            product.tax_rate.as_percent()
        );
        catalog.upsert(product);
    }
    Ok(ids)
}
