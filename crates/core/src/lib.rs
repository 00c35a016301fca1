//! Core billing and credit ledger logic for Khata.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `pricing` - Line and bill arithmetic (discounts, GST, round-off)
//! - `stock` - Stock reservation and atomic commit over the catalog
//! - `numbering` - Document number composition over an atomic sequence source
//! - `billing` - Bill lifecycle: drafts, finalization, payments, amendments
//! - `credit` - Credit ledger (udhari): entries, payments, reminders
//! - `aging` - Receivables aging report
//! - `quote` - Quotations convertible into bills
//! - `catalog` - Product snapshot and the catalog capability
//! - `events` - Domain events and the notification sink capability

pub mod aging;
pub mod billing;
pub mod catalog;
pub mod credit;
pub mod events;
pub mod numbering;
pub mod pricing;
pub mod quote;
pub mod stock;
