//! Shared types and configuration for Khata.
//!
//! This crate provides common building blocks used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Money rounding helpers and the validated tax rate type
//! - Business-calendar helpers for timezone-aware dating
//! - Engine configuration management

pub mod config;
pub mod types;

pub use config::EngineConfig;
pub use types::money::TaxRate;
