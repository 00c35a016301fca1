//! Engine configuration management.

use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Engine configuration.
///
/// Every field carries a sensible default so the engine can run with no
/// config files at all; files and environment only override.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    /// Billing configuration.
    #[serde(default)]
    pub billing: BillingConfig,
    /// Credit ledger configuration.
    #[serde(default)]
    pub credit: CreditConfig,
    /// Quotation configuration.
    #[serde(default)]
    pub quotes: QuoteConfig,
}

/// Billing configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BillingConfig {
    /// Hours after finalization during which non-financial header
    /// fields may still be amended.
    #[serde(default = "default_grace_window_hours")]
    pub grace_window_hours: i64,
    /// Zero-padded width of the sequence part of document numbers.
    #[serde(default = "default_number_pad_width")]
    pub number_pad_width: usize,
    /// Tax rate percentage applied when a product carries none.
    #[serde(default = "default_tax_percent")]
    pub default_tax_percent: Decimal,
    /// Business timezone used to derive document dates and years.
    #[serde(default = "default_timezone")]
    pub timezone: Tz,
}

fn default_grace_window_hours() -> i64 {
    24
}

fn default_number_pad_width() -> usize {
    6
}

fn default_tax_percent() -> Decimal {
    Decimal::from(18)
}

fn default_timezone() -> Tz {
    chrono_tz::Asia::Kolkata
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            grace_window_hours: default_grace_window_hours(),
            number_pad_width: default_number_pad_width(),
            default_tax_percent: default_tax_percent(),
            timezone: default_timezone(),
        }
    }
}

/// Credit ledger configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CreditConfig {
    /// Days until an entry opened today falls due.
    #[serde(default = "default_due_days")]
    pub default_due_days: i64,
}

fn default_due_days() -> i64 {
    30
}

impl Default for CreditConfig {
    fn default() -> Self {
        Self {
            default_due_days: default_due_days(),
        }
    }
}

/// Quotation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteConfig {
    /// Days a quotation stays valid after it is issued.
    #[serde(default = "default_valid_days")]
    pub valid_days: i64,
}

fn default_valid_days() -> i64 {
    7
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            valid_days: default_valid_days(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("KHATA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
