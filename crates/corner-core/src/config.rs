//! # Application Configuration
//!
//! Store identity and formatting settings loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`CORNER_*`)
//! 2. Defaults (this file)
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.
//! If hot-reloading is added later, we'd wrap in `RwLock`.

use serde::{Deserialize, Serialize};

use crate::money::{Money, TaxRate};
use crate::validation::validate_tax_rate_bps;
use crate::DEFAULT_TAX_RATE_BPS;

/// Application configuration.
///
/// ## Fields
/// Most fields have sensible defaults for development.
/// Production deployments should configure these properly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Store name (header line on every printed document)
    pub store_name: String,

    /// Store address lines (for receipts)
    pub store_address: Vec<String>,

    /// Store phone number (for receipts)
    pub store_phone: String,

    /// Store contact email (for receipts)
    pub store_email: String,

    /// Currency code (ISO 4217)
    pub currency_code: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Number of decimal places for currency
    pub currency_decimals: u8,

    /// Sales tax rate in basis points, applied to the whole pre-discount
    /// subtotal at checkout. e.g., 1000 = 10.00%
    pub default_tax_rate_bps: u32,

    /// Width in characters of rendered receipts and reports
    /// (42 suits an 80mm thermal roll)
    pub receipt_width: usize,
}

impl Default for AppConfig {
    /// Returns default configuration suitable for development.
    ///
    /// ## Default Values
    /// - Store: "Corner Market"
    /// - Currency: USD ($)
    /// - Tax: 10% on the pre-discount subtotal
    /// - Receipt width: 42 characters
    fn default() -> Self {
        AppConfig {
            store_name: "Corner Market".to_string(),
            store_address: vec![
                "123 Main Street".to_string(),
                "City, Country".to_string(),
            ],
            store_phone: "+1 (555) 123-4567".to_string(),
            store_email: "info@cornermarket.com".to_string(),
            currency_code: "USD".to_string(),
            currency_symbol: "$".to_string(),
            currency_decimals: 2,
            default_tax_rate_bps: DEFAULT_TAX_RATE_BPS,
            receipt_width: 42,
        }
    }
}

impl AppConfig {
    /// Creates an AppConfig from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `CORNER_STORE_NAME`: Override store name
    /// - `CORNER_CURRENCY_SYMBOL`: Override currency symbol
    /// - `CORNER_TAX_RATE`: Override tax rate as a percentage (e.g., "8.25")
    ///
    /// Unparseable or out-of-range values fall back to the defaults.
    pub fn from_env() -> Self {
        let mut config = AppConfig::default();

        if let Ok(store_name) = std::env::var("CORNER_STORE_NAME") {
            config.store_name = store_name;
        }

        if let Ok(symbol) = std::env::var("CORNER_CURRENCY_SYMBOL") {
            config.currency_symbol = symbol;
        }

        if let Ok(tax_rate_str) = std::env::var("CORNER_TAX_RATE") {
            if let Ok(rate) = tax_rate_str.parse::<f64>() {
                // Negative or NaN rates would saturate to 0 bps in the cast
                if rate.is_finite() && rate >= 0.0 {
                    let bps = (rate * 100.0).round() as u32;
                    if validate_tax_rate_bps(bps).is_ok() {
                        config.default_tax_rate_bps = bps;
                    }
                }
            }
        }

        config
    }

    /// Returns the configured tax rate.
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.default_tax_rate_bps)
    }

    /// Formats a Money amount as a currency string.
    ///
    /// ## Example
    /// ```rust
    /// use corner_core::config::AppConfig;
    /// use corner_core::money::Money;
    ///
    /// let config = AppConfig::default();
    /// assert_eq!(config.format_currency(Money::from_cents(1234)), "$12.34");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        let cents = amount.cents();
        let divisor = 10_i64.pow(self.currency_decimals as u32);
        let whole = cents / divisor;
        let frac = (cents % divisor).abs();

        format!(
            "{}{}{}",
            if cents < 0 { "-" } else { "" },
            self.currency_symbol,
            if self.currency_decimals > 0 {
                format!(
                    "{}.{:0width$}",
                    whole.abs(),
                    frac,
                    width = self.currency_decimals as usize
                )
            } else {
                whole.abs().to_string()
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency_positive() {
        let config = AppConfig::default();
        assert_eq!(config.format_currency(Money::from_cents(1234)), "$12.34");
        assert_eq!(config.format_currency(Money::from_cents(100)), "$1.00");
        assert_eq!(config.format_currency(Money::from_cents(1)), "$0.01");
        assert_eq!(config.format_currency(Money::zero()), "$0.00");
    }

    #[test]
    fn test_format_currency_negative() {
        let config = AppConfig::default();
        assert_eq!(config.format_currency(Money::from_cents(-1234)), "-$12.34");
    }

    #[test]
    fn test_format_currency_large() {
        let config = AppConfig::default();
        assert_eq!(
            config.format_currency(Money::from_cents(123456789)),
            "$1234567.89"
        );
    }

    #[test]
    fn test_default_tax_rate() {
        let config = AppConfig::default();
        assert_eq!(config.tax_rate().bps(), 1000);
        assert!((config.tax_rate().percentage() - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_env_tax_rate_junk_keeps_the_default() {
        std::env::set_var("CORNER_TAX_RATE", "8.25");
        assert_eq!(AppConfig::from_env().default_tax_rate_bps, 825);

        // Junk must fall back to the default, never zero the tax
        for junk in ["-5", "NaN", "inf", "abc", "250"] {
            std::env::set_var("CORNER_TAX_RATE", junk);
            assert_eq!(
                AppConfig::from_env().default_tax_rate_bps,
                DEFAULT_TAX_RATE_BPS,
                "rate {junk:?} should fall back"
            );
        }

        std::env::remove_var("CORNER_TAX_RATE");
    }
}
