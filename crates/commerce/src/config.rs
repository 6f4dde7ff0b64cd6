//! Commerce configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `LUXE_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)
//!
//! ## Optional
//! - `LUXE_FREE_SHIPPING_THRESHOLD` - Subtotal at which shipping becomes
//!   free, inclusive (default: 100)
//! - `LUXE_FLAT_SHIPPING_COST` - Shipping cost below the threshold
//!   (default: 9.99)
//! - `LUXE_TAX_RATE` - Tax rate as a fraction (default: 0.08)

use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;

use luxe_core::Money;

use crate::services::pricing::PricingConfig;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Commerce library configuration.
#[derive(Debug, Clone)]
pub struct CommerceConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// Pricing thresholds and rates
    pub pricing: PricingConfig,
}

impl CommerceConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or any
    /// pricing variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            database_url: get_database_url("LUXE_DATABASE_URL")?,
            pricing: pricing_from_env()?,
        })
    }
}

/// Load pricing configuration, using defaults for unset variables.
fn pricing_from_env() -> Result<PricingConfig, ConfigError> {
    let defaults = PricingConfig::default();
    Ok(PricingConfig {
        free_shipping_threshold: get_money_or(
            "LUXE_FREE_SHIPPING_THRESHOLD",
            defaults.free_shipping_threshold,
        )?,
        flat_shipping_cost: get_money_or("LUXE_FLAT_SHIPPING_COST", defaults.flat_shipping_cost)?,
        tax_rate: get_rate_or("LUXE_TAX_RATE", defaults.tax_rate)?,
    })
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get a money amount from the environment, or the default when unset.
fn get_money_or(key: &str, default: Money) -> Result<Money, ConfigError> {
    match std::env::var(key) {
        Err(_) => Ok(default),
        Ok(value) => parse_money(key, &value),
    }
}

/// Get a non-negative decimal rate from the environment, or the default.
fn get_rate_or(key: &str, default: Decimal) -> Result<Decimal, ConfigError> {
    match std::env::var(key) {
        Err(_) => Ok(default),
        Ok(value) => parse_rate(key, &value),
    }
}

fn parse_money(key: &str, value: &str) -> Result<Money, ConfigError> {
    Money::parse(value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_rate(key: &str, value: &str) -> Result<Decimal, ConfigError> {
    let rate: Decimal = value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnvVar(key.to_string(), "not a decimal".to_string()))?;
    if rate.is_sign_negative() && !rate.is_zero() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("rate cannot be negative (got {rate})"),
        ));
    }
    Ok(rate)
}
