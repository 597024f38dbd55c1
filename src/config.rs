//! # Configuration
//!
//! Application configuration loading and management.
//!
//! Configuration is loaded in the following order (later sources
//! override earlier):
//! 1. Default values
//! 2. Configuration file (if `SEAQUOTE_CONFIG` points at one)
//! 3. Environment variables (prefixed with `SEAQUOTE_`)
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SEAQUOTE_REST_HOST` | REST server host | `0.0.0.0` |
//! | `SEAQUOTE_REST_PORT` | REST server port | `8080` |
//! | `SEAQUOTE_LOG_LEVEL` | Log level | `info` |
//! | `SEAQUOTE_LOG_FORMAT` | Log format (json/pretty) | `json` |
//! | `SEAQUOTE_CURRENCY` | Quoting currency | `USD` |
//! | `SEAQUOTE_TAX_RATE` | Fixed tax rate on subtotals | `0` |
//! | `SEAQUOTE_QUOTE_VALIDITY_DAYS` | Customer acceptance window | `30` |
//! | `SEAQUOTE_ESTIMATE_TTL_DAYS` | Guest estimate time-to-live | `7` |
//! | `SEAQUOTE_SWEEP_INTERVAL_SECS` | Estimate sweep cadence | `3600` |
//!
//! # Examples
//!
//! ```ignore
//! use seaquote::config::AppConfig;
//!
//! let config = AppConfig::load()?;
//! println!("REST server: {}", config.rest_addr()?);
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration.
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// Invalid configuration value.
    #[error("invalid config value for {field}: {message}")]
    InvalidValue {
        /// Field name.
        field: &'static str,
        /// Error message.
        message: String,
    },
}

/// REST server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestConfig {
    /// Server host address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port.
    #[serde(default = "default_rest_port")]
    pub port: u16,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_rest_port(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (`trace` .. `error`).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (`json` or `pretty`).
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Pricing policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Quoting currency code.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Fixed tax rate applied on subtotals.
    #[serde(default = "default_tax_rate")]
    pub tax_rate: Decimal,

    /// Customer acceptance window in days.
    #[serde(default = "default_quote_validity_days")]
    pub quote_validity_days: i64,

    /// Guest estimate time-to-live in days.
    #[serde(default = "default_estimate_ttl_days")]
    pub estimate_ttl_days: i64,

    /// Bound on conditional/expression formula nesting.
    #[serde(default = "default_max_formula_depth")]
    pub max_formula_depth: usize,

    /// Seconds between estimate expiry sweeps.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            tax_rate: default_tax_rate(),
            quote_validity_days: default_quote_validity_days(),
            estimate_ttl_days: default_estimate_ttl_days(),
            max_formula_depth: default_max_formula_depth(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// REST server settings.
    #[serde(default)]
    pub rest: RestConfig,

    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,

    /// Pricing policy settings.
    #[serde(default)]
    pub pricing: PricingConfig,
}

impl AppConfig {
    /// Loads configuration from defaults, an optional file named by
    /// `SEAQUOTE_CONFIG`, and `SEAQUOTE_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for an unreadable or unparsable file or a
    /// malformed environment value.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("SEAQUOTE_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::FileRead` or `ConfigError::Parse`.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` on malformed TOML.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Returns the REST bind address.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when host/port do not form a
    /// socket address.
    pub fn rest_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.rest.host, self.rest.port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                field: "rest.host",
                message: format!("{}:{} is not a socket address", self.rest.host, self.rest.port),
            })
    }

    /// Validates cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for out-of-range settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pricing.tax_rate.is_sign_negative() {
            return Err(ConfigError::InvalidValue {
                field: "pricing.tax_rate",
                message: "tax rate cannot be negative".to_string(),
            });
        }
        if self.pricing.quote_validity_days <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "pricing.quote_validity_days",
                message: "validity window must be positive".to_string(),
            });
        }
        if self.pricing.estimate_ttl_days <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "pricing.estimate_ttl_days",
                message: "estimate TTL must be positive".to_string(),
            });
        }
        if self.pricing.max_formula_depth == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pricing.max_formula_depth",
                message: "depth bound must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(host) = std::env::var("SEAQUOTE_REST_HOST") {
            self.rest.host = host;
        }
        if let Ok(port) = std::env::var("SEAQUOTE_REST_PORT") {
            self.rest.port = parse_env("SEAQUOTE_REST_PORT", &port)?;
        }
        if let Ok(level) = std::env::var("SEAQUOTE_LOG_LEVEL") {
            self.log.level = level;
        }
        if let Ok(format) = std::env::var("SEAQUOTE_LOG_FORMAT") {
            self.log.format = format;
        }
        if let Ok(currency) = std::env::var("SEAQUOTE_CURRENCY") {
            self.pricing.currency = currency;
        }
        if let Ok(rate) = std::env::var("SEAQUOTE_TAX_RATE") {
            self.pricing.tax_rate = parse_env("SEAQUOTE_TAX_RATE", &rate)?;
        }
        if let Ok(days) = std::env::var("SEAQUOTE_QUOTE_VALIDITY_DAYS") {
            self.pricing.quote_validity_days = parse_env("SEAQUOTE_QUOTE_VALIDITY_DAYS", &days)?;
        }
        if let Ok(days) = std::env::var("SEAQUOTE_ESTIMATE_TTL_DAYS") {
            self.pricing.estimate_ttl_days = parse_env("SEAQUOTE_ESTIMATE_TTL_DAYS", &days)?;
        }
        if let Ok(secs) = std::env::var("SEAQUOTE_SWEEP_INTERVAL_SECS") {
            self.pricing.sweep_interval_secs = parse_env("SEAQUOTE_SWEEP_INTERVAL_SECS", &secs)?;
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        field,
        message: format!("cannot parse '{value}'"),
    })
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_rest_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_tax_rate() -> Decimal {
    Decimal::ZERO
}

fn default_quote_validity_days() -> i64 {
    30
}

fn default_estimate_ttl_days() -> i64 {
    7
}

fn default_max_formula_depth() -> usize {
    16
}

fn default_sweep_interval_secs() -> u64 {
    3600
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = AppConfig::default();
        assert_eq!(config.rest.port, 8080);
        assert_eq!(config.pricing.currency, "USD");
        assert_eq!(config.pricing.tax_rate, Decimal::ZERO);
        assert_eq!(config.pricing.quote_validity_days, 30);
        assert_eq!(config.pricing.estimate_ttl_days, 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rest_addr_combines_host_and_port() {
        let config = AppConfig::default();
        assert_eq!(config.rest_addr().unwrap().port(), 8080);
    }

    #[test]
    fn toml_overrides_defaults_partially() {
        let config = AppConfig::from_toml_str(
            r#"
            [rest]
            port = 9090

            [pricing]
            tax_rate = "0.08"
            estimate_ttl_days = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.rest.port, 9090);
        assert_eq!(config.rest.host, "0.0.0.0");
        assert_eq!(config.pricing.tax_rate.to_string(), "0.08");
        assert_eq!(config.pricing.estimate_ttl_days, 3);
        assert_eq!(config.pricing.quote_validity_days, 30);
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            AppConfig::from_toml_str("rest = 'nope"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn validate_rejects_nonpositive_windows() {
        let mut config = AppConfig::default();
        config.pricing.quote_validity_days = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.pricing.estimate_ttl_days = -1;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.pricing.tax_rate = Decimal::NEGATIVE_ONE;
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_host_is_rejected_by_rest_addr() {
        let mut config = AppConfig::default();
        config.rest.host = "not a host".to_string();
        assert!(config.rest_addr().is_err());
    }
}
