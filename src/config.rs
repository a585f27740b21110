//! Application configuration loading and validation.
//!
//! Configuration is loaded once from a TOML file at startup and treated as
//! immutable for the process lifetime. Telegram credentials come from
//! environment variables, never from the config file. Missing or invalid
//! values are fatal: the process refuses to enter the run loop with
//! undefined fees or thresholds.

use serde::Deserialize;
use std::path::Path;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{ConfigError, Result};

/// Wire protocol spoken by an exchange feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeKind {
    Bybit,
    Okx,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    /// Tracked pairs in canonical `BASE-QUOTE` form (e.g. `BTC-USDT`).
    pub pairs: Vec<String>,
    /// Exchanges to watch. Declaration order fixes the evaluator's
    /// enumeration order, making opportunity selection reproducible.
    pub exchanges: Vec<ExchangeConfig>,
    pub scanner: ScannerConfig,
    #[serde(default)]
    pub backoff: BackoffConfig,
    #[serde(default)]
    pub health: HealthConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub telegram: TelegramAppConfig,
    #[serde(default)]
    pub paper: PaperConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeConfig {
    /// Unique exchange name used as the key in price state and fee lookups.
    pub name: String,
    pub kind: ExchangeKind,
    pub ws_url: String,
    /// Taker fee as a fraction (0.0018 = 0.18%).
    pub taker_fee: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScannerConfig {
    /// Minimum post-fee profit in percent required to report an opportunity.
    pub min_profit_percent: f64,
    /// Quotes older than this are too stale to evaluate.
    #[serde(default = "default_staleness_timeout")]
    pub staleness_timeout_secs: f64,
}

fn default_staleness_timeout() -> f64 {
    10.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackoffConfig {
    #[serde(default = "default_backoff_initial")]
    pub initial_secs: u64,
    #[serde(default = "default_backoff_max")]
    pub max_secs: u64,
}

const fn default_backoff_initial() -> u64 {
    5
}

const fn default_backoff_max() -> u64 {
    60
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_secs: default_backoff_initial(),
            max_secs: default_backoff_max(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthConfig {
    #[serde(default = "default_health_interval")]
    pub interval_secs: u64,
}

const fn default_health_interval() -> u64 {
    60
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_health_interval(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

/// Telegram notification configuration. The bot token and chat ID are read
/// from `TELEGRAM_BOT_TOKEN` / `TELEGRAM_CHAT_ID` at runtime.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramAppConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Minimum seconds between sent alerts.
    #[serde(default = "default_telegram_cooldown")]
    pub cooldown_secs: f64,
}

fn default_telegram_cooldown() -> f64 {
    30.0
}

impl Default for TelegramAppConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            cooldown_secs: default_telegram_cooldown(),
        }
    }
}

/// Paper trading configuration. Balances are per-exchange starting amounts
/// in quote and base currency of the tracked pair.
#[derive(Debug, Clone, Deserialize)]
pub struct PaperConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Fraction of each balance held back from every simulated trade.
    #[serde(default = "default_safety_margin")]
    pub safety_margin: f64,
    #[serde(default = "default_initial_quote")]
    pub initial_quote: f64,
    #[serde(default = "default_initial_base")]
    pub initial_base: f64,
}

fn default_safety_margin() -> f64 {
    0.05
}

fn default_initial_quote() -> f64 {
    500.0
}

fn default_initial_base() -> f64 {
    0.01
}

impl Default for PaperConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            safety_margin: default_safety_margin(),
            initial_quote: default_initial_quote(),
            initial_base: default_initial_base(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;

        let config: Self = toml::from_str(&content).map_err(ConfigError::Parse)?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.pairs.is_empty() {
            return Err(ConfigError::MissingField { field: "pairs" }.into());
        }
        if self.exchanges.len() < 2 {
            return Err(ConfigError::InvalidValue {
                field: "exchanges",
                reason: format!("need at least 2 exchanges, got {}", self.exchanges.len()),
            }
            .into());
        }
        for (i, exchange) in self.exchanges.iter().enumerate() {
            if exchange.name.is_empty() {
                return Err(ConfigError::MissingField {
                    field: "exchanges.name",
                }
                .into());
            }
            if exchange.ws_url.is_empty() {
                return Err(ConfigError::MissingField {
                    field: "exchanges.ws_url",
                }
                .into());
            }
            if !(0.0..1.0).contains(&exchange.taker_fee) {
                return Err(ConfigError::InvalidValue {
                    field: "exchanges.taker_fee",
                    reason: format!(
                        "fee for '{}' must be in [0, 1), got {}",
                        exchange.name, exchange.taker_fee
                    ),
                }
                .into());
            }
            if self.exchanges[..i].iter().any(|e| e.name == exchange.name) {
                return Err(ConfigError::InvalidValue {
                    field: "exchanges.name",
                    reason: format!("duplicate exchange name '{}'", exchange.name),
                }
                .into());
            }
        }
        if self.scanner.min_profit_percent <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "min_profit_percent",
                reason: format!("must be positive, got {}", self.scanner.min_profit_percent),
            }
            .into());
        }
        if self.scanner.staleness_timeout_secs <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "staleness_timeout_secs",
                reason: format!(
                    "must be positive, got {}",
                    self.scanner.staleness_timeout_secs
                ),
            }
            .into());
        }
        if self.backoff.initial_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "backoff.initial_secs",
                reason: "must be at least 1".into(),
            }
            .into());
        }
        if self.backoff.max_secs < self.backoff.initial_secs {
            return Err(ConfigError::InvalidValue {
                field: "backoff.max_secs",
                reason: format!(
                    "must be >= initial_secs ({})",
                    self.backoff.initial_secs
                ),
            }
            .into());
        }
        if !(0.0..1.0).contains(&self.paper.safety_margin) {
            return Err(ConfigError::InvalidValue {
                field: "paper.safety_margin",
                reason: format!("must be in [0, 1), got {}", self.paper.safety_margin),
            }
            .into());
        }
        Ok(())
    }

    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.logging.level));

        match self.logging.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}
