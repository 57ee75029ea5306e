//! Flow configuration module
//! Loads payment flow settings from environment variables and validates them

use crate::payments::summary::FeePolicy;
use crate::payments::types::ProviderId;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub payments: PaymentsConfig,
    pub gateway: GatewayConfig,
    pub logging: LoggingConfig,
}

/// Amount rules, provider set and fee settings
#[derive(Debug, Clone)]
pub struct PaymentsConfig {
    pub currency: String,
    pub minor_units: u32,
    pub minimum_amount: Decimal,
    pub preset_amounts: Vec<Decimal>,
    pub enabled_providers: Vec<ProviderId>,
    pub provider_fee_bps: HashMap<ProviderId, u32>,
    pub cashout_fee_policy: FeePolicy,
}

/// Remote payment gateway settings
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log format options
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Plain,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenv::dotenv().ok();

        Ok(AppConfig {
            payments: PaymentsConfig::from_env()?,
            gateway: GatewayConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.payments.validate()?;
        self.gateway.validate()?;
        self.logging.validate()?;

        Ok(())
    }
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        let mut provider_fee_bps = HashMap::new();
        for id in ProviderId::ALL {
            provider_fee_bps.insert(id, id.default_fee_bps());
        }

        Self {
            currency: "SLE".to_string(),
            minor_units: 2,
            minimum_amount: Decimal::ONE,
            preset_amounts: [50, 100, 250, 500, 1000]
                .into_iter()
                .map(Decimal::from)
                .collect(),
            enabled_providers: vec![ProviderId::Orange, ProviderId::Africell],
            provider_fee_bps,
            cashout_fee_policy: FeePolicy::Absorbed,
        }
    }
}

impl PaymentsConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = PaymentsConfig::default();

        let preset_amounts = match env::var("PAYFLOW_PRESET_AMOUNTS") {
            Ok(raw) => parse_decimal_list(&raw, "PAYFLOW_PRESET_AMOUNTS")?,
            Err(_) => defaults.preset_amounts,
        };

        let enabled_providers = match env::var("PAYFLOW_ENABLED_PROVIDERS") {
            Ok(raw) => {
                let mut providers = Vec::new();
                for part in raw.split(',') {
                    let value = part.trim();
                    if value.is_empty() {
                        continue;
                    }
                    let id = ProviderId::from_str(value).map_err(|_| {
                        ConfigError::InvalidValue("PAYFLOW_ENABLED_PROVIDERS".to_string())
                    })?;
                    providers.push(id);
                }
                providers
            }
            Err(_) => defaults.enabled_providers,
        };

        let mut provider_fee_bps = HashMap::new();
        for id in ProviderId::ALL {
            let key = format!("{}_FEE_BPS", id.as_str().to_uppercase());
            let bps = match env::var(&key) {
                Ok(raw) => raw
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| ConfigError::InvalidValue(key.clone()))?,
                Err(_) => id.default_fee_bps(),
            };
            provider_fee_bps.insert(id, bps);
        }

        Ok(PaymentsConfig {
            currency: env::var("PAYFLOW_CURRENCY").unwrap_or(defaults.currency),
            minor_units: env::var("PAYFLOW_MINOR_UNITS")
                .unwrap_or_else(|_| "2".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PAYFLOW_MINOR_UNITS".to_string()))?,
            minimum_amount: Decimal::from_str(
                env::var("PAYFLOW_MIN_AMOUNT")
                    .unwrap_or_else(|_| "1".to_string())
                    .trim(),
            )
            .map_err(|_| ConfigError::InvalidValue("PAYFLOW_MIN_AMOUNT".to_string()))?,
            preset_amounts,
            enabled_providers,
            provider_fee_bps,
            cashout_fee_policy: match env::var("PAYFLOW_CASHOUT_FEE_POLICY")
                .unwrap_or_else(|_| "absorbed".to_string())
                .to_lowercase()
                .as_str()
            {
                "absorbed" => FeePolicy::Absorbed,
                "deducted" => FeePolicy::Deducted,
                _ => {
                    return Err(ConfigError::InvalidValue(
                        "PAYFLOW_CASHOUT_FEE_POLICY".to_string(),
                    ))
                }
            },
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.currency.trim().is_empty() {
            return Err(ConfigError::InvalidValue("PAYFLOW_CURRENCY".to_string()));
        }

        if self.minimum_amount <= Decimal::ZERO {
            return Err(ConfigError::ValidationFailed(
                "PAYFLOW_MIN_AMOUNT must be greater than zero".to_string(),
            ));
        }

        if let Some(preset) = self
            .preset_amounts
            .iter()
            .find(|preset| **preset < self.minimum_amount)
        {
            return Err(ConfigError::ValidationFailed(format!(
                "preset amount {} is below the minimum of {}",
                preset, self.minimum_amount
            )));
        }

        if self.enabled_providers.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "at least one provider must be enabled".to_string(),
            ));
        }

        for (id, bps) in &self.provider_fee_bps {
            if *bps >= 10_000 {
                return Err(ConfigError::ValidationFailed(format!(
                    "fee for {} must be below 10000 bps",
                    id
                )));
            }
        }

        Ok(())
    }

    pub fn fee_bps(&self, id: ProviderId) -> u32 {
        self.provider_fee_bps
            .get(&id)
            .copied()
            .unwrap_or_else(|| id.default_fee_bps())
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080/api/payments".to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(GatewayConfig {
            base_url: env::var("PAYFLOW_GATEWAY_URL")
                .unwrap_or_else(|_| GatewayConfig::default().base_url),
            api_key: env::var("PAYFLOW_GATEWAY_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            timeout_secs: env::var("PAYFLOW_GATEWAY_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|_| {
                    ConfigError::InvalidValue("PAYFLOW_GATEWAY_TIMEOUT_SECS".to_string())
                })?,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue(
                "PAYFLOW_GATEWAY_URL must be a valid URL".to_string(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "PAYFLOW_GATEWAY_TIMEOUT_SECS".to_string(),
            ));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl LoggingConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "INFO".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "plain".to_string())
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Plain,
            },
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];
        if !valid_levels.contains(&self.level.to_uppercase().as_str()) {
            return Err(ConfigError::InvalidValue("LOG_LEVEL".to_string()));
        }

        Ok(())
    }
}

fn parse_decimal_list(raw: &str, key: &str) -> Result<Vec<Decimal>, ConfigError> {
    let mut values = Vec::new();
    for part in raw.split(',') {
        let value = part.trim();
        if value.is_empty() {
            continue;
        }
        let parsed =
            Decimal::from_str(value).map_err(|_| ConfigError::InvalidValue(key.to_string()))?;
        values.push(parsed);
    }
    Ok(values)
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for configuration: {0}")]
    InvalidValue(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}
