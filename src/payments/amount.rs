use crate::config::PaymentsConfig;
use crate::error::{FlowError, FlowResult};
use crate::payments::types::{AmountInput, AmountMode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Limits an amount must satisfy for one flow invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountBounds {
    pub minimum: Decimal,
    /// Set for cashouts: the campaign balance that can be withdrawn
    pub available_balance: Option<Decimal>,
}

impl AmountBounds {
    pub fn donation(minimum: Decimal) -> Self {
        Self {
            minimum,
            available_balance: None,
        }
    }

    pub fn cashout(minimum: Decimal, available_balance: Decimal) -> Self {
        Self {
            minimum,
            available_balance: Some(available_balance),
        }
    }
}

/// Derives the amount actually charged or withdrawn
#[derive(Debug, Clone)]
pub struct AmountResolver {
    presets: Vec<Decimal>,
    /// Decimal places the currency can express
    minor_units: u32,
}

impl AmountResolver {
    pub fn new(presets: Vec<Decimal>, minor_units: u32) -> Self {
        Self {
            presets,
            minor_units,
        }
    }

    pub fn from_config(config: &PaymentsConfig) -> Self {
        Self::new(config.preset_amounts.clone(), config.minor_units)
    }

    pub fn presets(&self) -> &[Decimal] {
        &self.presets
    }

    pub fn resolve(&self, input: &AmountInput, bounds: &AmountBounds) -> FlowResult<Decimal> {
        let amount = match input.mode {
            AmountMode::Preset => {
                let preset = input.preset_amount.ok_or_else(|| FlowError::InvalidAmount {
                    amount: String::new(),
                    reason: "no preset amount selected".to_string(),
                })?;
                if !self.presets.contains(&preset) {
                    return Err(FlowError::InvalidAmount {
                        amount: preset.to_string(),
                        reason: "not one of the preset amounts".to_string(),
                    });
                }
                preset
            }
            AmountMode::Custom => {
                let raw = input.custom_amount.as_deref().unwrap_or_default();
                parse_custom_amount(raw)?
            }
        };

        if amount.normalize().scale() > self.minor_units {
            return Err(FlowError::InvalidAmount {
                amount: amount.to_string(),
                reason: format!("at most {} decimal places are allowed", self.minor_units),
            });
        }

        if amount < bounds.minimum {
            return Err(FlowError::BelowMinimum {
                amount: amount.normalize().to_string(),
                minimum: bounds.minimum.normalize().to_string(),
            });
        }

        if let Some(available) = bounds.available_balance {
            if amount > available {
                return Err(FlowError::ExceedsAvailable {
                    amount: amount.normalize().to_string(),
                    available: available.normalize().to_string(),
                });
            }
        }

        Ok(amount)
    }
}

fn parse_custom_amount(raw: &str) -> FlowResult<Decimal> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return Err(FlowError::InvalidAmount {
            amount: raw.to_string(),
            reason: "amount is required".to_string(),
        });
    }

    let parsed = Decimal::from_str(&cleaned).map_err(|_| FlowError::InvalidAmount {
        amount: raw.to_string(),
        reason: "not a number".to_string(),
    })?;

    if parsed <= Decimal::ZERO {
        return Err(FlowError::InvalidAmount {
            amount: raw.to_string(),
            reason: "amount must be greater than zero".to_string(),
        });
    }

    Ok(parsed)
}
