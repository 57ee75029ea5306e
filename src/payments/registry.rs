//! Provider registry
//!
//! The registry is the single owner of each carrier's fee rate, support flag
//! and phone numbering pattern. It is built once and never mutated.

use crate::config::PaymentsConfig;
use crate::error::{FlowError, FlowResult};
use crate::payments::types::ProviderId;
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;
use std::sync::OnceLock;

/// Allowed carrier prefixes and the total digit count of a local number
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PhonePattern {
    /// Two-digit network codes, written without the trunk `0`
    pub prefixes: Vec<&'static str>,
    /// Digits in the local form, trunk `0` included
    pub local_length: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Provider {
    pub id: ProviderId,
    pub display_name: &'static str,
    pub fee_rate: Decimal,
    pub supported: bool,
    pub phone_pattern: PhonePattern,
    pub ussd_shortcode: &'static str,
}

#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    providers: Vec<Provider>,
}

impl ProviderRegistry {
    /// Process-wide registry built from the default configuration
    pub fn global() -> &'static ProviderRegistry {
        static REGISTRY: OnceLock<ProviderRegistry> = OnceLock::new();
        REGISTRY.get_or_init(|| ProviderRegistry::from_config(&PaymentsConfig::default()))
    }

    pub fn from_config(config: &PaymentsConfig) -> Self {
        let providers = ProviderId::ALL
            .into_iter()
            .map(|id| Provider {
                id,
                display_name: display_name(id),
                fee_rate: Decimal::from(config.fee_bps(id)) / Decimal::from(10_000),
                supported: config.enabled_providers.contains(&id),
                phone_pattern: phone_pattern(id),
                ussd_shortcode: ussd_shortcode(id),
            })
            .collect();

        Self { providers }
    }

    /// All providers in display order, unsupported ones included
    pub fn list(&self) -> &[Provider] {
        &self.providers
    }

    pub fn get(&self, id: ProviderId) -> FlowResult<&Provider> {
        self.providers
            .iter()
            .find(|provider| provider.id == id)
            .ok_or_else(|| FlowError::ProviderNotFound {
                provider: id.to_string(),
            })
    }

    pub fn get_by_name(&self, name: &str) -> FlowResult<&Provider> {
        self.get(ProviderId::from_str(name)?)
    }

    /// Like `get`, but refuses providers that are listed and not yet selectable
    pub fn select(&self, id: ProviderId) -> FlowResult<&Provider> {
        let provider = self.get(id)?;
        if !provider.supported {
            return Err(FlowError::ProviderUnsupported {
                provider: provider.display_name.to_string(),
            });
        }
        Ok(provider)
    }

    pub fn supported(&self) -> impl Iterator<Item = &Provider> {
        self.providers.iter().filter(|provider| provider.supported)
    }
}

fn display_name(id: ProviderId) -> &'static str {
    match id {
        ProviderId::Orange => "Orange Money",
        ProviderId::Africell => "Africell Money",
        ProviderId::Qcell => "QMoney",
    }
}

fn phone_pattern(id: ProviderId) -> PhonePattern {
    let prefixes = match id {
        ProviderId::Orange => vec!["72", "73", "74", "75", "76", "78", "79"],
        ProviderId::Africell => vec!["30", "33", "34", "77", "80", "88", "99"],
        ProviderId::Qcell => vec!["31", "32"],
    };
    PhonePattern {
        prefixes,
        local_length: 9,
    }
}

fn ussd_shortcode(id: ProviderId) -> &'static str {
    match id {
        ProviderId::Orange => "*144#",
        ProviderId::Africell => "*161#",
        ProviderId::Qcell => "*303#",
    }
}
