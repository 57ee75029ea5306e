use crate::error::{FlowError, FlowResult};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::OnceLock;

/// Mobile-money carriers known to the platform
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    Orange,
    Africell,
    Qcell,
}

impl ProviderId {
    pub const ALL: [ProviderId; 3] = [ProviderId::Orange, ProviderId::Africell, ProviderId::Qcell];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Orange => "orange",
            ProviderId::Africell => "africell",
            ProviderId::Qcell => "qcell",
        }
    }

    pub fn default_fee_bps(&self) -> u32 {
        match self {
            ProviderId::Orange => 250,
            ProviderId::Africell => 200,
            ProviderId::Qcell => 300,
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = FlowError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "orange" | "orange_money" | "orange-money" => Ok(ProviderId::Orange),
            "africell" | "africell_money" | "africell-money" | "afrimoney" => {
                Ok(ProviderId::Africell)
            }
            "qcell" | "qmoney" => Ok(ProviderId::Qcell),
            _ => Err(FlowError::ProviderNotFound {
                provider: value.to_string(),
            }),
        }
    }
}

/// Whether money is flowing into a campaign or out to its owner
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Donation,
    Cashout,
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Donation => write!(f, "donation"),
            TransactionKind::Cashout => write!(f, "cashout"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    MobileMoney,
    Card,
    BankTransfer,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::MobileMoney => "mobile_money",
            PaymentMethod::Card => "card",
            PaymentMethod::BankTransfer => "bank_transfer",
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, PaymentMethod::MobileMoney)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AmountMode {
    Preset,
    Custom,
}

/// Amount as chosen on screen: a preset button or free-text entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AmountInput {
    pub mode: AmountMode,
    pub preset_amount: Option<Decimal>,
    pub custom_amount: Option<String>,
}

impl AmountInput {
    pub fn preset(amount: Decimal) -> Self {
        Self {
            mode: AmountMode::Preset,
            preset_amount: Some(amount),
            custom_amount: None,
        }
    }

    pub fn custom(text: impl Into<String>) -> Self {
        Self {
            mode: AmountMode::Custom,
            preset_amount: None,
            custom_amount: Some(text.into()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContactDetails {
    pub phone_number: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub anonymous: bool,
}

impl ContactDetails {
    pub fn new(phone_number: impl Into<String>) -> Self {
        Self {
            phone_number: phone_number.into(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }

    /// Checks the non-phone fields and returns the copy that gets submitted.
    ///
    /// Anonymous donors never have their name captured. Named donations need a
    /// non-blank name. Cashouts go to the campaign owner and skip the name rule.
    pub fn sanitized(&self, kind: TransactionKind) -> FlowResult<ContactDetails> {
        let email = match self.email.as_deref().map(str::trim) {
            Some("") | None => None,
            Some(email) => {
                if !email_pattern().is_match(email) {
                    return Err(FlowError::InvalidContact {
                        field: "email address".to_string(),
                        reason: "expected name@domain".to_string(),
                    });
                }
                Some(email.to_string())
            }
        };

        let name = match kind {
            TransactionKind::Donation if self.anonymous => None,
            TransactionKind::Donation => {
                let name = self
                    .name
                    .as_deref()
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .ok_or_else(|| FlowError::MissingContact {
                        field: "name".to_string(),
                    })?;
                Some(name.to_string())
            }
            TransactionKind::Cashout => self
                .name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
        };

        Ok(ContactDetails {
            phone_number: self.phone_number.clone(),
            email,
            name,
            anonymous: kind == TransactionKind::Donation && self.anonymous,
        })
    }
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is a valid regex")
    })
}
