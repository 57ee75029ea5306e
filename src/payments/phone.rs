use crate::error::{FlowError, FlowResult};
use crate::payments::registry::Provider;
use regex::Regex;
use std::sync::OnceLock;

const COUNTRY_CODE: &str = "232";

/// Format-only check of a mobile-money number against one provider's pattern
pub struct PhoneValidator;

impl PhoneValidator {
    /// Returns the number in local form (`0` + network code + subscriber digits).
    pub fn validate(raw: &str, provider: &Provider) -> FlowResult<String> {
        let invalid = |reason: &str| FlowError::InvalidPhone {
            provider: provider.display_name.to_string(),
            reason: reason.to_string(),
        };

        let compact: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();

        if compact.is_empty() {
            return Err(invalid("phone number is required"));
        }
        if !digits_pattern().is_match(&compact) {
            return Err(invalid("phone number must contain only digits"));
        }

        let local = Self::to_local(&compact);
        let pattern = &provider.phone_pattern;

        if local.len() != pattern.local_length || !local.starts_with('0') {
            return Err(invalid(&format!(
                "expected {} digits starting with 0",
                pattern.local_length
            )));
        }

        let network = &local[1..3];
        if !pattern.prefixes.iter().any(|prefix| *prefix == network) {
            return Err(invalid(&format!(
                "0{} is not a {} prefix",
                network, provider.display_name
            )));
        }

        Ok(local)
    }

    pub fn is_valid(raw: &str, provider: &Provider) -> bool {
        Self::validate(raw, provider).is_ok()
    }

    fn to_local(compact: &str) -> String {
        let national = compact
            .strip_prefix('+')
            .and_then(|rest| rest.strip_prefix(COUNTRY_CODE))
            .or_else(|| {
                compact
                    .strip_prefix("00")
                    .and_then(|rest| rest.strip_prefix(COUNTRY_CODE))
            })
            .or_else(|| {
                // Bare country code only when what follows cannot be a local number
                compact
                    .strip_prefix(COUNTRY_CODE)
                    .filter(|rest| !rest.starts_with('0') && rest.len() == 8)
            });

        match national {
            Some(rest) => format!("0{}", rest.trim_start_matches('0')),
            None => compact.to_string(),
        }
    }
}

fn digits_pattern() -> &'static Regex {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    DIGITS.get_or_init(|| Regex::new(r"^\+?[0-9]+$").expect("digit pattern is a valid regex"))
}
