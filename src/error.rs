//! Error taxonomy for the payment flow
//!
//! Validation errors are produced locally and never reach the network.
//! `GatewayFailure` is the only error raised after a gateway round-trip.

use crate::flow::state::FlowStep;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type FlowResult<T> = Result<T, FlowError>;

/// Stable codes for programmatic handling by the presentation layer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorCode {
    #[serde(rename = "INVALID_AMOUNT")]
    InvalidAmount,
    #[serde(rename = "BELOW_MINIMUM")]
    BelowMinimum,
    #[serde(rename = "EXCEEDS_AVAILABLE")]
    ExceedsAvailable,
    #[serde(rename = "INVALID_PHONE")]
    InvalidPhone,
    #[serde(rename = "MISSING_CONTACT")]
    MissingContact,
    #[serde(rename = "INVALID_CONTACT")]
    InvalidContact,
    #[serde(rename = "PROVIDER_UNSUPPORTED")]
    ProviderUnsupported,
    #[serde(rename = "PROVIDER_NOT_FOUND")]
    ProviderNotFound,
    #[serde(rename = "PAYMENT_METHOD_UNSUPPORTED")]
    PaymentMethodUnsupported,
    #[serde(rename = "GATEWAY_FAILURE")]
    GatewayFailure,
    #[serde(rename = "INVALID_TRANSITION")]
    InvalidTransition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FlowError {
    #[error("invalid amount '{amount}': {reason}")]
    InvalidAmount { amount: String, reason: String },

    #[error("amount {amount} is below the minimum of {minimum}")]
    BelowMinimum { amount: String, minimum: String },

    #[error("amount {amount} exceeds the available balance of {available}")]
    ExceedsAvailable { amount: String, available: String },

    #[error("invalid phone number for {provider}: {reason}")]
    InvalidPhone { provider: String, reason: String },

    #[error("missing contact field: {field}")]
    MissingContact { field: String },

    #[error("invalid {field}: {reason}")]
    InvalidContact { field: String, reason: String },

    #[error("provider {provider} is not supported yet")]
    ProviderUnsupported { provider: String },

    #[error("unknown provider: {provider}")]
    ProviderNotFound { provider: String },

    #[error("payment method {method} is not supported")]
    PaymentMethodUnsupported { method: String },

    #[error("gateway failure: {reason}")]
    GatewayFailure { reason: String },

    #[error("cannot {action} while at step {step}")]
    InvalidTransition { step: FlowStep, action: String },
}

impl FlowError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            FlowError::InvalidAmount { .. } => ErrorCode::InvalidAmount,
            FlowError::BelowMinimum { .. } => ErrorCode::BelowMinimum,
            FlowError::ExceedsAvailable { .. } => ErrorCode::ExceedsAvailable,
            FlowError::InvalidPhone { .. } => ErrorCode::InvalidPhone,
            FlowError::MissingContact { .. } => ErrorCode::MissingContact,
            FlowError::InvalidContact { .. } => ErrorCode::InvalidContact,
            FlowError::ProviderUnsupported { .. } => ErrorCode::ProviderUnsupported,
            FlowError::ProviderNotFound { .. } => ErrorCode::ProviderNotFound,
            FlowError::PaymentMethodUnsupported { .. } => ErrorCode::PaymentMethodUnsupported,
            FlowError::GatewayFailure { .. } => ErrorCode::GatewayFailure,
            FlowError::InvalidTransition { .. } => ErrorCode::InvalidTransition,
        }
    }

    /// Errors that are resolved on the current step without a network call
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            FlowError::GatewayFailure { .. } | FlowError::InvalidTransition { .. }
        )
    }

    /// Only a failed submission can be retried as-is; everything else needs new input
    pub fn is_retryable(&self) -> bool {
        matches!(self, FlowError::GatewayFailure { .. })
    }

    /// Inline message for the step the user is on
    pub fn user_message(&self) -> String {
        match self {
            FlowError::InvalidAmount { .. } => "Please enter a valid amount".to_string(),
            FlowError::BelowMinimum { minimum, .. } => {
                format!("The minimum amount is {}", minimum)
            }
            FlowError::ExceedsAvailable { available, .. } => {
                format!("You can withdraw at most {}", available)
            }
            FlowError::InvalidPhone { provider, .. } => {
                format!("Please enter a valid {} number", provider)
            }
            FlowError::MissingContact { field } => format!("Please provide your {}", field),
            FlowError::InvalidContact { field, .. } => {
                format!("Please enter a valid {}", field)
            }
            FlowError::ProviderUnsupported { provider } => {
                format!("{} is coming soon. Please choose another provider", provider)
            }
            FlowError::ProviderNotFound { .. } => "Please choose a provider".to_string(),
            FlowError::PaymentMethodUnsupported { .. } => {
                "This payment method is not available yet".to_string()
            }
            FlowError::GatewayFailure { reason } => {
                format!("Transaction failed: {}. Please try again", reason)
            }
            FlowError::InvalidTransition { .. } => {
                "This action is not available right now".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_not_retryable() {
        let err = FlowError::InvalidPhone {
            provider: "Orange Money".to_string(),
            reason: "bad prefix".to_string(),
        };
        assert!(err.is_validation());
        assert!(!err.is_retryable());
        assert_eq!(err.error_code(), ErrorCode::InvalidPhone);
    }

    #[test]
    fn invalid_contact_message_names_the_field() {
        let err = FlowError::InvalidContact {
            field: "email address".to_string(),
            reason: "expected name@domain".to_string(),
        };
        assert!(err.is_validation());
        assert_eq!(err.error_code(), ErrorCode::InvalidContact);
        assert_eq!(err.user_message(), "Please enter a valid email address");
        assert_eq!(
            err.to_string(),
            "invalid email address: expected name@domain"
        );
    }

    #[test]
    fn gateway_failure_is_retryable() {
        let err = FlowError::GatewayFailure {
            reason: "timeout".to_string(),
        };
        assert!(err.is_retryable());
        assert!(!err.is_validation());
        assert_eq!(err.to_string(), "gateway failure: timeout");
    }

    #[test]
    fn error_serializes_with_kind_tag() {
        let err = FlowError::ExceedsAvailable {
            amount: "600".to_string(),
            available: "500".to_string(),
        };
        let json = serde_json::to_value(&err).expect("serialization should succeed");
        assert_eq!(json["kind"], "exceeds_available");
        assert_eq!(json["available"], "500");

        let code = serde_json::to_value(err.error_code()).expect("serialization should succeed");
        assert_eq!(code, "EXCEEDS_AVAILABLE");
    }
}
