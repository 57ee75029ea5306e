use crate::error::FlowError;
use crate::payments::types::{ContactDetails, ProviderId};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("network error: {message}")]
    Network { message: String },

    #[error("gateway timed out after {}s", Decimal::new(*millis as i64, 3).normalize())]
    Timeout { millis: u64 },

    #[error("transaction declined: {message}")]
    Declined {
        message: String,
        provider_code: Option<String>,
    },

    #[error("provider error: {message}")]
    Provider { message: String },
}

impl GatewayError {
    pub fn timeout(after: Duration) -> Self {
        GatewayError::Timeout {
            millis: after.as_millis().min(i64::MAX as u128) as u64,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Network { .. } => true,
            GatewayError::Timeout { .. } => true,
            GatewayError::Declined { .. } => false,
            GatewayError::Provider { .. } => true,
        }
    }
}

impl From<GatewayError> for FlowError {
    fn from(err: GatewayError) -> Self {
        FlowError::GatewayFailure {
            reason: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationRequest {
    pub campaign_id: String,
    pub client_reference: String,
    pub provider: ProviderId,
    pub contact: ContactDetails,
    pub amount: Decimal,
    pub fee: Decimal,
    pub total: Decimal,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    pub campaign_id: String,
    pub client_reference: String,
    pub provider: ProviderId,
    pub contact: ContactDetails,
    pub amount: Decimal,
    pub fee: Decimal,
    pub net_amount: Decimal,
    pub currency: String,
}

/// What the gateway hands back for an accepted transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayReceipt {
    pub reference_code: String,
    /// Dial string the payer completes the transaction with, when the carrier issues one
    pub ussd_code: Option<String>,
}

impl GatewayReceipt {
    pub fn new(reference_code: impl Into<String>) -> Self {
        Self {
            reference_code: reference_code.into(),
            ussd_code: None,
        }
    }
}

/// Remote service that executes donations and withdrawals.
///
/// Each call is made at most once per user confirmation; implementations
/// must not retry internally.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn submit_donation(&self, request: DonationRequest) -> GatewayResult<GatewayReceipt>;

    async fn submit_withdrawal(
        &self,
        request: WithdrawalRequest,
    ) -> GatewayResult<GatewayReceipt>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockGateway {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PaymentGateway for MockGateway {
        async fn submit_donation(
            &self,
            request: DonationRequest,
        ) -> GatewayResult<GatewayReceipt> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(GatewayReceipt::new(format!("DON-{}", request.client_reference)))
        }

        async fn submit_withdrawal(
            &self,
            _request: WithdrawalRequest,
        ) -> GatewayResult<GatewayReceipt> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(GatewayError::Declined {
                message: "insufficient float".to_string(),
                provider_code: Some("E51".to_string()),
            })
        }
    }

    #[test]
    fn timeout_keeps_sub_second_precision() {
        assert_eq!(
            GatewayError::timeout(Duration::from_millis(500)).to_string(),
            "gateway timed out after 0.5s"
        );
        assert_eq!(
            GatewayError::timeout(Duration::from_millis(1250)).to_string(),
            "gateway timed out after 1.25s"
        );
        assert_eq!(
            GatewayError::timeout(Duration::from_secs(5)).to_string(),
            "gateway timed out after 5s"
        );
    }

    #[tokio::test]
    async fn trait_can_be_implemented_by_mock_gateway() {
        let gateway: Box<dyn PaymentGateway> = Box::new(MockGateway {
            calls: AtomicUsize::new(0),
        });

        let receipt = gateway
            .submit_donation(DonationRequest {
                campaign_id: "camp_1".to_string(),
                client_reference: "ref_1".to_string(),
                provider: ProviderId::Orange,
                contact: ContactDetails::new("076123456").anonymous(),
                amount: Decimal::from(100),
                fee: Decimal::new(25, 1),
                total: Decimal::new(1025, 1),
                currency: "SLE".to_string(),
            })
            .await
            .expect("donation should succeed");
        assert_eq!(receipt.reference_code, "DON-ref_1");

        let err = gateway
            .submit_withdrawal(WithdrawalRequest {
                campaign_id: "camp_1".to_string(),
                client_reference: "ref_2".to_string(),
                provider: ProviderId::Africell,
                contact: ContactDetails::new("077123456"),
                amount: Decimal::from(50),
                fee: Decimal::ONE,
                net_amount: Decimal::from(50),
                currency: "SLE".to_string(),
            })
            .await
            .expect_err("withdrawal should be declined");
        assert!(!err.is_retryable());
    }

    #[test]
    fn gateway_error_maps_to_flow_failure() {
        let flow_err: FlowError = GatewayError::timeout(Duration::from_secs(30)).into();
        assert_eq!(
            flow_err,
            FlowError::GatewayFailure {
                reason: "gateway timed out after 30s".to_string()
            }
        );
    }
}
