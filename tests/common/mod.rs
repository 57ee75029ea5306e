#![allow(dead_code)]

use async_trait::async_trait;
use crowdfund_payflow::payments::{DonationRequest, WithdrawalRequest};
use crowdfund_payflow::{GatewayError, GatewayReceipt, GatewayResult, PaymentGateway};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Gateway double that records every request it receives
pub struct RecordingGateway {
    calls: AtomicUsize,
    outcome: GatewayResult<GatewayReceipt>,
    donations: Mutex<Vec<DonationRequest>>,
    withdrawals: Mutex<Vec<WithdrawalRequest>>,
}

impl RecordingGateway {
    pub fn accepting(reference_code: &str) -> Arc<Self> {
        Self::with_outcome(Ok(GatewayReceipt::new(reference_code)))
    }

    pub fn declining(message: &str) -> Arc<Self> {
        Self::with_outcome(Err(GatewayError::Declined {
            message: message.to_string(),
            provider_code: None,
        }))
    }

    fn with_outcome(outcome: GatewayResult<GatewayReceipt>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            outcome,
            donations: Mutex::new(Vec::new()),
            withdrawals: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn donations(&self) -> Vec<DonationRequest> {
        self.donations.lock().unwrap().clone()
    }

    pub fn withdrawals(&self) -> Vec<WithdrawalRequest> {
        self.withdrawals.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for RecordingGateway {
    async fn submit_donation(&self, request: DonationRequest) -> GatewayResult<GatewayReceipt> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.donations.lock().unwrap().push(request);
        self.outcome.clone()
    }

    async fn submit_withdrawal(
        &self,
        request: WithdrawalRequest,
    ) -> GatewayResult<GatewayReceipt> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.withdrawals.lock().unwrap().push(request);
        self.outcome.clone()
    }
}
