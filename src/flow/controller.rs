//! Step Flow Controller
//!
//! Owns one donation or cashout flow, feeds user actions through the
//! transition function and performs the single gateway call per confirmation.

use crate::config::AppConfig;
use crate::error::{FlowError, FlowResult};
use crate::flow::machine::{self, FlowContext, FlowEvent, GatewayRequest, Submission};
use crate::flow::state::{FlowState, FlowStatus, FlowStep};
use crate::logging::mask_phone_number;
use crate::payments::amount::{AmountBounds, AmountResolver};
use crate::payments::gateway::{GatewayError, GatewayReceipt, GatewayResult, PaymentGateway};
use crate::payments::registry::{Provider, ProviderRegistry};
use crate::payments::summary::{TransactionSummary, TransactionSummaryBuilder};
use crate::payments::types::{AmountInput, ContactDetails, PaymentMethod, ProviderId, TransactionKind};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

// ============================================================================
// Settings
// ============================================================================

/// Collaborators and limits shared by every flow the application opens
#[derive(Debug, Clone)]
pub struct FlowSettings {
    pub registry: Arc<ProviderRegistry>,
    pub resolver: AmountResolver,
    pub summaries: TransactionSummaryBuilder,
    pub minimum_amount: Decimal,
    /// Upper bound on a single gateway call
    pub gateway_timeout: Duration,
}

impl FlowSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            registry: Arc::new(ProviderRegistry::from_config(&config.payments)),
            resolver: AmountResolver::from_config(&config.payments),
            summaries: TransactionSummaryBuilder::from_config(&config.payments),
            minimum_amount: config.payments.minimum_amount,
            gateway_timeout: config.gateway.timeout(),
        }
    }

    fn context(&self) -> FlowContext<'_> {
        FlowContext {
            registry: &self.registry,
            resolver: &self.resolver,
            summaries: &self.summaries,
        }
    }
}

impl Default for FlowSettings {
    fn default() -> Self {
        let config = crate::config::PaymentsConfig::default();
        Self {
            registry: Arc::new(ProviderRegistry::from_config(&config)),
            resolver: AmountResolver::from_config(&config),
            summaries: TransactionSummaryBuilder::from_config(&config),
            minimum_amount: config.minimum_amount,
            gateway_timeout: crate::config::GatewayConfig::default().timeout(),
        }
    }
}

// ============================================================================
// Controller
// ============================================================================

pub struct StepFlowController {
    settings: FlowSettings,
    gateway: Arc<dyn PaymentGateway>,
    state: FlowState,
}

impl StepFlowController {
    /// Opens the donation modal for a campaign
    pub fn donation(
        campaign_id: impl Into<String>,
        settings: FlowSettings,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        let bounds = AmountBounds::donation(settings.minimum_amount);
        Self::open(TransactionKind::Donation, campaign_id.into(), bounds, settings, gateway)
    }

    /// Opens the cashout modal; `available_balance` caps the withdrawal
    pub fn cashout(
        campaign_id: impl Into<String>,
        available_balance: Decimal,
        settings: FlowSettings,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        let bounds = AmountBounds::cashout(settings.minimum_amount, available_balance);
        Self::open(TransactionKind::Cashout, campaign_id.into(), bounds, settings, gateway)
    }

    fn open(
        kind: TransactionKind,
        campaign_id: String,
        bounds: AmountBounds,
        settings: FlowSettings,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        let state = FlowState::new(kind, campaign_id, bounds);
        info!(
            flow_id = %state.flow_id,
            kind = %kind,
            campaign_id = %state.campaign_id,
            "Payment flow opened"
        );
        Self {
            settings,
            gateway,
            state,
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn current_step(&self) -> FlowStep {
        self.state.step()
    }

    pub fn status(&self) -> FlowStatus {
        self.state.status
    }

    pub fn error(&self) -> Option<&FlowError> {
        self.state.error.as_ref()
    }

    pub fn summary(&self) -> Option<&TransactionSummary> {
        self.state.summary.as_ref()
    }

    pub fn receipt(&self) -> Option<&GatewayReceipt> {
        self.state.receipt.as_ref()
    }

    /// Providers for the selection screen, unsupported ones included
    pub fn providers(&self) -> &[Provider] {
        self.settings.registry.list()
    }

    pub fn preset_amounts(&self) -> &[Decimal] {
        self.settings.resolver.presets()
    }

    // ------------------------------------------------------------------------
    // User actions
    // ------------------------------------------------------------------------

    pub fn select_amount(&mut self, amount: AmountInput) -> FlowResult<()> {
        self.dispatch(FlowEvent::SelectAmount { amount })
    }

    pub fn select_payment_method(&mut self, method: PaymentMethod) -> FlowResult<()> {
        self.dispatch(FlowEvent::SelectPaymentMethod { method })
    }

    pub fn select_provider(&mut self, provider: ProviderId) -> FlowResult<()> {
        self.dispatch(FlowEvent::SelectProvider { provider })
    }

    /// `amount` is required for cashouts and optional for donations,
    /// where it overrides the amount picked on the first screen
    pub fn submit_details(
        &mut self,
        contact: ContactDetails,
        amount: Option<AmountInput>,
    ) -> FlowResult<()> {
        self.dispatch(FlowEvent::SubmitDetails { contact, amount })
    }

    /// Revalidates the details already entered, e.g. after switching provider
    pub fn resubmit_details(&mut self) -> FlowResult<()> {
        self.dispatch(FlowEvent::ResubmitDetails)
    }

    pub fn back(&mut self) -> FlowResult<()> {
        self.dispatch(FlowEvent::Back)
    }

    /// Abandons the flow. Results of a submission already in flight are ignored.
    pub fn cancel(&mut self) {
        let previous = self.state.flow_id;
        self.state = machine::apply(&self.state, FlowEvent::Cancel, &self.settings.context());
        info!(
            flow_id = %previous,
            generation = self.state.generation,
            "Payment flow cancelled"
        );
    }

    // ------------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------------

    /// Moves Confirm to Submitting and hands out the gateway call to make.
    ///
    /// Returns `Ok(None)` when a submission is already in flight.
    pub fn begin_confirm(&mut self) -> FlowResult<Option<Submission>> {
        if self.state.status == FlowStatus::Submitting {
            debug!(flow_id = %self.state.flow_id, "Confirm ignored, submission in flight");
            return Ok(None);
        }

        let previous = self.state.clone();
        self.dispatch(FlowEvent::Confirm)?;
        let Some(submission) = machine::submission(&self.state) else {
            // Never leave the flow parked in Submitting without a call to make
            let err = FlowError::InvalidTransition {
                step: FlowStep::Confirm,
                action: "confirm without validated details".to_string(),
            };
            self.state = FlowState {
                error: Some(err.clone()),
                ..previous
            };
            return Err(err);
        };

        info!(
            flow_id = %self.state.flow_id,
            client_reference = %submission.request.client_reference(),
            attempt = self.state.attempts,
            "Submitting transaction to gateway"
        );
        Ok(Some(submission))
    }

    /// Feeds the gateway outcome for `submission` back into the flow.
    ///
    /// Outcomes for a flow that was cancelled in the meantime are dropped.
    pub fn finish_confirm(
        &mut self,
        submission: &Submission,
        outcome: GatewayResult<GatewayReceipt>,
    ) -> FlowResult<()> {
        if submission.generation != self.state.generation {
            debug!(
                client_reference = %submission.request.client_reference(),
                "Dropping gateway result for a cancelled flow"
            );
            return Ok(());
        }

        let generation = submission.generation;
        match outcome {
            Ok(receipt) => {
                info!(
                    flow_id = %self.state.flow_id,
                    reference_code = %receipt.reference_code,
                    "Gateway accepted transaction"
                );
                self.dispatch(FlowEvent::GatewaySucceeded {
                    generation,
                    receipt,
                })
            }
            Err(err) => {
                error!(
                    flow_id = %self.state.flow_id,
                    error = %err,
                    retryable = err.is_retryable(),
                    "Gateway rejected transaction"
                );
                self.dispatch(FlowEvent::GatewayFailed {
                    generation,
                    reason: err.to_string(),
                })
            }
        }
    }

    /// Confirms and waits for the gateway. One call per invocation, never retried.
    pub async fn confirm(&mut self) -> FlowResult<GatewayReceipt> {
        let submission = self.begin_confirm()?.ok_or_else(|| FlowError::InvalidTransition {
            step: FlowStep::Submitting,
            action: "confirm".to_string(),
        })?;

        let timeout = self.settings.gateway_timeout;
        let outcome = match tokio::time::timeout(timeout, self.call_gateway(&submission.request)).await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(GatewayError::timeout(timeout)),
        };

        self.finish_confirm(&submission, outcome)?;
        self.state.receipt.clone().ok_or_else(|| FlowError::GatewayFailure {
            reason: "gateway returned no receipt".to_string(),
        })
    }

    async fn call_gateway(&self, request: &GatewayRequest) -> GatewayResult<GatewayReceipt> {
        match request {
            GatewayRequest::Donation(donation) => {
                self.gateway.submit_donation(donation.clone()).await
            }
            GatewayRequest::Withdrawal(withdrawal) => {
                self.gateway.submit_withdrawal(withdrawal.clone()).await
            }
        }
    }

    fn dispatch(&mut self, event: FlowEvent) -> FlowResult<()> {
        let from_step = self.state.step();
        let next = machine::apply(&self.state, event, &self.settings.context());
        let to_step = next.step();
        self.state = next;

        if let Some(err) = &self.state.error {
            if err.is_validation() {
                warn!(
                    flow_id = %self.state.flow_id,
                    step = %to_step,
                    code = ?err.error_code(),
                    error = %err,
                    "Payment flow validation failed"
                );
            }
            return Err(err.clone());
        }

        if from_step != to_step {
            info!(
                flow_id = %self.state.flow_id,
                kind = %self.state.kind,
                from_step = %from_step,
                to_step = %to_step,
                phone = %self
                    .state
                    .draft
                    .validated_phone
                    .as_deref()
                    .map(mask_phone_number)
                    .unwrap_or_default(),
                "Payment flow advanced"
            );
        }
        Ok(())
    }
}
