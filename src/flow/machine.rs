//! Pure transition function of the step flow: `(state, event) -> state`
//!
//! Errors never escape as `Err`; they are recorded in `FlowState::error` and
//! leave the current step untouched, so every event yields a usable state.

use crate::error::{FlowError, FlowResult};
use crate::flow::state::{FlowState, FlowStatus, FlowStep};
use crate::payments::amount::AmountResolver;
use crate::payments::gateway::{DonationRequest, GatewayReceipt, WithdrawalRequest};
use crate::payments::phone::PhoneValidator;
use crate::payments::registry::ProviderRegistry;
use crate::payments::summary::TransactionSummaryBuilder;
use crate::payments::types::{AmountInput, ContactDetails, PaymentMethod, ProviderId, TransactionKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FlowEvent {
    SelectAmount {
        amount: AmountInput,
    },
    SelectPaymentMethod {
        method: PaymentMethod,
    },
    SelectProvider {
        provider: ProviderId,
    },
    /// `amount: None` keeps the amount already in the draft
    SubmitDetails {
        contact: ContactDetails,
        amount: Option<AmountInput>,
    },
    ResubmitDetails,
    Back,
    Confirm,
    GatewaySucceeded {
        generation: u64,
        receipt: GatewayReceipt,
    },
    GatewayFailed {
        generation: u64,
        reason: String,
    },
    Cancel,
}

impl FlowEvent {
    fn name(&self) -> &'static str {
        match self {
            FlowEvent::SelectAmount { .. } => "select amount",
            FlowEvent::SelectPaymentMethod { .. } => "select payment method",
            FlowEvent::SelectProvider { .. } => "select provider",
            FlowEvent::SubmitDetails { .. } => "submit details",
            FlowEvent::ResubmitDetails => "submit details",
            FlowEvent::Back => "go back",
            FlowEvent::Confirm => "confirm",
            FlowEvent::GatewaySucceeded { .. } => "complete submission",
            FlowEvent::GatewayFailed { .. } => "fail submission",
            FlowEvent::Cancel => "cancel",
        }
    }
}

/// Read-only collaborators the transitions validate against
#[derive(Clone, Copy)]
pub struct FlowContext<'a> {
    pub registry: &'a ProviderRegistry,
    pub resolver: &'a AmountResolver,
    pub summaries: &'a TransactionSummaryBuilder,
}

/// Gateway call that a confirmation has authorised
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub generation: u64,
    pub request: GatewayRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GatewayRequest {
    Donation(DonationRequest),
    Withdrawal(WithdrawalRequest),
}

impl GatewayRequest {
    pub fn client_reference(&self) -> &str {
        match self {
            GatewayRequest::Donation(request) => &request.client_reference,
            GatewayRequest::Withdrawal(request) => &request.client_reference,
        }
    }
}

pub fn apply(state: &FlowState, event: FlowEvent, ctx: &FlowContext<'_>) -> FlowState {
    if is_stale(state, &event) {
        return state.clone();
    }

    // A second confirm while the first is in flight changes nothing
    if event == FlowEvent::Confirm && state.status == FlowStatus::Submitting {
        return state.clone();
    }

    if event == FlowEvent::Cancel {
        return state.reset();
    }

    let mut next = state.clone();
    next.error = None;
    if let Err(err) = transition(&mut next, event, ctx) {
        next.error = Some(err);
    }
    next
}

fn is_stale(state: &FlowState, event: &FlowEvent) -> bool {
    match event {
        FlowEvent::GatewaySucceeded { generation, .. }
        | FlowEvent::GatewayFailed { generation, .. } => {
            *generation != state.generation || state.status != FlowStatus::Submitting
        }
        _ => false,
    }
}

fn transition(next: &mut FlowState, event: FlowEvent, ctx: &FlowContext<'_>) -> FlowResult<()> {
    let step = next.step();
    match (step, event) {
        (FlowStep::AmountSelect, FlowEvent::SelectAmount { amount }) => {
            next.draft.amount = Some(amount.clone());
            next.draft.resolved_amount = None;
            next.summary = None;
            let resolved = ctx.resolver.resolve(&amount, &next.bounds)?;
            next.draft.resolved_amount = Some(resolved);
            next.advance_to(FlowStep::PaymentMethodSelect)
        }
        (FlowStep::PaymentMethodSelect, FlowEvent::SelectPaymentMethod { method }) => {
            if !method.is_supported() {
                return Err(FlowError::PaymentMethodUnsupported {
                    method: method.as_str().to_string(),
                });
            }
            next.draft.payment_method = Some(method);
            next.advance_to(FlowStep::ProviderSelect)
        }
        (FlowStep::ProviderSelect, FlowEvent::SelectProvider { provider }) => {
            let selected = ctx.registry.select(provider)?;
            if next.draft.provider != Some(selected.id) {
                // The phone number has to pass the new provider's pattern
                next.draft.validated_phone = None;
                next.summary = None;
            }
            next.draft.provider = Some(selected.id);
            next.advance_to(FlowStep::DetailsEntry)
        }
        (FlowStep::DetailsEntry, FlowEvent::SubmitDetails { contact, amount }) => {
            next.draft.contact = Some(contact);
            if let Some(amount) = amount {
                next.draft.amount = Some(amount);
            }
            validate_details(next, ctx)?;
            next.advance_to(FlowStep::Confirm)
        }
        (FlowStep::DetailsEntry, FlowEvent::ResubmitDetails) => {
            validate_details(next, ctx)?;
            next.advance_to(FlowStep::Confirm)
        }
        (FlowStep::Confirm, FlowEvent::Confirm) => {
            // Only enter Submitting once the gateway call is known to be buildable
            let attempt = next.attempts + 1;
            build_request(next, attempt)?;
            next.advance_to(FlowStep::Submitting)?;
            next.status = FlowStatus::Submitting;
            next.attempts = attempt;
            Ok(())
        }
        (FlowStep::Submitting, FlowEvent::GatewaySucceeded { receipt, .. }) => {
            next.advance_to(FlowStep::Success)?;
            next.receipt = Some(receipt);
            next.status = FlowStatus::Succeeded;
            Ok(())
        }
        (FlowStep::Submitting, FlowEvent::GatewayFailed { reason, .. }) => {
            let confirm = next.history.pop().unwrap_or(next.current_step);
            next.current_step = confirm;
            next.status = FlowStatus::Failed;
            Err(FlowError::GatewayFailure { reason })
        }
        (_, FlowEvent::Back) => {
            next.go_back()?;
            if next.status == FlowStatus::Failed {
                next.status = FlowStatus::InProgress;
            }
            Ok(())
        }
        (step, event) => Err(FlowError::InvalidTransition {
            step,
            action: event.name().to_string(),
        }),
    }
}

/// Runs every local check; nothing here touches the network
fn validate_details(next: &mut FlowState, ctx: &FlowContext<'_>) -> FlowResult<()> {
    next.summary = None;
    next.draft.resolved_amount = None;
    next.draft.validated_phone = None;

    let provider_id = next.draft.provider.ok_or_else(|| FlowError::ProviderNotFound {
        provider: "none selected".to_string(),
    })?;
    let provider = ctx.registry.select(provider_id)?;

    let amount = next
        .draft
        .amount
        .as_ref()
        .ok_or_else(|| FlowError::InvalidAmount {
            amount: String::new(),
            reason: "amount is required".to_string(),
        })?;
    let resolved = ctx.resolver.resolve(amount, &next.bounds)?;

    let contact = next
        .draft
        .contact
        .as_ref()
        .ok_or_else(|| FlowError::MissingContact {
            field: "phone number".to_string(),
        })?;
    let phone = PhoneValidator::validate(&contact.phone_number, provider)?;
    contact.sanitized(next.kind)?;

    next.summary = Some(ctx.summaries.build(resolved, provider, next.kind)?);
    next.draft.resolved_amount = Some(resolved);
    next.draft.validated_phone = Some(phone);
    Ok(())
}

/// Gateway call for a state that has just entered `Submitting`
pub fn submission(state: &FlowState) -> Option<Submission> {
    if state.status != FlowStatus::Submitting {
        return None;
    }

    let request = build_request(state, state.attempts).ok()?;
    Some(Submission {
        generation: state.generation,
        request,
    })
}

fn build_request(state: &FlowState, attempt: u32) -> FlowResult<GatewayRequest> {
    let unvalidated = || FlowError::InvalidTransition {
        step: FlowStep::Confirm,
        action: "confirm without validated details".to_string(),
    };

    let summary = state.summary.as_ref().ok_or_else(unvalidated)?;
    let phone = state.draft.validated_phone.as_ref().ok_or_else(unvalidated)?;
    let mut contact = state
        .draft
        .contact
        .as_ref()
        .ok_or_else(unvalidated)?
        .sanitized(state.kind)?;
    contact.phone_number = phone.clone();

    let client_reference = format!("{}-{}", state.flow_id.simple(), attempt);
    let request = match state.kind {
        TransactionKind::Donation => GatewayRequest::Donation(DonationRequest {
            campaign_id: state.campaign_id.clone(),
            client_reference,
            provider: summary.provider,
            contact,
            amount: summary.gross_amount,
            fee: summary.fee_amount,
            total: summary.net_or_total_amount,
            currency: summary.currency.clone(),
        }),
        TransactionKind::Cashout => GatewayRequest::Withdrawal(WithdrawalRequest {
            campaign_id: state.campaign_id.clone(),
            client_reference,
            provider: summary.provider,
            contact,
            amount: summary.gross_amount,
            fee: summary.fee_amount,
            net_amount: summary.net_or_total_amount,
            currency: summary.currency.clone(),
        }),
    };
    Ok(request)
}
