//! Explicit, serializable state of one payment flow invocation

use crate::error::FlowError;
use crate::payments::amount::AmountBounds;
use crate::payments::gateway::GatewayReceipt;
use crate::payments::summary::TransactionSummary;
use crate::payments::types::{AmountInput, ContactDetails, PaymentMethod, ProviderId, TransactionKind};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Screens of the donation and cashout modals
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FlowStep {
    AmountSelect,
    PaymentMethodSelect,
    ProviderSelect,
    DetailsEntry,
    Confirm,
    Submitting,
    Success,
}

impl std::fmt::Display for FlowStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlowStep::AmountSelect => write!(f, "amount_select"),
            FlowStep::PaymentMethodSelect => write!(f, "payment_method_select"),
            FlowStep::ProviderSelect => write!(f, "provider_select"),
            FlowStep::DetailsEntry => write!(f, "details_entry"),
            FlowStep::Confirm => write!(f, "confirm"),
            FlowStep::Submitting => write!(f, "submitting"),
            FlowStep::Success => write!(f, "success"),
        }
    }
}

const DONATION_STEPS: [FlowStep; 7] = [
    FlowStep::AmountSelect,
    FlowStep::PaymentMethodSelect,
    FlowStep::ProviderSelect,
    FlowStep::DetailsEntry,
    FlowStep::Confirm,
    FlowStep::Submitting,
    FlowStep::Success,
];

const CASHOUT_STEPS: [FlowStep; 5] = [
    FlowStep::ProviderSelect,
    FlowStep::DetailsEntry,
    FlowStep::Confirm,
    FlowStep::Submitting,
    FlowStep::Success,
];

/// Ordered, fixed step list for a flow kind
pub fn steps_for(kind: TransactionKind) -> &'static [FlowStep] {
    match kind {
        TransactionKind::Donation => &DONATION_STEPS,
        TransactionKind::Cashout => &CASHOUT_STEPS,
    }
}

impl FlowStep {
    /// Steps reachable by moving forward from this one
    pub fn valid_transitions(&self, kind: TransactionKind) -> Vec<FlowStep> {
        match self {
            FlowStep::AmountSelect => vec![FlowStep::PaymentMethodSelect],
            FlowStep::PaymentMethodSelect => vec![FlowStep::ProviderSelect],
            FlowStep::ProviderSelect => vec![FlowStep::DetailsEntry],
            FlowStep::DetailsEntry => vec![FlowStep::Confirm],
            FlowStep::Confirm => vec![FlowStep::Submitting],
            // A failed submission lands back on Confirm
            FlowStep::Submitting => vec![FlowStep::Success, FlowStep::Confirm],
            FlowStep::Success => vec![],
        }
        .into_iter()
        .filter(|step| steps_for(kind).contains(step))
        .collect()
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, FlowStep::Success)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FlowStatus {
    InProgress,
    Submitting,
    Succeeded,
    Failed,
}

/// Everything the user has entered so far. Survives Back and failed submissions.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlowDraft {
    pub amount: Option<AmountInput>,
    pub payment_method: Option<PaymentMethod>,
    pub provider: Option<ProviderId>,
    pub contact: Option<ContactDetails>,
    pub resolved_amount: Option<Decimal>,
    /// Phone number in local form, set once it has passed provider validation
    pub validated_phone: Option<String>,
}

impl FlowDraft {
    pub fn is_empty(&self) -> bool {
        *self == FlowDraft::default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlowState {
    pub flow_id: Uuid,
    pub kind: TransactionKind,
    pub campaign_id: String,
    pub bounds: AmountBounds,
    pub current_step: usize,
    pub history: Vec<usize>,
    pub status: FlowStatus,
    pub draft: FlowDraft,
    pub summary: Option<TransactionSummary>,
    pub receipt: Option<GatewayReceipt>,
    pub error: Option<FlowError>,
    pub attempts: u32,
    /// Bumped on cancel so results of abandoned submissions can be recognised
    pub generation: u64,
    pub started_at: DateTime<Utc>,
}

impl FlowState {
    pub fn new(kind: TransactionKind, campaign_id: impl Into<String>, bounds: AmountBounds) -> Self {
        Self {
            flow_id: Uuid::new_v4(),
            kind,
            campaign_id: campaign_id.into(),
            bounds,
            current_step: 0,
            history: Vec::new(),
            status: FlowStatus::InProgress,
            draft: FlowDraft::default(),
            summary: None,
            receipt: None,
            error: None,
            attempts: 0,
            generation: 0,
            started_at: Utc::now(),
        }
    }

    /// Fresh state for the same campaign; nothing entered survives
    pub fn reset(&self) -> Self {
        let mut fresh = FlowState::new(self.kind, self.campaign_id.clone(), self.bounds.clone());
        fresh.generation = self.generation + 1;
        fresh
    }

    pub fn steps(&self) -> &'static [FlowStep] {
        steps_for(self.kind)
    }

    pub fn step(&self) -> FlowStep {
        self.steps()[self.current_step]
    }

    pub fn index_of(&self, step: FlowStep) -> Option<usize> {
        self.steps().iter().position(|candidate| *candidate == step)
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
            && self.status != FlowStatus::Submitting
            && !self.step().is_terminal()
    }

    /// Moves forward, remembering where we came from
    pub(crate) fn advance_to(&mut self, step: FlowStep) -> Result<(), FlowError> {
        let target = self
            .index_of(step)
            .filter(|_| self.step().valid_transitions(self.kind).contains(&step))
            .ok_or_else(|| FlowError::InvalidTransition {
                step: self.step(),
                action: format!("move to {}", step),
            })?;
        self.history.push(self.current_step);
        self.current_step = target;
        Ok(())
    }

    pub(crate) fn go_back(&mut self) -> Result<FlowStep, FlowError> {
        if !self.can_go_back() {
            return Err(FlowError::InvalidTransition {
                step: self.step(),
                action: "go back".to_string(),
            });
        }
        // can_go_back guarantees a non-empty history
        if let Some(previous) = self.history.pop() {
            self.current_step = previous;
        }
        Ok(self.step())
    }
}
