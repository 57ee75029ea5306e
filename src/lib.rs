//! Payment flow controller for campaign donations and cashouts over mobile money.
//!
//! Collects an amount, a provider and contact details step by step, validates
//! them locally and hands exactly one request per confirmation to a
//! [`PaymentGateway`].

pub mod config;
pub mod error;
pub mod flow;
pub mod logging;
pub mod payments;

pub use config::{AppConfig, ConfigError};
pub use error::{ErrorCode, FlowError, FlowResult};
pub use flow::{FlowSettings, FlowState, FlowStatus, FlowStep, StepFlowController, Submission};
pub use payments::{
    AmountInput, ContactDetails, GatewayError, GatewayReceipt, GatewayResult, PaymentGateway,
    PaymentMethod, ProviderId, TransactionKind, TransactionSummary,
};
