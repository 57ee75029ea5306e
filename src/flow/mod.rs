//! Step flow for the donation and cashout modals

pub mod controller;
pub mod machine;
pub mod state;

pub use controller::{FlowSettings, StepFlowController};
pub use machine::{apply, submission, FlowContext, FlowEvent, GatewayRequest, Submission};
pub use state::{steps_for, FlowDraft, FlowState, FlowStatus, FlowStep};
