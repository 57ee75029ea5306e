//! Payment building blocks: amounts, phone numbers, providers, fees and the gateway seam

pub mod amount;
pub mod gateway;
#[cfg(feature = "http-gateway")]
pub mod http_gateway;
pub mod phone;
pub mod registry;
pub mod summary;
pub mod types;

pub use amount::{AmountBounds, AmountResolver};
pub use gateway::{
    DonationRequest, GatewayError, GatewayReceipt, GatewayResult, PaymentGateway,
    WithdrawalRequest,
};
#[cfg(feature = "http-gateway")]
pub use http_gateway::HttpPaymentGateway;
pub use phone::PhoneValidator;
pub use registry::{PhonePattern, Provider, ProviderRegistry};
pub use summary::{FeePolicy, TransactionSummary, TransactionSummaryBuilder};
pub use types::{AmountInput, AmountMode, ContactDetails, PaymentMethod, ProviderId, TransactionKind};
