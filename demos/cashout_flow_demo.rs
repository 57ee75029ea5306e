use async_trait::async_trait;
use crowdfund_payflow::logging::init_tracing;
use crowdfund_payflow::payments::{DonationRequest, WithdrawalRequest};
use crowdfund_payflow::{
    AmountInput, AppConfig, ContactDetails, FlowSettings, GatewayError, GatewayReceipt,
    GatewayResult, PaymentGateway, ProviderId, StepFlowController,
};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Fails the first withdrawal and accepts the next one
struct FlakyGateway {
    attempts: AtomicUsize,
}

#[async_trait]
impl PaymentGateway for FlakyGateway {
    async fn submit_donation(&self, _request: DonationRequest) -> GatewayResult<GatewayReceipt> {
        Err(GatewayError::Provider {
            message: "donations are not simulated in this demo".to_string(),
        })
    }

    async fn submit_withdrawal(
        &self,
        request: WithdrawalRequest,
    ) -> GatewayResult<GatewayReceipt> {
        if self.attempts.fetch_add(1, Ordering::SeqCst) == 0 {
            return Err(GatewayError::Network {
                message: "connection reset by peer".to_string(),
            });
        }
        Ok(GatewayReceipt::new(format!("WD-{}", request.client_reference)))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    config.validate()?;
    init_tracing(&config.logging);

    let gateway = Arc::new(FlakyGateway {
        attempts: AtomicUsize::new(0),
    });
    let settings = FlowSettings::from_config(&config);
    let mut flow = StepFlowController::cashout("camp_school_roof", Decimal::from(500), settings, gateway);

    println!("🏦 Campaign Cashout Flow Demo\n");
    println!("═══════════════════════════════════════════════════════════════\n");

    println!("📊 Step 1: Provider and payout details");
    println!("─────────────────────────────────────");
    flow.select_provider(ProviderId::Africell)?;

    let contact = ContactDetails::new("+232 77 123 456");
    if let Err(err) = flow.submit_details(contact.clone(), Some(AmountInput::custom("600"))) {
        println!("Withdrawing 600: {}", err.user_message());
    }
    flow.submit_details(contact, Some(AmountInput::custom("450")))?;

    if let Some(summary) = flow.summary() {
        println!("Withdrawal:   {}", summary.format_amount(summary.gross_amount));
        println!("Provider fee: {} ({:?})", summary.format_amount(summary.fee_amount), summary.fee_policy);
        println!("Payout:       {}", summary.format_amount(summary.net_or_total_amount));
    }

    println!("\n📊 Step 2: Confirm");
    println!("─────────────────────────────────────");
    if let Err(err) = flow.confirm().await {
        println!("First attempt: {}", err.user_message());
        println!("Back on {} with everything kept, retrying...", flow.current_step());
    }
    let receipt = flow.confirm().await?;
    println!("✅ Reference: {}", receipt.reference_code);

    Ok(())
}
