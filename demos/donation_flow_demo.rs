use async_trait::async_trait;
use crowdfund_payflow::logging::init_tracing;
use crowdfund_payflow::payments::{DonationRequest, WithdrawalRequest};
use crowdfund_payflow::{
    AmountInput, AppConfig, ContactDetails, FlowSettings, GatewayError, GatewayReceipt,
    GatewayResult, PaymentGateway, PaymentMethod, ProviderId, StepFlowController,
};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Stands in for the payment backend so the demo runs offline
struct SimulatedGateway;

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn submit_donation(&self, request: DonationRequest) -> GatewayResult<GatewayReceipt> {
        Ok(GatewayReceipt {
            reference_code: format!("TXN-{}", &request.client_reference[..8]),
            ussd_code: Some("*144*2*1#".to_string()),
        })
    }

    async fn submit_withdrawal(
        &self,
        _request: WithdrawalRequest,
    ) -> GatewayResult<GatewayReceipt> {
        Err(GatewayError::Provider {
            message: "withdrawals are not simulated in this demo".to_string(),
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    config.validate()?;
    init_tracing(&config.logging);

    let settings = FlowSettings::from_config(&config);
    let mut flow = StepFlowController::donation("camp_school_roof", settings, Arc::new(SimulatedGateway));

    println!("💚 Campaign Donation Flow Demo\n");
    println!("═══════════════════════════════════════════════════════════════\n");

    println!("📊 Step 1: Choose an amount");
    println!("─────────────────────────────────────");
    println!("Presets: {:?}", flow.preset_amounts());
    flow.select_amount(AmountInput::preset(Decimal::from(100)))?;
    println!("Selected 100, now at {}", flow.current_step());

    println!("\n📊 Step 2: Payment method and provider");
    println!("─────────────────────────────────────");
    flow.select_payment_method(PaymentMethod::MobileMoney)?;
    for provider in flow.providers() {
        let badge = if provider.supported { "" } else { " (coming soon)" };
        println!("  {} {}{}", provider.display_name, provider.ussd_shortcode, badge);
    }
    if let Err(err) = flow.select_provider(ProviderId::Qcell) {
        println!("QMoney refused: {}", err.user_message());
    }
    flow.select_provider(ProviderId::Orange)?;

    println!("\n📊 Step 3: Donor details");
    println!("─────────────────────────────────────");
    let contact = ContactDetails::new("076123456").with_name("Aminata Kamara");
    if let Err(err) = flow.submit_details(ContactDetails::new("077123456").with_name("Aminata Kamara"), None) {
        println!("Africell number with Orange: {}", err.user_message());
    }
    flow.submit_details(contact, None)?;

    if let Some(summary) = flow.summary() {
        println!("Donation:     {}", summary.format_amount(summary.gross_amount));
        println!("Provider fee: {}", summary.format_amount(summary.fee_amount));
        println!("Total:        {}", summary.format_amount(summary.net_or_total_amount));
    }

    println!("\n📊 Step 4: Confirm");
    println!("─────────────────────────────────────");
    let receipt = flow.confirm().await?;
    println!("✅ Reference: {}", receipt.reference_code);
    if let Some(ussd) = &receipt.ussd_code {
        println!("💡 Dial {} to approve the payment", ussd);
    }

    Ok(())
}
