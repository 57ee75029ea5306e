mod common;

use common::RecordingGateway;
use crowdfund_payflow::config::PaymentsConfig;
use crowdfund_payflow::payments::{AmountResolver, FeePolicy, TransactionSummaryBuilder};
use crowdfund_payflow::{
    AmountInput, ContactDetails, FlowError, FlowSettings, FlowStep, ProviderId, StepFlowController,
};
use rust_decimal::Decimal;

fn cashout(gateway: std::sync::Arc<RecordingGateway>, settings: FlowSettings) -> StepFlowController {
    StepFlowController::cashout("camp_17", Decimal::from(500), settings, gateway)
}

#[tokio::test]
async fn test_cashout_over_limit_stays_on_details() {
    let gateway = RecordingGateway::accepting("WD1");
    let mut flow = cashout(gateway.clone(), FlowSettings::default());
    assert_eq!(flow.current_step(), FlowStep::ProviderSelect);

    flow.select_provider(ProviderId::Africell).unwrap();
    let err = flow
        .submit_details(
            ContactDetails::new("077123456"),
            Some(AmountInput::custom("600")),
        )
        .unwrap_err();

    assert!(matches!(err, FlowError::ExceedsAvailable { .. }));
    assert_eq!(flow.current_step(), FlowStep::DetailsEntry);
    assert!(flow.confirm().await.is_err());
    assert_eq!(gateway.calls(), 0);
}

#[tokio::test]
async fn test_cashout_of_full_balance_succeeds() {
    let gateway = RecordingGateway::accepting("WD2");
    let mut flow = cashout(gateway.clone(), FlowSettings::default());

    flow.select_provider(ProviderId::Africell).unwrap();
    flow.submit_details(
        ContactDetails::new("030 123 456"),
        Some(AmountInput::custom("500")),
    )
    .unwrap();
    let receipt = flow.confirm().await.unwrap();
    assert_eq!(receipt.reference_code, "WD2");

    let sent = gateway.withdrawals();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].amount, Decimal::from(500));
    assert_eq!(sent[0].fee, Decimal::from(10));
    assert_eq!(sent[0].net_amount, Decimal::from(500));
    assert_eq!(sent[0].contact.phone_number, "030123456");
}

#[tokio::test]
async fn test_deducted_cashout_fee_reduces_payout() {
    let mut config = PaymentsConfig::default();
    config.cashout_fee_policy = FeePolicy::Deducted;
    let settings = FlowSettings {
        summaries: TransactionSummaryBuilder::from_config(&config),
        resolver: AmountResolver::from_config(&config),
        ..FlowSettings::default()
    };

    let gateway = RecordingGateway::accepting("WD3");
    let mut flow = cashout(gateway.clone(), settings);
    flow.select_provider(ProviderId::Orange).unwrap();
    flow.submit_details(
        ContactDetails::new("076123456"),
        Some(AmountInput::custom("200")),
    )
    .unwrap();

    let summary = flow.summary().cloned().unwrap();
    assert_eq!(summary.fee_policy, FeePolicy::Deducted);
    assert_eq!(summary.net_or_total_amount, Decimal::from(195));

    flow.confirm().await.unwrap();
    assert_eq!(gateway.withdrawals()[0].net_amount, Decimal::from(195));
}

#[tokio::test]
async fn test_cashout_below_minimum() {
    let gateway = RecordingGateway::accepting("WD4");
    let settings = FlowSettings {
        minimum_amount: Decimal::from(10),
        ..FlowSettings::default()
    };
    let mut flow = cashout(gateway, settings);
    flow.select_provider(ProviderId::Orange).unwrap();

    let err = flow
        .submit_details(
            ContactDetails::new("076123456"),
            Some(AmountInput::custom("5")),
        )
        .unwrap_err();
    assert!(matches!(err, FlowError::BelowMinimum { .. }));
    assert_eq!(
        err.user_message(),
        "The minimum amount is 10".to_string()
    );
}

#[tokio::test]
async fn test_cancel_after_failed_cashout_resets_flow() {
    let gateway = RecordingGateway::declining("account blocked");
    let mut flow = cashout(gateway.clone(), FlowSettings::default());
    flow.select_provider(ProviderId::Orange).unwrap();
    flow.submit_details(
        ContactDetails::new("076123456"),
        Some(AmountInput::custom("100")),
    )
    .unwrap();
    assert!(flow.confirm().await.is_err());

    flow.cancel();
    assert_eq!(flow.current_step(), FlowStep::ProviderSelect);
    assert!(flow.state().draft.is_empty());
    assert_eq!(flow.state().attempts, 0);
    assert_eq!(gateway.calls(), 1);
}
