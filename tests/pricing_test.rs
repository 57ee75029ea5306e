use crowdfund_payflow::config::PaymentsConfig;
use crowdfund_payflow::payments::{
    AmountBounds, AmountResolver, PhoneValidator, ProviderRegistry, TransactionSummaryBuilder,
};
use crowdfund_payflow::{AmountInput, FlowError, ProviderId, TransactionKind};
use rust_decimal::Decimal;

#[test]
fn test_amount_resolution_is_deterministic() {
    let resolver = AmountResolver::from_config(&PaymentsConfig::default());
    let bounds = AmountBounds::donation(Decimal::ONE);

    for input in [
        AmountInput::preset(Decimal::from(250)),
        AmountInput::custom("1,000"),
        AmountInput::custom(" 42.50 "),
    ] {
        let first = resolver.resolve(&input, &bounds);
        let second = resolver.resolve(&input, &bounds);
        assert_eq!(first, second);
        assert!(first.is_ok());
    }

    assert_eq!(
        resolver.resolve(&AmountInput::custom("1,000"), &bounds),
        Ok(Decimal::from(1000))
    );
}

#[test]
fn test_phone_validation_is_provider_scoped() {
    let registry = ProviderRegistry::from_config(&PaymentsConfig::default());
    let orange = registry.get(ProviderId::Orange).unwrap();
    let africell = registry.get(ProviderId::Africell).unwrap();

    assert_eq!(
        PhoneValidator::validate("076123456", orange),
        Ok("076123456".to_string())
    );
    assert!(matches!(
        PhoneValidator::validate("076123456", africell),
        Err(FlowError::InvalidPhone { .. })
    ));
    assert!(PhoneValidator::is_valid("088123456", africell));
    assert!(!PhoneValidator::is_valid("088123456", orange));
}

#[test]
fn test_fee_for_1000_at_one_and_a_half_percent() {
    let mut config = PaymentsConfig::default();
    config.provider_fee_bps.insert(ProviderId::Orange, 150);
    let registry = ProviderRegistry::from_config(&config);
    let orange = registry.get(ProviderId::Orange).unwrap();

    let summary = TransactionSummaryBuilder::from_config(&config).build(
        Decimal::from(1000),
        orange,
        TransactionKind::Donation,
    )
    .unwrap();
    assert_eq!(summary.fee_amount, Decimal::from(15));
    assert_eq!(summary.net_or_total_amount, Decimal::from(1015));
}
