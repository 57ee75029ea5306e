use crate::config::PaymentsConfig;
use crate::error::{FlowError, FlowResult};
use crate::payments::registry::Provider;
use crate::payments::types::{ProviderId, TransactionKind};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Who bears the provider fee
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FeePolicy {
    /// Fee is charged on top: total = gross + fee
    DonorPays,
    /// Platform covers the fee: net = gross
    Absorbed,
    /// Fee is withheld from the payout: net = gross - fee
    Deducted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub kind: TransactionKind,
    pub provider: ProviderId,
    pub currency: String,
    pub fee_rate: Decimal,
    pub fee_policy: FeePolicy,
    pub gross_amount: Decimal,
    pub fee_amount: Decimal,
    /// Total debited from the donor, or net paid out to the campaign owner
    pub net_or_total_amount: Decimal,
}

impl TransactionSummary {
    pub fn format_amount(&self, amount: Decimal) -> String {
        format!("{} {}", self.currency, amount.normalize())
    }
}

#[derive(Debug, Clone)]
pub struct TransactionSummaryBuilder {
    currency: String,
    minor_units: u32,
    cashout_policy: FeePolicy,
}

impl TransactionSummaryBuilder {
    pub fn new(currency: impl Into<String>, minor_units: u32, cashout_policy: FeePolicy) -> Self {
        Self {
            currency: currency.into(),
            minor_units,
            cashout_policy,
        }
    }

    pub fn from_config(config: &PaymentsConfig) -> Self {
        Self::new(
            config.currency.clone(),
            config.minor_units,
            config.cashout_fee_policy,
        )
    }

    pub fn policy_for(&self, kind: TransactionKind) -> FeePolicy {
        match kind {
            TransactionKind::Donation => FeePolicy::DonorPays,
            TransactionKind::Cashout => self.cashout_policy,
        }
    }

    /// Fee is rounded half up to the smallest currency unit.
    ///
    /// Fails with `InvalidAmount` when the amount is too large to price.
    pub fn build(
        &self,
        resolved_amount: Decimal,
        provider: &Provider,
        kind: TransactionKind,
    ) -> FlowResult<TransactionSummary> {
        let too_large = || FlowError::InvalidAmount {
            amount: resolved_amount.to_string(),
            reason: "amount is too large".to_string(),
        };

        let fee_amount = resolved_amount
            .checked_mul(provider.fee_rate)
            .ok_or_else(too_large)?
            .round_dp_with_strategy(self.minor_units, RoundingStrategy::MidpointAwayFromZero);
        let policy = self.policy_for(kind);

        let net_or_total_amount = match policy {
            FeePolicy::DonorPays => resolved_amount.checked_add(fee_amount),
            FeePolicy::Absorbed => Some(resolved_amount),
            FeePolicy::Deducted => resolved_amount.checked_sub(fee_amount),
        }
        .ok_or_else(too_large)?;

        Ok(TransactionSummary {
            kind,
            provider: provider.id,
            currency: self.currency.clone(),
            fee_rate: provider.fee_rate,
            fee_policy: policy,
            gross_amount: resolved_amount,
            fee_amount,
            net_or_total_amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payments::registry::ProviderRegistry;

    fn provider_with_bps(id: ProviderId, bps: u32) -> Provider {
        let mut config = PaymentsConfig::default();
        config.provider_fee_bps.insert(id, bps);
        ProviderRegistry::from_config(&config)
            .get(id)
            .expect("provider is registered")
            .clone()
    }

    #[test]
    fn donation_fee_is_added_on_top() {
        let provider = provider_with_bps(ProviderId::Orange, 150);
        let builder = TransactionSummaryBuilder::from_config(&PaymentsConfig::default());

        let summary = builder
            .build(Decimal::from(1000), &provider, TransactionKind::Donation)
            .expect("amount is in range");
        assert_eq!(summary.fee_amount, Decimal::from(15));
        assert_eq!(summary.net_or_total_amount, Decimal::from(1015));
        assert_eq!(summary.fee_policy, FeePolicy::DonorPays);
    }

    #[test]
    fn fractional_fee_keeps_minor_units() {
        let provider = provider_with_bps(ProviderId::Orange, 250);
        let builder = TransactionSummaryBuilder::from_config(&PaymentsConfig::default());

        let summary = builder
            .build(Decimal::from(100), &provider, TransactionKind::Donation)
            .expect("amount is in range");
        assert_eq!(summary.fee_amount, Decimal::new(25, 1));
        assert_eq!(summary.net_or_total_amount, Decimal::new(1025, 1));
        assert_eq!(summary.format_amount(summary.net_or_total_amount), "SLE 102.5");
    }

    #[test]
    fn fee_rounds_half_up_to_minor_unit() {
        let provider = provider_with_bps(ProviderId::Africell, 250);
        let whole_units = TransactionSummaryBuilder::new("SLE", 0, FeePolicy::Absorbed);

        // 2.5% of 101 = 2.525 -> 3 when no sub-units are shown
        let summary = whole_units
            .build(Decimal::from(101), &provider, TransactionKind::Donation)
            .expect("amount is in range");
        assert_eq!(summary.fee_amount, Decimal::from(3));

        let cents = TransactionSummaryBuilder::new("SLE", 2, FeePolicy::Absorbed);
        let summary = cents
            .build(Decimal::from(101), &provider, TransactionKind::Donation)
            .expect("amount is in range");
        assert_eq!(summary.fee_amount, Decimal::new(253, 2));
    }

    #[test]
    fn cashout_policy_controls_net_amount() {
        let provider = provider_with_bps(ProviderId::Africell, 200);

        let absorbed = TransactionSummaryBuilder::new("SLE", 2, FeePolicy::Absorbed);
        let summary = absorbed
            .build(Decimal::from(500), &provider, TransactionKind::Cashout)
            .expect("amount is in range");
        assert_eq!(summary.fee_amount, Decimal::from(10));
        assert_eq!(summary.net_or_total_amount, Decimal::from(500));

        let deducted = TransactionSummaryBuilder::new("SLE", 2, FeePolicy::Deducted);
        let summary = deducted
            .build(Decimal::from(500), &provider, TransactionKind::Cashout)
            .expect("amount is in range");
        assert_eq!(summary.net_or_total_amount, Decimal::from(490));
    }

    #[test]
    fn oversized_amount_is_rejected_instead_of_overflowing() {
        let provider = provider_with_bps(ProviderId::Orange, 250);
        let builder = TransactionSummaryBuilder::from_config(&PaymentsConfig::default());

        let result = builder.build(Decimal::MAX, &provider, TransactionKind::Donation);
        assert!(matches!(result, Err(FlowError::InvalidAmount { .. })));

        // Absorbed fees add nothing, so the same amount prices fine for a cashout
        let summary = builder
            .build(Decimal::MAX, &provider, TransactionKind::Cashout)
            .expect("absorbed fee cannot overflow");
        assert_eq!(summary.net_or_total_amount, Decimal::MAX);
    }

    #[test]
    fn build_is_deterministic() {
        let provider = provider_with_bps(ProviderId::Orange, 250);
        let builder = TransactionSummaryBuilder::from_config(&PaymentsConfig::default());
        let first = builder
            .build(Decimal::from(777), &provider, TransactionKind::Donation)
            .expect("amount is in range");
        let second = builder
            .build(Decimal::from(777), &provider, TransactionKind::Donation)
            .expect("amount is in range");
        assert_eq!(first, second);
    }
}
