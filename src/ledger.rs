use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::card::Card;
use crate::charge::Charge;
use crate::decimal::Money;
use crate::types::ChargeStatus;

/// credit figures for one card, derived from its charges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerView {
    pub credit_limit: Money,
    /// full totals of confirmed charges, installments included
    pub used_by_full_charges: Money,
    /// amounts settled through invoice payments, paid charges and paid slices
    pub paid_to_date: Money,
    /// `max(0, credit_limit - used_by_full_charges)`
    pub available_limit: Money,
    /// limit if each paid slice released its share immediately
    pub released_per_slice_limit: Money,
}

impl LedgerView {
    pub fn utilization(&self) -> rust_decimal::Decimal {
        if self.credit_limit.is_zero() {
            return rust_decimal::Decimal::ZERO;
        }
        self.used_by_full_charges.as_decimal() / self.credit_limit.as_decimal()
    }

    pub fn is_exhausted(&self) -> bool {
        self.used_by_full_charges >= self.credit_limit
    }
}

/// recomputes a card's available limit from its charge set
pub struct CreditLedger;

impl CreditLedger {
    /// credit limit minus the full total of every confirmed charge, floored at zero
    pub fn available_limit(card: &Card, charges: &[Charge]) -> Money {
        Self::view(card, charges).available_limit
    }

    pub fn view(card: &Card, charges: &[Charge]) -> LedgerView {
        let own = || charges.iter().filter(|c| c.card_id == card.id);

        let used_by_full_charges: Money = own()
            .filter(|c| c.status == ChargeStatus::Confirmed)
            .map(|c| c.total_amount)
            .sum();

        let paid_to_date: Money = own()
            .filter(|c| c.status != ChargeStatus::Cancelled)
            .map(|c| c.paid_amount())
            .sum();

        // only slices of still-open charges are double counted in `used_by_full_charges`
        let released_by_open_charges: Money = own()
            .filter(|c| c.status == ChargeStatus::Confirmed)
            .map(|c| c.paid_amount())
            .sum();

        let available_limit = (card.credit_limit - used_by_full_charges).max(Money::ZERO);
        let released_per_slice_limit = (card.credit_limit - used_by_full_charges
            + released_by_open_charges)
            .max(Money::ZERO)
            .min(card.credit_limit.max(Money::ZERO));

        debug!(
            card_id = %card.id,
            used = %used_by_full_charges,
            paid = %paid_to_date,
            available = %available_limit,
            "recomputed ledger"
        );

        LedgerView {
            credit_limit: card.credit_limit,
            used_by_full_charges,
            paid_to_date,
            available_limit,
            released_per_slice_limit,
        }
    }
}
