use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::card::Card;
use crate::config::EngineConfig;
use crate::cycle::calendar::add_months;
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::split::SplitAllocation;
use crate::types::RemainderPolicy;

/// one scheduled fraction of a purchase, tied to a single cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentSlice {
    /// 1-based position in the schedule
    pub sequence: u32,
    pub amount: Money,
    /// date used to resolve the slice's cycle
    pub effective_date: NaiveDate,
    #[serde(default)]
    pub paid: bool,
    /// per-party allocation of this slice's amount, empty when not shared
    #[serde(default)]
    pub splits: Vec<SplitAllocation>,
}

/// expands purchases into installment slices
#[derive(Debug, Clone, Copy)]
pub struct InstallmentScheduler {
    remainder_policy: RemainderPolicy,
    max_installments: u32,
}

impl Default for InstallmentScheduler {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl InstallmentScheduler {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            remainder_policy: config.remainder_policy,
            max_installments: config.max_installments,
        }
    }

    /// split `total_amount` into `installment_count` slices, slice k landing in
    /// the k-th cycle counted from the purchase's cycle
    pub fn schedule(
        &self,
        total_amount: Money,
        installment_count: u32,
        purchase_date: NaiveDate,
        card: &Card,
    ) -> Result<Vec<InstallmentSlice>> {
        let amounts = self.split_amounts(total_amount, installment_count)?;
        let calculator = card.calculator()?;

        let mut cycle = calculator.resolve(purchase_date)?;
        let mut slices = Vec::with_capacity(amounts.len());

        for (index, amount) in amounts.into_iter().enumerate() {
            if index > 0 {
                cycle = calculator.next(&cycle)?;
            }
            // same day-of-month k-1 months later, pulled inside cycle k when month
            // clamping would leave it in a neighbouring cycle
            let effective_date = add_months(purchase_date, index as u32)?
                .clamp(cycle.start_date, cycle.end_date);

            slices.push(InstallmentSlice {
                sequence: index as u32 + 1,
                amount,
                effective_date,
                paid: false,
                splits: Vec::new(),
            });
        }

        debug!(
            card_id = %card.id,
            total = %total_amount,
            installments = installment_count,
            %purchase_date,
            "scheduled installments"
        );

        Ok(slices)
    }

    /// per-slice amounts: floor to cents, remainder to the policy's slice
    pub fn split_amounts(&self, total_amount: Money, installment_count: u32) -> Result<Vec<Money>> {
        validate_charge(total_amount, installment_count, self.max_installments).map_err(|e| {
            warn!(total = %total_amount, installment_count, error = %e, "rejected installment plan");
            e
        })?;

        // may be zero when the total has fewer cents than slices
        let base = total_amount.floor_div(installment_count);

        let mut amounts = vec![base; installment_count as usize];
        let distributed: Money = amounts.iter().sum();
        let remainder = total_amount - distributed;

        let absorber = match self.remainder_policy {
            RemainderPolicy::LastSlice => amounts.len() - 1,
            RemainderPolicy::FirstSlice => 0,
        };
        amounts[absorber] += remainder;

        Ok(amounts)
    }
}

/// schedule with default configuration
pub fn schedule(
    total_amount: Money,
    installment_count: u32,
    purchase_date: NaiveDate,
    card: &Card,
) -> Result<Vec<InstallmentSlice>> {
    InstallmentScheduler::default().schedule(total_amount, installment_count, purchase_date, card)
}

fn validate_charge(total_amount: Money, installment_count: u32, max_installments: u32) -> Result<()> {
    if !total_amount.is_positive() {
        return Err(LedgerError::InvalidChargeParameters {
            message: format!("total amount must be positive, got {}", total_amount),
        });
    }

    if installment_count < 1 {
        return Err(LedgerError::InvalidChargeParameters {
            message: "installment count must be at least 1".to_string(),
        });
    }

    if installment_count > max_installments {
        return Err(LedgerError::InvalidChargeParameters {
            message: format!(
                "installment count {} exceeds maximum of {}",
                installment_count, max_installments
            ),
        });
    }

    Ok(())
}
