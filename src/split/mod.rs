pub mod income;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::decimal::{Money, Percentage};
use crate::errors::{LedgerError, Result};
use crate::types::PartyId;

pub use income::SharedIncome;

/// a party's share of a charge or income
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitTarget {
    pub party_id: PartyId,
    pub percentage: Percentage,
}

impl SplitTarget {
    pub fn new(party_id: PartyId, percentage: Percentage) -> Self {
        Self { party_id, percentage }
    }
}

/// allocated amount for one party
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitAllocation {
    pub party_id: PartyId,
    pub amount: Money,
}

/// distributes amounts across parties by percentage
#[derive(Debug, Clone, Copy)]
pub struct SplitAllocator {
    tolerance: Decimal,
}

impl Default for SplitAllocator {
    fn default() -> Self {
        Self::new(rust_decimal_macros::dec!(0.01))
    }
}

impl SplitAllocator {
    /// `tolerance` is the accepted deviation of the percentage sum from 100
    pub fn new(tolerance: Decimal) -> Self {
        Self { tolerance: tolerance.abs() }
    }

    /// check that targets are usable and sum to 100 within tolerance
    pub fn validate(&self, targets: &[SplitTarget]) -> Result<Percentage> {
        let total: Percentage = targets.iter().map(|t| t.percentage).sum();

        if targets.is_empty() || targets.iter().any(|t| t.percentage < Percentage::ZERO) {
            warn!(%total, targets = targets.len(), "rejected split targets");
            return Err(LedgerError::SplitMismatch {
                total_percentage: total.as_points(),
            });
        }

        let deviation = (total.as_points() - Decimal::ONE_HUNDRED).abs();
        if deviation > self.tolerance {
            warn!(%total, tolerance = %self.tolerance, "split percentages do not sum to 100");
            return Err(LedgerError::SplitMismatch {
                total_percentage: total.as_points(),
            });
        }

        Ok(total)
    }

    /// split `total_amount` across `targets`; the allocations sum to it exactly
    ///
    /// Shares are normalized by the actual percentage sum, floored to cents, and
    /// the residual cents go one each to the targets with the largest discarded
    /// fractions (ties resolved by target order).
    pub fn allocate(&self, total_amount: Money, targets: &[SplitTarget]) -> Result<Vec<SplitAllocation>> {
        let percentage_sum = self.validate(targets)?.as_points();
        if percentage_sum.is_zero() {
            return Err(LedgerError::SplitMismatch {
                total_percentage: percentage_sum,
            });
        }

        let magnitude = total_amount.abs().as_decimal();
        let sign = if total_amount.is_negative() { -Decimal::ONE } else { Decimal::ONE };

        let mut floors = Vec::with_capacity(targets.len());
        let mut fractions = Vec::with_capacity(targets.len());
        for target in targets {
            let exact = magnitude * target.percentage.as_points() / percentage_sum;
            let floor = exact.round_dp_with_strategy(Money::SCALE, RoundingStrategy::ToZero);
            floors.push(floor);
            fractions.push(exact - floor);
        }

        let distributed: Decimal = floors.iter().copied().sum();
        let residual_cents = ((magnitude - distributed) * Decimal::ONE_HUNDRED)
            .round()
            .to_usize()
            .unwrap_or(0)
            .min(targets.len());

        let mut order: Vec<usize> = (0..targets.len()).collect();
        // stable sort keeps target order among equal fractions
        order.sort_by(|&a, &b| fractions[b].cmp(&fractions[a]));
        for &index in order.iter().take(residual_cents) {
            floors[index] += Money::CENT.as_decimal();
        }

        let allocations: Vec<SplitAllocation> = targets
            .iter()
            .zip(floors)
            .map(|(target, amount)| SplitAllocation {
                party_id: target.party_id,
                amount: Money::from_decimal(amount * sign),
            })
            .collect();

        debug!(
            total = %total_amount,
            parties = allocations.len(),
            residual_cents,
            "allocated split"
        );

        Ok(allocations)
    }
}

/// allocate with the default tolerance
pub fn allocate(total_amount: Money, targets: &[SplitTarget]) -> Result<Vec<SplitAllocation>> {
    SplitAllocator::default().allocate(total_amount, targets)
}
