use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};

use super::{SplitAllocation, SplitAllocator, SplitTarget};

/// an income shared between parties, e.g. a joint salary or rent received
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedIncome {
    pub id: Uuid,
    pub description: String,
    pub amount: Money,
    pub received_on: NaiveDate,
    pub split_targets: Vec<SplitTarget>,
}

impl SharedIncome {
    pub fn new(
        description: impl Into<String>,
        amount: Money,
        received_on: NaiveDate,
        split_targets: Vec<SplitTarget>,
        allocator: &SplitAllocator,
    ) -> Result<Self> {
        if !amount.is_positive() {
            return Err(LedgerError::InvalidChargeParameters {
                message: format!("income amount must be positive, got {}", amount),
            });
        }
        allocator.validate(&split_targets)?;

        Ok(Self {
            id: Uuid::new_v4(),
            description: description.into(),
            amount,
            received_on,
            split_targets,
        })
    }

    /// per-party amounts, recomputed from the current total
    pub fn allocations(&self, allocator: &SplitAllocator) -> Result<Vec<SplitAllocation>> {
        allocator.allocate(self.amount, &self.split_targets)
    }

    /// change the amount; targets are kept and re-validated
    pub fn set_amount(&mut self, amount: Money, allocator: &SplitAllocator) -> Result<Vec<SplitAllocation>> {
        if !amount.is_positive() {
            return Err(LedgerError::InvalidChargeParameters {
                message: format!("income amount must be positive, got {}", amount),
            });
        }
        let allocations = allocator.allocate(amount, &self.split_targets)?;
        self.amount = amount;
        Ok(allocations)
    }
}
