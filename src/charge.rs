use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::card::Card;
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::installments::{InstallmentScheduler, InstallmentSlice};
use crate::split::{SplitAllocation, SplitAllocator, SplitTarget};
use crate::types::{CardId, ChargeId, ChargeStatus};

/// charge creation request from the entry flow or bank ingestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeRequest {
    #[serde(default)]
    pub description: String,
    pub total_amount: Money,
    pub installment_count: u32,
    pub purchase_date: NaiveDate,
    #[serde(default)]
    pub split_targets: Vec<SplitTarget>,
}

impl ChargeRequest {
    pub fn new(total_amount: Money, installment_count: u32, purchase_date: NaiveDate) -> Self {
        Self {
            description: String::new(),
            total_amount,
            installment_count,
            purchase_date,
            split_targets: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn split(mut self, targets: Vec<SplitTarget>) -> Self {
        self.split_targets = targets;
        self
    }
}

/// fields to change on an existing charge; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChargeEdit {
    pub description: Option<String>,
    pub total_amount: Option<Money>,
    pub installment_count: Option<u32>,
    pub purchase_date: Option<NaiveDate>,
    pub split_targets: Option<Vec<SplitTarget>>,
}

/// one billable amount of a charge: the whole purchase or one installment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BillingEntry {
    pub charge_id: ChargeId,
    pub sequence: u32,
    pub amount: Money,
    pub effective_date: NaiveDate,
    pub paid: bool,
}

/// a purchase booked against a card
///
/// Every charge carries its schedule; a single-payment purchase has exactly one
/// slice dated on the purchase date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charge {
    pub id: ChargeId,
    pub card_id: CardId,
    #[serde(default)]
    pub description: String,
    pub total_amount: Money,
    pub purchase_date: NaiveDate,
    pub installment_count: u32,
    pub status: ChargeStatus,
    #[serde(default)]
    pub split_targets: Vec<SplitTarget>,
    pub slices: Vec<InstallmentSlice>,
}

impl Charge {
    /// build a confirmed charge with its schedule and per-slice splits
    pub fn create(
        card: &Card,
        request: ChargeRequest,
        scheduler: &InstallmentScheduler,
        allocator: &SplitAllocator,
    ) -> Result<Self> {
        let mut charge = Self {
            id: Uuid::new_v4(),
            card_id: card.id,
            description: request.description,
            total_amount: request.total_amount,
            purchase_date: request.purchase_date,
            installment_count: request.installment_count,
            status: ChargeStatus::Confirmed,
            split_targets: request.split_targets,
            slices: Vec::new(),
        };
        charge.regenerate(card, scheduler, allocator)?;

        info!(
            charge_id = %charge.id,
            card_id = %card.id,
            total = %charge.total_amount,
            installments = charge.installment_count,
            "charge created"
        );

        Ok(charge)
    }

    /// copy of this charge with `edit` applied and all slices rebuilt
    pub fn edited(
        &self,
        edit: ChargeEdit,
        card: &Card,
        scheduler: &InstallmentScheduler,
        allocator: &SplitAllocator,
    ) -> Result<Self> {
        self.ensure_mutable()?;

        let mut charge = self.clone();
        if let Some(description) = edit.description {
            charge.description = description;
        }
        if let Some(total_amount) = edit.total_amount {
            charge.total_amount = total_amount;
        }
        if let Some(installment_count) = edit.installment_count {
            charge.installment_count = installment_count;
        }
        if let Some(purchase_date) = edit.purchase_date {
            charge.purchase_date = purchase_date;
        }
        if let Some(split_targets) = edit.split_targets {
            charge.split_targets = split_targets;
        }
        charge.regenerate(card, scheduler, allocator)?;

        debug!(charge_id = %charge.id, total = %charge.total_amount, "charge edited");
        Ok(charge)
    }

    /// copy of this charge in cancelled status; cancelling twice is a no-op
    pub fn cancelled(&self) -> Result<Self> {
        match self.status {
            ChargeStatus::Cancelled => Ok(self.clone()),
            ChargeStatus::Paid => Err(LedgerError::ChargeNotEditable {
                id: self.id,
                status: self.status,
            }),
            ChargeStatus::Confirmed => {
                self.ensure_mutable()?;
                let mut charge = self.clone();
                charge.status = ChargeStatus::Cancelled;
                info!(charge_id = %charge.id, "charge cancelled");
                Ok(charge)
            }
        }
    }

    /// rebuild every slice from the current amount, count and date
    fn regenerate(
        &mut self,
        card: &Card,
        scheduler: &InstallmentScheduler,
        allocator: &SplitAllocator,
    ) -> Result<()> {
        if !self.split_targets.is_empty() {
            allocator.validate(&self.split_targets)?;
        }

        let mut slices = scheduler.schedule(
            self.total_amount,
            self.installment_count,
            self.purchase_date,
            card,
        )?;

        if !self.split_targets.is_empty() {
            for slice in &mut slices {
                slice.splits = allocator.allocate(slice.amount, &self.split_targets)?;
            }
        }

        self.slices = slices;
        Ok(())
    }

    fn ensure_mutable(&self) -> Result<()> {
        if self.status != ChargeStatus::Confirmed || self.slices.iter().any(|s| s.paid) {
            return Err(LedgerError::ChargeNotEditable {
                id: self.id,
                status: self.status,
            });
        }
        Ok(())
    }

    pub fn is_installment(&self) -> bool {
        self.installment_count > 1
    }

    pub fn is_shared(&self) -> bool {
        !self.split_targets.is_empty()
    }

    /// billable entries, one per slice
    pub fn entries(&self) -> Vec<BillingEntry> {
        self.slices
            .iter()
            .map(|slice| BillingEntry {
                charge_id: self.id,
                sequence: slice.sequence,
                amount: slice.amount,
                effective_date: slice.effective_date,
                paid: slice.paid || self.status == ChargeStatus::Paid,
            })
            .collect()
    }

    /// amount already settled through invoice payments
    pub fn paid_amount(&self) -> Money {
        match self.status {
            ChargeStatus::Paid => self.total_amount,
            _ => self.slices.iter().filter(|s| s.paid).map(|s| s.amount).sum(),
        }
    }

    /// each slice's own full split allocation
    pub fn slice_splits(&self) -> Vec<(u32, &[SplitAllocation])> {
        self.slices
            .iter()
            .map(|slice| (slice.sequence, slice.splits.as_slice()))
            .collect()
    }

    /// slices must be numbered 1..=n and add up to the total
    pub fn check_integrity(&self) -> Result<()> {
        if self.slices.len() != self.installment_count as usize {
            return Err(LedgerError::OrphanSlice {
                charge_id: self.id,
                sequence: self.slices.len() as u32,
            });
        }

        for (index, slice) in self.slices.iter().enumerate() {
            if slice.sequence != index as u32 + 1 {
                return Err(LedgerError::OrphanSlice {
                    charge_id: self.id,
                    sequence: slice.sequence,
                });
            }
        }

        let scheduled: Money = self.slices.iter().map(|s| s.amount).sum();
        if scheduled != self.total_amount {
            return Err(LedgerError::OrphanSlice {
                charge_id: self.id,
                sequence: self.installment_count,
            });
        }

        Ok(())
    }

    /// mark the given slices paid; the charge turns paid once every slice is
    pub(crate) fn settle_slices(&mut self, sequences: &[u32]) -> Result<()> {
        for &sequence in sequences {
            let slice = self
                .slices
                .iter_mut()
                .find(|s| s.sequence == sequence)
                .ok_or(LedgerError::OrphanSlice {
                    charge_id: self.id,
                    sequence,
                })?;
            slice.paid = true;
        }

        if self.slices.iter().all(|s| s.paid) {
            self.status = ChargeStatus::Paid;
        }
        Ok(())
    }
}
