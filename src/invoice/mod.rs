pub mod payment;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::card::Card;
use crate::charge::{BillingEntry, Charge};
use crate::config::EngineConfig;
use crate::cycle::{Cycle, CycleCalculator};
use crate::decimal::Money;
use crate::errors::Result;
use crate::split::SplitAllocator;
use crate::types::{CardId, ChargeId, ChargeStatus, InvoiceStatus};

pub use payment::{PaymentRecord, PaymentResult};

/// all billable entries of one card whose effective date falls in one cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub card_id: CardId,
    pub cycle: Cycle,
    pub total: Money,
    /// part of `total` not yet settled
    pub outstanding: Money,
    /// distinct member charges, ascending
    pub member_charge_ids: Vec<ChargeId>,
    /// entries ordered by charge id, then installment sequence
    pub entries: Vec<BillingEntry>,
    pub status: InvoiceStatus,
}

impl Invoice {
    pub fn due_date(&self) -> NaiveDate {
        self.cycle.due_date
    }

    pub fn is_paid(&self) -> bool {
        self.status == InvoiceStatus::Paid
    }
}

/// classify a cycle against a reference date, ignoring payment
pub fn classify(cycle: &Cycle, reference_date: NaiveDate) -> InvoiceStatus {
    if reference_date < cycle.start_date {
        InvoiceStatus::Future
    } else if reference_date <= cycle.end_date {
        InvoiceStatus::Current
    } else {
        InvoiceStatus::Closed
    }
}

/// groups a card's charges into invoices and settles them
pub struct InvoiceAggregator<'a> {
    card: &'a Card,
    calculator: CycleCalculator,
    allocator: SplitAllocator,
}

impl<'a> InvoiceAggregator<'a> {
    pub fn new(card: &'a Card, config: &EngineConfig) -> Result<Self> {
        Ok(Self {
            card,
            calculator: card.calculator()?,
            allocator: SplitAllocator::new(config.split_tolerance),
        })
    }

    pub fn card(&self) -> &Card {
        self.card
    }

    /// invoices for every cycle touched by a non-cancelled charge, oldest first
    pub fn build_invoices(&self, charges: &[Charge], reference_date: NaiveDate) -> Result<Vec<Invoice>> {
        let mut by_cycle: BTreeMap<NaiveDate, (Cycle, Vec<BillingEntry>)> = BTreeMap::new();

        for charge in charges {
            if charge.card_id != self.card.id || charge.status == ChargeStatus::Cancelled {
                continue;
            }
            charge.check_integrity()?;

            for entry in charge.entries() {
                let cycle = self.calculator.resolve(entry.effective_date)?;
                by_cycle
                    .entry(cycle.start_date)
                    .or_insert_with(|| (cycle, Vec::new()))
                    .1
                    .push(entry);
            }
        }

        let invoices: Vec<Invoice> = by_cycle
            .into_values()
            .map(|(cycle, entries)| self.assemble(cycle, entries, reference_date))
            .collect();

        debug!(
            card_id = %self.card.id,
            %reference_date,
            invoices = invoices.len(),
            "built invoices"
        );

        Ok(invoices)
    }

    /// the invoice whose cycle contains `date`, if any entry falls in it
    pub fn invoice_containing(
        &self,
        charges: &[Charge],
        date: NaiveDate,
        reference_date: NaiveDate,
    ) -> Result<Option<Invoice>> {
        let cycle = self.calculator.resolve(date)?;
        Ok(self
            .build_invoices(charges, reference_date)?
            .into_iter()
            .find(|invoice| invoice.cycle == cycle))
    }

    fn assemble(&self, cycle: Cycle, mut entries: Vec<BillingEntry>, reference_date: NaiveDate) -> Invoice {
        entries.sort_by_key(|e| (e.charge_id, e.sequence));

        let total: Money = entries.iter().map(|e| e.amount).sum();
        let outstanding: Money = entries.iter().filter(|e| !e.paid).map(|e| e.amount).sum();

        let mut member_charge_ids: Vec<ChargeId> = entries.iter().map(|e| e.charge_id).collect();
        member_charge_ids.dedup();

        let status = if entries.iter().all(|e| e.paid) {
            InvoiceStatus::Paid
        } else {
            classify(&cycle, reference_date)
        };

        Invoice {
            card_id: self.card.id,
            cycle,
            total,
            outstanding,
            member_charge_ids,
            entries,
            status,
        }
    }
}
