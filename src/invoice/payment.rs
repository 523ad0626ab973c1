use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::charge::Charge;
use crate::cycle::Cycle;
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::ledger::{CreditLedger, LedgerView};
use crate::split::{SplitAllocation, SplitTarget};
use crate::types::{CardId, ChargeId, ChargeStatus, InvoiceStatus, PaymentId};

use super::{Invoice, InvoiceAggregator};

/// ledger-visible record of one invoice payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: PaymentId,
    pub card_id: CardId,
    pub cycle: Cycle,
    pub amount: Money,
    pub paid_on: NaiveDate,
    /// payer allocation, empty when one party pays
    pub splits: Vec<SplitAllocation>,
}

/// outcome of a successful invoice payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentResult {
    pub payment: PaymentRecord,
    /// new versions of every charge touched by the payment, ordered by id
    pub updated_charges: Vec<Charge>,
    /// ledger recomputed over the snapshot with the updates applied
    pub ledger: LedgerView,
}

impl PaymentResult {
    /// replace the touched charges in a caller-held snapshot
    pub fn apply_to(&self, charges: &mut [Charge]) {
        for updated in &self.updated_charges {
            if let Some(slot) = charges.iter_mut().find(|c| c.id == updated.id) {
                *slot = updated.clone();
            }
        }
    }
}

impl<'a> InvoiceAggregator<'a> {
    /// settle a closed invoice against the current charge snapshot
    ///
    /// Every unpaid member slice is marked paid; a charge turns paid only when
    /// all of its slices are. Fails with `AlreadyPaid` when nothing is left to
    /// settle, so a retried payment has no second effect.
    pub fn pay_invoice(
        &self,
        invoice: &Invoice,
        charges: &[Charge],
        payer_split: &[SplitTarget],
        paid_on: NaiveDate,
    ) -> Result<PaymentResult> {
        let card = self.card();
        if invoice.card_id != card.id {
            return Err(LedgerError::InvalidConfiguration {
                message: format!("invoice belongs to card {}, not {}", invoice.card_id, card.id),
            });
        }

        match invoice.status {
            InvoiceStatus::Paid => {
                return Err(LedgerError::AlreadyPaid {
                    card_id: card.id,
                    cycle_start: invoice.cycle.start_date,
                });
            }
            InvoiceStatus::Future | InvoiceStatus::Current => {
                warn!(card_id = %card.id, status = ?invoice.status, "refused to pay open invoice");
                return Err(LedgerError::NotClosed { status: invoice.status });
            }
            InvoiceStatus::Closed => {}
        }

        // re-read member state from the snapshot; the invoice may be stale
        let mut pending: Vec<(ChargeId, u32, Money)> = Vec::new();
        for entry in &invoice.entries {
            let charge = charges
                .iter()
                .find(|c| c.id == entry.charge_id && c.card_id == card.id)
                .ok_or(LedgerError::OrphanSlice {
                    charge_id: entry.charge_id,
                    sequence: entry.sequence,
                })?;
            let slice = charge
                .slices
                .iter()
                .find(|s| s.sequence == entry.sequence)
                .ok_or(LedgerError::OrphanSlice {
                    charge_id: entry.charge_id,
                    sequence: entry.sequence,
                })?;

            if charge.status == ChargeStatus::Confirmed && !invoice.cycle.contains(slice.effective_date) {
                // an edit moved the slice into another cycle since the invoice was built
                warn!(
                    charge_id = %charge.id,
                    sequence = slice.sequence,
                    effective_date = %slice.effective_date,
                    "slice no longer belongs to the invoice cycle"
                );
                return Err(LedgerError::OrphanSlice {
                    charge_id: charge.id,
                    sequence: slice.sequence,
                });
            }

            match charge.status {
                ChargeStatus::Confirmed if !slice.paid => {
                    pending.push((charge.id, slice.sequence, slice.amount));
                }
                ChargeStatus::Cancelled => {
                    warn!(charge_id = %charge.id, "skipping charge cancelled after invoice was built");
                }
                _ => {}
            }
        }

        if pending.is_empty() {
            return Err(LedgerError::AlreadyPaid {
                card_id: card.id,
                cycle_start: invoice.cycle.start_date,
            });
        }

        let amount: Money = pending.iter().map(|(_, _, amount)| *amount).sum();
        let splits = if payer_split.is_empty() {
            Vec::new()
        } else {
            self.allocator.allocate(amount, payer_split)?
        };

        let mut updated_charges: Vec<Charge> = Vec::new();
        for (charge_id, _, _) in &pending {
            if updated_charges.iter().any(|c| c.id == *charge_id) {
                continue;
            }
            let sequences: Vec<u32> = pending
                .iter()
                .filter(|(id, _, _)| id == charge_id)
                .map(|(_, sequence, _)| *sequence)
                .collect();

            // presence checked above
            if let Some(original) = charges.iter().find(|c| c.id == *charge_id) {
                let mut charge = original.clone();
                charge.settle_slices(&sequences)?;
                updated_charges.push(charge);
            }
        }
        updated_charges.sort_by_key(|c| c.id);

        let mut snapshot = charges.to_vec();
        for updated in &updated_charges {
            if let Some(slot) = snapshot.iter_mut().find(|c| c.id == updated.id) {
                *slot = updated.clone();
            }
        }
        let ledger: LedgerView = CreditLedger::view(card, &snapshot);

        info!(
            card_id = %card.id,
            cycle_start = %invoice.cycle.start_date,
            amount = %amount,
            entries = pending.len(),
            available = %ledger.available_limit,
            "invoice paid"
        );

        Ok(PaymentResult {
            payment: PaymentRecord {
                id: Uuid::new_v4(),
                card_id: card.id,
                cycle: invoice.cycle,
                amount,
                paid_on,
                splits,
            },
            updated_charges,
            ledger,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Card;
    use crate::charge::{ChargeEdit, ChargeRequest};
    use crate::config::EngineConfig;
    use crate::decimal::Percentage;
    use crate::installments::InstallmentScheduler;
    use crate::split::SplitAllocator;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn charge(card: &Card, amount: Money, installments: u32, purchase: NaiveDate) -> Charge {
        Charge::create(
            card,
            ChargeRequest::new(amount, installments, purchase),
            &InstallmentScheduler::default(),
            &SplitAllocator::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_pay_closed_invoice_settles_slices_only() {
        let card = Card::new(Money::from_major(1_000), 10, 15).unwrap();
        let aggregator = InvoiceAggregator::new(&card, &EngineConfig::default()).unwrap();
        let mut charges = vec![
            charge(&card, Money::from_major(50), 1, date(2024, 2, 20)),
            charge(&card, Money::from_major(301), 3, date(2024, 3, 5)),
        ];

        let invoices = aggregator.build_invoices(&charges, date(2024, 3, 25)).unwrap();
        let closed = &invoices[0];
        assert_eq!(closed.status, InvoiceStatus::Closed);

        let result = aggregator.pay_invoice(closed, &charges, &[], date(2024, 4, 1)).unwrap();
        assert_eq!(result.payment.amount, Money::from_decimal(dec!(150.33)));
        assert!(result.payment.splits.is_empty());
        assert_eq!(result.updated_charges.len(), 2);

        result.apply_to(&mut charges);
        assert_eq!(charges[0].status, ChargeStatus::Paid);
        // installment parent stays confirmed until every slice is paid
        assert_eq!(charges[1].status, ChargeStatus::Confirmed);
        assert!(charges[1].slices[0].paid);
        assert!(!charges[1].slices[1].paid);

        // full installment amount is still reserved against the limit
        assert_eq!(result.ledger.used_by_full_charges, Money::from_major(301));
        assert_eq!(result.ledger.available_limit, Money::from_major(699));
        assert_eq!(result.ledger.paid_to_date, Money::from_decimal(dec!(150.33)));

        let rebuilt = aggregator.build_invoices(&charges, date(2024, 3, 25)).unwrap();
        assert_eq!(rebuilt[0].status, InvoiceStatus::Paid);
        assert_eq!(rebuilt[0].outstanding, Money::ZERO);
        assert_eq!(rebuilt[1].status, InvoiceStatus::Current);
    }

    #[test]
    fn test_pay_is_idempotent() {
        let card = Card::new(Money::from_major(1_000), 10, 15).unwrap();
        let aggregator = InvoiceAggregator::new(&card, &EngineConfig::default()).unwrap();
        let mut charges = vec![charge(&card, Money::from_major(80), 1, date(2024, 2, 20))];

        let invoice = aggregator.build_invoices(&charges, date(2024, 3, 25)).unwrap().remove(0);
        let result = aggregator.pay_invoice(&invoice, &charges, &[], date(2024, 4, 1)).unwrap();
        result.apply_to(&mut charges);
        let after_first = charges.clone();

        // retry with the stale invoice view
        let retry = aggregator.pay_invoice(&invoice, &charges, &[], date(2024, 4, 1));
        assert!(matches!(retry, Err(LedgerError::AlreadyPaid { .. })));

        // retry with a freshly built view
        let fresh = aggregator.build_invoices(&charges, date(2024, 3, 25)).unwrap().remove(0);
        let retry = aggregator.pay_invoice(&fresh, &charges, &[], date(2024, 4, 1));
        assert!(matches!(retry, Err(LedgerError::AlreadyPaid { .. })));

        assert_eq!(charges, after_first);
    }

    #[test]
    fn test_cannot_prepay() {
        let card = Card::new(Money::from_major(1_000), 10, 15).unwrap();
        let aggregator = InvoiceAggregator::new(&card, &EngineConfig::default()).unwrap();
        let charges = vec![charge(&card, Money::from_major(300), 3, date(2024, 3, 12))];

        let invoices = aggregator.build_invoices(&charges, date(2024, 3, 25)).unwrap();
        assert_eq!(
            aggregator.pay_invoice(&invoices[0], &charges, &[], date(2024, 3, 25)),
            Err(LedgerError::NotClosed { status: InvoiceStatus::Current })
        );
        assert_eq!(
            aggregator.pay_invoice(&invoices[1], &charges, &[], date(2024, 3, 25)),
            Err(LedgerError::NotClosed { status: InvoiceStatus::Future })
        );
    }

    #[test]
    fn test_payer_split() {
        let card = Card::new(Money::from_major(1_000), 10, 15).unwrap();
        let aggregator = InvoiceAggregator::new(&card, &EngineConfig::default()).unwrap();
        let charges = vec![charge(&card, Money::from_major(150), 1, date(2024, 2, 20))];
        let a = SplitTarget::new(Uuid::new_v4(), Percentage::from_whole(60));
        let b = SplitTarget::new(Uuid::new_v4(), Percentage::from_whole(40));

        let invoice = aggregator.build_invoices(&charges, date(2024, 3, 25)).unwrap().remove(0);
        let result = aggregator.pay_invoice(&invoice, &charges, &[a, b], date(2024, 4, 1)).unwrap();
        assert_eq!(result.payment.splits[0].amount, Money::from_major(90));
        assert_eq!(result.payment.splits[1].amount, Money::from_major(60));

        let bad = SplitTarget::new(Uuid::new_v4(), Percentage::from_whole(99));
        assert!(matches!(
            aggregator.pay_invoice(&invoice, &charges, &[bad], date(2024, 4, 1)),
            Err(LedgerError::SplitMismatch { .. })
        ));
    }

    #[test]
    fn test_stale_invoice_cannot_pay_moved_slice() {
        let card = Card::new(Money::from_major(1_000), 10, 15).unwrap();
        let aggregator = InvoiceAggregator::new(&card, &EngineConfig::default()).unwrap();
        let original = charge(&card, Money::from_major(100), 1, date(2024, 2, 20));
        let stale = aggregator
            .build_invoices(&[original.clone()], date(2024, 3, 25))
            .unwrap()
            .remove(0);
        assert_eq!(stale.status, InvoiceStatus::Closed);

        // purchase date moved into the current cycle
        let moved = original
            .edited(
                ChargeEdit {
                    purchase_date: Some(date(2024, 3, 20)),
                    ..Default::default()
                },
                &card,
                &InstallmentScheduler::default(),
                &SplitAllocator::default(),
            )
            .unwrap();
        let charges = vec![moved];

        assert!(matches!(
            aggregator.pay_invoice(&stale, &charges, &[], date(2024, 3, 25)),
            Err(LedgerError::OrphanSlice { .. })
        ));

        let fresh = aggregator.build_invoices(&charges, date(2024, 3, 25)).unwrap();
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].cycle.start_date, date(2024, 3, 11));
        assert_eq!(fresh[0].status, InvoiceStatus::Current);
    }

    #[test]
    fn test_missing_member_is_orphan() {
        let card = Card::new(Money::from_major(1_000), 10, 15).unwrap();
        let aggregator = InvoiceAggregator::new(&card, &EngineConfig::default()).unwrap();
        let charges = vec![charge(&card, Money::from_major(150), 1, date(2024, 2, 20))];

        let invoice = aggregator.build_invoices(&charges, date(2024, 3, 25)).unwrap().remove(0);
        assert!(matches!(
            aggregator.pay_invoice(&invoice, &[], &[], date(2024, 4, 1)),
            Err(LedgerError::OrphanSlice { .. })
        ));
    }
}
