use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use tracing::{info, warn};

use crate::card::Card;
use crate::charge::{Charge, ChargeEdit, ChargeRequest};
use crate::config::EngineConfig;
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::events::{EventStore, LedgerEvent};
use crate::installments::InstallmentScheduler;
use crate::invoice::{Invoice, InvoiceAggregator, PaymentRecord};
use crate::ledger::{CreditLedger, LedgerView};
use crate::snapshot::CardSnapshot;
use crate::split::{SplitAllocator, SplitTarget};
use crate::types::{CardId, ChargeId};

/// one card with its charges and payments, held in memory
pub struct CardAccount {
    pub card: Card,
    pub config: EngineConfig,
    charges: Vec<Charge>,
    payments: Vec<PaymentRecord>,
    pub events: EventStore,
}

impl CardAccount {
    /// open an account for a validated card
    pub fn open(card: Card, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        card.validate()?;

        let mut account = Self {
            card,
            config,
            charges: Vec::new(),
            payments: Vec::new(),
            events: EventStore::new(),
        };

        account.events.emit(LedgerEvent::CardCreated {
            card_id: account.card.id,
            credit_limit: account.card.credit_limit,
            closing_day: account.card.closing_day,
            billing_day: account.card.billing_day,
        });

        Ok(account)
    }

    /// rebuild an account from a persisted snapshot
    pub fn restore(snapshot: CardSnapshot, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        snapshot.card.validate()?;
        for charge in &snapshot.charges {
            if charge.card_id != snapshot.card.id {
                return Err(LedgerError::InvalidConfiguration {
                    message: format!("charge {} belongs to card {}", charge.id, charge.card_id),
                });
            }
            charge.check_integrity()?;
        }

        Ok(Self {
            card: snapshot.card,
            config,
            charges: snapshot.charges,
            payments: snapshot.payments,
            events: EventStore::new(),
        })
    }

    pub fn id(&self) -> CardId {
        self.card.id
    }

    pub fn charges(&self) -> &[Charge] {
        &self.charges
    }

    pub fn charge(&self, id: ChargeId) -> Result<&Charge> {
        self.charges
            .iter()
            .find(|c| c.id == id)
            .ok_or(LedgerError::ChargeNotFound { id })
    }

    pub fn payments(&self) -> &[PaymentRecord] {
        &self.payments
    }

    fn scheduler(&self) -> InstallmentScheduler {
        InstallmentScheduler::new(&self.config)
    }

    fn allocator(&self) -> SplitAllocator {
        SplitAllocator::new(self.config.split_tolerance)
    }

    fn position(&self, id: ChargeId) -> Result<usize> {
        self.charges
            .iter()
            .position(|c| c.id == id)
            .ok_or(LedgerError::ChargeNotFound { id })
    }

    /// record a purchase and debit its full amount from the limit
    pub fn create_charge(&mut self, request: ChargeRequest) -> Result<Charge> {
        let charge = Charge::create(&self.card, request, &self.scheduler(), &self.allocator())?;

        self.events.emit(LedgerEvent::ChargeCreated {
            card_id: self.card.id,
            charge_id: charge.id,
            total_amount: charge.total_amount,
            installment_count: charge.installment_count,
            purchase_date: charge.purchase_date,
        });

        self.charges.push(charge.clone());
        self.recompute_limit();
        Ok(charge)
    }

    /// apply an edit to a confirmed, fully unpaid charge
    pub fn edit_charge(&mut self, id: ChargeId, edit: ChargeEdit) -> Result<Charge> {
        let index = self.position(id)?;
        let old_amount = self.charges[index].total_amount;

        let charge = self.charges[index]
            .edited(edit, &self.card, &self.scheduler(), &self.allocator())
            .map_err(|e| {
                warn!(charge_id = %id, error = %e, "charge edit rejected");
                e
            })?;

        self.events.emit(LedgerEvent::ChargeEdited {
            card_id: self.card.id,
            charge_id: id,
            old_amount,
            new_amount: charge.total_amount,
            installment_count: charge.installment_count,
        });

        self.charges[index] = charge.clone();
        self.recompute_limit();
        Ok(charge)
    }

    /// cancel a confirmed charge; cancelling twice changes nothing
    pub fn cancel_charge(&mut self, id: ChargeId) -> Result<Charge> {
        let index = self.position(id)?;
        let current = &self.charges[index];
        if current.status == crate::types::ChargeStatus::Cancelled {
            return Ok(current.clone());
        }

        let charge = current.cancelled()?;
        self.events.emit(LedgerEvent::ChargeCancelled {
            card_id: self.card.id,
            charge_id: id,
            released_amount: charge.total_amount,
        });

        self.charges[index] = charge.clone();
        self.recompute_limit();
        Ok(charge)
    }

    /// invoices classified against the clock's current date
    pub fn invoices(&self, time_provider: &SafeTimeProvider) -> Result<Vec<Invoice>> {
        self.invoices_at(time_provider.now().date_naive())
    }

    /// invoices with system time
    pub fn invoices_now(&self) -> Result<Vec<Invoice>> {
        let time = SafeTimeProvider::new(hourglass_rs::TimeSource::System);
        self.invoices(&time)
    }

    pub fn invoices_at(&self, reference_date: NaiveDate) -> Result<Vec<Invoice>> {
        InvoiceAggregator::new(&self.card, &self.config)?.build_invoices(&self.charges, reference_date)
    }

    /// pay the invoice whose cycle starts on `cycle_start`
    ///
    /// The new slice and charge statuses replace the stored ones only after the
    /// whole payment succeeded. Paying the same invoice again fails with
    /// `AlreadyPaid` and leaves the account untouched.
    pub fn pay_invoice(
        &mut self,
        cycle_start: NaiveDate,
        payer_split: &[SplitTarget],
        time_provider: &SafeTimeProvider,
    ) -> Result<PaymentRecord> {
        let today = time_provider.now().date_naive();
        let aggregator = InvoiceAggregator::new(&self.card, &self.config)?;

        let invoice = aggregator
            .build_invoices(&self.charges, today)?
            .into_iter()
            .find(|invoice| invoice.cycle.start_date == cycle_start)
            .ok_or(LedgerError::InvoiceNotFound {
                card_id: self.card.id,
                cycle_start,
            })?;

        let result = aggregator.pay_invoice(&invoice, &self.charges, payer_split, today)?;
        let settled_entries = invoice.entries.iter().filter(|e| !e.paid).count();

        result.apply_to(&mut self.charges);
        self.payments.push(result.payment.clone());

        self.events.emit(LedgerEvent::InvoicePaid {
            card_id: self.card.id,
            payment_id: result.payment.id,
            cycle_start: invoice.cycle.start_date,
            cycle_end: invoice.cycle.end_date,
            amount: result.payment.amount,
            settled_entries,
            paid_on: today,
        });
        self.recompute_limit();

        Ok(result.payment)
    }

    /// pay with system time
    pub fn pay_invoice_now(&mut self, cycle_start: NaiveDate, payer_split: &[SplitTarget]) -> Result<PaymentRecord> {
        let time = SafeTimeProvider::new(hourglass_rs::TimeSource::System);
        self.pay_invoice(cycle_start, payer_split, &time)
    }

    pub fn ledger_view(&self) -> LedgerView {
        CreditLedger::view(&self.card, &self.charges)
    }

    pub fn available_limit(&self) -> Money {
        CreditLedger::available_limit(&self.card, &self.charges)
    }

    pub fn snapshot(&self, time_provider: &SafeTimeProvider) -> CardSnapshot {
        CardSnapshot::capture(&self.card, &self.charges, &self.payments, time_provider.now())
    }

    pub fn take_events(&mut self) -> Vec<LedgerEvent> {
        self.events.take_events()
    }

    fn recompute_limit(&mut self) {
        let view = self.ledger_view();

        self.events.emit(LedgerEvent::LimitRecomputed {
            card_id: self.card.id,
            used: view.used_by_full_charges,
            available: view.available_limit,
        });

        if view.is_exhausted() {
            warn!(card_id = %self.card.id, used = %view.used_by_full_charges, "credit limit exhausted");
            self.events.emit(LedgerEvent::CreditLimitExhausted {
                card_id: self.card.id,
                credit_limit: view.credit_limit,
                used: view.used_by_full_charges,
            });
        } else {
            info!(card_id = %self.card.id, available = %view.available_limit, "limit recomputed");
        }
    }
}
