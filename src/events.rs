use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{CardId, ChargeId, PaymentId};

/// all events that can be emitted by a card account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LedgerEvent {
    CardCreated {
        card_id: CardId,
        credit_limit: Money,
        closing_day: u32,
        billing_day: u32,
    },

    // charge events
    ChargeCreated {
        card_id: CardId,
        charge_id: ChargeId,
        total_amount: Money,
        installment_count: u32,
        purchase_date: NaiveDate,
    },
    ChargeEdited {
        card_id: CardId,
        charge_id: ChargeId,
        old_amount: Money,
        new_amount: Money,
        installment_count: u32,
    },
    ChargeCancelled {
        card_id: CardId,
        charge_id: ChargeId,
        released_amount: Money,
    },

    // invoice events
    InvoicePaid {
        card_id: CardId,
        payment_id: PaymentId,
        cycle_start: NaiveDate,
        cycle_end: NaiveDate,
        amount: Money,
        settled_entries: usize,
        paid_on: NaiveDate,
    },

    // limit events
    LimitRecomputed {
        card_id: CardId,
        used: Money,
        available: Money,
    },
    CreditLimitExhausted {
        card_id: CardId,
        credit_limit: Money,
        used: Money,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<LedgerEvent>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
