use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// unique identifier for a card
pub type CardId = Uuid;

/// unique identifier for a charge; charges are ordered by this value
pub type ChargeId = Uuid;

/// unique identifier for a responsible party (family member, partner)
pub type PartyId = Uuid;

/// unique identifier for an invoice payment record
pub type PaymentId = Uuid;

/// charge status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChargeStatus {
    /// booked against the card, counts toward used credit
    Confirmed,
    /// settled through invoice payment; terminal
    Paid,
    /// voided by the user
    Cancelled,
}

/// invoice status relative to a reference date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvoiceStatus {
    /// cycle has not started yet
    Future,
    /// reference date falls inside the cycle
    Current,
    /// cycle ended, awaiting payment
    Closed,
    /// every member settled; terminal
    Paid,
}

impl InvoiceStatus {
    /// whether the invoice accepts a payment
    pub fn is_payable(&self) -> bool {
        matches!(self, InvoiceStatus::Closed)
    }
}

/// which installment slice absorbs the rounding remainder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RemainderPolicy {
    #[default]
    LastSlice,
    FirstSlice,
}
