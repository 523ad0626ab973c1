use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::types::{CardId, ChargeId, ChargeStatus, InvoiceStatus};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("invalid card configuration: {field} = {value} is outside 1..=31")]
    InvalidCardConfig {
        field: &'static str,
        value: u32,
    },

    #[error("invalid charge parameters: {message}")]
    InvalidChargeParameters {
        message: String,
    },

    #[error("split percentages sum to {total_percentage}, expected 100")]
    SplitMismatch {
        total_percentage: Decimal,
    },

    #[error("invoice for card {card_id} starting {cycle_start} is already paid")]
    AlreadyPaid {
        card_id: CardId,
        cycle_start: NaiveDate,
    },

    #[error("invoice is not closed: current status is {status:?}")]
    NotClosed {
        status: InvoiceStatus,
    },

    #[error("orphan installment slice {sequence} of charge {charge_id}")]
    OrphanSlice {
        charge_id: ChargeId,
        sequence: u32,
    },

    #[error("charge not found: {id}")]
    ChargeNotFound {
        id: ChargeId,
    },

    #[error("no invoice for card {card_id} starts on {cycle_start}")]
    InvoiceNotFound {
        card_id: CardId,
        cycle_start: NaiveDate,
    },

    #[error("charge {id} cannot be changed in status {status:?}")]
    ChargeNotEditable {
        id: ChargeId,
        status: ChargeStatus,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },
}

impl LedgerError {
    /// errors a caller should surface to the user as bad input
    pub fn is_user_input(&self) -> bool {
        matches!(
            self,
            LedgerError::SplitMismatch { .. }
                | LedgerError::InvalidChargeParameters { .. }
                | LedgerError::InvoiceNotFound { .. }
        )
    }

    /// errors an idempotent retry treats as "nothing left to do"
    pub fn is_benign_retry(&self) -> bool {
        matches!(self, LedgerError::AlreadyPaid { .. } | LedgerError::NotClosed { .. })
    }

    /// data-integrity faults that should abort the calling transaction
    pub fn is_integrity_fault(&self) -> bool {
        matches!(
            self,
            LedgerError::InvalidCardConfig { .. } | LedgerError::OrphanSlice { .. }
        )
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        LedgerError::InvalidConfiguration {
            message: e.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
