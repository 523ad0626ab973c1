use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cycle::CycleCalculator;
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::types::CardId;

/// credit card configuration record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    #[serde(default)]
    pub name: String,
    pub credit_limit: Money,
    /// day of month the statement closes (1..=31, clamped in short months)
    pub closing_day: u32,
    /// day of month the statement is due (1..=31, clamped in short months)
    pub billing_day: u32,
}

impl Card {
    pub fn new(credit_limit: Money, closing_day: u32, billing_day: u32) -> Result<Self> {
        Self::with_id(Uuid::new_v4(), credit_limit, closing_day, billing_day)
    }

    pub fn with_id(id: CardId, credit_limit: Money, closing_day: u32, billing_day: u32) -> Result<Self> {
        let card = Self {
            id,
            name: String::new(),
            credit_limit,
            closing_day,
            billing_day,
        };
        card.validate()?;
        Ok(card)
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        CycleCalculator::new(self.closing_day, self.billing_day)?;
        if self.credit_limit.is_negative() {
            return Err(LedgerError::InvalidConfiguration {
                message: format!("credit limit cannot be negative: {}", self.credit_limit),
            });
        }
        Ok(())
    }

    /// cycle calculator for this card's closing and billing days
    pub fn calculator(&self) -> Result<CycleCalculator> {
        CycleCalculator::new(self.closing_day, self.billing_day)
    }
}
