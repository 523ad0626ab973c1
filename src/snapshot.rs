use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::card::Card;
use crate::charge::Charge;
use crate::errors::Result;
use crate::invoice::PaymentRecord;
use crate::types::CardId;

/// persisted view of one card account: the card, its charges and payments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSnapshot {
    pub snapshot_id: Uuid,
    pub card: Card,
    pub charges: Vec<Charge>,
    #[serde(default)]
    pub payments: Vec<PaymentRecord>,
    pub captured_at: DateTime<Utc>,
}

impl CardSnapshot {
    pub fn capture(
        card: &Card,
        charges: &[Charge],
        payments: &[PaymentRecord],
        captured_at: DateTime<Utc>,
    ) -> Self {
        Self {
            snapshot_id: Uuid::new_v4(),
            card: card.clone(),
            charges: charges.to_vec(),
            payments: payments.to_vec(),
            captured_at,
        }
    }

    pub fn card_id(&self) -> CardId {
        self.card.id
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// load and integrity-check a stored snapshot
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Self = serde_json::from_str(json)?;
        snapshot.card.validate()?;
        for charge in &snapshot.charges {
            charge.check_integrity()?;
        }
        Ok(snapshot)
    }
}
