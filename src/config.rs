use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::errors::{LedgerError, Result};
use crate::types::RemainderPolicy;

/// engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// accepted deviation of summed split percentages from 100, in points
    pub split_tolerance: Decimal,
    /// slice that absorbs the installment rounding remainder
    pub remainder_policy: RemainderPolicy,
    /// upper bound on installments per charge
    pub max_installments: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            split_tolerance: dec!(0.01),
            remainder_policy: RemainderPolicy::LastSlice,
            max_installments: 48,
        }
    }
}

impl EngineConfig {
    /// strict configuration: exact percentages, last slice absorbs remainder
    pub fn strict() -> Self {
        Self {
            split_tolerance: Decimal::ZERO,
            ..Self::default()
        }
    }

    /// parse and validate a json document; absent fields take defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.split_tolerance < Decimal::ZERO || self.split_tolerance >= Decimal::ONE {
            return Err(LedgerError::InvalidConfiguration {
                message: format!(
                    "split_tolerance must be in [0, 1), got {}",
                    self.split_tolerance
                ),
            });
        }

        if self.max_installments == 0 {
            return Err(LedgerError::InvalidConfiguration {
                message: "max_installments must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}
