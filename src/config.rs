use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::Rate;
use crate::errors::{LedgerError, Result};
use crate::types::CarryOverPolicy;

/// ledger configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default)]
    pub carry_over: CarryOverPolicy,
    #[serde(default)]
    pub risk: RiskThresholds,
}

/// collection-rate thresholds, in percent, below which groups are flagged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    /// zones and villages
    pub low_group_collection_pct: Decimal,
    /// field workers
    pub low_worker_collection_pct: Decimal,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            low_group_collection_pct: dec!(50),
            low_worker_collection_pct: dec!(60),
        }
    }
}

impl RiskThresholds {
    pub fn group_threshold(&self) -> Rate {
        Rate::from_decimal(self.low_group_collection_pct / dec!(100))
    }

    pub fn worker_threshold(&self) -> Rate {
        Rate::from_decimal(self.low_worker_collection_pct / dec!(100))
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl LedgerConfig {
    /// carry-over resolved from the ledger, default risk thresholds
    pub fn standard() -> Self {
        Self {
            carry_over: CarryOverPolicy::Recompute,
            risk: RiskThresholds::default(),
        }
    }

    /// carry-over read from stored remainders, as older screens did
    pub fn legacy() -> Self {
        Self {
            carry_over: CarryOverPolicy::StoredRemaining,
            risk: RiskThresholds::default(),
        }
    }

    pub fn with_carry_over(mut self, policy: CarryOverPolicy) -> Self {
        self.carry_over = policy;
        self
    }

    pub fn with_risk(mut self, risk: RiskThresholds) -> Self {
        self.risk = risk;
        self
    }

    /// parse and validate a json configuration
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: LedgerConfig = serde_json::from_str(raw).map_err(|e| {
            LedgerError::InvalidConfiguration {
                message: e.to_string(),
            }
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let in_range = |pct: Decimal| pct >= Decimal::ZERO && pct <= dec!(100);

        if !in_range(self.risk.low_group_collection_pct) {
            return Err(LedgerError::InvalidConfiguration {
                message: format!(
                    "low_group_collection_pct must be within 0..=100, got {}",
                    self.risk.low_group_collection_pct
                ),
            });
        }
        if !in_range(self.risk.low_worker_collection_pct) {
            return Err(LedgerError::InvalidConfiguration {
                message: format!(
                    "low_worker_collection_pct must be within 0..=100, got {}",
                    self.risk.low_worker_collection_pct
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(LedgerConfig::standard().carry_over, CarryOverPolicy::Recompute);
        assert_eq!(LedgerConfig::legacy().carry_over, CarryOverPolicy::StoredRemaining);
        assert_eq!(LedgerConfig::default(), LedgerConfig::standard());
    }

    #[test]
    fn test_from_json_with_defaults() {
        let config = LedgerConfig::from_json(r#"{"carry_over": "stored_remaining"}"#).unwrap();
        assert_eq!(config.carry_over, CarryOverPolicy::StoredRemaining);
        assert_eq!(config.risk, RiskThresholds::default());

        let empty = LedgerConfig::from_json("{}").unwrap();
        assert_eq!(empty, LedgerConfig::standard());
    }

    #[test]
    fn test_from_json_rejects_out_of_range_threshold() {
        let raw = r#"{"risk": {"low_group_collection_pct": "150", "low_worker_collection_pct": "60"}}"#;
        let err = LedgerConfig::from_json(raw).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_from_json_rejects_unknown_policy() {
        assert!(LedgerConfig::from_json(r#"{"carry_over": "guess"}"#).is_err());
    }

    #[test]
    fn test_thresholds_as_rates() {
        let risk = RiskThresholds::default();
        assert_eq!(risk.group_threshold().as_percentage(), dec!(50));
        assert_eq!(risk.worker_threshold().as_percentage(), dec!(60));
    }
}
