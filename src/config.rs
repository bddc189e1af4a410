use serde::{Deserialize, Serialize};

use crate::decimal::Rate;
use crate::errors::{LedgerError, Result};
use crate::interest::PenaltyConfig;
use crate::status::{DueStatusClassifier, DEFAULT_UPCOMING_WINDOW_DAYS};

/// ledger configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub penalty: PenaltyConfig,
    /// days ahead of the due date an installment counts as upcoming
    pub upcoming_window_days: u32,
}

impl LedgerConfig {
    /// parse from json; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: LedgerConfig = serde_json::from_str(json).map_err(|e| LedgerError::InvalidConfiguration {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_default_penalty_rate(mut self, rate: Rate) -> Self {
        self.penalty.default_penalty_rate = rate;
        self
    }

    pub fn with_upcoming_window_days(mut self, days: u32) -> Self {
        self.upcoming_window_days = days;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.penalty.validate()
    }

    pub fn classifier(&self) -> DueStatusClassifier {
        DueStatusClassifier::with_window_days(self.upcoming_window_days)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            penalty: PenaltyConfig::default(),
            upcoming_window_days: DEFAULT_UPCOMING_WINDOW_DAYS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let config = LedgerConfig::default();
        assert_eq!(config.penalty.default_penalty_rate, Rate::from_percentage(2));
        assert_eq!(config.upcoming_window_days, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_round_trip() {
        let config = LedgerConfig::default()
            .with_default_penalty_rate(Rate::from_percentage_decimal(dec!(2.5)))
            .with_upcoming_window_days(2);

        let json = config.to_json_pretty().unwrap();
        assert_eq!(LedgerConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = LedgerConfig::from_json(r#"{ "upcoming_window_days": 5 }"#).unwrap();
        assert_eq!(config.upcoming_window_days, 5);
        assert_eq!(config.penalty, PenaltyConfig::default());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = LedgerConfig::from_json(r#"{ "penalty": { "default_penalty_rate": "0" } }"#).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidConfiguration { .. }));

        assert!(LedgerConfig::from_json("not json").is_err());
    }
}
