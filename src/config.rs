// 7.0 config.rs: all ledger settings in one place. margin bounds, custody
// account, event retention. every field has a default so partial json works.

use serde::{Deserialize, Serialize};

use crate::margin::MarginParams;
use crate::types::Principal;

pub const DEFAULT_CUSTODY_ACCOUNT: &str = "futures-ledger";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    // Position size and collateral bounds
    pub margin: MarginParams,
    // Principal that holds escrowed collateral in the token
    pub custody_account: Principal,
    // Maximum number of events to retain in memory
    pub max_events: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            margin: MarginParams::default(),
            custody_account: Principal::new(DEFAULT_CUSTODY_ACCOUNT),
            max_events: 100_000,
        }
    }
}

impl LedgerConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn with_margin(mut self, margin: MarginParams) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_max_events(mut self, max_events: usize) -> Self {
        self.max_events = max_events;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::margin::{MAX_POSITION_SIZE, MIN_COLLATERAL};

    #[test]
    fn defaults() {
        let config = LedgerConfig::default();
        assert_eq!(config.margin.min_collateral, MIN_COLLATERAL);
        assert_eq!(config.margin.max_position_size, MAX_POSITION_SIZE);
        assert_eq!(config.custody_account, Principal::new(DEFAULT_CUSTODY_ACCOUNT));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = LedgerConfig::from_json(r#"{ "max_events": 16 }"#).unwrap();
        assert_eq!(config.max_events, 16);
        assert_eq!(config.margin, MarginParams::default());
    }

    #[test]
    fn json_round_trip() {
        let config = LedgerConfig::default().with_margin(MarginParams {
            min_collateral: 10,
            max_position_size: 500,
        });
        let parsed = LedgerConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(LedgerConfig::from_json("{ max_events: }").is_err());
    }
}
