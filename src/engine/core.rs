// 8.0 engine/core.rs: the ledger. holds roles, registry, price table,
// position table and the event log. all state lives here.

use super::results::LedgerError;
use crate::access::AccessControl;
use crate::config::LedgerConfig;
use crate::custody::CustodyGateway;
use crate::events::{Event, EventLog, EventPayload};
use crate::position::{Position, PositionKey};
use crate::price_feed::PriceFeed;
use crate::registry::ContractRegistry;
use crate::types::{BlockHeight, Principal, TokenId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/** 8.1: main ledger struct. serializes to the persisted layout */
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    pub(super) config: LedgerConfig,
    pub(super) access: AccessControl,
    pub(super) collateral_token: Option<TokenId>,
    pub(super) registry: ContractRegistry,
    pub(super) prices: PriceFeed,
    #[serde(with = "position_table")]
    pub(super) positions: HashMap<PositionKey, Position>,
    pub(super) events: EventLog,
}

impl Ledger {
    pub fn new(owner: Principal, config: LedgerConfig) -> Self {
        let events = EventLog::new(config.max_events);
        Self {
            config,
            access: AccessControl::new(owner),
            collateral_token: None,
            registry: ContractRegistry::new(),
            prices: PriceFeed::new(),
            positions: HashMap::new(),
            events,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn custody_account(&self) -> &Principal {
        &self.config.custody_account
    }

    pub fn events(&self) -> &[Event] {
        self.events.events()
    }

    pub fn recent_events(&self, count: usize) -> &[Event] {
        self.events.recent(count)
    }

    // every table but the event log, which rolls back by checkpoint instead
    pub(super) fn clone_without_events(&self) -> Ledger {
        Ledger {
            config: self.config.clone(),
            access: self.access.clone(),
            collateral_token: self.collateral_token.clone(),
            registry: self.registry.clone(),
            prices: self.prices.clone(),
            positions: self.positions.clone(),
            events: EventLog::new(self.config.max_events),
        }
    }

    pub(super) fn emit_event(&mut self, height: BlockHeight, payload: EventPayload) {
        self.events.record(height, payload);
    }

    // once a collateral token is configured, only that token is accepted
    pub(super) fn check_token<G>(&self, token: &G) -> Result<(), LedgerError>
    where
        G: CustodyGateway + ?Sized,
    {
        match &self.collateral_token {
            Some(expected) if expected != token.token_id() => Err(LedgerError::TokenMismatch {
                expected: expected.clone(),
                supplied: token.token_id().clone(),
            }),
            _ => Ok(()),
        }
    }
}

// the position table has a struct key, which json maps cannot hold, so it
// persists as a list of entries
mod position_table {
    use crate::position::{Position, PositionKey};
    use serde::{Deserialize, Deserializer, Serializer};
    use std::collections::HashMap;

    pub fn serialize<S>(table: &HashMap<PositionKey, Position>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut entries: Vec<(&PositionKey, &Position)> = table.iter().collect();
        entries.sort_by(|a, b| (&a.0.user, a.0.contract_id).cmp(&(&b.0.user, b.0.contract_id)));
        serializer.collect_seq(entries)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<HashMap<PositionKey, Position>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries = Vec::<(PositionKey, Position)>::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}
