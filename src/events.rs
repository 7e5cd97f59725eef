// 11.0: every committed state change produces an event. this is the change log
// a host attaches to mutations. rolled back operations never reach it.

use crate::types::{
    Amount, AssetSymbol, BlockHeight, ContractId, Price, Principal, Side, SignedAmount, TokenId,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub height: BlockHeight,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(id: EventId, height: BlockHeight, payload: EventPayload) -> Self {
        Self {
            id,
            height,
            payload,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventPayload {
    // Admin events
    OracleSet(OracleSetEvent),
    CollateralTokenSet(CollateralTokenSetEvent),
    ContractCreated(ContractCreatedEvent),
    ContractDeactivated(ContractDeactivatedEvent),

    // Price events
    PriceUpdated(PriceUpdatedEvent),

    // Position events
    PositionOpened(PositionOpenedEvent),
    PositionClosed(PositionClosedEvent),
    PositionLiquidated(PositionLiquidatedEvent),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleSetEvent {
    pub oracle: Principal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralTokenSetEvent {
    pub token: TokenId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractCreatedEvent {
    pub contract_id: ContractId,
    pub symbol: AssetSymbol,
    pub expiry_height: BlockHeight,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractDeactivatedEvent {
    pub contract_id: ContractId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceUpdatedEvent {
    pub symbol: AssetSymbol,
    pub price: Price,
    pub previous: Option<Price>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionOpenedEvent {
    pub user: Principal,
    pub contract_id: ContractId,
    pub side: Side,
    pub size: Amount,
    pub entry_price: Price,
    pub collateral: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionClosedEvent {
    pub user: Principal,
    pub contract_id: ContractId,
    pub exit_price: Price,
    pub pnl: SignedAmount,
    pub payout: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionLiquidatedEvent {
    pub user: Principal,
    pub contract_id: ContractId,
    pub liquidator: Principal,
    pub price: Price,
    pub liquidation_price: Amount,
    pub reward: Amount,
}

/// Position in the log to roll back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventCheckpoint {
    next_id: u64,
}

/// Bounded in-memory change log. Oldest entries are dropped past `capacity`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<Event>,
    next_id: u64,
    capacity: usize,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: Vec::new(),
            next_id: 1,
            capacity,
        }
    }

    pub fn record(&mut self, height: BlockHeight, payload: EventPayload) -> EventId {
        let id = EventId(self.next_id);
        self.next_id += 1;
        tracing::debug!(event_id = id.0, height = height.0, ?payload, "ledger event");

        self.events.push(Event::new(id, height, payload));
        if self.events.len() > self.capacity {
            let drain_count = self.events.len() - self.capacity;
            self.events.drain(0..drain_count);
        }
        id
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn recent(&self, count: usize) -> &[Event] {
        let start = self.events.len().saturating_sub(count);
        &self.events[start..]
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn checkpoint(&self) -> EventCheckpoint {
        EventCheckpoint {
            next_id: self.next_id,
        }
    }

    /// Drops every event recorded since `checkpoint` and reuses their ids.
    /// Entries already drained past capacity stay dropped.
    pub fn rollback(&mut self, checkpoint: EventCheckpoint) {
        let keep = self
            .events
            .partition_point(|event| event.id.0 < checkpoint.next_id);
        self.events.truncate(keep);
        self.next_id = checkpoint.next_id;
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
