//! Serialized, all-or-nothing execution over ledger and token together.
//!
//! One mutex guards the whole state: registry, price table, positions and the
//! custody token. `transact` snapshots that state, runs the operation, and
//! puts the snapshot back if the operation fails, so a caller never observes
//! a half-applied call.

use super::core::Ledger;
use super::results::{CloseResult, LedgerError, LiquidationResult};
use crate::custody::CustodyGateway;
use crate::position::Position;
use crate::types::{Amount, ContractId, ExecutionContext, Price, Principal, Side, TokenId};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone)]
pub struct HostState<G> {
    pub ledger: Ledger,
    pub token: G,
}

#[derive(Debug)]
pub struct Host<G> {
    state: Mutex<HostState<G>>,
}

impl<G> Host<G>
where
    G: CustodyGateway + Clone,
{
    pub fn new(ledger: Ledger, token: G) -> Self {
        Self {
            state: Mutex::new(HostState { ledger, token }),
        }
    }

    pub fn into_inner(self) -> HostState<G> {
        self.state.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    // poisoning is ignored. ledger operations return errors rather than panic
    fn lock(&self) -> MutexGuard<'_, HostState<G>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `operation` under the lock. Tables and token are snapshotted by
    /// clone, so each call costs a copy of them; the event log is only
    /// checkpointed and truncated back on error.
    pub fn transact<T, F>(&self, operation: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut Ledger, &mut G) -> Result<T, LedgerError>,
    {
        let mut state = self.lock();
        let mut ledger_snapshot = state.ledger.clone_without_events();
        let token_snapshot = state.token.clone();
        let checkpoint = state.ledger.events.checkpoint();
        let HostState { ledger, token } = &mut *state;

        match operation(ledger, token) {
            Ok(value) => Ok(value),
            Err(err) => {
                std::mem::swap(&mut ledger_snapshot.events, &mut state.ledger.events);
                ledger_snapshot.events.rollback(checkpoint);
                state.ledger = ledger_snapshot;
                state.token = token_snapshot;
                Err(err)
            }
        }
    }

    pub fn read<T, F>(&self, query: F) -> T
    where
        F: FnOnce(&Ledger, &G) -> T,
    {
        let state = self.lock();
        query(&state.ledger, &state.token)
    }

    pub fn set_oracle(&self, ctx: &ExecutionContext, oracle: Principal) -> Result<(), LedgerError> {
        self.transact(|ledger, _| ledger.set_oracle(ctx, oracle))
    }

    pub fn set_collateral_token(&self, ctx: &ExecutionContext, token: TokenId) -> Result<(), LedgerError> {
        self.transact(|ledger, _| ledger.set_collateral_token(ctx, token))
    }

    pub fn create_contract(
        &self,
        ctx: &ExecutionContext,
        symbol: &str,
        expiry_in_blocks: u64,
    ) -> Result<ContractId, LedgerError> {
        self.transact(|ledger, _| ledger.create_contract(ctx, symbol, expiry_in_blocks))
    }

    pub fn deactivate_contract(&self, ctx: &ExecutionContext, contract_id: ContractId) -> Result<(), LedgerError> {
        self.transact(|ledger, _| ledger.deactivate_contract(ctx, contract_id))
    }

    pub fn update_price(&self, ctx: &ExecutionContext, symbol: &str, price: u128) -> Result<Price, LedgerError> {
        self.transact(|ledger, _| ledger.update_price(ctx, symbol, price))
    }

    pub fn open_position(
        &self,
        ctx: &ExecutionContext,
        contract_id: ContractId,
        side: Side,
        size: Amount,
    ) -> Result<Position, LedgerError> {
        self.transact(|ledger, token| ledger.open_position(ctx, contract_id, side, size, token))
    }

    pub fn close_position(&self, ctx: &ExecutionContext, contract_id: ContractId) -> Result<CloseResult, LedgerError> {
        self.transact(|ledger, token| ledger.close_position(ctx, contract_id, token))
    }

    pub fn liquidate_position(
        &self,
        ctx: &ExecutionContext,
        user: &Principal,
        contract_id: ContractId,
    ) -> Result<LiquidationResult, LedgerError> {
        self.transact(|ledger, token| ledger.liquidate_position(ctx, user, contract_id, token))
    }
}
