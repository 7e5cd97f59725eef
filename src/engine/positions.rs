//! Opening and closing positions.
//!
//! Every precondition is checked before the custody transfer, and the position
//! table is only touched after the transfer went through. A rejected call
//! therefore leaves the ledger and the token exactly as they were.

use super::core::Ledger;
use super::results::{log_rejection, CloseResult, LedgerError};
use crate::custody::CustodyGateway;
use crate::events::{EventPayload, PositionClosedEvent, PositionOpenedEvent};
use crate::margin::{check_position_size, settlement_payout};
use crate::position::{Position, PositionKey};
use crate::types::{Amount, ContractId, ExecutionContext, Side};

impl Ledger {
    /// Open a 2x position for the caller, pulling the required collateral
    /// into custody and snapshotting the current price as entry.
    pub fn open_position<G>(
        &mut self,
        ctx: &ExecutionContext,
        contract_id: ContractId,
        side: Side,
        size: Amount,
        token: &mut G,
    ) -> Result<Position, LedgerError>
    where
        G: CustodyGateway + ?Sized,
    {
        self.try_open_position(ctx, contract_id, side, size, token)
            .inspect_err(|err| log_rejection("open-position", ctx, err))
    }

    fn try_open_position<G>(
        &mut self,
        ctx: &ExecutionContext,
        contract_id: ContractId,
        side: Side,
        size: Amount,
        token: &mut G,
    ) -> Result<Position, LedgerError>
    where
        G: CustodyGateway + ?Sized,
    {
        self.check_token(token)?;
        let symbol = self
            .registry
            .require_tradable(contract_id, ctx.height)?
            .symbol
            .clone();
        let collateral = check_position_size(size, &self.config.margin)?;

        let available = token.balance_of(&ctx.caller);
        if available < collateral {
            return Err(LedgerError::InsufficientBalance {
                required: collateral,
                available,
            });
        }

        let key = PositionKey::new(ctx.caller.clone(), contract_id);
        if self.positions.contains_key(&key) {
            return Err(LedgerError::PositionExists(key));
        }
        let entry_price = self
            .prices
            .get(&symbol)
            .ok_or(LedgerError::PriceUnavailable(symbol))?;

        token.transfer(collateral, &ctx.caller, &self.config.custody_account)?;

        let position = Position::new(side, entry_price, collateral, size, ctx.height);
        self.positions.insert(key, position.clone());

        tracing::info!(user = %ctx.caller, contract = %contract_id, %side, size, collateral, "position opened");
        self.emit_event(
            ctx.height,
            EventPayload::PositionOpened(PositionOpenedEvent {
                user: ctx.caller.clone(),
                contract_id,
                side,
                size,
                entry_price,
                collateral,
            }),
        );

        Ok(position)
    }

    /// Close the caller's position at the current price. Pays out
    /// collateral plus pnl, and fails if the loss exceeds the collateral.
    pub fn close_position<G>(
        &mut self,
        ctx: &ExecutionContext,
        contract_id: ContractId,
        token: &mut G,
    ) -> Result<CloseResult, LedgerError>
    where
        G: CustodyGateway + ?Sized,
    {
        self.try_close_position(ctx, contract_id, token)
            .inspect_err(|err| log_rejection("close-position", ctx, err))
    }

    fn try_close_position<G>(
        &mut self,
        ctx: &ExecutionContext,
        contract_id: ContractId,
        token: &mut G,
    ) -> Result<CloseResult, LedgerError>
    where
        G: CustodyGateway + ?Sized,
    {
        self.check_token(token)?;
        let symbol = self.registry.require(contract_id)?.symbol.clone();
        let key = PositionKey::new(ctx.caller.clone(), contract_id);
        let position = self
            .positions
            .get(&key)
            .ok_or_else(|| LedgerError::PositionNotFound(key.clone()))?;
        let exit_price = self
            .prices
            .get(&symbol)
            .ok_or(LedgerError::PriceUnavailable(symbol))?;

        let pnl = position.unrealized_pnl(exit_price)?;
        let payout = settlement_payout(position.collateral_amount, pnl)?;

        // a total loss leaves nothing to send
        if payout > 0 {
            token.transfer(payout, &self.config.custody_account, &ctx.caller)?;
        }
        self.positions.remove(&key);

        tracing::info!(user = %ctx.caller, contract = %contract_id, pnl, payout, "position closed");
        self.emit_event(
            ctx.height,
            EventPayload::PositionClosed(PositionClosedEvent {
                user: ctx.caller.clone(),
                contract_id,
                exit_price,
                pnl,
                payout,
            }),
        );

        Ok(CloseResult {
            contract_id,
            exit_price,
            pnl,
            payout,
        })
    }
}
