//! Owner-gated setters and contract administration.

use super::core::Ledger;
use super::results::{log_rejection, LedgerError};
use crate::events::{
    CollateralTokenSetEvent, ContractCreatedEvent, ContractDeactivatedEvent, EventPayload,
    OracleSetEvent,
};
use crate::types::{AssetSymbol, ContractId, ExecutionContext, Principal, TokenId};

impl Ledger {
    /// Replace the oracle. No history is kept.
    pub fn set_oracle(&mut self, ctx: &ExecutionContext, oracle: Principal) -> Result<(), LedgerError> {
        self.access
            .set_oracle(&ctx.caller, oracle.clone())
            .map_err(LedgerError::from)
            .inspect_err(|err| log_rejection("set-oracle", ctx, err))?;

        self.emit_event(ctx.height, EventPayload::OracleSet(OracleSetEvent { oracle }));
        Ok(())
    }

    pub fn set_collateral_token(
        &mut self,
        ctx: &ExecutionContext,
        token: TokenId,
    ) -> Result<(), LedgerError> {
        self.access
            .require_owner(&ctx.caller)
            .map_err(LedgerError::from)
            .inspect_err(|err| log_rejection("set-collateral-token", ctx, err))?;

        self.collateral_token = Some(token.clone());
        self.emit_event(
            ctx.height,
            EventPayload::CollateralTokenSet(CollateralTokenSetEvent { token }),
        );
        Ok(())
    }

    /// Register a contract expiring `expiry_in_blocks` after the current height.
    pub fn create_contract(
        &mut self,
        ctx: &ExecutionContext,
        symbol: &str,
        expiry_in_blocks: u64,
    ) -> Result<ContractId, LedgerError> {
        self.try_create_contract(ctx, symbol, expiry_in_blocks)
            .inspect_err(|err| log_rejection("create-contract", ctx, err))
    }

    fn try_create_contract(
        &mut self,
        ctx: &ExecutionContext,
        symbol: &str,
        expiry_in_blocks: u64,
    ) -> Result<ContractId, LedgerError> {
        self.access.require_owner(&ctx.caller)?;
        let symbol =
            AssetSymbol::new(symbol).ok_or_else(|| LedgerError::InvalidSymbol(symbol.to_string()))?;

        let contract = self.registry.create(symbol, expiry_in_blocks, ctx.height)?;
        let event = ContractCreatedEvent {
            contract_id: contract.id,
            symbol: contract.symbol.clone(),
            expiry_height: contract.expiry_height,
        };
        let id = contract.id;

        tracing::info!(contract = %id, symbol = %event.symbol, expiry = event.expiry_height.0, "contract created");
        self.emit_event(ctx.height, EventPayload::ContractCreated(event));
        Ok(id)
    }

    pub fn deactivate_contract(
        &mut self,
        ctx: &ExecutionContext,
        contract_id: ContractId,
    ) -> Result<(), LedgerError> {
        self.try_deactivate_contract(ctx, contract_id)
            .inspect_err(|err| log_rejection("deactivate-contract", ctx, err))
    }

    fn try_deactivate_contract(
        &mut self,
        ctx: &ExecutionContext,
        contract_id: ContractId,
    ) -> Result<(), LedgerError> {
        self.access.require_owner(&ctx.caller)?;
        self.registry.deactivate(contract_id)?;

        self.emit_event(
            ctx.height,
            EventPayload::ContractDeactivated(ContractDeactivatedEvent { contract_id }),
        );
        Ok(())
    }
}
