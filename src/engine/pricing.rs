//! Price update operations.

use super::core::Ledger;
use super::results::{log_rejection, LedgerError};
use crate::events::{EventPayload, PriceUpdatedEvent};
use crate::types::{AssetSymbol, ExecutionContext, Price};

impl Ledger {
    /// Oracle-only overwrite of the latest price for `symbol`.
    pub fn update_price(
        &mut self,
        ctx: &ExecutionContext,
        symbol: &str,
        price: u128,
    ) -> Result<Price, LedgerError> {
        self.try_update_price(ctx, symbol, price)
            .inspect_err(|err| log_rejection("update-price", ctx, err))
    }

    fn try_update_price(
        &mut self,
        ctx: &ExecutionContext,
        symbol: &str,
        price: u128,
    ) -> Result<Price, LedgerError> {
        self.access.require_oracle(&ctx.caller)?;
        let price = Price::new(price).ok_or(LedgerError::InvalidPrice)?;
        let symbol =
            AssetSymbol::new(symbol).ok_or_else(|| LedgerError::InvalidSymbol(symbol.to_string()))?;

        let previous = self.prices.update(symbol.clone(), price);

        self.emit_event(
            ctx.height,
            EventPayload::PriceUpdated(PriceUpdatedEvent {
                symbol,
                price,
                previous,
            }),
        );

        Ok(price)
    }
}
