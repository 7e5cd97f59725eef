//! Liquidation of underwater positions.
//!
//! Anyone may liquidate. The liquidator receives the position's entire
//! collateral as a flat reward; there is no partial liquidation and nothing
//! is returned to the position owner.

use super::core::Ledger;
use super::results::{log_rejection, LedgerError, LiquidationResult};
use crate::custody::CustodyGateway;
use crate::events::{EventPayload, PositionLiquidatedEvent};
use crate::margin::is_liquidatable;
use crate::position::PositionKey;
use crate::types::{ContractId, ExecutionContext, Principal};

impl Ledger {
    pub fn liquidate_position<G>(
        &mut self,
        ctx: &ExecutionContext,
        user: &Principal,
        contract_id: ContractId,
        token: &mut G,
    ) -> Result<LiquidationResult, LedgerError>
    where
        G: CustodyGateway + ?Sized,
    {
        self.try_liquidate_position(ctx, user, contract_id, token)
            .inspect_err(|err| log_rejection("liquidate-position", ctx, err))
    }

    fn try_liquidate_position<G>(
        &mut self,
        ctx: &ExecutionContext,
        user: &Principal,
        contract_id: ContractId,
        token: &mut G,
    ) -> Result<LiquidationResult, LedgerError>
    where
        G: CustodyGateway + ?Sized,
    {
        self.check_token(token)?;
        let key = PositionKey::new(user.clone(), contract_id);
        let position = self
            .positions
            .get(&key)
            .ok_or_else(|| LedgerError::PositionNotFound(key.clone()))?;
        let symbol = self.registry.require(contract_id)?.symbol.clone();
        let price = self
            .prices
            .get(&symbol)
            .ok_or(LedgerError::PriceUnavailable(symbol))?;

        let liquidation_price = position.liquidation_price()?;
        if !is_liquidatable(position.side, price, liquidation_price) {
            return Err(LedgerError::NotLiquidatable {
                price,
                liquidation_price,
            });
        }
        let reward = position.collateral_amount;

        token.transfer(reward, &self.config.custody_account, &ctx.caller)?;
        self.positions.remove(&key);

        tracing::info!(user = %user, contract = %contract_id, liquidator = %ctx.caller, %price, reward, "position liquidated");
        self.emit_event(
            ctx.height,
            EventPayload::PositionLiquidated(PositionLiquidatedEvent {
                user: user.clone(),
                contract_id,
                liquidator: ctx.caller.clone(),
                price,
                liquidation_price,
                reward,
            }),
        );

        Ok(LiquidationResult {
            position: key,
            price,
            liquidation_price,
            reward,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerConfig;
    use crate::custody::TokenLedger;
    use crate::engine::testkit::Fixture;
    use crate::engine::ErrorCode;
    use crate::margin::MarginParams;
    use crate::types::{Side, TokenId};

    #[test]
    fn short_liquidated_at_threshold() {
        let mut fx = Fixture::new();
        fx.open("alice", Side::Short, 1000).unwrap();

        fx.set_price(50_999);
        assert_eq!(
            fx.liquidate("bob", "alice").unwrap_err().code(),
            ErrorCode::Unliquidatable
        );

        fx.set_price(51_000);
        let result = fx.liquidate("bob", "alice").unwrap();
        assert_eq!(result.reward, 50_000);
        assert_eq!(result.liquidation_price, 51_000);
        assert_eq!(fx.balance("bob"), Fixture::STARTING_BALANCE + 50_000);
        // owner gets nothing back
        assert_eq!(fx.balance("alice"), Fixture::STARTING_BALANCE - 50_000);
        assert_eq!(fx.custody_balance(), Fixture::HOUSE_LIQUIDITY);
    }

    #[test]
    fn second_liquidation_is_not_found() {
        let mut fx = Fixture::new();
        fx.open("alice", Side::Short, 1000).unwrap();
        fx.set_price(60_000);
        fx.liquidate("bob", "alice").unwrap();
        assert_eq!(
            fx.liquidate("carol", "alice").unwrap_err().code(),
            ErrorCode::NotFound
        );
        // and closing is no longer possible either
        assert_eq!(fx.close("alice").unwrap_err().code(), ErrorCode::NotFound);
    }

    #[test]
    fn closed_position_cannot_be_liquidated() {
        let mut fx = Fixture::new();
        fx.open("alice", Side::Short, 1000).unwrap();
        fx.close("alice").unwrap();
        fx.set_price(60_000);
        assert_eq!(
            fx.liquidate("bob", "alice").unwrap_err().code(),
            ErrorCode::NotFound
        );
    }

    #[test]
    fn fully_collateralized_long_is_safe() {
        let mut fx = Fixture::new();
        fx.open("alice", Side::Long, 1000).unwrap();
        for price in [1, 2, 10, 999, 1000, 5000] {
            fx.set_price(price);
            assert_eq!(
                fx.liquidate("bob", "alice").unwrap_err().code(),
                ErrorCode::Unliquidatable
            );
        }
    }

    #[test]
    fn owner_may_liquidate_own_position() {
        let mut fx = Fixture::new();
        fx.open("alice", Side::Short, 1000).unwrap();
        fx.set_price(51_000);
        let result = fx.liquidate("alice", "alice").unwrap();
        assert_eq!(result.reward, 50_000);
        assert_eq!(fx.balance("alice"), Fixture::STARTING_BALANCE);
    }

    #[test]
    fn reward_failure_keeps_position() {
        let mut fx = Fixture::new();
        fx.open("alice", Side::Short, 1000).unwrap();
        fx.set_price(51_000);
        fx.token.freeze(&Principal::new("bob"));
        assert_eq!(
            fx.liquidate("bob", "alice").unwrap_err().code(),
            ErrorCode::CustodyFailure
        );
        assert!(fx.ledger.get_position(&Principal::new("alice"), fx.contract).is_some());
        fx.liquidate("carol", "alice").unwrap();
    }

    #[test]
    fn long_threshold_always_clamps_at_two_x() {
        // collateral is 50x size, so the buffer is 50x entry and a long's
        // liquidation price floors at zero for every size
        let config = LedgerConfig::default().with_margin(MarginParams {
            min_collateral: 1,
            max_position_size: 1_000_000,
        });
        let mut ledger = Ledger::new(Principal::new("owner"), config);
        let mut token = TokenLedger::new(TokenId::new("USDx"));
        token.mint(&Principal::new("alice"), 10_000_000).unwrap();

        let owner = ExecutionContext::at("owner", 1);
        let id = ledger.create_contract(&owner, "PET", 100).unwrap();
        ledger.set_oracle(&owner, Principal::new("oracle")).unwrap();
        ledger
            .update_price(&ExecutionContext::at("oracle", 1), "PET", 1_000_000)
            .unwrap();

        let alice = ExecutionContext::at("alice", 2);
        let position = ledger
            .open_position(&alice, id, Side::Long, 1, &mut token)
            .unwrap();
        assert_eq!(position.collateral_amount, 50);
        assert_eq!(ledger.calculate_liquidation_price(&alice.caller, id).unwrap(), 0);

        ledger
            .update_price(&ExecutionContext::at("oracle", 3), "PET", 1)
            .unwrap();
        let err = ledger
            .liquidate_position(&ExecutionContext::at("bob", 3), &alice.caller, id, &mut token)
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Unliquidatable);
    }
}
