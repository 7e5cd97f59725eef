//! Read-only queries. Nothing here mutates state or emits events.

use super::core::Ledger;
use super::results::LedgerError;
use crate::margin::{calculate_liquidation_price, calculate_pnl, required_collateral};
use crate::position::{Position, PositionKey};
use crate::registry::FuturesContract;
use crate::types::{Amount, AssetSymbol, ContractId, Price, Principal, Side, SignedAmount, TokenId};
use rust_decimal::Decimal;

impl Ledger {
    pub fn get_contract(&self, contract_id: ContractId) -> Option<&FuturesContract> {
        self.registry.get(contract_id)
    }

    pub fn get_position(&self, user: &Principal, contract_id: ContractId) -> Option<&Position> {
        self.positions
            .get(&PositionKey::new(user.clone(), contract_id))
    }

    pub fn get_price(&self, symbol: &AssetSymbol) -> Option<Price> {
        self.prices.get(symbol)
    }

    pub fn get_owner(&self) -> &Principal {
        self.access.owner()
    }

    pub fn get_oracle(&self) -> Option<&Principal> {
        self.access.oracle()
    }

    pub fn get_collateral_token(&self) -> Option<&TokenId> {
        self.collateral_token.as_ref()
    }

    pub fn get_last_contract_id(&self) -> ContractId {
        self.registry.last_id()
    }

    pub fn calculate_liquidation_price(
        &self,
        user: &Principal,
        contract_id: ContractId,
    ) -> Result<Amount, LedgerError> {
        Ok(self.require_position(user, contract_id)?.liquidation_price()?)
    }

    /// Unrealized pnl of a position at the current price.
    pub fn get_position_pnl(
        &self,
        user: &Principal,
        contract_id: ContractId,
    ) -> Result<SignedAmount, LedgerError> {
        let position = self.require_position(user, contract_id)?;
        let price = self.current_price(contract_id)?;
        Ok(position.unrealized_pnl(price)?)
    }

    // equity over collateral at the current price, informational
    pub fn get_position_health(
        &self,
        user: &Principal,
        contract_id: ContractId,
    ) -> Result<Option<Decimal>, LedgerError> {
        let position = self.require_position(user, contract_id)?;
        let price = self.current_price(contract_id)?;
        Ok(position.health(price)?)
    }

    pub fn quote_required_collateral(&self, size: Amount) -> Result<Amount, LedgerError> {
        Ok(required_collateral(size)?)
    }

    pub fn quote_pnl(
        &self,
        side: Side,
        entry_price: Price,
        current_price: Price,
        size: Amount,
    ) -> Result<SignedAmount, LedgerError> {
        Ok(calculate_pnl(side, entry_price, current_price, size)?)
    }

    pub fn quote_liquidation_price(
        &self,
        side: Side,
        entry_price: Price,
        collateral: Amount,
        size: Amount,
    ) -> Result<Amount, LedgerError> {
        Ok(calculate_liquidation_price(side, entry_price, collateral, size)?)
    }

    /// Open positions of `user`, ordered by contract id.
    pub fn positions_for(&self, user: &Principal) -> Vec<(ContractId, &Position)> {
        let mut positions: Vec<(ContractId, &Position)> = self
            .positions
            .iter()
            .filter(|(key, _)| key.user == *user)
            .map(|(key, position)| (key.contract_id, position))
            .collect();
        positions.sort_by_key(|(id, _)| *id);
        positions
    }

    pub fn open_position_count(&self) -> usize {
        self.positions.len()
    }

    /// Sum of `collateral_amount` over open positions: what custody owes back
    /// before pnl.
    pub fn total_collateral_locked(&self) -> Amount {
        self.positions
            .values()
            .fold(0, |total: Amount, p| total.saturating_add(p.collateral_amount))
    }

    fn require_position(
        &self,
        user: &Principal,
        contract_id: ContractId,
    ) -> Result<&Position, LedgerError> {
        let key = PositionKey::new(user.clone(), contract_id);
        self.positions
            .get(&key)
            .ok_or(LedgerError::PositionNotFound(key))
    }

    fn current_price(&self, contract_id: ContractId) -> Result<Price, LedgerError> {
        let symbol = &self.registry.require(contract_id)?.symbol;
        self.prices
            .get(symbol)
            .ok_or_else(|| LedgerError::PriceUnavailable(symbol.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testkit::Fixture;
    use crate::engine::ErrorCode;
    use rust_decimal_macros::dec;

    fn alice() -> Principal {
        Principal::new("alice")
    }

    #[test]
    fn position_queries_need_a_position() {
        let fx = Fixture::new();
        assert_eq!(
            fx.ledger
                .calculate_liquidation_price(&alice(), fx.contract)
                .unwrap_err()
                .code(),
            ErrorCode::NotFound
        );
        assert_eq!(
            fx.ledger.get_position_pnl(&alice(), fx.contract).unwrap_err().code(),
            ErrorCode::NotFound
        );
    }

    #[test]
    fn pnl_and_health_follow_price() {
        let mut fx = Fixture::new();
        fx.open("alice", Side::Short, 1000).unwrap();
        assert_eq!(fx.ledger.get_position_pnl(&alice(), fx.contract).unwrap(), 0);
        assert_eq!(
            fx.ledger.get_position_health(&alice(), fx.contract).unwrap(),
            Some(dec!(1))
        );

        fx.set_price(26_000);
        assert_eq!(fx.ledger.get_position_pnl(&alice(), fx.contract).unwrap(), -25_000);
        assert_eq!(
            fx.ledger.get_position_health(&alice(), fx.contract).unwrap(),
            Some(dec!(0.5))
        );
        assert_eq!(
            fx.ledger.calculate_liquidation_price(&alice(), fx.contract).unwrap(),
            51_000
        );
    }

    #[test]
    fn pure_quotes_match_margin_math() {
        let fx = Fixture::new();
        let entry = Price::new(1000).unwrap();
        assert_eq!(fx.ledger.quote_required_collateral(1000).unwrap(), 50_000);
        assert_eq!(
            fx.ledger
                .quote_pnl(Side::Long, entry, Price::new(1100).unwrap(), 1000)
                .unwrap(),
            100
        );
        assert_eq!(
            fx.ledger
                .quote_liquidation_price(Side::Long, entry, 50_000, 1000)
                .unwrap(),
            0
        );
        assert_eq!(
            fx.ledger
                .quote_liquidation_price(Side::Long, entry, 1, 0)
                .unwrap_err()
                .code(),
            ErrorCode::InvalidInput
        );
    }

    #[test]
    fn positions_listed_per_user() {
        let mut fx = Fixture::new();
        let ctx = fx.ctx("owner");
        let second = fx.ledger.create_contract(&ctx, "PET", 500).unwrap();

        fx.open("alice", Side::Long, 1000).unwrap();
        fx.open("bob", Side::Short, 40).unwrap();
        let ctx = fx.ctx("alice");
        fx.ledger
            .open_position(&ctx, second, Side::Short, 20, &mut fx.token)
            .unwrap();

        let listed = fx.ledger.positions_for(&alice());
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].0, fx.contract);
        assert_eq!(listed[1].0, second);
        assert_eq!(fx.ledger.open_position_count(), 3);
        assert_eq!(fx.ledger.total_collateral_locked(), 50_000 + 2_000 + 1_000);
    }

    #[test]
    fn scalar_state() {
        let fx = Fixture::new();
        assert_eq!(fx.ledger.get_owner(), &Principal::new("owner"));
        assert_eq!(fx.ledger.get_oracle(), Some(&Principal::new("oracle")));
        assert_eq!(fx.ledger.get_collateral_token(), None);
        assert_eq!(fx.ledger.get_last_contract_id(), ContractId(1));
        assert_eq!(
            fx.ledger.get_price(&AssetSymbol::new("PET").unwrap()),
            Price::new(1000)
        );
    }
}
