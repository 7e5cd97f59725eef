// 4.0: open position record. created by open, never mutated, removed by
// close or liquidate. pnl and liquidation math delegate to margin.rs.

use crate::margin::{
    calculate_liquidation_price, calculate_pnl, collateral_health, is_liquidatable, MarginError,
};
use crate::types::{Amount, BlockHeight, ContractId, Price, Principal, Side, SignedAmount};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Composite key of the position table. One record per user per contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionKey {
    pub user: Principal,
    pub contract_id: ContractId,
}

impl PositionKey {
    pub fn new(user: Principal, contract_id: ContractId) -> Self {
        Self { user, contract_id }
    }
}

impl fmt::Display for PositionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.user, self.contract_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub side: Side,
    pub entry_price: Price,
    pub collateral_amount: Amount,
    pub size: Amount,
    pub opened_at: BlockHeight,
}

impl Position {
    pub fn new(
        side: Side,
        entry_price: Price,
        collateral_amount: Amount,
        size: Amount,
        opened_at: BlockHeight,
    ) -> Self {
        Self {
            side,
            entry_price,
            collateral_amount,
            size,
            opened_at,
        }
    }

    // 4.1: paper gain or loss at the given price
    pub fn unrealized_pnl(&self, current_price: Price) -> Result<SignedAmount, MarginError> {
        calculate_pnl(self.side, self.entry_price, current_price, self.size)
    }

    pub fn liquidation_price(&self) -> Result<Amount, MarginError> {
        calculate_liquidation_price(self.side, self.entry_price, self.collateral_amount, self.size)
    }

    pub fn is_liquidatable(&self, current_price: Price) -> Result<bool, MarginError> {
        Ok(is_liquidatable(self.side, current_price, self.liquidation_price()?))
    }

    pub fn health(&self, current_price: Price) -> Result<Option<Decimal>, MarginError> {
        let pnl = self.unrealized_pnl(current_price)?;
        Ok(collateral_health(self.collateral_amount, pnl))
    }
}
