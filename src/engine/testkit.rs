// shared setup for engine unit tests: one PET contract priced at 1000,
// funded traders and a custody account seeded with house liquidity.

use super::core::Ledger;
use super::results::{CloseResult, LedgerError, LiquidationResult};
use crate::config::LedgerConfig;
use crate::custody::{CustodyGateway, TokenLedger};
use crate::position::Position;
use crate::types::{Amount, ContractId, ExecutionContext, Principal, Side, TokenId};

pub(crate) struct Fixture {
    pub ledger: Ledger,
    pub token: TokenLedger,
    pub contract: ContractId,
    pub height: u64,
}

impl Fixture {
    pub const STARTING_BALANCE: Amount = 1_000_000;
    pub const HOUSE_LIQUIDITY: Amount = 1_000_000;
    pub const EXPIRY_HEIGHT: u64 = 1_001;

    pub fn new() -> Self {
        let config = LedgerConfig::default();
        let custody = config.custody_account.clone();
        let mut ledger = Ledger::new(Principal::new("owner"), config);
        let mut token = TokenLedger::new(TokenId::new("USDx"));

        let owner = ExecutionContext::at("owner", 1);
        let contract = ledger.create_contract(&owner, "PET", 1000).unwrap();
        ledger.set_oracle(&owner, Principal::new("oracle")).unwrap();
        ledger
            .update_price(&ExecutionContext::at("oracle", 1), "PET", 1000)
            .unwrap();

        for trader in ["alice", "bob", "carol"] {
            token
                .mint(&Principal::new(trader), Self::STARTING_BALANCE)
                .unwrap();
        }
        token.mint(&custody, Self::HOUSE_LIQUIDITY).unwrap();

        Self {
            ledger,
            token,
            contract,
            height: 10,
        }
    }

    pub fn ctx(&self, caller: &str) -> ExecutionContext {
        ExecutionContext::at(caller, self.height)
    }

    pub fn set_price(&mut self, price: u128) {
        let ctx = self.ctx("oracle");
        self.ledger.update_price(&ctx, "PET", price).unwrap();
    }

    pub fn open(&mut self, user: &str, side: Side, size: Amount) -> Result<Position, LedgerError> {
        let ctx = self.ctx(user);
        self.ledger
            .open_position(&ctx, self.contract, side, size, &mut self.token)
    }

    pub fn close(&mut self, user: &str) -> Result<CloseResult, LedgerError> {
        let ctx = self.ctx(user);
        self.ledger
            .close_position(&ctx, self.contract, &mut self.token)
    }

    pub fn liquidate(&mut self, liquidator: &str, target: &str) -> Result<LiquidationResult, LedgerError> {
        let ctx = self.ctx(liquidator);
        self.ledger.liquidate_position(
            &ctx,
            &Principal::new(target),
            self.contract,
            &mut self.token,
        )
    }

    pub fn balance(&self, user: &str) -> Amount {
        self.token.balance_of(&Principal::new(user))
    }

    pub fn custody_balance(&self) -> Amount {
        self.token.balance_of(self.ledger.custody_account())
    }
}
