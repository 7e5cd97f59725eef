// 9.2 custody.rs: collateral token adapter. the ledger only needs transfer
// and balance_of; TokenLedger is the in-memory token used by tests and the sim.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::types::{Amount, Principal, TokenId};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CustodyError {
    #[error("{owner} holds {available}, transfer needs {requested}")]
    InsufficientBalance {
        owner: Principal,
        available: Amount,
        requested: Amount,
    },

    #[error("transfer amount must be positive")]
    InvalidAmount,

    #[error("sender and recipient are both {0}")]
    SameParty(Principal),

    #[error("{0} is frozen")]
    Frozen(Principal),

    #[error("balance overflow for {0}")]
    Overflow(Principal),
}

/// The two token operations the position ledger consumes.
///
/// A failed transfer must leave every balance untouched; the ledger relies
/// on that to abort the surrounding operation cleanly.
pub trait CustodyGateway {
    fn token_id(&self) -> &TokenId;

    fn transfer(
        &mut self,
        amount: Amount,
        from: &Principal,
        to: &Principal,
    ) -> Result<(), CustodyError>;

    fn balance_of(&self, owner: &Principal) -> Amount;
}

// fungible token with mint and per-holder freezing. freezing lets tests
// force a transfer failure after every ledger precondition has passed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenLedger {
    token: TokenId,
    balances: HashMap<Principal, Amount>,
    frozen: HashSet<Principal>,
    total_supply: Amount,
}

impl TokenLedger {
    pub fn new(token: TokenId) -> Self {
        Self {
            token,
            balances: HashMap::new(),
            frozen: HashSet::new(),
            total_supply: 0,
        }
    }

    pub fn mint(&mut self, to: &Principal, amount: Amount) -> Result<(), CustodyError> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or_else(|| CustodyError::Overflow(to.clone()))?;
        let balance = self.balance_of(to);
        let new_balance = balance
            .checked_add(amount)
            .ok_or_else(|| CustodyError::Overflow(to.clone()))?;

        self.balances.insert(to.clone(), new_balance);
        self.total_supply = supply;
        Ok(())
    }

    pub fn freeze(&mut self, holder: &Principal) {
        self.frozen.insert(holder.clone());
    }

    pub fn unfreeze(&mut self, holder: &Principal) {
        self.frozen.remove(holder);
    }

    pub fn is_frozen(&self, holder: &Principal) -> bool {
        self.frozen.contains(holder)
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    pub fn holders(&self) -> impl Iterator<Item = (&Principal, &Amount)> {
        self.balances.iter()
    }
}

impl CustodyGateway for TokenLedger {
    fn token_id(&self) -> &TokenId {
        &self.token
    }

    fn transfer(
        &mut self,
        amount: Amount,
        from: &Principal,
        to: &Principal,
    ) -> Result<(), CustodyError> {
        if amount == 0 {
            return Err(CustodyError::InvalidAmount);
        }
        if from == to {
            return Err(CustodyError::SameParty(from.clone()));
        }
        for party in [from, to] {
            if self.is_frozen(party) {
                return Err(CustodyError::Frozen(party.clone()));
            }
        }

        let available = self.balance_of(from);
        let remaining = available
            .checked_sub(amount)
            .ok_or_else(|| CustodyError::InsufficientBalance {
                owner: from.clone(),
                available,
                requested: amount,
            })?;
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or_else(|| CustodyError::Overflow(to.clone()))?;

        // all checks done, now both writes
        self.balances.insert(from.clone(), remaining);
        self.balances.insert(to.clone(), credited);
        Ok(())
    }

    fn balance_of(&self, owner: &Principal) -> Amount {
        self.balances.get(owner).copied().unwrap_or(0)
    }
}
