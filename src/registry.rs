//! Futures contract registry.
//!
//! Contracts are numbered from 1 in creation order and the counter never
//! rewinds, so ids are not reused even after a contract is deactivated.
//! Deactivation is one-way.

use crate::types::{AssetSymbol, BlockHeight, ContractId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuturesContract {
    pub id: ContractId,
    pub symbol: AssetSymbol,
    pub expiry_height: BlockHeight,
    pub active: bool,
}

impl FuturesContract {
    /// Open for new positions at `height`.
    pub fn is_tradable(&self, height: BlockHeight) -> bool {
        self.active && height < self.expiry_height
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("contract {0} not found")]
    NotFound(ContractId),

    #[error("expiry must be at least one block")]
    ZeroExpiry,

    #[error("expiry height overflows: {height} + {blocks}")]
    ExpiryOverflow { height: BlockHeight, blocks: u64 },

    #[error("contract {0} is deactivated")]
    Inactive(ContractId),

    #[error("contract {id} expired at height {expiry_height}")]
    Expired {
        id: ContractId,
        expiry_height: BlockHeight,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContractRegistry {
    contracts: HashMap<ContractId, FuturesContract>,
    last_id: u64,
}

impl ContractRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(
        &mut self,
        symbol: AssetSymbol,
        expiry_in_blocks: u64,
        current_height: BlockHeight,
    ) -> Result<&FuturesContract, RegistryError> {
        if expiry_in_blocks == 0 {
            return Err(RegistryError::ZeroExpiry);
        }
        let expiry_height = current_height
            .checked_add(expiry_in_blocks)
            .ok_or(RegistryError::ExpiryOverflow {
                height: current_height,
                blocks: expiry_in_blocks,
            })?;

        self.last_id += 1;
        let id = ContractId(self.last_id);
        let contract = FuturesContract {
            id,
            symbol,
            expiry_height,
            active: true,
        };
        Ok(self.contracts.entry(id).or_insert(contract))
    }

    pub fn deactivate(&mut self, id: ContractId) -> Result<&FuturesContract, RegistryError> {
        let contract = self
            .contracts
            .get_mut(&id)
            .ok_or(RegistryError::NotFound(id))?;
        contract.active = false;
        Ok(contract)
    }

    pub fn get(&self, id: ContractId) -> Option<&FuturesContract> {
        self.contracts.get(&id)
    }

    pub fn require(&self, id: ContractId) -> Result<&FuturesContract, RegistryError> {
        self.contracts.get(&id).ok_or(RegistryError::NotFound(id))
    }

    /// Looks up a contract that can take new positions at `height`.
    pub fn require_tradable(
        &self,
        id: ContractId,
        height: BlockHeight,
    ) -> Result<&FuturesContract, RegistryError> {
        let contract = self.require(id)?;
        if !contract.active {
            return Err(RegistryError::Inactive(id));
        }
        if height >= contract.expiry_height {
            return Err(RegistryError::Expired {
                id,
                expiry_height: contract.expiry_height,
            });
        }
        Ok(contract)
    }

    pub fn last_id(&self) -> ContractId {
        ContractId(self.last_id)
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}
