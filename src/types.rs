// 1.0: all the primitives live here. principals, ids, symbols, prices, heights.
// each is a newtype so the compiler catches type mixups.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// token amounts, position sizes and collateral. never negative.
pub type Amount = u128;

// signed pnl. only checked for sign when a payout is computed.
pub type SignedAmount = i128;

pub const MAX_SYMBOL_LEN: usize = 16;

/// An identity that can call into the ledger or hold tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Principal(pub String);

impl Principal {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContractId(pub u64);

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifies a fungible collateral token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenId(pub String);

impl TokenId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// 1.1: asset symbol, key into the price table. 1..=16 chars, nothing else checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct AssetSymbol(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("symbol {0:?} must be 1 to 16 characters")]
pub struct SymbolLengthError(pub String);

impl AssetSymbol {
    #[must_use]
    pub fn new(symbol: impl Into<String>) -> Option<Self> {
        Self::try_from(symbol.into()).ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AssetSymbol {
    type Error = SymbolLengthError;

    fn try_from(symbol: String) -> Result<Self, Self::Error> {
        let len = symbol.chars().count();
        if len == 0 || len > MAX_SYMBOL_LEN {
            Err(SymbolLengthError(symbol))
        } else {
            Ok(Self(symbol))
        }
    }
}

impl fmt::Display for AssetSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Long = profit when price goes up. Short = profit when price goes down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    pub fn opposite(&self) -> Self {
        match self {
            Side::Long => Side::Short,
            Side::Short => Side::Long,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "long"),
            Side::Short => write!(f, "short"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown side {0:?}, expected long or short")]
pub struct ParseSideError(pub String);

impl FromStr for Side {
    type Err = ParseSideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "long" => Ok(Side::Long),
            "short" => Ok(Side::Short),
            _ => Err(ParseSideError(s.to_string())),
        }
    }
}

// 1.2: price in collateral units per unit of the asset. must be positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u128")]
pub struct Price(u128);

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("price must be positive")]
pub struct ZeroPriceError;

impl Price {
    #[must_use]
    pub fn new(value: u128) -> Option<Self> {
        Self::try_from(value).ok()
    }

    pub fn value(&self) -> u128 {
        self.0
    }
}

impl TryFrom<u128> for Price {
    type Error = ZeroPriceError;

    fn try_from(value: u128) -> Result<Self, Self::Error> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(ZeroPriceError)
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// 1.3: block height. contract expiry is measured in blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockHeight(pub u64);

impl BlockHeight {
    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn checked_add(&self, blocks: u64) -> Option<Self> {
        self.0.checked_add(blocks).map(Self)
    }
}

impl fmt::Display for BlockHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// 1.4: who is calling and at what height. passed into every operation
// so runs are replayable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionContext {
    pub caller: Principal,
    pub height: BlockHeight,
}

impl ExecutionContext {
    pub fn new(caller: Principal, height: BlockHeight) -> Self {
        Self { caller, height }
    }

    pub fn at(caller: &str, height: u64) -> Self {
        Self::new(Principal::new(caller), BlockHeight(height))
    }
}
