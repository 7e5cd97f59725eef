// 8.0.2: result types and errors for ledger operations.

use crate::access::AccessError;
use crate::custody::CustodyError;
use crate::margin::MarginError;
use crate::position::PositionKey;
use crate::registry::RegistryError;
use crate::types::{
    Amount, AssetSymbol, ContractId, ExecutionContext, ParseSideError, Price, SignedAmount, TokenId,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseResult {
    pub contract_id: ContractId,
    pub exit_price: Price,
    pub pnl: SignedAmount,
    pub payout: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationResult {
    pub position: PositionKey,
    pub price: Price,
    pub liquidation_price: Amount,
    pub reward: Amount, // whole collateral, not pnl adjusted
}

/// Categorical failure code. Every `LedgerError` maps to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    NotFound,
    AlreadyExists,
    InvalidInput,
    InsufficientFunds,
    ExpiredOrInactive,
    Unliquidatable,
    CustodyFailure,
    Overflow,
}

impl ErrorCode {
    // stable numeric codes for hosts that return integers
    pub fn as_u32(&self) -> u32 {
        match self {
            ErrorCode::Unauthorized => 100,
            ErrorCode::NotFound => 101,
            ErrorCode::AlreadyExists => 102,
            ErrorCode::InvalidInput => 103,
            ErrorCode::InsufficientFunds => 104,
            ErrorCode::ExpiredOrInactive => 105,
            ErrorCode::Unliquidatable => 106,
            ErrorCode::CustodyFailure => 107,
            ErrorCode::Overflow => 108,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("Access denied: {0}")]
    Access(#[from] AccessError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Margin error: {0}")]
    Margin(#[from] MarginError),

    #[error("Custody transfer failed: {0}")]
    Custody(#[from] CustodyError),

    #[error("Invalid side: {0}")]
    InvalidSide(#[from] ParseSideError),

    #[error("Invalid asset symbol {0:?}")]
    InvalidSymbol(String),

    #[error("Price must be positive")]
    InvalidPrice,

    #[error("Token {supplied} is not the collateral token {expected}")]
    TokenMismatch { expected: TokenId, supplied: TokenId },

    #[error("No price available for {0}")]
    PriceUnavailable(AssetSymbol),

    #[error("Position {0} not found")]
    PositionNotFound(PositionKey),

    #[error("Position {0} already open")]
    PositionExists(PositionKey),

    #[error("Balance {available} below required collateral {required}")]
    InsufficientBalance { required: Amount, available: Amount },

    #[error("Position is solvent: price {price}, liquidation price {liquidation_price}")]
    NotLiquidatable { price: Price, liquidation_price: Amount },
}

impl LedgerError {
    pub fn code(&self) -> ErrorCode {
        match self {
            LedgerError::Access(_) => ErrorCode::Unauthorized,
            LedgerError::Registry(err) => match err {
                RegistryError::NotFound(_) => ErrorCode::NotFound,
                RegistryError::ZeroExpiry => ErrorCode::InvalidInput,
                RegistryError::ExpiryOverflow { .. } => ErrorCode::Overflow,
                RegistryError::Inactive(_) | RegistryError::Expired { .. } => {
                    ErrorCode::ExpiredOrInactive
                }
            },
            LedgerError::Margin(err) => match err {
                MarginError::SizeTooLarge { .. } | MarginError::ZeroSize => ErrorCode::InvalidInput,
                MarginError::CollateralBelowMinimum { .. } | MarginError::NegativePayout { .. } => {
                    ErrorCode::InsufficientFunds
                }
                MarginError::Overflow(_) => ErrorCode::Overflow,
            },
            LedgerError::Custody(_) => ErrorCode::CustodyFailure,
            LedgerError::InvalidSide(_)
            | LedgerError::InvalidSymbol(_)
            | LedgerError::InvalidPrice
            | LedgerError::TokenMismatch { .. } => ErrorCode::InvalidInput,
            LedgerError::PriceUnavailable(_) | LedgerError::PositionNotFound(_) => {
                ErrorCode::NotFound
            }
            LedgerError::PositionExists(_) => ErrorCode::AlreadyExists,
            LedgerError::InsufficientBalance { .. } => ErrorCode::InsufficientFunds,
            LedgerError::NotLiquidatable { .. } => ErrorCode::Unliquidatable,
        }
    }
}

// custody failures are the only rejections worth a warning
pub(super) fn log_rejection(operation: &'static str, ctx: &ExecutionContext, err: &LedgerError) {
    let code = err.code();
    if code == ErrorCode::CustodyFailure {
        tracing::warn!(operation, caller = %ctx.caller, height = ctx.height.0, ?code, %err, "rejected");
    } else {
        tracing::debug!(operation, caller = %ctx.caller, height = ctx.height.0, ?code, %err, "rejected");
    }
}
