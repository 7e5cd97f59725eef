//! Margin arithmetic for fixed 2x positions.
//!
//! Required collateral is `size * 100 / 2`, floor division. PnL scales the
//! absolute price move by `size / entry` and carries its sign separately so
//! losses never pass through an unsigned intermediate. The liquidation price
//! is the price at which the move wipes out the posted collateral; for a long
//! it clamps to zero when the collateral exceeds the entry value.
//!
//! Everything here is pure and checked. Overflow is an error, never a wrap.

use crate::types::{Amount, Price, Side, SignedAmount};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const LEVERAGE: Amount = 2;
pub const COLLATERAL_SCALE: Amount = 100;
pub const MIN_COLLATERAL: Amount = 1_000;
pub const MAX_POSITION_SIZE: Amount = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarginParams {
    pub min_collateral: Amount,
    pub max_position_size: Amount,
}

impl Default for MarginParams {
    fn default() -> Self {
        Self {
            min_collateral: MIN_COLLATERAL,
            max_position_size: MAX_POSITION_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarginError {
    #[error("position size {size} exceeds maximum {maximum}")]
    SizeTooLarge { size: Amount, maximum: Amount },

    #[error("required collateral {required} below minimum {minimum}")]
    CollateralBelowMinimum { required: Amount, minimum: Amount },

    #[error("payout would be negative: collateral {collateral}, pnl {pnl}")]
    NegativePayout { collateral: Amount, pnl: SignedAmount },

    #[error("position size must be non-zero")]
    ZeroSize,

    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),
}

pub fn required_collateral(size: Amount) -> Result<Amount, MarginError> {
    size.checked_mul(COLLATERAL_SCALE)
        .map(|scaled| scaled / LEVERAGE)
        .ok_or(MarginError::Overflow("required collateral"))
}

/// Checks size against the configured bounds and returns the collateral to lock.
pub fn check_position_size(size: Amount, params: &MarginParams) -> Result<Amount, MarginError> {
    if size > params.max_position_size {
        return Err(MarginError::SizeTooLarge {
            size,
            maximum: params.max_position_size,
        });
    }
    let required = required_collateral(size)?;
    if required < params.min_collateral {
        return Err(MarginError::CollateralBelowMinimum {
            required,
            minimum: params.min_collateral,
        });
    }
    Ok(required)
}

// 3.1: |current - entry| * size / entry, signed by direction.
// a flat price counts as a gain of zero for both sides.
pub fn calculate_pnl(
    side: Side,
    entry_price: Price,
    current_price: Price,
    size: Amount,
) -> Result<SignedAmount, MarginError> {
    let entry = entry_price.value();
    let current = current_price.value();
    let diff = entry.abs_diff(current);

    let magnitude = diff
        .checked_mul(size)
        .ok_or(MarginError::Overflow("pnl"))?
        / entry;
    let magnitude = SignedAmount::try_from(magnitude).map_err(|_| MarginError::Overflow("pnl"))?;

    let gained = match side {
        Side::Long => current >= entry,
        Side::Short => entry >= current,
    };

    Ok(if gained { magnitude } else { -magnitude })
}

// 3.2: price move that consumes the whole collateral.
pub fn calculate_liquidation_price(
    side: Side,
    entry_price: Price,
    collateral: Amount,
    size: Amount,
) -> Result<Amount, MarginError> {
    if size == 0 {
        return Err(MarginError::ZeroSize);
    }
    let entry = entry_price.value();
    let buffer = collateral
        .checked_mul(entry)
        .ok_or(MarginError::Overflow("liquidation price"))?
        / size;

    match side {
        Side::Long => Ok(entry.saturating_sub(buffer)),
        Side::Short => entry
            .checked_add(buffer)
            .ok_or(MarginError::Overflow("liquidation price")),
    }
}

pub fn is_liquidatable(side: Side, current_price: Price, liquidation_price: Amount) -> bool {
    match side {
        Side::Long => current_price.value() <= liquidation_price,
        Side::Short => current_price.value() >= liquidation_price,
    }
}

// 3.3: collateral + pnl, rejected if negative. only place pnl sign matters.
pub fn settlement_payout(collateral: Amount, pnl: SignedAmount) -> Result<Amount, MarginError> {
    if pnl >= 0 {
        collateral
            .checked_add(pnl.unsigned_abs())
            .ok_or(MarginError::Overflow("payout"))
    } else {
        collateral
            .checked_sub(pnl.unsigned_abs())
            .ok_or(MarginError::NegativePayout { collateral, pnl })
    }
}

/// Equity over posted collateral. 1 at entry, 0 when the loss equals the
/// collateral, negative beyond that. Informational only, never enforced.
pub fn collateral_health(collateral: Amount, pnl: SignedAmount) -> Option<Decimal> {
    if collateral == 0 {
        return None;
    }
    let collateral = SignedAmount::try_from(collateral).ok()?;
    let equity = collateral.checked_add(pnl)?;
    let equity = Decimal::try_from_i128_with_scale(equity, 0).ok()?;
    let collateral = Decimal::try_from_i128_with_scale(collateral, 0).ok()?;
    equity.checked_div(collateral)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn price(value: u128) -> Price {
        Price::new(value).unwrap()
    }

    #[test]
    fn collateral_at_two_x() {
        assert_eq!(required_collateral(1000).unwrap(), 50_000);
        assert_eq!(required_collateral(3).unwrap(), 150);
        assert_eq!(required_collateral(0).unwrap(), 0);
    }

    #[test]
    fn collateral_overflow_is_an_error() {
        assert_eq!(
            required_collateral(u128::MAX),
            Err(MarginError::Overflow("required collateral"))
        );
    }

    #[test]
    fn size_bounds() {
        let params = MarginParams::default();
        assert_eq!(check_position_size(1000, &params).unwrap(), 50_000);
        assert!(matches!(
            check_position_size(MAX_POSITION_SIZE + 1, &params),
            Err(MarginError::SizeTooLarge { .. })
        ));
        // 19 * 50 = 950 < 1000
        assert!(matches!(
            check_position_size(19, &params),
            Err(MarginError::CollateralBelowMinimum { required: 950, .. })
        ));
        assert_eq!(check_position_size(20, &params).unwrap(), 1000);
    }

    #[test]
    fn long_pnl_both_directions() {
        assert_eq!(calculate_pnl(Side::Long, price(1000), price(1100), 1000).unwrap(), 100);
        assert_eq!(calculate_pnl(Side::Long, price(1000), price(900), 1000).unwrap(), -100);
    }

    #[test]
    fn short_pnl_both_directions() {
        assert_eq!(calculate_pnl(Side::Short, price(1000), price(900), 1000).unwrap(), 100);
        assert_eq!(calculate_pnl(Side::Short, price(1000), price(1100), 1000).unwrap(), -100);
    }

    #[test]
    fn pnl_floors_magnitude_before_sign() {
        // 1 * 7 / 3 = 2.33 -> 2, so the loss is -2 rather than -3
        assert_eq!(calculate_pnl(Side::Long, price(3), price(2), 7).unwrap(), -2);
        assert_eq!(calculate_pnl(Side::Short, price(3), price(2), 7).unwrap(), 2);
    }

    #[test]
    fn pnl_flat_price_is_zero() {
        assert_eq!(calculate_pnl(Side::Long, price(500), price(500), 1000).unwrap(), 0);
        assert_eq!(calculate_pnl(Side::Short, price(500), price(500), 1000).unwrap(), 0);
    }

    #[test]
    fn long_liquidation_price_clamps_to_zero() {
        // 1000 - 50000 * 1000 / 1000 underflows
        assert_eq!(calculate_liquidation_price(Side::Long, price(1000), 50_000, 1000).unwrap(), 0);
        // 1000 - 400 * 1000 / 1000 = 600
        assert_eq!(calculate_liquidation_price(Side::Long, price(1000), 400, 1000).unwrap(), 600);
    }

    #[test]
    fn short_liquidation_price_adds_buffer() {
        assert_eq!(
            calculate_liquidation_price(Side::Short, price(1000), 50_000, 1000).unwrap(),
            51_000
        );
    }

    #[test]
    fn liquidation_price_rejects_zero_size() {
        assert_eq!(
            calculate_liquidation_price(Side::Long, price(1000), 10, 0),
            Err(MarginError::ZeroSize)
        );
    }

    #[test]
    fn liquidatable_edges_are_inclusive() {
        assert!(is_liquidatable(Side::Long, price(600), 600));
        assert!(!is_liquidatable(Side::Long, price(601), 600));
        assert!(is_liquidatable(Side::Short, price(51_000), 51_000));
        assert!(!is_liquidatable(Side::Short, price(50_999), 51_000));
        // clamped long never liquidates at a positive price
        assert!(!is_liquidatable(Side::Long, price(1), 0));
    }

    #[test]
    fn payout_sign_checked_once() {
        assert_eq!(settlement_payout(50_000, 100).unwrap(), 50_100);
        assert_eq!(settlement_payout(50_000, -50_000).unwrap(), 0);
        assert_eq!(
            settlement_payout(50_000, -50_001),
            Err(MarginError::NegativePayout { collateral: 50_000, pnl: -50_001 })
        );
    }

    #[test]
    fn health_ratio() {
        assert_eq!(collateral_health(50_000, 0), Some(dec!(1)));
        assert_eq!(collateral_health(50_000, -25_000), Some(dec!(0.5)));
        assert_eq!(collateral_health(0, 10), None);
    }
}
