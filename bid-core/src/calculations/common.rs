//! Common utility functions for bid capacity calculations.
//!
//! Rounding and clamping helpers shared by the formula functions and the
//! worksheet.
//!
//! The `clamped_*` helpers never panic. A result outside the `Decimal` range
//! is pinned to [`Decimal::MAX`] or [`Decimal::MIN`] and a warning is logged.

use rust_decimal::Decimal;
use tracing::warn;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use bid_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(12.344)), dec!(12.34));
/// assert_eq!(round_half_up(dec!(12.345)), dec!(12.35));
/// assert_eq!(round_half_up(dec!(-12.345)), dec!(-12.35)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Returns `value`, or zero when `value` is negative.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use bid_core::calculations::common::floor_at_zero;
///
/// assert_eq!(floor_at_zero(dec!(60.00)), dec!(60.00));
/// assert_eq!(floor_at_zero(dec!(-5.00)), dec!(0));
/// ```
pub fn floor_at_zero(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

/// `lhs × rhs`, clamped to the `Decimal` range.
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use rust_decimal_macros::dec;
/// use bid_core::calculations::common::clamped_mul;
///
/// assert_eq!(clamped_mul(dec!(10), dec!(1.15)), dec!(11.50));
/// assert_eq!(clamped_mul(Decimal::MAX, dec!(-2)), Decimal::MIN);
/// ```
pub fn clamped_mul(
    lhs: Decimal,
    rhs: Decimal,
) -> Decimal {
    lhs.checked_mul(rhs).unwrap_or_else(|| {
        let clamped = lhs.saturating_mul(rhs);
        warn!(%lhs, %rhs, %clamped, "Multiplication overflowed; result clamped");
        clamped
    })
}

/// `lhs + rhs`, clamped to the `Decimal` range.
pub fn clamped_add(
    lhs: Decimal,
    rhs: Decimal,
) -> Decimal {
    lhs.checked_add(rhs).unwrap_or_else(|| {
        let clamped = lhs.saturating_add(rhs);
        warn!(%lhs, %rhs, %clamped, "Addition overflowed; result clamped");
        clamped
    })
}

/// `lhs − rhs`, clamped to the `Decimal` range.
pub fn clamped_sub(
    lhs: Decimal,
    rhs: Decimal,
) -> Decimal {
    lhs.checked_sub(rhs).unwrap_or_else(|| {
        let clamped = lhs.saturating_sub(rhs);
        warn!(%lhs, %rhs, %clamped, "Subtraction overflowed; result clamped");
        clamped
    })
}

/// `lhs ÷ rhs`, clamped to the `Decimal` range. `None` only when `rhs` is
/// zero.
pub fn clamped_div(
    lhs: Decimal,
    rhs: Decimal,
) -> Option<Decimal> {
    if rhs.is_zero() {
        return None;
    }
    Some(lhs.checked_div(rhs).unwrap_or_else(|| {
        let clamped = if lhs.is_sign_negative() == rhs.is_sign_negative() {
            Decimal::MAX
        } else {
            Decimal::MIN
        };
        warn!(%lhs, %rhs, %clamped, "Division overflowed; result clamped");
        clamped
    }))
}
