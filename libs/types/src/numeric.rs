//! Fixed-point raw amounts
//!
//! Every price, position amount and collateral amount is carried as a
//! `Decimal` holding an integral raw value at its own scale: prices at
//! 10^10, position amounts at 10^5, collateral at 10^18. Arithmetic is
//! checked; division either floors exactly or fails with a rounding error.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::errors::MathError;

/// Raw amounts are plain integers in a `Decimal` container.
pub type Amount = Decimal;

/// Decimal places of a raw price.
pub const PRICE_DECIMALS: u32 = 10;

/// Decimal places of a raw position amount.
pub const BASE_DECIMALS: u32 = 5;

/// Decimal places of a raw collateral amount.
pub const COLLATERAL_DECIMALS: u32 = 18;

/// A floor division loses too much when the remainder is at least this
/// fraction (per mille) of the product.
pub const ROUNDING_TOLERANCE_PER_MILLE: i64 = 1;

fn pow10(decimals: u32) -> Result<Decimal, MathError> {
    let scale = 10i128.checked_pow(decimals).ok_or(MathError::Overflow)?;
    Decimal::try_from_i128_with_scale(scale, 0).map_err(|_| MathError::Overflow)
}

/// Convert a human-readable value into its raw integer representation.
pub fn to_raw(value: Decimal, decimals: u32) -> Result<Amount, MathError> {
    let raw = value
        .checked_mul(pow10(decimals)?)
        .ok_or(MathError::Overflow)?;
    ensure_integral(raw)
}

/// Convert a raw integer amount back into a human-readable value.
pub fn from_raw(raw: Amount, decimals: u32) -> Result<Decimal, MathError> {
    let value = raw
        .checked_div(pow10(decimals)?)
        .ok_or(MathError::DivisionByZero)?;
    Ok(value.normalize())
}

/// Reject values with a fractional part.
pub fn ensure_integral(value: Decimal) -> Result<Amount, MathError> {
    if value.fract().is_zero() {
        Ok(value.trunc().normalize())
    } else {
        Err(MathError::NonIntegral {
            value: value.to_string(),
        })
    }
}

/// Reject negative or fractional raw amounts.
pub fn ensure_amount(value: Decimal) -> Result<Amount, MathError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(MathError::Negative {
            value: value.to_string(),
        });
    }
    ensure_integral(value)
}

pub fn safe_add(lhs: Amount, rhs: Amount) -> Result<Amount, MathError> {
    lhs.checked_add(rhs).ok_or(MathError::Overflow)
}

/// Checked subtraction; going below zero is an `Underflow`.
pub fn safe_sub(lhs: Amount, rhs: Amount) -> Result<Amount, MathError> {
    if rhs > lhs {
        return Err(MathError::Underflow {
            lhs: lhs.to_string(),
            rhs: rhs.to_string(),
        });
    }
    lhs.checked_sub(rhs).ok_or(MathError::Overflow)
}

/// `lhs - rhs`, clamped at zero.
pub fn saturating_sub(lhs: Amount, rhs: Amount) -> Amount {
    if rhs >= lhs {
        Decimal::ZERO
    } else {
        lhs - rhs
    }
}

pub fn safe_mul(lhs: Amount, rhs: Amount) -> Result<Amount, MathError> {
    lhs.checked_mul(rhs).ok_or(MathError::Overflow)
}

/// Exact integer floor division of raw amounts.
pub fn floor_div(numerator: Amount, denominator: Amount) -> Result<Amount, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let remainder = numerator
        .checked_rem(denominator)
        .ok_or(MathError::DivisionByZero)?;
    let exact = safe_sub(numerator, remainder)?;
    exact
        .checked_div(denominator)
        .map(|q| q.trunc().normalize())
        .ok_or(MathError::Overflow)
}

/// Widen an integral raw amount for intermediate products that may not fit
/// the 96-bit `Decimal` mantissa.
fn widen(value: Amount) -> Result<i128, MathError> {
    ensure_integral(value)?
        .to_i128()
        .ok_or(MathError::Overflow)
}

/// Narrow a wide intermediate back into a raw amount.
fn narrow(value: i128) -> Result<Amount, MathError> {
    Decimal::try_from_i128_with_scale(value, 0).map_err(|_| MathError::Overflow)
}

/// `(numerator * multiplier, denominator)` in i128.
fn wide_product(
    numerator: Amount,
    denominator: Amount,
    multiplier: Amount,
) -> Result<(i128, i128), MathError> {
    let denominator = widen(denominator)?;
    if denominator == 0 {
        return Err(MathError::DivisionByZero);
    }
    let product = widen(numerator)?
        .checked_mul(widen(multiplier)?)
        .ok_or(MathError::Overflow)?;
    Ok((product, denominator))
}

/// Whether `numerator * multiplier / denominator` floors away at least
/// 0.1% of the exact result.
pub fn is_rounding_error(
    numerator: Amount,
    denominator: Amount,
    multiplier: Amount,
) -> Result<bool, MathError> {
    let (product, denominator) = wide_product(numerator, denominator, multiplier)?;
    if product == 0 {
        return Ok(false);
    }
    let remainder = product
        .checked_rem_euclid(denominator)
        .ok_or(MathError::DivisionByZero)?;
    let scaled = remainder
        .checked_mul(i128::from(1000 / ROUNDING_TOLERANCE_PER_MILLE))
        .ok_or(MathError::Overflow)?;
    Ok(scaled >= product)
}

/// `floor(numerator * multiplier / denominator)`, failing instead of
/// truncating when the discarded remainder is not negligible.
///
/// The product is taken in i128, so only the quotient has to fit an
/// `Amount`.
pub fn partial_amount_floor(
    numerator: Amount,
    denominator: Amount,
    multiplier: Amount,
) -> Result<Amount, MathError> {
    if is_rounding_error(numerator, denominator, multiplier)? {
        return Err(MathError::RoundingError {
            numerator: numerator.to_string(),
            denominator: denominator.to_string(),
            target: multiplier.to_string(),
        });
    }
    let (product, denominator) = wide_product(numerator, denominator, multiplier)?;
    narrow(
        product
            .checked_div_euclid(denominator)
            .ok_or(MathError::DivisionByZero)?,
    )
}
