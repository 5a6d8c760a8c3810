//! Trading fee calculation
//!
//! Fee rates are integers over `FEE_RATE_BASE`, rebate rates integers over
//! `REBATE_RATE_BASE`. Fees are charged on a per-unit fee base times the
//! filled position amount.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::MathError;
use crate::numeric::{partial_amount_floor, safe_mul, Amount};

/// Denominator of maker and taker fee rates (250 = 0.25%).
pub const FEE_RATE_BASE: u64 = 100_000;

/// Denominator of the maker rebate rate (percent of the taker fee).
pub const REBATE_RATE_BASE: u64 = 100;

/// Which per-unit value a fee rate is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeBasis {
    /// Collateral of one unit at the middle of the price band:
    /// `(cap + floor) / 2 * multiplier`. Independent of the fill price.
    #[default]
    MidCollateral,
    /// Fill price times multiplier.
    FillPrice,
}

/// Fees owed for one fill segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeeQuote {
    pub maker_fee: Amount,
    pub taker_fee: Amount,
    /// Paid by the fee recipient to the maker out of the taker fee.
    pub maker_rebate: Amount,
}

/// Fee rates of one maker/taker pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeRates {
    pub maker_fee_rate: u16,
    pub taker_fee_rate: u16,
    pub maker_rebate_rate: u16,
}

impl FeeRates {
    /// Quote fees for `amount` units at `fee_base_per_unit` collateral each.
    ///
    /// A positive rebate rate waives the maker fee; the rebate is that share
    /// of the taker fee, capped at 100%.
    pub fn quote(&self, fee_base_per_unit: Amount, amount: Amount) -> Result<FeeQuote, MathError> {
        let fee_base = safe_mul(fee_base_per_unit, amount)?;
        let taker_fee = charge(fee_base, self.taker_fee_rate)?;

        if self.maker_rebate_rate > 0 {
            let rate = u64::from(self.maker_rebate_rate).min(REBATE_RATE_BASE);
            let maker_rebate = partial_amount_floor(
                taker_fee,
                Decimal::from(REBATE_RATE_BASE),
                Decimal::from(rate),
            )?;
            return Ok(FeeQuote {
                maker_fee: Decimal::ZERO,
                taker_fee,
                maker_rebate,
            });
        }

        Ok(FeeQuote {
            maker_fee: charge(fee_base, self.maker_fee_rate)?,
            taker_fee,
            maker_rebate: Decimal::ZERO,
        })
    }
}

fn charge(fee_base: Amount, rate: u16) -> Result<Amount, MathError> {
    partial_amount_floor(fee_base, Decimal::from(FEE_RATE_BASE), Decimal::from(rate))
}
