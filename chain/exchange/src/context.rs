//! Order context resolver
//!
//! Reads a market definition once per match call and derives everything the
//! planner and executor need: token addresses, price band, per-unit
//! collateral and fees, and the taker's side. Never persisted.

use serde::{Deserialize, Serialize};
use types::fee::FeeBasis;
use types::ids::Address;
use types::numeric::{floor_div, safe_add, safe_mul, safe_sub, Amount};
use types::order::{Order, PositionLeg, Side};

use crate::config::ExchangeConfig;
use crate::errors::ExchangeError;
use crate::market::MarketContract;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderContext {
    pub market: Address,
    pub collateral_token: Address,
    /// `[long, short]`
    pub pos_tokens: [Address; 2],
    pub market_token: Address,
    pub collateral_pool: Address,
    pub price_cap: Amount,
    pub price_floor: Amount,
    pub qty_multiplier: Amount,
    pub collateral_per_unit: Amount,
    pub collateral_fee_per_unit: Amount,
    pub market_token_fee_per_unit: Amount,
    pub expiration: u64,
    pub taker_side: Side,
}

impl OrderContext {
    /// Resolve the context of a match on `market` for `taker`.
    pub fn resolve(
        config: &ExchangeConfig,
        market: &dyn MarketContract,
        market_ref: Address,
        taker: &Order,
        now: u64,
    ) -> Result<Self, ExchangeError> {
        if market.address() != market_ref || taker.market != market_ref {
            return Err(ExchangeError::InvalidMarket { market: market_ref });
        }
        if !config.is_market_allowed(&market_ref) {
            return Err(ExchangeError::MarketNotRegistered { market: market_ref });
        }
        if now >= market.expiration() {
            return Err(ExchangeError::MarketExpired {
                market: market_ref,
                expiration: market.expiration(),
            });
        }

        Ok(Self {
            market: market_ref,
            collateral_token: market.collateral_token(),
            pos_tokens: [market.long_token(), market.short_token()],
            market_token: market.market_token(),
            collateral_pool: market.collateral_pool(),
            price_cap: market.price_cap(),
            price_floor: market.price_floor(),
            qty_multiplier: market.qty_multiplier(),
            collateral_per_unit: market.collateral_per_unit(),
            collateral_fee_per_unit: market.collateral_fee_per_unit(),
            market_token_fee_per_unit: market.market_token_fee_per_unit(),
            expiration: market.expiration(),
            taker_side: taker.side(),
        })
    }

    /// 0 when the taker buys (long-biased), 1 when it sells.
    pub fn taker_side_bit(&self) -> u8 {
        self.taker_side.as_bit()
    }

    pub fn leg_token(&self, leg: PositionLeg) -> Address {
        match leg {
            PositionLeg::Long => self.pos_tokens[0],
            PositionLeg::Short => self.pos_tokens[1],
        }
    }

    pub fn price_in_range(&self, price: Amount) -> bool {
        price >= self.price_floor && price <= self.price_cap
    }

    /// Collateral backing one raw unit of `leg` bought at `price`:
    /// `(price - floor) * multiplier` for long, `(cap - price) * multiplier`
    /// for short.
    pub fn margin_per_unit(&self, leg: PositionLeg, price: Amount) -> Result<Amount, ExchangeError> {
        let distance = match leg {
            PositionLeg::Long => safe_sub(price, self.price_floor)?,
            PositionLeg::Short => safe_sub(self.price_cap, price)?,
        };
        Ok(safe_mul(distance, self.qty_multiplier)?)
    }

    /// Per-unit amount fee rates apply to.
    pub fn fee_base_per_unit(&self, basis: FeeBasis, price: Amount) -> Result<Amount, ExchangeError> {
        let per_unit = match basis {
            FeeBasis::MidCollateral => {
                let mid = floor_div(safe_add(self.price_cap, self.price_floor)?, Amount::TWO)?;
                safe_mul(mid, self.qty_multiplier)?
            }
            FeeBasis::FillPrice => safe_mul(price, self.qty_multiplier)?,
        };
        Ok(per_unit)
    }
}
