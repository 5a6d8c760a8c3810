//! Market definition: collateralised long/short position pairs
//!
//! `MarketContract` is the interface the exchange consumes: price band,
//! quantity multiplier, per-unit collateral and fee, token addresses, and the
//! mint/redeem entry points. `PositionMarket` is the in-memory implementation
//! used by the reference deployment and the tests.
//!
//! Per raw position unit:
//! - collateral: `(cap - floor) * multiplier`
//! - collateral fee: `(cap + floor) / 2 * multiplier * fee_rate / 100_000`
//! - market token fee: half the collateral fee

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use types::fee::FEE_RATE_BASE;
use types::ids::Address;
use types::numeric::{floor_div, safe_add, safe_mul, safe_sub, Amount, COLLATERAL_DECIMALS, BASE_DECIMALS};

use crate::errors::MarketError;
use crate::token::TokenBank;

/// Read accessors and mint/redeem entry points of a market definition.
pub trait MarketContract {
    fn address(&self) -> Address;
    fn price_cap(&self) -> Amount;
    fn price_floor(&self) -> Amount;
    fn qty_multiplier(&self) -> Amount;
    fn collateral_per_unit(&self) -> Amount;
    fn collateral_fee_per_unit(&self) -> Amount;
    fn market_token_fee_per_unit(&self) -> Amount;
    fn collateral_token(&self) -> Address;
    fn long_token(&self) -> Address;
    fn short_token(&self) -> Address;
    fn market_token(&self) -> Address;
    /// Account that receives collateral and fees and must be approved by
    /// minters.
    fn collateral_pool(&self) -> Address;
    /// Unix seconds after which the market no longer trades.
    fn expiration(&self) -> u64;

    /// Take `qty * (collateral_per_unit + fee)` from `caller` and mint `qty`
    /// of each leg to it. With `pay_in_market_token` the fee is taken in the
    /// market token at its per-unit rate instead.
    fn mint_position_tokens(
        &self,
        bank: &mut TokenBank,
        caller: Address,
        qty: Amount,
        pay_in_market_token: bool,
        now: u64,
    ) -> Result<(), MarketError>;

    /// Burn `qty` of each leg held by `caller` and pay it
    /// `qty * collateral_per_unit`.
    fn redeem_position_tokens(
        &self,
        bank: &mut TokenBank,
        caller: Address,
        qty: Amount,
    ) -> Result<(), MarketError>;
}

/// Deployment parameters of a market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSpec {
    pub name: String,
    pub address: Address,
    pub collateral_token: Address,
    pub market_token: Address,
    /// Raw price units.
    pub price_cap: Amount,
    /// Raw price units.
    pub price_floor: Amount,
    pub qty_multiplier: Amount,
    /// Creation fee rate over `FEE_RATE_BASE`.
    pub fee_rate: u16,
    pub expiration: u64,
}

impl MarketSpec {
    fn leg_address(&self, leg: &str) -> Address {
        Address::from_label(&format!("{}/{}/{}", self.name, self.address, leg))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionMarket {
    spec: MarketSpec,
    long_token: Address,
    short_token: Address,
    collateral_per_unit: Amount,
    collateral_fee_per_unit: Amount,
    market_token_fee_per_unit: Amount,
}

impl PositionMarket {
    /// Validate parameters, register the leg tokens and make the market
    /// their minter. Collateral and market tokens are registered if absent.
    pub fn deploy(bank: &mut TokenBank, spec: MarketSpec) -> Result<Self, MarketError> {
        if spec.price_cap <= spec.price_floor {
            return Err(MarketError::InvalidParameters {
                reason: format!("cap {} must exceed floor {}", spec.price_cap, spec.price_floor),
            });
        }
        if spec.qty_multiplier <= Decimal::ZERO {
            return Err(MarketError::InvalidParameters {
                reason: "multiplier must be positive".to_string(),
            });
        }

        let range = safe_sub(spec.price_cap, spec.price_floor)?;
        let collateral_per_unit = safe_mul(range, spec.qty_multiplier)?;
        let mid = floor_div(safe_add(spec.price_cap, spec.price_floor)?, Decimal::TWO)?;
        let collateral_fee_per_unit = floor_div(
            safe_mul(safe_mul(mid, spec.qty_multiplier)?, Decimal::from(spec.fee_rate))?,
            Decimal::from(FEE_RATE_BASE),
        )?;
        let market_token_fee_per_unit = floor_div(collateral_fee_per_unit, Decimal::TWO)?;

        for (token, symbol) in [
            (spec.collateral_token, "CTK"),
            (spec.market_token, "MKT"),
        ] {
            if !bank.is_registered(&token) {
                bank.register_token(token, symbol, COLLATERAL_DECIMALS)?;
            }
        }

        let long_token = spec.leg_address("long");
        let short_token = spec.leg_address("short");
        bank.register_token(long_token, format!("{}-LONG", spec.name), BASE_DECIMALS)?;
        bank.register_token(short_token, format!("{}-SHORT", spec.name), BASE_DECIMALS)?;
        bank.add_minter(&long_token, spec.address)?;
        bank.add_minter(&short_token, spec.address)?;

        info!(
            market = %spec.address,
            name = %spec.name,
            collateral_per_unit = %collateral_per_unit,
            collateral_fee_per_unit = %collateral_fee_per_unit,
            "market deployed"
        );

        Ok(Self {
            spec,
            long_token,
            short_token,
            collateral_per_unit,
            collateral_fee_per_unit,
            market_token_fee_per_unit,
        })
    }

    pub fn spec(&self) -> &MarketSpec {
        &self.spec
    }

    fn check_not_expired(&self, now: u64) -> Result<(), MarketError> {
        if now >= self.spec.expiration {
            return Err(MarketError::Expired {
                market: self.spec.address,
                expiration: self.spec.expiration,
            });
        }
        Ok(())
    }
}

impl MarketContract for PositionMarket {
    fn address(&self) -> Address {
        self.spec.address
    }

    fn price_cap(&self) -> Amount {
        self.spec.price_cap
    }

    fn price_floor(&self) -> Amount {
        self.spec.price_floor
    }

    fn qty_multiplier(&self) -> Amount {
        self.spec.qty_multiplier
    }

    fn collateral_per_unit(&self) -> Amount {
        self.collateral_per_unit
    }

    fn collateral_fee_per_unit(&self) -> Amount {
        self.collateral_fee_per_unit
    }

    fn market_token_fee_per_unit(&self) -> Amount {
        self.market_token_fee_per_unit
    }

    fn collateral_token(&self) -> Address {
        self.spec.collateral_token
    }

    fn long_token(&self) -> Address {
        self.long_token
    }

    fn short_token(&self) -> Address {
        self.short_token
    }

    fn market_token(&self) -> Address {
        self.spec.market_token
    }

    fn collateral_pool(&self) -> Address {
        self.spec.address
    }

    fn expiration(&self) -> u64 {
        self.spec.expiration
    }

    fn mint_position_tokens(
        &self,
        bank: &mut TokenBank,
        caller: Address,
        qty: Amount,
        pay_in_market_token: bool,
        now: u64,
    ) -> Result<(), MarketError> {
        self.check_not_expired(now)?;
        let pool = self.collateral_pool();
        let collateral = safe_mul(qty, self.collateral_per_unit)?;

        if pay_in_market_token {
            let fee = safe_mul(qty, self.market_token_fee_per_unit)?;
            bank.transfer_from(&self.spec.market_token, pool, caller, pool, fee)?;
            bank.transfer_from(&self.spec.collateral_token, pool, caller, pool, collateral)?;
        } else {
            let fee = safe_mul(qty, self.collateral_fee_per_unit)?;
            bank.transfer_from(
                &self.spec.collateral_token,
                pool,
                caller,
                pool,
                safe_add(collateral, fee)?,
            )?;
        }

        bank.mint(&self.long_token, &self.spec.address, caller, qty)?;
        bank.mint(&self.short_token, &self.spec.address, caller, qty)?;
        Ok(())
    }

    fn redeem_position_tokens(
        &self,
        bank: &mut TokenBank,
        caller: Address,
        qty: Amount,
    ) -> Result<(), MarketError> {
        bank.burn(&self.long_token, &self.spec.address, caller, qty)?;
        bank.burn(&self.short_token, &self.spec.address, caller, qty)?;
        let collateral = safe_mul(qty, self.collateral_per_unit)?;
        bank.transfer(&self.spec.collateral_token, self.collateral_pool(), caller, collateral)?;
        Ok(())
    }
}
