//! Contract events
//!
//! Immutable records appended by successful operations. Failed operations
//! emit nothing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::ids::{Address, OrderHash};
use types::order::PositionLeg;
use types::trade::{FillAction, MatchResult};

/// An order was cancelled by its trader or relayer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancelled {
    pub order_hash: OrderHash,
    pub cancelled_by: Address,
}

/// One settled segment of a maker/taker pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matched {
    pub taker_order_hash: OrderHash,
    pub maker_order_hash: OrderHash,
    pub taker: Address,
    pub maker: Address,
    pub action: FillAction,
    pub taker_leg: PositionLeg,
    pub price: Decimal,
    pub amount: Decimal,
    pub collateral: Decimal,
    pub maker_fee: Decimal,
    pub taker_fee: Decimal,
    pub maker_rebate: Decimal,
}

impl Matched {
    pub fn from_result(taker_order_hash: OrderHash, result: &MatchResult) -> Self {
        Self {
            taker_order_hash,
            maker_order_hash: result.maker_order_hash,
            taker: result.taker,
            maker: result.maker,
            action: result.action,
            taker_leg: result.taker_leg,
            price: result.price,
            amount: result.pos_filled_amount,
            collateral: result.collateral_filled_amount,
            maker_fee: result.maker_fee,
            taker_fee: result.taker_fee,
            maker_rebate: result.maker_rebate,
        }
    }
}

/// A whole batch committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSettled {
    pub taker_order_hash: OrderHash,
    pub relayer: Address,
    pub market: Address,
    pub maker_count: usize,
    pub segment_count: usize,
    pub taker_filled: Decimal,
}

/// Where a pool served position tokens or collateral from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolSource {
    Inventory,
    Market,
    MarketPaidInMarketToken,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolMinted {
    pub market: Address,
    pub caller: Address,
    pub qty: Decimal,
    pub source: PoolSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolRedeemed {
    pub market: Address,
    pub caller: Address,
    pub qty: Decimal,
    pub source: PoolSource,
}

/// Enum wrapper for all contract events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractEvent {
    OrderCancelled(OrderCancelled),
    Matched(Matched),
    BatchSettled(BatchSettled),
    PoolMinted(PoolMinted),
    PoolRedeemed(PoolRedeemed),
}
