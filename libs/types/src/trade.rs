//! Match results
//!
//! One result per settlement segment of a maker/taker pairing. Results are
//! computed before any token moves and never outlive the match call.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::{Address, OrderHash};
use crate::order::PositionLeg;

/// How a segment settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FillAction {
    /// Taker opens by taking the maker's existing position tokens.
    Buy,
    /// Taker closes by handing its position tokens to the opening maker.
    Sell,
    /// Both open: a fresh long/short pair is minted from their margins.
    Mint,
    /// Both close: their long/short pair is redeemed for collateral.
    Redeem,
}

impl FillAction {
    /// Action for a segment given whether each side closes a position.
    pub fn from_intents(taker_closes: bool, maker_closes: bool) -> Self {
        match (taker_closes, maker_closes) {
            (true, true) => FillAction::Redeem,
            (true, false) => FillAction::Sell,
            (false, true) => FillAction::Buy,
            (false, false) => FillAction::Mint,
        }
    }

    pub fn taker_closes(&self) -> bool {
        matches!(self, FillAction::Sell | FillAction::Redeem)
    }

    pub fn maker_closes(&self) -> bool {
        matches!(self, FillAction::Buy | FillAction::Redeem)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub maker: Address,
    pub taker: Address,
    pub maker_order_hash: OrderHash,
    pub action: FillAction,
    /// Leg the taker receives (opening) or gives up (closing).
    pub taker_leg: PositionLeg,
    /// Maker's price, raw price units.
    pub price: Decimal,
    pub maker_fee: Decimal,
    pub taker_fee: Decimal,
    pub maker_rebate: Decimal,
    pub maker_gas_fee: Decimal,
    pub taker_gas_fee: Decimal,
    pub pos_filled_amount: Decimal,
    /// Margin of the taker's leg times `pos_filled_amount`. This is the
    /// collateral that changes hands on Buy/Sell, and the taker's share of
    /// the pair's collateral on Mint/Redeem.
    pub collateral_filled_amount: Decimal,
}

impl MatchResult {
    pub fn maker_leg(&self) -> PositionLeg {
        match self.action {
            FillAction::Buy | FillAction::Sell => self.taker_leg,
            FillAction::Mint | FillAction::Redeem => self.taker_leg.other(),
        }
    }
}
