//! Order model
//!
//! Signed orders, their packed 32-byte data word, canonical hashing and
//! the fillability states an order can be observed in.
//!
//! Layout of the packed order data word:
//!
//! | bytes  | field                                   |
//! |--------|-----------------------------------------|
//! | 0      | version (1 explicit leg, 2 balance)     |
//! | 1      | side (0 buy, 1 sell)                    |
//! | 2      | type (0 limit, 1 market)                |
//! | 3..8   | expiry, unix seconds                    |
//! | 8..10  | maker fee rate                          |
//! | 10..12 | taker fee rate                          |
//! | 12..14 | maker rebate rate                       |
//! | 14..22 | salt                                    |
//! | 22     | maker only                              |
//! | 23     | position leg (version 1 only)           |
//! | 24..32 | zero                                    |

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::OrderDataError;
use crate::ids::{Address, OrderHash};

/// Domain tag mixed into every order hash.
pub const ORDER_HASH_DOMAIN: &[u8] = b"position-exchange/order/v2";

/// Largest expiry representable in the 40-bit expiry field.
pub const MAX_EXPIRED_AT: u64 = (1 << 40) - 1;

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// Leg acquired when the order opens a new position.
    pub fn opening_leg(&self) -> PositionLeg {
        match self {
            Side::Buy => PositionLeg::Long,
            Side::Sell => PositionLeg::Short,
        }
    }

    /// Leg disposed of when the order closes an existing position.
    pub fn closing_leg(&self) -> PositionLeg {
        match self {
            Side::Buy => PositionLeg::Short,
            Side::Sell => PositionLeg::Long,
        }
    }

    /// 0 for buy, 1 for sell.
    pub fn as_bit(&self) -> u8 {
        match self {
            Side::Buy => 0,
            Side::Sell => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    Limit,
    Market,
}

/// One of the two complementary position tokens of a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionLeg {
    Long,
    Short,
}

impl PositionLeg {
    pub fn other(&self) -> Self {
        match self {
            PositionLeg::Long => PositionLeg::Short,
            PositionLeg::Short => PositionLeg::Long,
        }
    }
}

/// How an order decides between opening and closing a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "version", content = "leg")]
pub enum ProtocolVersion {
    /// Version 1: the order names the leg it trades. Buying long or selling
    /// short opens; buying short or selling long closes.
    ExplicitLeg(PositionLeg),
    /// Version 2: the order closes whatever it holds of its closing leg
    /// first, then opens for the remainder.
    BalanceDriven,
}

/// Unpacked order data word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderData {
    pub version: ProtocolVersion,
    pub side: Side,
    pub order_type: OrderType,
    /// Unix seconds; the order is fillable strictly before this instant.
    pub expired_at: u64,
    pub maker_fee_rate: u16,
    pub taker_fee_rate: u16,
    pub maker_rebate_rate: u16,
    pub salt: u64,
    pub maker_only: bool,
}

impl OrderData {
    /// Version 2 limit order data with no fees.
    pub fn new(side: Side, expired_at: u64, salt: u64) -> Self {
        Self {
            version: ProtocolVersion::BalanceDriven,
            side,
            order_type: OrderType::Limit,
            expired_at,
            maker_fee_rate: 0,
            taker_fee_rate: 0,
            maker_rebate_rate: 0,
            salt,
            maker_only: false,
        }
    }

    pub fn is_market_order(&self) -> bool {
        self.order_type == OrderType::Market
    }

    pub fn pack(&self) -> Result<[u8; 32], OrderDataError> {
        if self.expired_at > MAX_EXPIRED_AT {
            return Err(OrderDataError::ExpiryOutOfRange(self.expired_at));
        }
        Ok(self.encode())
    }

    /// The packed word with the expiry truncated to its low 40 bits.
    fn encode(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        let (version, leg) = match self.version {
            ProtocolVersion::ExplicitLeg(PositionLeg::Short) => (1, 0),
            ProtocolVersion::ExplicitLeg(PositionLeg::Long) => (1, 1),
            ProtocolVersion::BalanceDriven => (2, 0),
        };
        word[0] = version;
        word[1] = self.side.as_bit();
        word[2] = match self.order_type {
            OrderType::Limit => 0,
            OrderType::Market => 1,
        };
        word[3..8].copy_from_slice(&self.expired_at.to_be_bytes()[3..8]);
        word[8..10].copy_from_slice(&self.maker_fee_rate.to_be_bytes());
        word[10..12].copy_from_slice(&self.taker_fee_rate.to_be_bytes());
        word[12..14].copy_from_slice(&self.maker_rebate_rate.to_be_bytes());
        word[14..22].copy_from_slice(&self.salt.to_be_bytes());
        word[22] = u8::from(self.maker_only);
        word[23] = leg;
        word
    }

    pub fn unpack(word: &[u8; 32]) -> Result<Self, OrderDataError> {
        if word[24..].iter().any(|b| *b != 0) {
            return Err(OrderDataError::NonZeroPadding);
        }
        let version = match (word[0], word[23]) {
            (1, 0) => ProtocolVersion::ExplicitLeg(PositionLeg::Short),
            (1, 1) => ProtocolVersion::ExplicitLeg(PositionLeg::Long),
            (1, value) => return Err(OrderDataError::InvalidFlag { field: "leg", value }),
            (2, 0) => ProtocolVersion::BalanceDriven,
            (2, value) => return Err(OrderDataError::InvalidFlag { field: "leg", value }),
            (other, _) => return Err(OrderDataError::UnknownVersion(other)),
        };
        let side = match word[1] {
            0 => Side::Buy,
            1 => Side::Sell,
            value => return Err(OrderDataError::InvalidFlag { field: "side", value }),
        };
        let order_type = match word[2] {
            0 => OrderType::Limit,
            1 => OrderType::Market,
            value => return Err(OrderDataError::InvalidFlag { field: "type", value }),
        };
        let maker_only = match word[22] {
            0 => false,
            1 => true,
            value => {
                return Err(OrderDataError::InvalidFlag {
                    field: "maker_only",
                    value,
                })
            }
        };

        let mut expiry = [0u8; 8];
        expiry[3..8].copy_from_slice(&word[3..8]);
        let mut salt = [0u8; 8];
        salt.copy_from_slice(&word[14..22]);

        Ok(Self {
            version,
            side,
            order_type,
            expired_at: u64::from_be_bytes(expiry),
            maker_fee_rate: u16::from_be_bytes([word[8], word[9]]),
            taker_fee_rate: u16::from_be_bytes([word[10], word[11]]),
            maker_rebate_rate: u16::from_be_bytes([word[12], word[13]]),
            salt: u64::from_be_bytes(salt),
            maker_only,
        })
    }
}

/// A signed order. Immutable once signed; identity is its hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub trader: Address,
    pub relayer: Address,
    pub market: Address,
    /// Position amount, raw base units.
    pub amount: Decimal,
    /// Limit price, raw price units. Ignored for market orders.
    pub price: Decimal,
    /// Flat collateral charged on the order's first fill.
    pub gas_amount: Decimal,
    pub data: OrderData,
}

impl Order {
    /// Canonical digest over every field, with the order data hashed as
    /// its packed word.
    ///
    /// Amounts are hashed as their normalized 16-byte decimal encoding, so
    /// equal values with different scales hash identically.
    pub fn hash(&self) -> OrderHash {
        let mut hasher = Sha256::new();
        hasher.update(ORDER_HASH_DOMAIN);
        hasher.update(self.trader.as_bytes());
        hasher.update(self.relayer.as_bytes());
        hasher.update(self.market.as_bytes());
        hasher.update(self.amount.normalize().serialize());
        hasher.update(self.price.normalize().serialize());
        hasher.update(self.gas_amount.normalize().serialize());

        hasher.update(self.data.encode());
        // Expiry bits above the packed field; zero for every packable order.
        hasher.update(&(self.data.expired_at >> 40).to_be_bytes()[5..8]);

        OrderHash::new(hasher.finalize().into())
    }

    pub fn side(&self) -> Side {
        self.data.side
    }
}

/// Detached signature over an order hash. Both fields are hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSignature {
    pub public_key: String,
    pub signature: String,
}

/// Order plus its signature, as submitted for matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderParam {
    pub order: Order,
    pub signature: OrderSignature,
}

/// Addresses shared by every order of one match call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAddressSet {
    pub market: Address,
    pub relayer: Address,
}

/// Observed fillability of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Fillable,
    Expired,
    Cancelled,
    FullyFilled,
}

impl OrderStatus {
    /// Status given the order, its cumulative fill and cancellation flag.
    ///
    /// Cancellation wins over expiry, expiry over a full fill.
    pub fn evaluate(order: &Order, filled: Decimal, cancelled: bool, now: u64) -> Self {
        if cancelled {
            OrderStatus::Cancelled
        } else if now >= order.data.expired_at {
            OrderStatus::Expired
        } else if filled >= order.amount {
            OrderStatus::FullyFilled
        } else {
            OrderStatus::Fillable
        }
    }

    pub fn is_fillable(&self) -> bool {
        *self == OrderStatus::Fillable
    }
}
