//! Contract-specific error types
//!
//! One enum per contract, plus `ExchangeError` for the matching entry points.
//! Every `ExchangeError` carries a stable reason code.

use thiserror::Error;
use types::errors::{MathError, OrderDataError};
use types::ids::{Address, OrderHash};
use types::order::OrderStatus;

/// Ownership and whitelist failures shared by every owned contract.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AccessError {
    #[error("NOT_OWNER: {caller}")]
    NotOwner { caller: Address },

    #[error("INVALID_OWNER: new owner must not be the zero address")]
    ZeroOwner,

    #[error("SENDER_NOT_IN_WHITELIST: {caller}")]
    NotWhitelisted { caller: Address },
}

/// Fungible token ledger errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TokenError {
    #[error("Unknown token: {token}")]
    UnknownToken { token: Address },

    #[error("Token already registered: {token}")]
    AlreadyRegistered { token: Address },

    #[error("Insufficient balance of {token} for {owner}: required {required}, available {available}")]
    InsufficientBalance {
        token: Address,
        owner: Address,
        required: String,
        available: String,
    },

    #[error("Insufficient allowance of {token} from {owner} to {spender}: required {required}, available {available}")]
    InsufficientAllowance {
        token: Address,
        owner: Address,
        spender: Address,
        required: String,
        available: String,
    },

    #[error("Caller {caller} is not a minter of {token}")]
    NotMinter { token: Address, caller: Address },

    #[error("Math error: {0}")]
    Math(#[from] MathError),
}

/// Market definition errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketError {
    #[error("MP_EXPIRED: market {market} expired at {expiration}")]
    Expired { market: Address, expiration: u64 },

    #[error("Invalid market parameters: {reason}")]
    InvalidParameters { reason: String },

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Math error: {0}")]
    Math(#[from] MathError),
}

/// Custody proxy errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CustodyError {
    #[error("Access error: {0}")]
    Access(#[from] AccessError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Market error: {0}")]
    Market(#[from] MarketError),

    #[error("Pool error: {0}")]
    Pool(#[from] PoolError),
}

/// Minting pool errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PoolError {
    #[error("Access error: {0}")]
    Access(#[from] AccessError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Market error: {0}")]
    Market(#[from] MarketError),

    #[error("Math error: {0}")]
    Math(#[from] MathError),

    #[error("Amount must be positive")]
    InvalidAmount,
}

/// Matching, settlement and cancellation failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExchangeError {
    #[error("INVALID_SENDER: {caller} is not the relayer")]
    InvalidSender { caller: Address },

    #[error("INVALID_ORDER_RELAYER: order {order_hash}")]
    InvalidOrderRelayer { order_hash: OrderHash },

    #[error("INVALID_MARKET: {market}")]
    InvalidMarket { market: Address },

    #[error("MARKET_NOT_REGISTERED: {market}")]
    MarketNotRegistered { market: Address },

    #[error("MP_EXPIRED: market {market} expired at {expiration}")]
    MarketExpired { market: Address, expiration: u64 },

    #[error("INVALID_ORDER_DATA: order {order_hash}: {source}")]
    InvalidOrderData {
        order_hash: OrderHash,
        source: OrderDataError,
    },

    #[error("INVALID_SIGNATURE: order {order_hash}")]
    InvalidSignature { order_hash: OrderHash },

    #[error("ORDER_IS_NOT_FILLABLE: order {order_hash} is {status:?}")]
    OrderNotFillable {
        order_hash: OrderHash,
        status: OrderStatus,
    },

    #[error("MAKER_ORDER_CAN_NOT_BE_MARKET_ORDER: order {order_hash}")]
    MakerOrderIsMarketOrder { order_hash: OrderHash },

    #[error("MAKER_ONLY_ORDER_CANNOT_BE_TAKER: order {order_hash}")]
    MakerOnlyTaker { order_hash: OrderHash },

    #[error("INVALID_SIDE: maker {order_hash} is on the taker's side")]
    InvalidSide { order_hash: OrderHash },

    #[error("INVALID_MATCH: maker price {maker_price} does not cross taker price {taker_price}")]
    PriceMismatch {
        taker_price: String,
        maker_price: String,
    },

    #[error("PRICE_OUT_OF_RANGE: {price} outside [{floor}, {cap}]")]
    PriceOutOfRange {
        price: String,
        floor: String,
        cap: String,
    },

    #[error("INVALID_FILL_AMOUNT: {amount}")]
    InvalidFillAmount { amount: String },

    #[error("TAKER_ORDER_OVER_MATCH: order {order_hash} filled {filled} + {requested} > {amount}")]
    TakerOverMatch {
        order_hash: OrderHash,
        filled: String,
        requested: String,
        amount: String,
    },

    #[error("MAKER_ORDER_OVER_MATCH: order {order_hash} filled {filled} + {requested} > {amount}")]
    MakerOverMatch {
        order_hash: OrderHash,
        filled: String,
        requested: String,
        amount: String,
    },

    #[error("LENGTH_MISMATCH: {makers} maker orders, {amounts} fill amounts")]
    LengthMismatch { makers: usize, amounts: usize },

    #[error("EMPTY_BATCH: no maker orders")]
    EmptyBatch,

    #[error("INVALID_TRADER: {caller} may not cancel order {order_hash}")]
    InvalidTrader {
        caller: Address,
        order_hash: OrderHash,
    },

    #[error("ORDER_NOT_CANCELLABLE: order {order_hash} is {status:?}")]
    OrderNotCancellable {
        order_hash: OrderHash,
        status: OrderStatus,
    },

    #[error("Access error: {0}")]
    Access(#[from] AccessError),

    #[error("Math error: {0}")]
    Math(#[from] MathError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Market error: {0}")]
    Market(#[from] MarketError),

    #[error("Custody error: {0}")]
    Custody(#[from] CustodyError),

    #[error("Pool error: {0}")]
    Pool(#[from] PoolError),
}

impl ExchangeError {
    /// Stable reason code surfaced to relayers.
    pub fn code(&self) -> &'static str {
        match self {
            ExchangeError::InvalidSender { .. } => "INVALID_SENDER",
            ExchangeError::InvalidOrderRelayer { .. } => "INVALID_ORDER_RELAYER",
            ExchangeError::InvalidMarket { .. } => "INVALID_MARKET",
            ExchangeError::MarketNotRegistered { .. } => "MARKET_NOT_REGISTERED",
            ExchangeError::MarketExpired { .. } => "MP_EXPIRED",
            ExchangeError::InvalidOrderData { .. } => "INVALID_ORDER_DATA",
            ExchangeError::InvalidSignature { .. } => "INVALID_SIGNATURE",
            ExchangeError::OrderNotFillable { .. } => "ORDER_IS_NOT_FILLABLE",
            ExchangeError::MakerOrderIsMarketOrder { .. } => "MAKER_ORDER_CAN_NOT_BE_MARKET_ORDER",
            ExchangeError::MakerOnlyTaker { .. } => "MAKER_ONLY_ORDER_CANNOT_BE_TAKER",
            ExchangeError::InvalidSide { .. } => "INVALID_SIDE",
            ExchangeError::PriceMismatch { .. } => "INVALID_MATCH",
            ExchangeError::PriceOutOfRange { .. } => "PRICE_OUT_OF_RANGE",
            ExchangeError::InvalidFillAmount { .. } => "INVALID_FILL_AMOUNT",
            ExchangeError::TakerOverMatch { .. } => "TAKER_ORDER_OVER_MATCH",
            ExchangeError::MakerOverMatch { .. } => "MAKER_ORDER_OVER_MATCH",
            ExchangeError::LengthMismatch { .. } => "LENGTH_MISMATCH",
            ExchangeError::EmptyBatch => "EMPTY_BATCH",
            ExchangeError::InvalidTrader { .. } => "INVALID_TRADER",
            ExchangeError::OrderNotCancellable { .. } => "ORDER_NOT_CANCELLABLE",
            ExchangeError::Access(AccessError::NotOwner { .. }) => "NOT_OWNER",
            ExchangeError::Access(AccessError::ZeroOwner) => "INVALID_OWNER",
            ExchangeError::Access(AccessError::NotWhitelisted { .. }) => "SENDER_NOT_IN_WHITELIST",
            ExchangeError::Math(MathError::RoundingError { .. }) => "ROUNDING_ERROR",
            ExchangeError::Math(_) => "MATH_ERROR",
            ExchangeError::Market(MarketError::Expired { .. }) => "MP_EXPIRED",
            ExchangeError::Token(_)
            | ExchangeError::Market(_)
            | ExchangeError::Custody(_)
            | ExchangeError::Pool(_) => "TOKEN_TRANSFER_FAILED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_error_display() {
        let err = TokenError::InsufficientBalance {
            token: Address::ZERO,
            owner: Address::ZERO,
            required: "5".to_string(),
            available: "1".to_string(),
        };
        assert!(err.to_string().contains("required 5"));
    }

    #[test]
    fn test_exchange_error_codes() {
        let hash = OrderHash::new([0u8; 32]);
        assert_eq!(
            ExchangeError::MakerOrderIsMarketOrder { order_hash: hash }.code(),
            "MAKER_ORDER_CAN_NOT_BE_MARKET_ORDER"
        );
        assert_eq!(
            ExchangeError::TakerOverMatch {
                order_hash: hash,
                filled: "0".to_string(),
                requested: "2".to_string(),
                amount: "1".to_string(),
            }
            .code(),
            "TAKER_ORDER_OVER_MATCH"
        );
        assert_eq!(ExchangeError::EmptyBatch.code(), "EMPTY_BATCH");
        assert_eq!(
            ExchangeError::InvalidOrderData {
                order_hash: hash,
                source: OrderDataError::ExpiryOutOfRange(1 << 41),
            }
            .code(),
            "INVALID_ORDER_DATA"
        );
    }

    #[test]
    fn test_nested_error_codes() {
        let rounding: ExchangeError = MathError::RoundingError {
            numerator: "1".to_string(),
            denominator: "1998".to_string(),
            target: "2000".to_string(),
        }
        .into();
        assert_eq!(rounding.code(), "ROUNDING_ERROR");

        let owner: ExchangeError = AccessError::NotOwner {
            caller: Address::ZERO,
        }
        .into();
        assert_eq!(owner.code(), "NOT_OWNER");

        let token: ExchangeError = TokenError::UnknownToken {
            token: Address::ZERO,
        }
        .into();
        assert_eq!(token.code(), "TOKEN_TRANSFER_FAILED");
    }

    #[test]
    fn test_custody_error_from_token() {
        let err: CustodyError = TokenError::UnknownToken {
            token: Address::ZERO,
        }
        .into();
        assert!(matches!(err, CustodyError::Token(_)));
    }

    #[test]
    fn test_message_carries_code() {
        let err = ExchangeError::MarketExpired {
            market: Address::ZERO,
            expiration: 10,
        };
        assert!(err.to_string().starts_with("MP_EXPIRED"));
    }
}
