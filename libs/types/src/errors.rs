//! Error types shared by the exchange crates
//!
//! Fixed-point math, packed order data and identifier parsing failures.

use thiserror::Error;

/// Fixed-point arithmetic errors.
///
/// Every amount in the system is a raw integer, so any of these aborts the
/// operation that produced it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Arithmetic underflow: {lhs} - {rhs}")]
    Underflow { lhs: String, rhs: String },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("ROUNDING_ERROR: {numerator} / {denominator} * {target}")]
    RoundingError {
        numerator: String,
        denominator: String,
        target: String,
    },

    #[error("Amount is not an integral raw value: {value}")]
    NonIntegral { value: String },

    #[error("Amount must not be negative: {value}")]
    Negative { value: String },
}

/// Malformed packed order data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrderDataError {
    #[error("Unknown order data version: {0}")]
    UnknownVersion(u8),

    #[error("Invalid flag byte for {field}: {value}")]
    InvalidFlag { field: &'static str, value: u8 },

    #[error("Expiry {0} does not fit in 40 bits")]
    ExpiryOutOfRange(u64),

    #[error("Trailing padding bytes must be zero")]
    NonZeroPadding,
}

/// Identifier parsing errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IdError {
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    #[error("Invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}
