//! Types library for the position token exchange
//!
//! Core type definitions shared by the contract crates: identifiers,
//! fixed-point raw amounts, the signed order model, fees and match results.
//!
//! # Modules
//! - `ids`: Addresses and order hashes
//! - `numeric`: Raw integer amounts and checked fixed-point math
//! - `order`: Orders, packed order data, fillability
//! - `fee`: Fee rates, fee basis, rebates
//! - `trade`: Fill actions and match results
//! - `errors`: Error taxonomy

pub mod errors;
pub mod fee;
pub mod ids;
pub mod numeric;
pub mod order;
pub mod trade;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::errors::*;
    pub use crate::fee::*;
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::order::*;
    pub use crate::trade::*;
}
