//! Contract logic for the position token exchange
//!
//! A relayer submits one taker order and a list of maker orders with fill
//! amounts. The exchange verifies the orders, splits every pairing into
//! Buy/Sell/Mint/Redeem segments against the traders' position holdings,
//! and settles them through a custody proxy in one atomic step.
//!
//! # Modules
//! - `token`: In-memory fungible token bank (balances, allowances, minters)
//! - `market`: Market definition trait and the collateralised reference market
//! - `security`: Ownership and caller whitelists
//! - `signature`: Order signature verification (ed25519)
//! - `config`: Exchange configuration
//! - `context`: Per-call order context derived from the market
//! - `ledger`: Cumulative fills and cancellations per order hash
//! - `planner`: Batch validation and segment planning
//! - `settlement`: Token movements for planned segments
//! - `custody`: Custody proxy moving trader funds
//! - `pool`: Minting pool with position and collateral inventory
//! - `exchange`: Matching, cancellation and introspection entry points
//! - `events`: Contract events
//! - `errors`: Contract-specific error types

pub mod config;
pub mod context;
pub mod custody;
pub mod errors;
pub mod events;
pub mod exchange;
pub mod ledger;
pub mod market;
pub mod planner;
pub mod pool;
pub mod security;
pub mod settlement;
pub mod signature;
pub mod token;

/// Contract ABI version, frozen after release
pub const CONTRACT_ABI_VERSION: &str = "2.0.0";
