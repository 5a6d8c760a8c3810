//! Exchange configuration
//!
//! Passed at construction; replaceable only by the exchange owner.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use types::fee::FeeBasis;
use types::ids::Address;

/// What cancelling an order that can no longer fill does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelPolicy {
    /// Cancelling again, or cancelling a fully filled order, succeeds and
    /// changes nothing.
    #[default]
    Idempotent,
    /// Both cases fail with `ORDER_NOT_CANCELLABLE`.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    pub fee_basis: FeeBasis,
    /// Markets orders may trade on. `None` accepts any market.
    pub allowed_markets: Option<BTreeSet<Address>>,
    pub cancel_policy: CancelPolicy,
    /// Only the batch relayer may submit a match.
    pub require_relayer_sender: bool,
    /// Let the minting pool pay the market fee in the market token when it
    /// holds enough of it.
    pub pool_pays_in_market_token: bool,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            fee_basis: FeeBasis::MidCollateral,
            allowed_markets: None,
            cancel_policy: CancelPolicy::Idempotent,
            require_relayer_sender: true,
            pool_pays_in_market_token: true,
        }
    }
}

impl ExchangeConfig {
    pub fn is_market_allowed(&self, market: &Address) -> bool {
        self.allowed_markets
            .as_ref()
            .map_or(true, |markets| markets.contains(market))
    }
}
