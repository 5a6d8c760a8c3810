//! Fill ledger: cumulative filled amount and cancellation per order hash
//!
//! The only state shared between match calls. Fills of a batch are staged in
//! a `FillStage` and written back with `commit` once every token movement of
//! the batch has succeeded.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use types::errors::MathError;
use types::ids::OrderHash;
use types::numeric::{safe_add, saturating_sub, Amount};
use types::order::{Order, OrderStatus};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FillLedger {
    filled: HashMap<OrderHash, Amount>,
    cancelled: HashSet<OrderHash>,
}

impl FillLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filled(&self, hash: &OrderHash) -> Amount {
        self.filled.get(hash).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn is_cancelled(&self, hash: &OrderHash) -> bool {
        self.cancelled.contains(hash)
    }

    /// Unfilled amount, zero once fully filled.
    pub fn remaining(&self, order: &Order, hash: &OrderHash) -> Amount {
        saturating_sub(order.amount, self.filled(hash))
    }

    pub fn status(&self, order: &Order, hash: &OrderHash, now: u64) -> OrderStatus {
        OrderStatus::evaluate(order, self.filled(hash), self.is_cancelled(hash), now)
    }

    /// Mark cancelled. Returns `false` if it already was.
    pub fn cancel(&mut self, hash: OrderHash) -> bool {
        self.cancelled.insert(hash)
    }

    /// Write staged cumulative totals back.
    pub fn commit(&mut self, stage: FillStage) {
        self.filled.extend(stage.totals);
    }
}

/// Cumulative fills of one batch, read through to the ledger.
#[derive(Debug, Clone, Default)]
pub struct FillStage {
    totals: HashMap<OrderHash, Amount>,
}

impl FillStage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filled(&self, ledger: &FillLedger, hash: &OrderHash) -> Amount {
        self.totals
            .get(hash)
            .copied()
            .unwrap_or_else(|| ledger.filled(hash))
    }

    /// Add `amount` to the order's cumulative fill and return the new total.
    ///
    /// Overmatch is checked by the caller, which owns the error reporting.
    pub fn record_fill(
        &mut self,
        ledger: &FillLedger,
        hash: OrderHash,
        amount: Amount,
    ) -> Result<Amount, MathError> {
        let total = safe_add(self.filled(ledger, &hash), amount)?;
        self.totals.insert(hash, total);
        Ok(total)
    }
}
