//! Exchange: matching, settlement and cancellation entry points
//!
//! Owns the fill ledger, the custody proxy and an optional minting pool.
//! A match call plans against committed state, settles on a staged copy of
//! the token bank and pool, and commits bank, pool and fills together.
//! Any failure leaves every piece of state as it was.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use types::ids::{Address, OrderHash};
use types::numeric::Amount;
use types::order::{Order, OrderStatus};
use types::trade::MatchResult;

use crate::config::{CancelPolicy, ExchangeConfig};
use crate::context::OrderContext;
use crate::custody::CustodyProxy;
use crate::errors::{AccessError, ExchangeError};
use crate::events::{BatchSettled, ContractEvent, Matched, OrderCancelled};
use crate::ledger::FillLedger;
use crate::market::MarketContract;
use crate::planner::{MatchPlan, MatchPlanner, MatchRequest};
use crate::pool::MintingPool;
use crate::security::Ownable;
use crate::settlement::SettlementExecutor;
use crate::signature::{Ed25519Verifier, SignatureVerifier};
use crate::token::TokenBank;

/// Fill state of a single order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderInfo {
    pub order_hash: OrderHash,
    pub status: OrderStatus,
    pub filled_amount: Amount,
}

#[derive(Debug)]
pub struct Exchange<V: SignatureVerifier = Ed25519Verifier> {
    address: Address,
    config: ExchangeConfig,
    ownable: Ownable,
    ledger: FillLedger,
    verifier: V,
    proxy: CustodyProxy,
    pool: Option<MintingPool>,
    /// Emitted events log (append-only)
    events: Vec<ContractEvent>,
}

impl Exchange<Ed25519Verifier> {
    pub fn with_ed25519(address: Address, owner: Address, config: ExchangeConfig, proxy: CustodyProxy) -> Self {
        Self::new(address, owner, config, proxy, Ed25519Verifier)
    }
}

impl<V: SignatureVerifier> Exchange<V> {
    /// The proxy must whitelist `address` before the first match.
    pub fn new(
        address: Address,
        owner: Address,
        config: ExchangeConfig,
        proxy: CustodyProxy,
        verifier: V,
    ) -> Self {
        Self {
            address,
            config,
            ownable: Ownable::new(owner),
            ledger: FillLedger::new(),
            verifier,
            proxy,
            pool: None,
            events: Vec::new(),
        }
    }

    /// Route mints and redemptions through `pool`. The pool must whitelist
    /// the proxy.
    pub fn with_pool(mut self, pool: MintingPool) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    pub fn proxy(&self) -> &CustodyProxy {
        &self.proxy
    }

    pub fn proxy_mut(&mut self) -> &mut CustodyProxy {
        &mut self.proxy
    }

    pub fn pool(&self) -> Option<&MintingPool> {
        self.pool.as_ref()
    }

    pub fn pool_mut(&mut self) -> Option<&mut MintingPool> {
        self.pool.as_mut()
    }

    // ───────────────────────── Owner ─────────────────────────

    pub fn update_config(&mut self, caller: &Address, config: ExchangeConfig) -> Result<(), AccessError> {
        self.ownable.only_owner(caller)?;
        info!(exchange = %self.address, "config updated");
        self.config = config;
        Ok(())
    }

    pub fn transfer_ownership(&mut self, caller: &Address, new_owner: Address) -> Result<(), AccessError> {
        self.ownable.transfer_ownership(caller, new_owner)
    }

    // ───────────────────────── Matching ─────────────────────────

    /// Match a taker against makers and settle every segment atomically.
    pub fn match_orders(
        &mut self,
        bank: &mut TokenBank,
        market: &dyn MarketContract,
        request: &MatchRequest<'_>,
    ) -> Result<Vec<MatchResult>, ExchangeError> {
        let outcome = self.try_match(bank, market, request);
        if let Err(err) = &outcome {
            warn!(
                code = err.code(),
                error = %err,
                relayer = %request.asset.relayer,
                market = %request.asset.market,
                "match rejected"
            );
        }
        outcome
    }

    fn try_match(
        &mut self,
        bank: &mut TokenBank,
        market: &dyn MarketContract,
        request: &MatchRequest<'_>,
    ) -> Result<Vec<MatchResult>, ExchangeError> {
        let MatchPlan {
            taker_hash,
            context,
            results,
            fills,
            taker_filled,
        } = self.plan(bank, market, request)?;

        let mut staged_bank = bank.clone();
        let mut staged_pool = self.pool.clone();
        SettlementExecutor::new(
            &context,
            market,
            &self.proxy,
            staged_pool.as_mut(),
            self.address,
            request.asset.relayer,
            self.config.pool_pays_in_market_token,
            request.now,
        )
        .settle(&mut staged_bank, &results)?;

        *bank = staged_bank;
        self.pool = staged_pool;
        self.ledger.commit(fills);

        self.events.extend(
            results
                .iter()
                .map(|r| ContractEvent::Matched(Matched::from_result(taker_hash, r))),
        );
        self.events.push(ContractEvent::BatchSettled(BatchSettled {
            taker_order_hash: taker_hash,
            relayer: request.asset.relayer,
            market: context.market,
            maker_count: request.makers.len(),
            segment_count: results.len(),
            taker_filled,
        }));
        info!(
            taker_order = %taker_hash,
            market = %context.market,
            makers = request.makers.len(),
            segments = results.len(),
            filled = %taker_filled,
            "batch settled"
        );
        Ok(results)
    }

    fn plan(
        &self,
        bank: &TokenBank,
        market: &dyn MarketContract,
        request: &MatchRequest<'_>,
    ) -> Result<MatchPlan, ExchangeError> {
        MatchPlanner::new(&self.config, &self.ledger, &self.verifier, bank, market).plan(request)
    }

    // ───────────────────────── Cancellation ─────────────────────────

    /// Cancel `order`. Only its trader or its relayer may.
    ///
    /// Returns `true` when the order became cancelled by this call.
    pub fn cancel_order(&mut self, caller: &Address, order: &Order, now: u64) -> Result<bool, ExchangeError> {
        let order_hash = order.hash();
        if *caller != order.trader && *caller != order.relayer {
            return Err(ExchangeError::InvalidTrader {
                caller: *caller,
                order_hash,
            });
        }

        let status = self.ledger.status(order, &order_hash, now);
        if matches!(status, OrderStatus::Cancelled | OrderStatus::FullyFilled) {
            return match self.config.cancel_policy {
                CancelPolicy::Idempotent => Ok(false),
                CancelPolicy::Strict => Err(ExchangeError::OrderNotCancellable { order_hash, status }),
            };
        }

        self.ledger.cancel(order_hash);
        self.events.push(ContractEvent::OrderCancelled(OrderCancelled {
            order_hash,
            cancelled_by: *caller,
        }));
        info!(order = %order_hash, by = %caller, "order cancelled");
        Ok(true)
    }

    // ───────────────────────── Introspection ─────────────────────────

    pub fn get_order_context(
        &self,
        market: &dyn MarketContract,
        taker: &Order,
        now: u64,
    ) -> Result<OrderContext, ExchangeError> {
        OrderContext::resolve(&self.config, market, taker.market, taker, now)
    }

    pub fn get_order_info(&self, order: &Order, now: u64) -> OrderInfo {
        let order_hash = order.hash();
        OrderInfo {
            order_hash,
            status: self.ledger.status(order, &order_hash, now),
            filled_amount: self.ledger.filled(&order_hash),
        }
    }

    /// Plan a match without settling it.
    pub fn get_match_results(
        &self,
        bank: &TokenBank,
        market: &dyn MarketContract,
        request: &MatchRequest<'_>,
    ) -> Result<Vec<MatchResult>, ExchangeError> {
        Ok(self.plan(bank, market, request)?.results)
    }

    pub fn filled(&self, order_hash: &OrderHash) -> Amount {
        self.ledger.filled(order_hash)
    }

    pub fn is_cancelled(&self, order_hash: &OrderHash) -> bool {
        self.ledger.is_cancelled(order_hash)
    }

    pub fn events(&self) -> &[ContractEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<ContractEvent> {
        std::mem::take(&mut self.events)
    }
}
