//! Settlement executor
//!
//! Applies planned match results to a token bank through the custody proxy.
//! The bank handed in is the exchange's staged copy; the caller commits it
//! only when every result of the batch has settled.
//!
//! Per result, in order:
//! 1. Position movement (Buy, Sell, Redeem) or margin collection (Mint)
//! 2. Trading fees and gas to the relayer, maker rebate from the relayer
//! 3. For Mint: mint fee from the relayer, mint, delivery of both legs

use tracing::debug;
use types::ids::Address;
use types::numeric::{safe_add, safe_mul, safe_sub, Amount};
use types::trade::{FillAction, MatchResult};

use crate::context::OrderContext;
use crate::errors::ExchangeError;
use crate::custody::CustodyProxy;
use crate::market::MarketContract;
use crate::pool::MintingPool;
use crate::token::TokenBank;

pub struct SettlementExecutor<'a> {
    context: &'a OrderContext,
    market: &'a dyn MarketContract,
    proxy: &'a CustodyProxy,
    pool: Option<&'a mut MintingPool>,
    /// Identity the exchange presents to the proxy.
    operator: Address,
    relayer: Address,
    pool_pays_in_market_token: bool,
    now: u64,
}

impl<'a> SettlementExecutor<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        context: &'a OrderContext,
        market: &'a dyn MarketContract,
        proxy: &'a CustodyProxy,
        pool: Option<&'a mut MintingPool>,
        operator: Address,
        relayer: Address,
        pool_pays_in_market_token: bool,
        now: u64,
    ) -> Self {
        Self {
            context,
            market,
            proxy,
            pool,
            operator,
            relayer,
            pool_pays_in_market_token,
            now,
        }
    }

    pub fn settle(&mut self, bank: &mut TokenBank, results: &[MatchResult]) -> Result<(), ExchangeError> {
        for result in results {
            self.settle_result(bank, result)?;
        }
        Ok(())
    }

    fn settle_result(&mut self, bank: &mut TokenBank, result: &MatchResult) -> Result<(), ExchangeError> {
        let ctx = self.context;
        let collateral = ctx.collateral_token;
        let proxy = self.proxy.address();
        let amount = result.pos_filled_amount;
        let taker_leg = ctx.leg_token(result.taker_leg);
        let maker_leg = ctx.leg_token(result.maker_leg());

        match result.action {
            FillAction::Buy => {
                self.pull(bank, &collateral, result.taker, result.maker, result.collateral_filled_amount)?;
                self.pull(bank, &taker_leg, result.maker, result.taker, amount)?;
            }
            FillAction::Sell => {
                self.pull(bank, &collateral, result.maker, result.taker, result.collateral_filled_amount)?;
                self.pull(bank, &taker_leg, result.taker, result.maker, amount)?;
            }
            FillAction::Redeem => {
                self.pull(bank, &taker_leg, result.taker, proxy, amount)?;
                self.pull(bank, &maker_leg, result.maker, proxy, amount)?;
                self.proxy.redeem_position_tokens(
                    bank,
                    &self.operator,
                    self.market,
                    self.pool.as_deref_mut(),
                    amount,
                )?;
                self.pay(bank, &collateral, result.taker, result.collateral_filled_amount)?;
                self.pay(bank, &collateral, result.maker, self.maker_share(result)?)?;
            }
            FillAction::Mint => {
                self.pull(bank, &collateral, result.taker, proxy, result.collateral_filled_amount)?;
                self.pull(bank, &collateral, result.maker, proxy, self.maker_share(result)?)?;
            }
        }

        let taker_charge = safe_add(result.taker_fee, result.taker_gas_fee)?;
        let maker_charge = safe_add(result.maker_fee, result.maker_gas_fee)?;
        self.pull(bank, &collateral, result.taker, self.relayer, taker_charge)?;
        self.pull(bank, &collateral, result.maker, self.relayer, maker_charge)?;
        self.pull(bank, &collateral, self.relayer, result.maker, result.maker_rebate)?;

        if result.action == FillAction::Mint {
            let mint_fee = safe_mul(ctx.collateral_fee_per_unit, amount)?;
            self.pull(bank, &collateral, self.relayer, proxy, mint_fee)?;
            self.proxy.mint_position_tokens(
                bank,
                &self.operator,
                self.market,
                self.pool.as_deref_mut(),
                amount,
                self.pool_pays_in_market_token,
                self.now,
            )?;
            self.pay(bank, &taker_leg, result.taker, amount)?;
            self.pay(bank, &maker_leg, result.maker, amount)?;
        }

        debug!(
            maker_order = %result.maker_order_hash,
            action = ?result.action,
            amount = %amount,
            "segment settled"
        );
        Ok(())
    }

    /// The maker's part of a pair's collateral on Mint and Redeem.
    fn maker_share(&self, result: &MatchResult) -> Result<Amount, ExchangeError> {
        let pair = safe_mul(self.context.collateral_per_unit, result.pos_filled_amount)?;
        Ok(safe_sub(pair, result.collateral_filled_amount)?)
    }

    fn pull(
        &self,
        bank: &mut TokenBank,
        token: &Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), ExchangeError> {
        self.proxy
            .transfer_from(bank, &self.operator, token, from, to, amount)?;
        Ok(())
    }

    fn pay(&self, bank: &mut TokenBank, token: &Address, to: Address, amount: Amount) -> Result<(), ExchangeError> {
        self.proxy.transfer(bank, &self.operator, token, to, amount)?;
        Ok(())
    }
}
