//! Custody proxy: moves trader funds on behalf of whitelisted callers
//!
//! Traders approve the proxy once per token. The exchange, once whitelisted,
//! settles every token movement through it: pulls with `transfer_from`,
//! payouts of what the proxy itself holds with `transfer`, and mint/redeem
//! either directly on the market or through a minting pool.

use serde::{Deserialize, Serialize};
use tracing::info;
use types::ids::Address;
use types::numeric::Amount;

use crate::errors::{AccessError, CustodyError};
use crate::market::MarketContract;
use crate::pool::MintingPool;
use crate::security::{Ownable, Whitelist};
use crate::token::{TokenBank, UNLIMITED_ALLOWANCE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustodyProxy {
    address: Address,
    ownable: Ownable,
    whitelist: Whitelist,
}

impl CustodyProxy {
    pub fn new(address: Address, owner: Address) -> Self {
        Self {
            address,
            ownable: Ownable::new(owner),
            whitelist: Whitelist::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn owner(&self) -> Option<Address> {
        self.ownable.owner()
    }

    pub fn transfer_ownership(&mut self, caller: &Address, new_owner: Address) -> Result<(), AccessError> {
        self.ownable.transfer_ownership(caller, new_owner)
    }

    // ───────────────────────── Whitelist ─────────────────────────

    /// Allow `member` to move funds through the proxy. Owner-only.
    pub fn add_address(&mut self, caller: &Address, member: Address) -> Result<bool, AccessError> {
        self.ownable.only_owner(caller)?;
        Ok(self.whitelist.add(member))
    }

    pub fn remove_address(&mut self, caller: &Address, member: &Address) -> Result<bool, AccessError> {
        self.ownable.only_owner(caller)?;
        Ok(self.whitelist.remove(member))
    }

    pub fn is_whitelisted(&self, member: &Address) -> bool {
        self.whitelist.contains(member)
    }

    // ───────────────────────── Transfers ─────────────────────────

    /// Pull `amount` of `token` from an account that approved the proxy.
    pub fn transfer_from(
        &self,
        bank: &mut TokenBank,
        caller: &Address,
        token: &Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), CustodyError> {
        self.whitelist.require(caller)?;
        bank.transfer_from(token, self.address, from, to, amount)?;
        Ok(())
    }

    /// Pay out of the proxy's own balance.
    pub fn transfer(
        &self,
        bank: &mut TokenBank,
        caller: &Address,
        token: &Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), CustodyError> {
        self.whitelist.require(caller)?;
        bank.transfer(token, self.address, to, amount)?;
        Ok(())
    }

    // ───────────────────────── Position tokens ─────────────────────────

    /// Mint `qty` pairs to the proxy, paying from the proxy's collateral.
    #[allow(clippy::too_many_arguments)]
    pub fn mint_position_tokens(
        &self,
        bank: &mut TokenBank,
        caller: &Address,
        market: &dyn MarketContract,
        pool: Option<&mut MintingPool>,
        qty: Amount,
        pay_in_market_token: bool,
        now: u64,
    ) -> Result<(), CustodyError> {
        self.whitelist.require(caller)?;
        match pool {
            Some(pool) => {
                pool.mint_position_tokens(bank, market, self.address, qty, pay_in_market_token, now)?;
            }
            None => market.mint_position_tokens(bank, self.address, qty, false, now)?,
        }
        Ok(())
    }

    /// Redeem `qty` pairs held by the proxy for collateral.
    pub fn redeem_position_tokens(
        &self,
        bank: &mut TokenBank,
        caller: &Address,
        market: &dyn MarketContract,
        pool: Option<&mut MintingPool>,
        qty: Amount,
    ) -> Result<(), CustodyError> {
        self.whitelist.require(caller)?;
        match pool {
            Some(pool) => {
                pool.redeem_position_tokens(bank, market, self.address, qty)?;
            }
            None => market.redeem_position_tokens(bank, self.address, qty)?,
        }
        Ok(())
    }

    // ───────────────────────── Owner ─────────────────────────

    /// Let the market's collateral pool pull collateral and market token from
    /// the proxy when minting directly.
    pub fn approve_market(
        &self,
        caller: &Address,
        bank: &mut TokenBank,
        market: &dyn MarketContract,
    ) -> Result<(), CustodyError> {
        self.ownable.only_owner(caller)?;
        let spender = market.collateral_pool();
        bank.approve(&market.collateral_token(), self.address, spender, UNLIMITED_ALLOWANCE)?;
        bank.approve(&market.market_token(), self.address, spender, UNLIMITED_ALLOWANCE)?;
        Ok(())
    }

    /// Let a minting pool pull collateral and both legs from the proxy.
    pub fn approve_pool(
        &self,
        caller: &Address,
        bank: &mut TokenBank,
        market: &dyn MarketContract,
        pool: Address,
    ) -> Result<(), CustodyError> {
        self.ownable.only_owner(caller)?;
        for token in [market.collateral_token(), market.long_token(), market.short_token()] {
            bank.approve(&token, self.address, pool, UNLIMITED_ALLOWANCE)?;
        }
        Ok(())
    }

    pub fn withdraw_collateral(
        &self,
        caller: &Address,
        bank: &mut TokenBank,
        market: &dyn MarketContract,
        to: Address,
        amount: Amount,
    ) -> Result<(), CustodyError> {
        self.ownable.only_owner(caller)?;
        bank.transfer(&market.collateral_token(), self.address, to, amount)?;
        info!(proxy = %self.address, to = %to, amount = %amount, "collateral withdrawn");
        Ok(())
    }
}
