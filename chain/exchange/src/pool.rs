//! Minting pool: position inventory shared by whitelisted callers
//!
//! The pool sits between the custody proxy and the market. It serves mints
//! from its own long/short inventory and redemptions from its own
//! collateral when it can, and only calls the market when it cannot. When
//! allowed and funded, the pool pays the market's mint fee in the market
//! token and keeps the collateral fee the caller paid.

use serde::{Deserialize, Serialize};
use tracing::info;
use types::ids::Address;
use types::numeric::{safe_add, safe_mul, Amount};

use crate::errors::{AccessError, PoolError};
use crate::events::{ContractEvent, PoolMinted, PoolRedeemed, PoolSource};
use crate::market::MarketContract;
use crate::security::{Ownable, Whitelist};
use crate::token::{TokenBank, UNLIMITED_ALLOWANCE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MintingPool {
    address: Address,
    ownable: Ownable,
    whitelist: Whitelist,
    /// Emitted events log (append-only)
    events: Vec<ContractEvent>,
}

impl MintingPool {
    pub fn new(address: Address, owner: Address) -> Self {
        Self {
            address,
            ownable: Ownable::new(owner),
            whitelist: Whitelist::new(),
            events: Vec::new(),
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

    pub fn events(&self) -> &[ContractEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<ContractEvent> {
        std::mem::take(&mut self.events)
    }

    // ───────────────────────── Whitelisted ─────────────────────────

    /// Sell `qty` pairs to `caller` for `qty * (collateral + fee)` collateral.
    pub fn mint_position_tokens(
        &mut self,
        bank: &mut TokenBank,
        market: &dyn MarketContract,
        caller: Address,
        qty: Amount,
        pay_in_market_token: bool,
        now: u64,
    ) -> Result<PoolSource, PoolError> {
        self.whitelist.require(&caller)?;
        require_positive(qty)?;

        let price = safe_add(market.collateral_per_unit(), market.collateral_fee_per_unit())?;
        bank.transfer_from(
            &market.collateral_token(),
            self.address,
            caller,
            self.address,
            safe_mul(qty, price)?,
        )?;

        let source = if self.holds_pairs(bank, market, qty) {
            PoolSource::Inventory
        } else {
            self.mint_from_market(bank, market, qty, pay_in_market_token, now)?
        };

        bank.transfer(&market.long_token(), self.address, caller, qty)?;
        bank.transfer(&market.short_token(), self.address, caller, qty)?;

        info!(pool = %self.address, caller = %caller, qty = %qty, source = ?source, "pool mint");
        self.events.push(ContractEvent::PoolMinted(PoolMinted {
            market: market.address(),
            caller,
            qty,
            source,
        }));
        Ok(source)
    }

    /// Buy back `qty` pairs from `caller` for `qty * collateral_per_unit`.
    pub fn redeem_position_tokens(
        &mut self,
        bank: &mut TokenBank,
        market: &dyn MarketContract,
        caller: Address,
        qty: Amount,
    ) -> Result<PoolSource, PoolError> {
        self.whitelist.require(&caller)?;
        require_positive(qty)?;

        bank.transfer_from(&market.long_token(), self.address, caller, self.address, qty)?;
        bank.transfer_from(&market.short_token(), self.address, caller, self.address, qty)?;

        let payout = safe_mul(qty, market.collateral_per_unit())?;
        let source = if bank.balance_of(&market.collateral_token(), &self.address) >= payout {
            PoolSource::Inventory
        } else {
            market.redeem_position_tokens(bank, self.address, qty)?;
            PoolSource::Market
        };
        bank.transfer(&market.collateral_token(), self.address, caller, payout)?;

        info!(pool = %self.address, caller = %caller, qty = %qty, source = ?source, "pool redeem");
        self.events.push(ContractEvent::PoolRedeemed(PoolRedeemed {
            market: market.address(),
            caller,
            qty,
            source,
        }));
        Ok(source)
    }

    // ───────────────────────── Owner ─────────────────────────

    /// Mint `qty` pairs into the pool's inventory from its own collateral.
    pub fn internal_mint(
        &mut self,
        caller: &Address,
        bank: &mut TokenBank,
        market: &dyn MarketContract,
        qty: Amount,
        pay_in_market_token: bool,
        now: u64,
    ) -> Result<PoolSource, PoolError> {
        self.ownable.only_owner(caller)?;
        require_positive(qty)?;
        self.mint_from_market(bank, market, qty, pay_in_market_token, now)
    }

    /// Redeem `qty` inventory pairs back into collateral.
    pub fn internal_redeem(
        &mut self,
        caller: &Address,
        bank: &mut TokenBank,
        market: &dyn MarketContract,
        qty: Amount,
    ) -> Result<(), PoolError> {
        self.ownable.only_owner(caller)?;
        require_positive(qty)?;
        market.redeem_position_tokens(bank, self.address, qty)?;
        Ok(())
    }

    pub fn withdraw_collateral(
        &mut self,
        caller: &Address,
        bank: &mut TokenBank,
        market: &dyn MarketContract,
        to: Address,
        amount: Amount,
    ) -> Result<(), PoolError> {
        self.ownable.only_owner(caller)?;
        bank.transfer(&market.collateral_token(), self.address, to, amount)?;
        Ok(())
    }

    pub fn withdraw_market_token(
        &mut self,
        caller: &Address,
        bank: &mut TokenBank,
        market: &dyn MarketContract,
        to: Address,
        amount: Amount,
    ) -> Result<(), PoolError> {
        self.ownable.only_owner(caller)?;
        bank.transfer(&market.market_token(), self.address, to, amount)?;
        Ok(())
    }

    /// Let the market's collateral pool pull collateral and market token
    /// from the pool.
    pub fn approve_market(
        &mut self,
        caller: &Address,
        bank: &mut TokenBank,
        market: &dyn MarketContract,
    ) -> Result<(), PoolError> {
        self.ownable.only_owner(caller)?;
        let spender = market.collateral_pool();
        bank.approve(&market.collateral_token(), self.address, spender, UNLIMITED_ALLOWANCE)?;
        bank.approve(&market.market_token(), self.address, spender, UNLIMITED_ALLOWANCE)?;
        Ok(())
    }

    // ───────────────────────── Internal ─────────────────────────

    fn holds_pairs(&self, bank: &TokenBank, market: &dyn MarketContract, qty: Amount) -> bool {
        bank.balance_of(&market.long_token(), &self.address) >= qty
            && bank.balance_of(&market.short_token(), &self.address) >= qty
    }

    fn mint_from_market(
        &self,
        bank: &mut TokenBank,
        market: &dyn MarketContract,
        qty: Amount,
        pay_in_market_token: bool,
        now: u64,
    ) -> Result<PoolSource, PoolError> {
        let market_fee = safe_mul(qty, market.market_token_fee_per_unit())?;
        let use_market_token = pay_in_market_token
            && bank.balance_of(&market.market_token(), &self.address) >= market_fee;
        market.mint_position_tokens(bank, self.address, qty, use_market_token, now)?;
        Ok(if use_market_token {
            PoolSource::MarketPaidInMarketToken
        } else {
            PoolSource::Market
        })
    }
}

fn require_positive(qty: Amount) -> Result<(), PoolError> {
    if qty > Amount::ZERO {
        Ok(())
    } else {
        Err(PoolError::InvalidAmount)
    }
}
