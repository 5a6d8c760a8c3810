//! Token bank: in-memory fungible token ledger
//!
//! Holds every fungible token the exchange touches (collateral, position
//! legs, market fee token) keyed by token address:
//! - Balances by (token, owner)
//! - Allowances by (token, owner, spender); `UNLIMITED_ALLOWANCE` is never
//!   decremented
//! - Per-token minter set for mint/burn
//!
//! The bank is `Clone` so a batch can settle against a staged copy and
//! commit it wholesale.

use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use tracing::debug;
use types::ids::Address;
use types::numeric::{ensure_amount, safe_add, safe_sub, Amount};

use crate::errors::TokenError;

/// Allowance that transfers never consume.
pub const UNLIMITED_ALLOWANCE: Decimal = Decimal::MAX;

#[derive(Debug, Clone, PartialEq)]
pub struct TokenInfo {
    pub symbol: String,
    pub decimals: u32,
    pub total_supply: Amount,
}

#[derive(Debug, Clone, Default)]
struct TokenLedger {
    balances: HashMap<Address, Amount>,
    allowances: HashMap<(Address, Address), Amount>,
    minters: HashSet<Address>,
}

#[derive(Debug, Clone, Default)]
pub struct TokenBank {
    info: HashMap<Address, TokenInfo>,
    ledgers: HashMap<Address, TokenLedger>,
}

impl TokenBank {
    pub fn new() -> Self {
        Self::default()
    }

    // ───────────────────────── Registry ─────────────────────────

    pub fn register_token(
        &mut self,
        token: Address,
        symbol: impl Into<String>,
        decimals: u32,
    ) -> Result<(), TokenError> {
        if self.info.contains_key(&token) {
            return Err(TokenError::AlreadyRegistered { token });
        }
        self.info.insert(
            token,
            TokenInfo {
                symbol: symbol.into(),
                decimals,
                total_supply: Decimal::ZERO,
            },
        );
        self.ledgers.insert(token, TokenLedger::default());
        Ok(())
    }

    pub fn is_registered(&self, token: &Address) -> bool {
        self.info.contains_key(token)
    }

    pub fn token_info(&self, token: &Address) -> Option<&TokenInfo> {
        self.info.get(token)
    }

    pub fn add_minter(&mut self, token: &Address, minter: Address) -> Result<(), TokenError> {
        self.ledger_mut(token)?.minters.insert(minter);
        Ok(())
    }

    pub fn is_minter(&self, token: &Address, account: &Address) -> bool {
        self.ledgers
            .get(token)
            .map_or(false, |l| l.minters.contains(account))
    }

    // ───────────────────────── Queries ─────────────────────────

    pub fn balance_of(&self, token: &Address, owner: &Address) -> Amount {
        self.ledgers
            .get(token)
            .and_then(|l| l.balances.get(owner))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn allowance(&self, token: &Address, owner: &Address, spender: &Address) -> Amount {
        self.ledgers
            .get(token)
            .and_then(|l| l.allowances.get(&(*owner, *spender)))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn total_supply(&self, token: &Address) -> Amount {
        self.info
            .get(token)
            .map_or(Decimal::ZERO, |i| i.total_supply)
    }

    // ───────────────────────── Transfers ─────────────────────────

    pub fn approve(
        &mut self,
        token: &Address,
        owner: Address,
        spender: Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        let amount = if amount == UNLIMITED_ALLOWANCE {
            amount
        } else {
            ensure_amount(amount)?
        };
        self.ledger_mut(token)?
            .allowances
            .insert((owner, spender), amount);
        Ok(())
    }

    pub fn transfer(
        &mut self,
        token: &Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        let amount = ensure_amount(amount)?;
        if amount.is_zero() {
            return Ok(());
        }
        self.safe_debit(token, &from, amount)?;
        self.safe_credit(token, to, amount)?;
        debug!(token = %token, from = %from, to = %to, amount = %amount, "token transfer");
        Ok(())
    }

    /// Move `amount` from `from` to `to` on behalf of `spender`.
    pub fn transfer_from(
        &mut self,
        token: &Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        let amount = ensure_amount(amount)?;
        if amount.is_zero() {
            return Ok(());
        }
        let available = self.allowance(token, &from, &spender);
        if available < amount {
            return Err(TokenError::InsufficientAllowance {
                token: *token,
                owner: from,
                spender,
                required: amount.to_string(),
                available: available.to_string(),
            });
        }
        self.safe_debit(token, &from, amount)?;
        self.safe_credit(token, to, amount)?;
        if available != UNLIMITED_ALLOWANCE {
            self.ledger_mut(token)?
                .allowances
                .insert((from, spender), safe_sub(available, amount)?);
        }
        debug!(token = %token, spender = %spender, from = %from, to = %to, amount = %amount, "token transfer_from");
        Ok(())
    }

    // ───────────────────────── Supply ─────────────────────────

    pub fn mint(
        &mut self,
        token: &Address,
        minter: &Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        let amount = ensure_amount(amount)?;
        self.require_minter(token, minter)?;
        self.safe_credit(token, to, amount)?;
        let info = self.info_mut(token)?;
        info.total_supply = safe_add(info.total_supply, amount)?;
        Ok(())
    }

    pub fn burn(
        &mut self,
        token: &Address,
        minter: &Address,
        from: Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        let amount = ensure_amount(amount)?;
        self.require_minter(token, minter)?;
        self.safe_debit(token, &from, amount)?;
        let info = self.info_mut(token)?;
        info.total_supply = safe_sub(info.total_supply, amount)?;
        Ok(())
    }

    // ───────────────────────── Internal ─────────────────────────

    fn require_minter(&self, token: &Address, minter: &Address) -> Result<(), TokenError> {
        if !self.is_registered(token) {
            return Err(TokenError::UnknownToken { token: *token });
        }
        if !self.is_minter(token, minter) {
            return Err(TokenError::NotMinter {
                token: *token,
                caller: *minter,
            });
        }
        Ok(())
    }

    fn safe_credit(&mut self, token: &Address, to: Address, amount: Amount) -> Result<(), TokenError> {
        let balance = self.ledger_mut(token)?.balances.entry(to).or_insert(Decimal::ZERO);
        *balance = safe_add(*balance, amount)?;
        Ok(())
    }

    fn safe_debit(&mut self, token: &Address, from: &Address, amount: Amount) -> Result<(), TokenError> {
        let token_addr = *token;
        let balance = self
            .ledger_mut(token)?
            .balances
            .entry(*from)
            .or_insert(Decimal::ZERO);
        if *balance < amount {
            return Err(TokenError::InsufficientBalance {
                token: token_addr,
                owner: *from,
                required: amount.to_string(),
                available: balance.to_string(),
            });
        }
        *balance = safe_sub(*balance, amount)?;
        Ok(())
    }

    fn ledger_mut(&mut self, token: &Address) -> Result<&mut TokenLedger, TokenError> {
        self.ledgers
            .get_mut(token)
            .ok_or(TokenError::UnknownToken { token: *token })
    }

    fn info_mut(&mut self, token: &Address) -> Result<&mut TokenInfo, TokenError> {
        self.info
            .get_mut(token)
            .ok_or(TokenError::UnknownToken { token: *token })
    }
}
