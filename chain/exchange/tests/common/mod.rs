//! Shared fixtures for exchange integration tests
//!
//! Market: cap 8500, floor 7500, multiplier 1000, creation fee 0.3%.
//! One unit backs 1000 collateral and costs 24 collateral (or 12 market
//! token) to mint.

#![allow(dead_code)]

use ed25519_dalek::SigningKey;
use exchange::config::ExchangeConfig;
use exchange::custody::CustodyProxy;
use exchange::errors::ExchangeError;
use exchange::exchange::Exchange;
pub use exchange::market::MarketContract;
use exchange::market::{MarketSpec, PositionMarket};
use exchange::planner::MatchRequest;
use exchange::pool::MintingPool;
use exchange::signature::{sign_order, signer_address};
use exchange::token::{TokenBank, UNLIMITED_ALLOWANCE};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;
use types::ids::Address;
use types::numeric::{to_raw, BASE_DECIMALS, COLLATERAL_DECIMALS, PRICE_DECIMALS};
use types::order::{Order, OrderAddressSet, OrderData, OrderParam, Side};
use types::trade::MatchResult;

pub const NOW: u64 = 1_700_000_000;
pub const MARKET_EXPIRATION: u64 = 1_800_000_000;
pub const ORDER_EXPIRATION: u64 = 1_750_000_000;

pub fn to_wei(value: &str) -> Decimal {
    to_raw(Decimal::from_str(value).unwrap(), COLLATERAL_DECIMALS).unwrap()
}

pub fn to_base(value: &str) -> Decimal {
    to_raw(Decimal::from_str(value).unwrap(), BASE_DECIMALS).unwrap()
}

pub fn to_price(value: i64) -> Decimal {
    to_raw(Decimal::from(value), PRICE_DECIMALS).unwrap()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub struct Trader {
    pub key: SigningKey,
    pub address: Address,
}

/// Deterministic key per seed.
pub fn trader(seed: u8) -> Trader {
    let key = SigningKey::from_bytes(&[seed; 32]);
    let address = signer_address(&key);
    Trader { key, address }
}

pub fn market_spec() -> MarketSpec {
    MarketSpec {
        name: "BTC-8500-7500".to_string(),
        address: Address::from_label("market"),
        collateral_token: Address::from_label("collateral"),
        market_token: Address::from_label("market-token"),
        price_cap: to_price(8500),
        price_floor: to_price(7500),
        qty_multiplier: Decimal::from(1000),
        fee_rate: 300,
        expiration: MARKET_EXPIRATION,
    }
}

pub struct Env {
    pub bank: TokenBank,
    pub market: PositionMarket,
    pub exchange: Exchange,
    pub owner: Address,
    pub relayer: Address,
    pub admin: Address,
}

impl Env {
    pub fn new() -> Self {
        Self::build(false)
    }

    /// Mints and redemptions go through a minting pool.
    pub fn with_pool() -> Self {
        Self::build(true)
    }

    fn build(with_pool: bool) -> Self {
        init_tracing();
        let mut bank = TokenBank::new();
        let market = PositionMarket::deploy(&mut bank, market_spec()).unwrap();
        let owner = Address::from_label("owner");
        let relayer = Address::from_label("relayer");
        let admin = Address::from_label("token-admin");
        bank.add_minter(&market.collateral_token(), admin).unwrap();
        bank.add_minter(&market.market_token(), admin).unwrap();

        let exchange_address = Address::from_label("exchange");
        let mut proxy = CustodyProxy::new(Address::from_label("proxy"), owner);
        proxy.add_address(&owner, exchange_address).unwrap();
        proxy.approve_market(&owner, &mut bank, &market).unwrap();

        let mut exchange =
            Exchange::with_ed25519(exchange_address, owner, ExchangeConfig::default(), proxy);
        if with_pool {
            let mut pool = MintingPool::new(Address::from_label("pool"), owner);
            pool.add_address(&owner, exchange.proxy().address()).unwrap();
            pool.approve_market(&owner, &mut bank, &market).unwrap();
            exchange
                .proxy()
                .approve_pool(&owner, &mut bank, &market, pool.address())
                .unwrap();
            exchange = exchange.with_pool(pool);
        }

        let mut env = Self {
            bank,
            market,
            exchange,
            owner,
            relayer,
            admin,
        };
        env.approve_proxy(relayer);
        env
    }

    pub fn proxy_address(&self) -> Address {
        self.exchange.proxy().address()
    }

    pub fn pool_address(&self) -> Address {
        self.exchange.pool().map(|p| p.address()).unwrap()
    }

    // ───────────────────────── Funding ─────────────────────────

    pub fn approve_proxy(&mut self, who: Address) {
        let proxy = self.proxy_address();
        for token in [
            self.market.collateral_token(),
            self.market.long_token(),
            self.market.short_token(),
        ] {
            self.bank
                .approve(&token, who, proxy, UNLIMITED_ALLOWANCE)
                .unwrap();
        }
    }

    /// Mint collateral to `who` and approve the proxy for everything.
    pub fn fund(&mut self, who: Address, wei: &str) {
        let token = self.market.collateral_token();
        self.bank.mint(&token, &self.admin, who, to_wei(wei)).unwrap();
        self.approve_proxy(who);
    }

    pub fn fund_market_token(&mut self, who: Address, wei: &str) {
        let token = self.market.market_token();
        self.bank.mint(&token, &self.admin, who, to_wei(wei)).unwrap();
    }

    /// Mint `amount` pairs through the market and hand the long leg to
    /// `long_holder` and the short leg to `short_holder`.
    pub fn prepare_positions(&mut self, long_holder: Address, short_holder: Address, amount: &str) {
        let issuer = Address::from_label("issuer");
        let qty = to_base(amount);
        let cost = (self.market.collateral_per_unit() + self.market.collateral_fee_per_unit()) * qty;
        let ctk = self.market.collateral_token();
        self.bank.mint(&ctk, &self.admin, issuer, cost).unwrap();
        self.bank
            .approve(&ctk, issuer, self.market.collateral_pool(), UNLIMITED_ALLOWANCE)
            .unwrap();
        self.market
            .mint_position_tokens(&mut self.bank, issuer, qty, false, NOW)
            .unwrap();
        self.bank
            .transfer(&self.market.long_token(), issuer, long_holder, qty)
            .unwrap();
        self.bank
            .transfer(&self.market.short_token(), issuer, short_holder, qty)
            .unwrap();
    }

    // ───────────────────────── Balances ─────────────────────────

    pub fn collateral(&self, who: Address) -> Decimal {
        self.bank.balance_of(&self.market.collateral_token(), &who)
    }

    pub fn market_token(&self, who: Address) -> Decimal {
        self.bank.balance_of(&self.market.market_token(), &who)
    }

    pub fn long(&self, who: Address) -> Decimal {
        self.bank.balance_of(&self.market.long_token(), &who)
    }

    pub fn short(&self, who: Address) -> Decimal {
        self.bank.balance_of(&self.market.short_token(), &who)
    }

    // ───────────────────────── Orders ─────────────────────────

    /// Unsigned limit order with no fees and no gas.
    pub fn order(&self, trader: &Trader, side: Side, price: i64, amount: &str) -> Order {
        Order {
            trader: trader.address,
            relayer: self.relayer,
            market: self.market.address(),
            amount: to_base(amount),
            price: to_price(price),
            gas_amount: Decimal::ZERO,
            data: OrderData::new(side, ORDER_EXPIRATION, u64::from(trader.key.to_bytes()[0])),
        }
    }

    pub fn asset(&self) -> OrderAddressSet {
        OrderAddressSet {
            market: self.market.address(),
            relayer: self.relayer,
        }
    }

    pub fn match_orders(
        &mut self,
        taker: &OrderParam,
        makers: &[OrderParam],
        amounts: &[Decimal],
    ) -> Result<Vec<MatchResult>, ExchangeError> {
        self.match_at(NOW, taker, makers, amounts)
    }

    pub fn match_at(
        &mut self,
        now: u64,
        taker: &OrderParam,
        makers: &[OrderParam],
        amounts: &[Decimal],
    ) -> Result<Vec<MatchResult>, ExchangeError> {
        let request = MatchRequest {
            caller: self.relayer,
            now,
            taker,
            makers,
            amounts,
            asset: self.asset(),
        };
        self.exchange
            .match_orders(&mut self.bank, &self.market, &request)
    }
}

pub fn sign(trader: &Trader, order: &Order) -> OrderParam {
    sign_order(order, &trader.key)
}
