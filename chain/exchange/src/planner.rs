//! Match planner
//!
//! Validates one taker against an ordered list of makers and splits every
//! pairing into settlement segments. Nothing moves here: a `MatchPlan`
//! carries the results and the staged fills, and the exchange settles and
//! commits them.
//!
//! A party closes while it holds the leg its side would close (a buyer its
//! short, a seller its long) and opens otherwise. Holdings are tracked
//! across the whole batch, so earlier segments change what later ones do.

use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use tracing::debug;
use types::fee::FeeRates;
use types::ids::{Address, OrderHash};
use types::numeric::{ensure_amount, safe_add, safe_mul, safe_sub, saturating_sub, Amount};
use types::order::{Order, OrderAddressSet, OrderParam, OrderStatus, PositionLeg, ProtocolVersion, Side};
use types::trade::{FillAction, MatchResult};

use crate::config::ExchangeConfig;
use crate::context::OrderContext;
use crate::errors::ExchangeError;
use crate::ledger::{FillLedger, FillStage};
use crate::market::MarketContract;
use crate::signature::SignatureVerifier;
use crate::token::TokenBank;

/// One match call: a taker, its makers and the fill amount per maker.
#[derive(Debug, Clone, Copy)]
pub struct MatchRequest<'a> {
    pub caller: Address,
    pub now: u64,
    pub taker: &'a OrderParam,
    pub makers: &'a [OrderParam],
    pub amounts: &'a [Amount],
    pub asset: OrderAddressSet,
}

#[derive(Debug, Clone)]
pub struct MatchPlan {
    pub taker_hash: OrderHash,
    pub context: OrderContext,
    pub results: Vec<MatchResult>,
    pub fills: FillStage,
    pub taker_filled: Amount,
}

pub struct MatchPlanner<'a, V: ?Sized> {
    config: &'a ExchangeConfig,
    ledger: &'a FillLedger,
    verifier: &'a V,
    bank: &'a TokenBank,
    market: &'a dyn MarketContract,
}

/// Mutable state threaded through the makers of one batch.
struct Batch<'a> {
    holdings: Holdings<'a>,
    fills: FillStage,
    gas_charged: HashSet<OrderHash>,
    results: Vec<MatchResult>,
}

impl<'a, V: SignatureVerifier + ?Sized> MatchPlanner<'a, V> {
    pub fn new(
        config: &'a ExchangeConfig,
        ledger: &'a FillLedger,
        verifier: &'a V,
        bank: &'a TokenBank,
        market: &'a dyn MarketContract,
    ) -> Self {
        Self {
            config,
            ledger,
            verifier,
            bank,
            market,
        }
    }

    pub fn plan(&self, request: &MatchRequest<'_>) -> Result<MatchPlan, ExchangeError> {
        let asset = &request.asset;
        if self.config.require_relayer_sender && request.caller != asset.relayer {
            return Err(ExchangeError::InvalidSender {
                caller: request.caller,
            });
        }
        if request.makers.len() != request.amounts.len() {
            return Err(ExchangeError::LengthMismatch {
                makers: request.makers.len(),
                amounts: request.amounts.len(),
            });
        }
        if request.makers.is_empty() {
            return Err(ExchangeError::EmptyBatch);
        }
        for param in std::iter::once(request.taker).chain(request.makers) {
            check_addresses(&param.order, asset)?;
            check_order_data(&param.order)?;
        }

        let taker = &request.taker.order;
        let taker_hash = taker.hash();
        let context =
            OrderContext::resolve(self.config, self.market, asset.market, taker, request.now)?;

        self.check_signature(request.taker, taker_hash)?;
        if taker.data.maker_only {
            return Err(ExchangeError::MakerOnlyTaker {
                order_hash: taker_hash,
            });
        }
        let status = self.ledger.status(taker, &taker_hash, request.now);
        if !status.is_fillable() {
            return Err(ExchangeError::OrderNotFillable {
                order_hash: taker_hash,
                status,
            });
        }

        let mut batch = Batch {
            holdings: Holdings::new(self.bank, &context),
            fills: FillStage::new(),
            gas_charged: HashSet::new(),
            results: Vec::new(),
        };
        let mut taker_filled = Decimal::ZERO;
        for (maker, amount) in request.makers.iter().zip(request.amounts) {
            self.plan_maker(&context, request, taker_hash, maker, *amount, &mut batch)?;
            taker_filled = safe_add(taker_filled, *amount)?;
        }

        let Batch { fills, results, .. } = batch;
        Ok(MatchPlan {
            taker_hash,
            context,
            results,
            fills,
            taker_filled,
        })
    }

    fn plan_maker(
        &self,
        context: &OrderContext,
        request: &MatchRequest<'_>,
        taker_hash: OrderHash,
        maker_param: &OrderParam,
        amount: Amount,
        batch: &mut Batch<'_>,
    ) -> Result<(), ExchangeError> {
        let taker = &request.taker.order;
        let maker = &maker_param.order;
        let maker_hash = maker.hash();

        if maker.data.is_market_order() {
            return Err(ExchangeError::MakerOrderIsMarketOrder {
                order_hash: maker_hash,
            });
        }
        self.check_signature(maker_param, maker_hash)?;

        let maker_filled = batch.fills.filled(self.ledger, &maker_hash);
        let status = OrderStatus::evaluate(
            maker,
            maker_filled,
            self.ledger.is_cancelled(&maker_hash),
            request.now,
        );
        if !status.is_fillable() {
            return Err(ExchangeError::OrderNotFillable {
                order_hash: maker_hash,
                status,
            });
        }

        if maker.side() != taker.side().opposite() {
            return Err(ExchangeError::InvalidSide {
                order_hash: maker_hash,
            });
        }
        if !taker.data.is_market_order() && !crosses(taker, maker) {
            return Err(ExchangeError::PriceMismatch {
                taker_price: taker.price.to_string(),
                maker_price: maker.price.to_string(),
            });
        }
        if !context.price_in_range(maker.price) {
            return Err(ExchangeError::PriceOutOfRange {
                price: maker.price.to_string(),
                floor: context.price_floor.to_string(),
                cap: context.price_cap.to_string(),
            });
        }

        let amount = valid_fill_amount(amount)?;
        let taker_filled = batch.fills.filled(self.ledger, &taker_hash);
        if safe_add(taker_filled, amount)? > taker.amount {
            return Err(ExchangeError::TakerOverMatch {
                order_hash: taker_hash,
                filled: taker_filled.to_string(),
                requested: amount.to_string(),
                amount: taker.amount.to_string(),
            });
        }
        if safe_add(maker_filled, amount)? > maker.amount {
            return Err(ExchangeError::MakerOverMatch {
                order_hash: maker_hash,
                filled: maker_filled.to_string(),
                requested: amount.to_string(),
                amount: maker.amount.to_string(),
            });
        }
        batch.fills.record_fill(self.ledger, taker_hash, amount)?;
        batch.fills.record_fill(self.ledger, maker_hash, amount)?;

        let price = maker.price;
        let fee_base = context.fee_base_per_unit(self.config.fee_basis, price)?;
        let rates = FeeRates {
            maker_fee_rate: maker.data.maker_fee_rate,
            taker_fee_rate: taker.data.taker_fee_rate,
            maker_rebate_rate: maker.data.maker_rebate_rate,
        };

        let mut left = amount;
        while left > Decimal::ZERO {
            let taker_closable = batch.holdings.closable(taker, left);
            let maker_closable = batch.holdings.closable(maker, left);
            let seg = [taker_closable, maker_closable]
                .into_iter()
                .flatten()
                .fold(left, Decimal::min);

            let action = FillAction::from_intents(taker_closable.is_some(), maker_closable.is_some());
            let taker_leg = if action.taker_closes() {
                taker.side().closing_leg()
            } else {
                taker.side().opening_leg()
            };
            batch.holdings.apply(taker, action.taker_closes(), seg)?;
            batch.holdings.apply(maker, action.maker_closes(), seg)?;

            let fees = rates.quote(fee_base, seg)?;
            let collateral = safe_mul(context.margin_per_unit(taker_leg, price)?, seg)?;
            let result = MatchResult {
                maker: maker.trader,
                taker: taker.trader,
                maker_order_hash: maker_hash,
                action,
                taker_leg,
                price,
                maker_fee: fees.maker_fee,
                taker_fee: fees.taker_fee,
                maker_rebate: fees.maker_rebate,
                maker_gas_fee: self.gas_once(&mut batch.gas_charged, maker, maker_hash),
                taker_gas_fee: self.gas_once(&mut batch.gas_charged, taker, taker_hash),
                pos_filled_amount: seg,
                collateral_filled_amount: collateral,
            };
            debug!(
                maker = %result.maker,
                taker = %result.taker,
                action = ?result.action,
                taker_leg = ?result.taker_leg,
                amount = %seg,
                collateral = %collateral,
                "segment planned"
            );
            batch.results.push(result);
            left = safe_sub(left, seg)?;
        }
        Ok(())
    }

    fn check_signature(&self, param: &OrderParam, hash: OrderHash) -> Result<(), ExchangeError> {
        if self
            .verifier
            .verify(&param.order.trader, &hash, &param.signature)
        {
            Ok(())
        } else {
            Err(ExchangeError::InvalidSignature { order_hash: hash })
        }
    }

    /// Full gas amount on the first segment of an order that has never
    /// filled before; zero afterwards.
    fn gas_once(&self, charged: &mut HashSet<OrderHash>, order: &Order, hash: OrderHash) -> Amount {
        if self.ledger.filled(&hash).is_zero() && charged.insert(hash) {
            order.gas_amount
        } else {
            Decimal::ZERO
        }
    }
}

fn check_addresses(order: &Order, asset: &OrderAddressSet) -> Result<(), ExchangeError> {
    if order.relayer != asset.relayer {
        return Err(ExchangeError::InvalidOrderRelayer {
            order_hash: order.hash(),
        });
    }
    if order.market != asset.market {
        return Err(ExchangeError::InvalidMarket {
            market: order.market,
        });
    }
    Ok(())
}

/// Orders whose data does not fit the packed word cannot be signed over it.
fn check_order_data(order: &Order) -> Result<(), ExchangeError> {
    order
        .data
        .pack()
        .map(|_| ())
        .map_err(|source| ExchangeError::InvalidOrderData {
            order_hash: order.hash(),
            source,
        })
}

/// Whether the maker's price is at least as good as the taker's limit.
fn crosses(taker: &Order, maker: &Order) -> bool {
    match taker.side() {
        Side::Buy => maker.price <= taker.price,
        Side::Sell => maker.price >= taker.price,
    }
}

fn valid_fill_amount(amount: Amount) -> Result<Amount, ExchangeError> {
    match ensure_amount(amount) {
        Ok(amount) if amount > Decimal::ZERO => Ok(amount),
        _ => Err(ExchangeError::InvalidFillAmount {
            amount: amount.to_string(),
        }),
    }
}

// ───────────────────────── Holdings ─────────────────────────

/// Position balances as they will be once the segments planned so far
/// settle. Read lazily from the bank.
struct Holdings<'a> {
    bank: &'a TokenBank,
    context: &'a OrderContext,
    held: HashMap<(Address, PositionLeg), Amount>,
}

impl<'a> Holdings<'a> {
    fn new(bank: &'a TokenBank, context: &'a OrderContext) -> Self {
        Self {
            bank,
            context,
            held: HashMap::new(),
        }
    }

    fn entry(&mut self, trader: Address, leg: PositionLeg) -> &mut Amount {
        let (bank, token) = (self.bank, self.context.leg_token(leg));
        self.held
            .entry((trader, leg))
            .or_insert_with(|| bank.balance_of(&token, &trader))
    }

    /// How much of `left` the order closes next, `None` if it opens.
    fn closable(&mut self, order: &Order, left: Amount) -> Option<Amount> {
        let closing_leg = order.side().closing_leg();
        match order.data.version {
            ProtocolVersion::ExplicitLeg(leg) => (leg == closing_leg).then_some(left),
            ProtocolVersion::BalanceDriven => {
                let held = *self.entry(order.trader, closing_leg);
                (held > Decimal::ZERO).then(|| held.min(left))
            }
        }
    }

    fn apply(&mut self, order: &Order, closes: bool, amount: Amount) -> Result<(), ExchangeError> {
        let side = order.side();
        if closes {
            let held = self.entry(order.trader, side.closing_leg());
            // Explicit-leg closers are not bounded by their balance here;
            // settlement rejects what they cannot deliver.
            *held = saturating_sub(*held, amount);
        } else {
            let held = self.entry(order.trader, side.opening_leg());
            *held = safe_add(*held, amount)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::{MarketSpec, PositionMarket};
    use crate::signature::{sign_order, signer_address, Ed25519Verifier};
    use ed25519_dalek::SigningKey;
    use types::order::OrderData;

    const UNIT: i64 = 100_000;

    fn price(v: i64) -> Decimal {
        Decimal::from(v) * Decimal::from(10_000_000_000u64)
    }

    fn units(tenths: i64) -> Decimal {
        Decimal::from(tenths * UNIT / 10)
    }

    fn key(seed: u8) -> SigningKey {
        SigningKey::from_bytes(&[seed; 32])
    }

    struct Fixture {
        bank: TokenBank,
        market: PositionMarket,
        config: ExchangeConfig,
        ledger: FillLedger,
        relayer: Address,
    }

    impl Fixture {
        fn new() -> Self {
            let mut bank = TokenBank::new();
            let market = PositionMarket::deploy(
                &mut bank,
                MarketSpec {
                    name: "mock".to_string(),
                    address: Address::from_label("market"),
                    collateral_token: Address::from_label("collateral"),
                    market_token: Address::from_label("mkt"),
                    price_cap: price(8500),
                    price_floor: price(7500),
                    qty_multiplier: Decimal::from(1000),
                    fee_rate: 300,
                    expiration: 4_000_000_000,
                },
            )
            .unwrap();
            Self {
                bank,
                market,
                config: ExchangeConfig::default(),
                ledger: FillLedger::new(),
                relayer: Address::from_label("relayer"),
            }
        }

        fn order(&self, seed: u8, side: Side, px: i64, tenths: i64) -> OrderParam {
            let k = key(seed);
            let order = Order {
                trader: signer_address(&k),
                relayer: self.relayer,
                market: self.market.address(),
                amount: units(tenths),
                price: price(px),
                gas_amount: Decimal::from(7),
                data: OrderData::new(side, 3_500_000_000, u64::from(seed)),
            };
            sign_order(&order, &k)
        }

        fn give(&mut self, seed: u8, leg: PositionLeg, tenths: i64) {
            let token = match leg {
                PositionLeg::Long => self.market.long_token(),
                PositionLeg::Short => self.market.short_token(),
            };
            let minter = self.market.address();
            self.bank
                .mint(&token, &minter, signer_address(&key(seed)), units(tenths))
                .unwrap();
        }

        fn plan(
            &self,
            taker: &OrderParam,
            makers: &[OrderParam],
            amounts: &[Amount],
        ) -> Result<MatchPlan, ExchangeError> {
            let request = MatchRequest {
                caller: self.relayer,
                now: 1_000,
                taker,
                makers,
                amounts,
                asset: OrderAddressSet {
                    market: self.market.address(),
                    relayer: self.relayer,
                },
            };
            MatchPlanner::new(&self.config, &self.ledger, &Ed25519Verifier, &self.bank, &self.market)
                .plan(&request)
        }
    }

    #[test]
    fn test_mint_when_both_open() {
        let f = Fixture::new();
        let taker = f.order(2, Side::Buy, 7900, 1);
        let maker = f.order(1, Side::Sell, 7800, 1);
        let plan = f.plan(&taker, &[maker.clone()], &[units(1)]).unwrap();

        assert_eq!(plan.results.len(), 1);
        let r = &plan.results[0];
        assert_eq!(r.action, FillAction::Mint);
        assert_eq!(r.taker_leg, PositionLeg::Long);
        assert_eq!(r.maker_leg(), PositionLeg::Short);
        assert_eq!(r.price, price(7800));
        // (7800 - 7500) * 1000 per unit, 0.1 unit
        assert_eq!(r.collateral_filled_amount, price(300) * Decimal::from(1000) * units(1));
        assert_eq!(r.taker_gas_fee, Decimal::from(7));
        assert_eq!(r.maker_gas_fee, Decimal::from(7));
        assert_eq!(plan.fills.filled(&f.ledger, &maker.order.hash()), units(1));
        assert_eq!(plan.taker_filled, units(1));
    }

    #[test]
    fn test_redeem_buy_mint_segments() {
        let mut f = Fixture::new();
        f.give(1, PositionLeg::Short, 10);
        f.give(2, PositionLeg::Long, 20);
        let taker = f.order(1, Side::Buy, 8000, 30);
        let maker = f.order(2, Side::Sell, 8000, 30);
        let plan = f.plan(&taker, &[maker], &[units(30)]).unwrap();

        let actions: Vec<_> = plan.results.iter().map(|r| r.action).collect();
        assert_eq!(actions, vec![FillAction::Redeem, FillAction::Buy, FillAction::Mint]);
        for r in &plan.results {
            assert_eq!(r.pos_filled_amount, units(10));
        }
        // Gas lands on the first segment only.
        assert_eq!(plan.results[0].taker_gas_fee, Decimal::from(7));
        assert_eq!(plan.results[1].taker_gas_fee, Decimal::ZERO);
        assert_eq!(plan.results[2].maker_gas_fee, Decimal::ZERO);
    }

    #[test]
    fn test_sell_when_taker_closes_against_opening_maker() {
        let mut f = Fixture::new();
        f.give(1, PositionLeg::Long, 10);
        let taker = f.order(1, Side::Sell, 7900, 10);
        let maker = f.order(2, Side::Buy, 8000, 10);
        let plan = f.plan(&taker, &[maker], &[units(10)]).unwrap();
        assert_eq!(plan.results.len(), 1);
        assert_eq!(plan.results[0].action, FillAction::Sell);
        assert_eq!(plan.results[0].taker_leg, PositionLeg::Long);
        assert_eq!(plan.results[0].maker_leg(), PositionLeg::Long);
    }

    #[test]
    fn test_explicit_leg_orders_ignore_balances() {
        let mut f = Fixture::new();
        f.give(1, PositionLeg::Short, 10);
        let k1 = key(1);
        let mut taker = f.order(1, Side::Buy, 8000, 10).order;
        taker.data.version = ProtocolVersion::ExplicitLeg(PositionLeg::Long);
        let taker = sign_order(&taker, &k1);
        let k2 = key(2);
        let mut maker = f.order(2, Side::Sell, 8000, 10).order;
        maker.data.version = ProtocolVersion::ExplicitLeg(PositionLeg::Long);
        let maker = sign_order(&maker, &k2);

        let plan = f.plan(&taker, &[maker], &[units(10)]).unwrap();
        assert_eq!(plan.results.len(), 1);
        assert_eq!(plan.results[0].action, FillAction::Buy);
        assert_eq!(plan.results[0].pos_filled_amount, units(10));
    }

    #[test]
    fn test_explicit_leg_closer_beyond_balance() {
        let f = Fixture::new();
        let k1 = key(1);
        let mut taker = f.order(1, Side::Sell, 7900, 10).order;
        taker.data.version = ProtocolVersion::ExplicitLeg(PositionLeg::Long);
        let taker = sign_order(&taker, &k1);
        let first = f.order(2, Side::Buy, 8000, 5);
        let second = f.order(3, Side::Buy, 8000, 5);

        // Nothing held: the planned close drives holdings to zero, not below.
        let plan = f
            .plan(&taker, &[first, second], &[units(4), units(5)])
            .unwrap();
        let actions: Vec<_> = plan.results.iter().map(|r| r.action).collect();
        assert_eq!(actions, vec![FillAction::Sell, FillAction::Sell]);
        assert_eq!(plan.taker_filled, units(9));
    }

    #[test]
    fn test_unpackable_order_data_rejected() {
        let f = Fixture::new();
        let k1 = key(1);
        let mut taker = f.order(1, Side::Buy, 8000, 10).order;
        taker.data.expired_at = 1 << 41;
        let taker = sign_order(&taker, &k1);
        let maker = f.order(2, Side::Sell, 8000, 10);
        let err = f.plan(&taker, &[maker], &[units(1)]).unwrap_err();
        assert_eq!(err.code(), "INVALID_ORDER_DATA");

        // Checked ahead of the signature.
        let taker = f.order(1, Side::Buy, 8000, 10);
        let mut maker = f.order(2, Side::Sell, 8000, 10);
        maker.order.data.expired_at = types::order::MAX_EXPIRED_AT + 1;
        let err = f.plan(&taker, &[maker], &[units(1)]).unwrap_err();
        assert!(matches!(
            err,
            ExchangeError::InvalidOrderData {
                source: types::errors::OrderDataError::ExpiryOutOfRange(_),
                ..
            }
        ));
    }

    #[test]
    fn test_same_side_rejected() {
        let f = Fixture::new();
        let taker = f.order(1, Side::Buy, 8000, 10);
        let maker = f.order(2, Side::Buy, 8000, 10);
        let err = f.plan(&taker, &[maker], &[units(1)]).unwrap_err();
        assert_eq!(err.code(), "INVALID_SIDE");
    }

    #[test]
    fn test_price_must_cross() {
        let f = Fixture::new();
        let taker = f.order(1, Side::Buy, 7800, 10);
        let maker = f.order(2, Side::Sell, 7900, 10);
        let err = f.plan(&taker, &[maker.clone()], &[units(1)]).unwrap_err();
        assert_eq!(err.code(), "INVALID_MATCH");

        let k = key(1);
        let mut market_taker = taker.order.clone();
        market_taker.data.order_type = types::order::OrderType::Market;
        let market_taker = sign_order(&market_taker, &k);
        assert!(f.plan(&market_taker, &[maker], &[units(1)]).is_ok());
    }

    #[test]
    fn test_overmatch_checks_taker_first() {
        let f = Fixture::new();
        let taker = f.order(1, Side::Buy, 8000, 5);
        let maker = f.order(2, Side::Sell, 8000, 5);
        let err = f.plan(&taker, &[maker.clone()], &[units(6)]).unwrap_err();
        assert_eq!(err.code(), "TAKER_ORDER_OVER_MATCH");

        let big_taker = f.order(1, Side::Buy, 8000, 10);
        let err = f.plan(&big_taker, &[maker], &[units(6)]).unwrap_err();
        assert_eq!(err.code(), "MAKER_ORDER_OVER_MATCH");
    }

    #[test]
    fn test_same_maker_twice_counts_staged_fills() {
        let f = Fixture::new();
        let taker = f.order(1, Side::Buy, 8000, 10);
        let maker = f.order(2, Side::Sell, 8000, 5);
        let err = f
            .plan(&taker, &[maker.clone(), maker], &[units(3), units(3)])
            .unwrap_err();
        assert_eq!(err.code(), "MAKER_ORDER_OVER_MATCH");
    }

    #[test]
    fn test_batch_shape_errors() {
        let f = Fixture::new();
        let taker = f.order(1, Side::Buy, 8000, 10);
        let maker = f.order(2, Side::Sell, 8000, 10);
        assert_eq!(
            f.plan(&taker, &[maker], &[]).unwrap_err().code(),
            "LENGTH_MISMATCH"
        );
        assert_eq!(f.plan(&taker, &[], &[]).unwrap_err().code(), "EMPTY_BATCH");
    }

    #[test]
    fn test_invalid_fill_amounts() {
        let f = Fixture::new();
        let taker = f.order(1, Side::Buy, 8000, 10);
        let maker = f.order(2, Side::Sell, 8000, 10);
        for bad in [Decimal::ZERO, Decimal::NEGATIVE_ONE, Decimal::new(15, 1)] {
            let err = f.plan(&taker, &[maker.clone()], &[bad]).unwrap_err();
            assert_eq!(err.code(), "INVALID_FILL_AMOUNT");
        }
    }

    #[test]
    fn test_roles() {
        let f = Fixture::new();
        let k1 = key(1);
        let mut taker = f.order(1, Side::Buy, 8000, 10).order;
        taker.data.maker_only = true;
        let maker_only_taker = sign_order(&taker, &k1);
        let maker = f.order(2, Side::Sell, 8000, 10);
        assert_eq!(
            f.plan(&maker_only_taker, &[maker], &[units(1)]).unwrap_err().code(),
            "MAKER_ONLY_ORDER_CANNOT_BE_TAKER"
        );

        let taker = f.order(1, Side::Buy, 8000, 10);
        let k2 = key(2);
        let mut market_maker = f.order(2, Side::Sell, 8000, 10).order;
        market_maker.data.order_type = types::order::OrderType::Market;
        let market_maker = sign_order(&market_maker, &k2);
        assert_eq!(
            f.plan(&taker, &[market_maker], &[units(1)]).unwrap_err().code(),
            "MAKER_ORDER_CAN_NOT_BE_MARKET_ORDER"
        );
    }

    #[test]
    fn test_bad_signature_and_sender() {
        let f = Fixture::new();
        let taker = f.order(1, Side::Buy, 8000, 10);
        let mut forged = f.order(2, Side::Sell, 8000, 10);
        forged.signature = taker.signature.clone();
        assert_eq!(
            f.plan(&taker, &[forged], &[units(1)]).unwrap_err().code(),
            "INVALID_SIGNATURE"
        );

        let maker = f.order(2, Side::Sell, 8000, 10);
        let request = MatchRequest {
            caller: Address::from_label("someone"),
            now: 1_000,
            taker: &taker,
            makers: std::slice::from_ref(&maker),
            amounts: &[units(1)],
            asset: OrderAddressSet {
                market: f.market.address(),
                relayer: f.relayer,
            },
        };
        let err = MatchPlanner::new(&f.config, &f.ledger, &Ed25519Verifier, &f.bank, &f.market)
            .plan(&request)
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_SENDER");
    }

    #[test]
    fn test_price_out_of_range() {
        let f = Fixture::new();
        let taker = f.order(1, Side::Sell, 7000, 10);
        let maker = f.order(2, Side::Buy, 8600, 10);
        assert_eq!(
            f.plan(&taker, &[maker], &[units(1)]).unwrap_err().code(),
            "PRICE_OUT_OF_RANGE"
        );
    }

    #[test]
    fn test_gas_not_charged_after_first_fill() {
        let mut f = Fixture::new();
        let taker = f.order(1, Side::Buy, 8000, 10);
        let maker = f.order(2, Side::Sell, 8000, 10);
        let plan = f.plan(&taker, &[maker.clone()], &[units(4)]).unwrap();
        f.ledger.commit(plan.fills);

        let plan = f.plan(&taker, &[maker], &[units(6)]).unwrap();
        assert_eq!(plan.results[0].taker_gas_fee, Decimal::ZERO);
        assert_eq!(plan.results[0].maker_gas_fee, Decimal::ZERO);
    }
}
