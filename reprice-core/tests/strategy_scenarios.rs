//! Scenario tests across the seven adjustment strategies.
//!
//! Each scenario drives a strategy through the public trait surface only:
//! register intentions, run cycles against ticks, feed observed-state
//! snapshots back, and check the desired order sets.

mod common;

use common::{advance, manual_clock, FakeMarket};
use reprice_core::config::EngineParams;
use reprice_core::domain::{
    Clock, ExecutionReport, ObservedState, Order, OrderKind, Side, Tick,
};
use reprice_core::strategy::{self, Strategy};

// ─── Helpers ──────────────────────────────────────────────────────────

fn buy(asset: &str, amount: f64, target: f64, clock: Clock) -> Order {
    Order::new(asset, Side::Buy, amount, target, OrderKind::Limit, clock)
}

fn sell(asset: &str, amount: f64, target: f64, clock: Clock) -> Order {
    Order::new(asset, Side::Sell, amount, target, OrderKind::Limit, clock)
}

fn posted_at(id: reprice_core::domain::OrderId, price: f64) -> ExecutionReport {
    ExecutionReport {
        order_id: id,
        observed: ObservedState {
            posted: true,
            actual_price: Some(price),
            completed: false,
            filled: 0.0,
        },
    }
}

fn done_with(id: reprice_core::domain::OrderId, filled: f64) -> ExecutionReport {
    ExecutionReport {
        order_id: id,
        observed: ObservedState {
            posted: false,
            actual_price: None,
            completed: true,
            filled,
        },
    }
}

fn make(name: &str, ctx: std::sync::Arc<FakeMarket>) -> Box<dyn Strategy> {
    strategy::create(Some(name), ctx, &EngineParams::default()).unwrap()
}

// ─── Target / Ticker ─────────────────────────────────────────────────

#[test]
fn target_reprices_to_the_quantized_target() {
    let ctx = FakeMarket::new();
    let mut s = make("target", ctx);
    s.register(vec![buy("X", 1000.0, 50.0, Clock::system())]);

    let orders = s.get_orders(&Tick::from_pairs([("X", 49.0)]));
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].desired.price, Some(50.0));
    assert_eq!(orders[0].amount, 1000.0);
}

#[test]
fn ticker_follows_the_tick() {
    let ctx = FakeMarket::new();
    let mut s = make("ticker", ctx);
    s.register(vec![buy("X", 1000.0, 50.0, Clock::system())]);

    let orders = s.get_orders(&Tick::from_pairs([("X", 49.0)]));
    assert_eq!(orders[0].desired.price, Some(49.0));

    let orders = s.get_orders(&Tick::from_pairs([("X", 49.37)]));
    assert_eq!(orders[0].desired.price, Some(49.37));
}

#[test]
fn target_quantizes_off_grid_targets() {
    let ctx = FakeMarket::new();
    let mut s = make("target", ctx);
    s.register(vec![sell("X", 10.0, 49.996, Clock::system())]);

    let orders = s.get_orders(&Tick::from_pairs([("X", 49.0)]));
    assert_eq!(orders[0].desired.price, Some(50.0));
}

// ─── AskBid ──────────────────────────────────────────────────────────

#[test]
fn askbid_buys_at_the_ask_and_sells_at_the_bid() {
    let ctx = FakeMarket::new();
    ctx.set_mid("X", 50.0);
    ctx.set_mid("Y", 80.0);
    let mut s = make("askbid", ctx);
    s.register(vec![
        buy("X", 100.0, 50.0, Clock::system()),
        sell("Y", 40.0, 80.0, Clock::system()),
    ]);

    let tick = Tick::from_pairs([("X", 50.0), ("Y", 80.0)]);
    let orders = s.get_orders(&tick);

    let x = orders.iter().find(|o| o.asset == "X").unwrap();
    let y = orders.iter().find(|o| o.asset == "Y").unwrap();
    assert_eq!(x.desired.price, Some(50.05));
    assert_eq!(y.desired.price, Some(79.95));
}

#[test]
fn askbid_cancels_then_replaces_over_three_cycles() {
    let ctx = FakeMarket::new();
    ctx.set_mid("X", 50.0);
    let mut s = make("askbid", ctx.clone());
    s.register(vec![buy("X", 100.0, 50.0, Clock::system())]);
    let tick = Tick::from_pairs([("X", 50.0)]);

    // Cycle 1: fresh quote at the ask.
    let orders = s.get_orders(&tick);
    assert_eq!(orders.len(), 1);
    let first = orders[0].clone();
    assert_eq!(first.desired.price, Some(50.05));
    s.observe(&posted_at(first.id, 50.05));

    // Market moves. Cycle 2 must only cancel; no replacement yet.
    ctx.set_mid("X", 50.40);
    let orders = s.get_orders(&tick);
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, first.id);
    assert!(orders[0].to_cancel);
    assert_eq!(orders[0].desired.price, None);

    // Cancel confirmed (with a partial fill caught on the way out).
    s.observe(&done_with(first.id, 30.0));

    // Cycle 3: replacement sized to the remaining 70 at the new ask.
    let orders = s.get_orders(&tick);
    assert_eq!(orders.len(), 1);
    let replacement = &orders[0];
    assert_ne!(replacement.id, first.id);
    assert_eq!(replacement.amount, 70.0);
    assert_eq!(replacement.desired.price, Some(50.45));
}

#[test]
fn askbid_leaves_matching_resting_orders_alone() {
    let ctx = FakeMarket::new();
    ctx.set_mid("X", 50.0);
    let mut s = make("askbid", ctx);
    s.register(vec![buy("X", 100.0, 50.0, Clock::system())]);
    let tick = Tick::from_pairs([("X", 50.0)]);

    let orders = s.get_orders(&tick);
    let id = orders[0].id;
    s.observe(&posted_at(id, 50.05));

    // Same quote: the resting order stays, nothing is cancelled.
    let orders = s.get_orders(&tick);
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, id);
    assert!(!orders[0].to_cancel);
}

// ─── WaitNSee ────────────────────────────────────────────────────────

#[test]
fn waitnsee_only_watches_early_in_the_window() {
    let ctx = FakeMarket::new();
    let (source, clock) = manual_clock();
    let mut s = make("waitnsee", ctx);
    s.register(vec![buy("X", 100.0, 50.0, clock)]);

    // 10s into a 180s window: the drift snapshot is not armed yet.
    advance(&source, 10);
    let orders = s.get_orders(&Tick::from_pairs([("X", 50.5)]));
    assert!(orders.is_empty());
}

#[test]
fn waitnsee_trades_once_armed_on_favorable_drift() {
    let ctx = FakeMarket::new();
    ctx.set_mid("X", 50.5);
    let (source, clock) = manual_clock();
    let mut s = make("waitnsee", ctx);
    s.register(vec![buy("X", 100.0, 50.0, clock)]);

    // 100s in: armed. Tick above target means positive drift for a buy.
    advance(&source, 100);
    let orders = s.get_orders(&Tick::from_pairs([("X", 50.5)]));
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].desired.price, Some(50.55));
}

#[test]
fn waitnsee_snapshot_is_taken_once() {
    let ctx = FakeMarket::new();
    ctx.set_mid("X", 50.5);
    let (source, clock) = manual_clock();
    let mut s = make("waitnsee", ctx);
    s.register(vec![buy("X", 100.0, 50.0, clock)]);

    advance(&source, 100);
    assert_eq!(s.get_orders(&Tick::from_pairs([("X", 50.5)])).len(), 1);

    // The tick turning unfavorable later does not revoke the decision.
    let orders = s.get_orders(&Tick::from_pairs([("X", 49.0)]));
    assert!(!orders.is_empty());
}

#[test]
fn waitnsee_forces_trading_near_the_deadline() {
    let ctx = FakeMarket::new();
    ctx.set_mid("X", 49.0);
    let (source, clock) = manual_clock();
    let mut s = make("waitnsee", ctx);
    s.register(vec![buy("X", 100.0, 50.0, clock)]);

    // Armed with an unfavorable snapshot: no trade at 100s.
    advance(&source, 100);
    assert!(s.get_orders(&Tick::from_pairs([("X", 49.0)])).is_empty());

    // 5s before the deadline the gate opens regardless.
    advance(&source, 75);
    let orders = s.get_orders(&Tick::from_pairs([("X", 49.0)]));
    assert_eq!(orders.len(), 1);
}

// ─── Delta lifecycle ─────────────────────────────────────────────────

#[test]
fn delta_full_lifecycle_posts_fills_and_finishes() {
    let ctx = FakeMarket::new();
    let mut s = make("delta", ctx);
    s.register(vec![buy("X", 1000.0, 50.0, Clock::system())]);
    // -2% is past the good cap: trade everything remaining.
    let tick = Tick::from_pairs([("X", 49.0)]);

    let orders = s.get_orders(&tick);
    let limit = orders.iter().find(|o| !o.to_cancel).unwrap().clone();
    assert_eq!(limit.amount, 1000.0);

    s.observe(&posted_at(limit.id, 49.0));
    let orders = s.get_orders(&tick);
    let resting = orders.iter().find(|o| !o.to_cancel).unwrap();
    assert_eq!(resting.id, limit.id, "unchanged quote must not churn");

    // Partial fill, then completion.
    s.observe(&done_with(limit.id, 400.0));
    let orders = s.get_orders(&tick);
    let next = orders.iter().find(|o| !o.to_cancel).unwrap().clone();
    assert_eq!(next.amount, 600.0);

    s.observe(&done_with(next.id, 600.0));
    let orders = s.get_orders(&tick);
    assert!(orders.iter().all(|o| o.to_cancel));
}

#[test]
fn delta_duplicate_fill_reports_count_once() {
    let ctx = FakeMarket::new();
    let mut s = make("delta", ctx);
    s.register(vec![buy("X", 1000.0, 50.0, Clock::system())]);
    let tick = Tick::from_pairs([("X", 49.0)]);

    let orders = s.get_orders(&tick);
    let limit = orders.iter().find(|o| !o.to_cancel).unwrap().clone();

    s.observe(&done_with(limit.id, 400.0));
    let orders = s.get_orders(&tick);
    let next = orders.iter().find(|o| !o.to_cancel).unwrap().clone();
    assert_eq!(next.amount, 600.0);

    // A late duplicate snapshot for the settled order must change nothing.
    s.observe(&done_with(limit.id, 400.0));
    s.observe(&posted_at(next.id, 49.0));
    let orders = s.get_orders(&tick);
    let resting = orders.iter().find(|o| !o.to_cancel).unwrap();
    assert_eq!(resting.amount, 600.0);
}

#[test]
fn delta_wild_move_quotes_the_touch() {
    let ctx = FakeMarket::new();
    ctx.set_mid("X", 49.0);
    ctx.set_wild(true);
    let mut s = make("delta", ctx);
    s.register(vec![buy("X", 1000.0, 50.0, Clock::system())]);

    let orders = s.get_orders(&Tick::from_pairs([("X", 49.0)]));
    let limit = orders.iter().find(|o| !o.to_cancel).unwrap();
    // Buy under a wild move quotes the ask (49.05), ceiled to the cent.
    assert_eq!(limit.desired.price, Some(49.05));
    assert!(limit.wild);
}

// ─── NewDelta ────────────────────────────────────────────────────────

#[test]
fn newdelta_escalates_while_nothing_fills() {
    let ctx = FakeMarket::new();
    ctx.set_spread(10.0); // keep quotes far from the tick: no snapping
    let mut s = make("newdelta", ctx);
    s.register(vec![buy("X", 1000.0, 50.0, Clock::system())]);
    // Slightly favorable tick so the escalating base rate is what sizes.
    let tick = Tick::from_pairs([("X", 49.995)]);

    let mut last = 0.0;
    for _ in 0..8 {
        let orders = s.get_orders(&tick);
        if let Some(limit) = orders.iter().find(|o| !o.to_cancel) {
            assert!(limit.amount >= last, "slices must not shrink while stalled");
            last = limit.amount;
        }
    }
    assert!(last >= 1.0);
}

// ─── Cross-strategy invariants ───────────────────────────────────────

#[test]
fn no_strategy_ever_returns_a_nonpositive_amount() {
    for name in strategy::STRATEGY_NAMES {
        let ctx = FakeMarket::new();
        ctx.set_mid("X", 49.8);
        let mut s = make(name, ctx);
        s.register(vec![
            buy("X", 1000.0, 50.0, Clock::system()),
            sell("Y", 3.0, 80.0, Clock::system()),
        ]);
        let tick = Tick::from_pairs([("X", 49.8), ("Y", 80.2)]);
        for _ in 0..4 {
            for order in s.get_orders(&tick) {
                assert!(
                    order.amount > 0.0,
                    "{name} returned a non-positive amount"
                );
            }
        }
    }
}

#[test]
fn adjust_is_idempotent_for_an_unchanged_tick() {
    for name in strategy::STRATEGY_NAMES {
        let ctx = FakeMarket::new();
        ctx.set_mid("X", 49.8);
        let mut s = make(name, ctx);
        let original = buy("X", 1000.0, 50.0, Clock::system());
        s.register(vec![original.clone()]);
        let tick = Tick::from_pairs([("X", 49.8)]);

        let mut order = original.derive_working(100.0, OrderKind::Limit);
        s.adjust(&mut order, &tick);
        let first = order.desired.price;
        s.adjust(&mut order, &tick);
        assert_eq!(order.desired.price, first, "{name} adjust is not stable");
    }
}

#[test]
fn progress_is_reported_through_the_context_log() {
    let ctx = FakeMarket::new();
    let mut s = make("delta", ctx.clone());
    s.register(vec![buy("X", 1000.0, 50.0, Clock::system())]);
    let tick = Tick::from_pairs([("X", 49.0)]);

    let orders = s.get_orders(&tick);
    let limit = orders.iter().find(|o| !o.to_cancel).unwrap().clone();
    s.observe(&done_with(limit.id, 400.0));
    s.get_orders(&tick);

    let logs = ctx.logs();
    assert!(logs.iter().any(|l| l.contains("To buy: 1000 X @ 50")));
    assert!(logs.iter().any(|l| l.contains("X executed at: 40.00 (400/1000)")));
}
