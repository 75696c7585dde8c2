//! NewDelta — delta-banded sizing with stall escalation and book-aware
//! pricing.
//!
//! Sizing follows the same banded shape as `delta` with two differences: the
//! time-pressure base rate scales with a per-asset stall count that grows
//! every cycle the asset sees no fill, and only a single limit slot is run
//! (no stop-loss sizing at all).
//!
//! Pricing is favorable-cent as usual, then nudged one cent away from the
//! market when delta is positive (a worse price while the market is against
//! us), and snapped to the top of the book whenever the touch sits within
//! 0.005% of the tick.

use super::ledger::{ChangeThresholds, OrderLedger};
use super::pricing::toward_favorable;
use super::{log_intentions, Strategy};
use crate::config::NewDeltaParams;
use crate::domain::{ExecutionReport, Order, OrderKind, Role, Tick};
use crate::market::MarketContext;
use std::collections::HashMap;
use std::sync::Arc;

/// Sizing floor in asset units, applied only when the band trades at all.
const MIN_AMOUNT: f64 = 1.0;

/// One cent, the nudge unit for positive-delta pricing.
const NUDGE: f64 = 0.01;

/// Relative gap (in percent) under which the quote snaps to the touch.
const SNAP_GAP_PCT: f64 = 0.005;

pub struct NewDelta {
    ctx: Arc<dyn MarketContext>,
    params: NewDeltaParams,
    ledger: OrderLedger,
    /// Cycles since the last fill, per asset. Starts at 1 and never resets;
    /// it simply stops growing while fills keep landing.
    stall_counts: HashMap<String, u64>,
}

impl NewDelta {
    pub fn new(ctx: Arc<dyn MarketContext>, params: NewDeltaParams) -> Self {
        Self {
            ctx,
            params,
            ledger: OrderLedger::new(),
            stall_counts: HashMap::new(),
        }
    }

    fn delta_of(order: &Order, tick: &Tick) -> f64 {
        let delta = (tick.price(&order.asset) - order.target_price) / order.target_price * 100.0;
        if order.is_sell() {
            -delta
        } else {
            delta
        }
    }

    /// `(to_trade, remainder)` for one original.
    fn sizes(&self, original: &Order, tick: &Tick, remaining_time: f64) -> (f64, f64) {
        let p = &self.params;
        let delta = Self::delta_of(original, tick);
        let count = self.stall_counts.get(&original.asset).copied().unwrap_or(1);

        // Stall-escalated base rate: each fill-less cycle pushes more volume.
        let v_t = p.a1 * (original.remaining() / original.amount).powf(p.l1)
            / (p.a2 * (remaining_time.max(1.0) / 2.0).powf(p.l2))
            * p.a3
            * count as f64
            / original.amount;

        let mut s1 = if delta < 0.0 {
            v_t.max(p.par_n1 * delta.abs().powf(p.exp_n1))
        } else if delta == 0.0 {
            p.par_z
        } else if delta > p.delta_bad_cap {
            0.0
        } else {
            v_t.max(p.par_p1 * delta.abs().powf(p.exp_p1))
        };

        if s1 > 0.0 {
            let ctx = self.ctx.as_ref();
            s1 = original.remaining().min(
                MIN_AMOUNT.max(
                    ctx.adjust_amount(
                        &original.asset,
                        s1 * original.amount,
                        ctx.reference_price(),
                    )
                    .abs(),
                ),
            );
        }
        (s1, original.remaining() - s1)
    }

    fn price_order(&self, order: &mut Order, tick: &Tick) {
        if order.to_cancel {
            return;
        }
        let ctx = self.ctx.as_ref();
        let quantized = ctx.adjust_price(&order.asset, tick.price(&order.asset));
        let mut price = toward_favorable(order.side, quantized);

        // Market against us: back off one cent rather than chase.
        if Self::delta_of(order, tick) > 0.0 {
            price += if order.is_buy() { -NUDGE } else { NUDGE };
        }

        // Already at the touch (or crossed): quote the top of the book.
        if order.is_buy() {
            let ask = ctx.ask(&order.asset);
            if (ask - quantized) / quantized * 100.0 < SNAP_GAP_PCT {
                price = toward_favorable(order.side, ctx.adjust_price(&order.asset, ask));
            }
        } else {
            let bid = ctx.bid(&order.asset);
            if (quantized - bid) / quantized * 100.0 < SNAP_GAP_PCT {
                price = toward_favorable(order.side, ctx.adjust_price(&order.asset, bid));
            }
        }
        order.desired.price = Some(price);
    }
}

impl Strategy for NewDelta {
    fn name(&self) -> &'static str {
        "newdelta"
    }

    fn register(&mut self, intentions: Vec<Order>) {
        log_intentions(self.ctx.as_ref(), &intentions);
        self.stall_counts = intentions.iter().map(|o| (o.asset.clone(), 1)).collect();
        self.ledger.register(intentions);
    }

    fn get_orders(&mut self, tick: &Tick) -> Vec<Order> {
        let filled_assets = self.ledger.settle();
        for (asset, count) in self.stall_counts.iter_mut() {
            if !filled_assets.contains(asset) {
                *count += 1;
            }
        }
        self.ledger.log_progress(self.ctx.as_ref());

        let remaining_time = self.ledger.remaining_time(self.ctx.trading_interval());
        let thresholds = ChangeThresholds {
            amount: self.params.amount_threshold,
            price: self.params.price_threshold,
        };

        let originals = self.ledger.originals().to_vec();
        for original in &originals {
            let (to_trade, mut remainder) = self.sizes(original, tick, remaining_time);

            let candidate = (to_trade > 0.0).then(|| {
                let mut c = original.derive_working(to_trade, OrderKind::Limit);
                // Pre-priced so the replace-if-changed comparison is against
                // an already quantized price.
                self.price_order(&mut c, tick);
                c
            });
            remainder -= self.ledger.reconcile_sized(
                &original.asset,
                Role::Limit,
                original.amount,
                to_trade,
                candidate,
                thresholds,
            );

            // Remainder marker: born cancelled, settles away next cycle.
            let mut marker = original.derive_working(remainder, OrderKind::Limit);
            marker.mark_cancel();
            self.ledger.push(marker);
        }

        self.ledger.desired_set()
    }

    fn adjust(&mut self, order: &mut Order, tick: &Tick) {
        self.price_order(order, tick);
    }

    fn observe(&mut self, report: &ExecutionReport) {
        self.ledger.observe(report);
    }
}
