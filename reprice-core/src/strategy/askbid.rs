//! AskBid — the reconciliation skeleton's base case.
//!
//! Sells quote at the current best bid, buys at the current best ask. One
//! working order per asset, sized to the original's remaining amount, with
//! strict cancel-then-post-next-cycle replacement when the resting price
//! drifts from the freshly quoted one.

use super::ledger::OrderLedger;
use super::{log_intentions, Strategy};
use crate::domain::{ExecutionReport, Order, OrderKind, Role, Tick};
use crate::market::MarketContext;
use std::sync::Arc;
use tracing::debug;

/// Quote the touch: bid for sells, ask for buys. Orders pending cancellation
/// keep their cleared price.
pub(crate) fn quote_touch(ctx: &dyn MarketContext, order: &mut Order) {
    if order.to_cancel {
        return;
    }
    let touch = if order.is_sell() {
        ctx.bid(&order.asset)
    } else {
        ctx.ask(&order.asset)
    };
    order.desired.price = Some(ctx.adjust_price(&order.asset, touch));
}

/// One reconciliation cycle over the ledger with a per-order trade gate.
///
/// Shared by AskBid (gate always open) and WaitNSee (delta-based gate).
pub(crate) fn cycle(
    ledger: &mut OrderLedger,
    ctx: &dyn MarketContext,
    tick: &Tick,
    mut do_trade: impl FnMut(&Order, &Tick) -> bool,
) -> Vec<Order> {
    ledger.settle();
    ledger.log_progress(ctx);

    let originals = ledger.originals().to_vec();
    for original in &originals {
        if !do_trade(original, tick) {
            continue;
        }

        // Pre-price the candidate so the replace-if-changed comparison is
        // against an already quantized price; raw quotes would force a
        // cancel every cycle.
        let mut candidate = original.derive_working(original.remaining(), OrderKind::Limit);
        quote_touch(ctx, &mut candidate);

        if ledger.live_working(&original.asset, Role::Limit).is_none() {
            ledger.push(candidate);
            continue;
        }
        let live = ledger.live_working(&original.asset, Role::Limit).unwrap();
        if live.observed.actual_price != candidate.desired.price {
            debug!(
                id = live.id.0,
                asset = %live.asset,
                resting = ?live.observed.actual_price,
                quoted = ?candidate.desired.price,
                "price drifted, cancelling before replacement"
            );
            live.mark_cancel();
        }
    }

    ledger.desired_set()
}

/// Quote-the-touch strategy with full reconciliation.
pub struct AskBid {
    ctx: Arc<dyn MarketContext>,
    ledger: OrderLedger,
}

impl AskBid {
    pub fn new(ctx: Arc<dyn MarketContext>) -> Self {
        Self {
            ctx,
            ledger: OrderLedger::new(),
        }
    }
}

impl Strategy for AskBid {
    fn name(&self) -> &'static str {
        "askbid"
    }

    fn register(&mut self, intentions: Vec<Order>) {
        log_intentions(self.ctx.as_ref(), &intentions);
        self.ledger.register(intentions);
    }

    fn get_orders(&mut self, tick: &Tick) -> Vec<Order> {
        cycle(&mut self.ledger, self.ctx.as_ref(), tick, |_, _| true)
    }

    fn adjust(&mut self, order: &mut Order, _tick: &Tick) {
        quote_touch(self.ctx.as_ref(), order);
    }

    fn observe(&mut self, report: &ExecutionReport) {
        self.ledger.observe(report);
    }
}
