//! WaitNSee — AskBid gated on a one-shot favorable-drift check.
//!
//! Early in the cycle window the strategy only watches. Once enough of the
//! window remains armed (more than twice the grace period has elapsed), it
//! takes a single snapshot of the fractional gap between tick and target per
//! asset — sign-flipped for sells — and memoizes it for the rest of the
//! registration. Trading is allowed once that delta is known and
//! non-negative, or unconditionally in the last seconds before the deadline.

use super::askbid::{cycle, quote_touch};
use super::ledger::OrderLedger;
use super::{log_intentions, Strategy};
use crate::domain::{ExecutionReport, Order, Tick};
use crate::market::MarketContext;
use std::collections::HashMap;
use std::sync::Arc;

/// Seconds of grace; the delta snapshot arms once
/// `remaining_time <= interval - 2 * GRACE_SECS`.
const GRACE_SECS: f64 = 46.0;

/// Force trading when this close to the deadline, favorable or not.
const FORCE_TRADE_SECS: f64 = 10.0;

pub struct WaitNSee {
    ctx: Arc<dyn MarketContext>,
    ledger: OrderLedger,
    /// Memoized per-asset delta, taken once per registration.
    deltas: HashMap<String, f64>,
}

impl WaitNSee {
    pub fn new(ctx: Arc<dyn MarketContext>) -> Self {
        Self {
            ctx,
            ledger: OrderLedger::new(),
            deltas: HashMap::new(),
        }
    }
}

impl Strategy for WaitNSee {
    fn name(&self) -> &'static str {
        "waitnsee"
    }

    fn register(&mut self, intentions: Vec<Order>) {
        log_intentions(self.ctx.as_ref(), &intentions);
        self.ledger.register(intentions);
        self.deltas.clear();
    }

    fn get_orders(&mut self, tick: &Tick) -> Vec<Order> {
        let ctx = Arc::clone(&self.ctx);
        let interval = ctx.trading_interval();
        let remaining = self.ledger.remaining_time(interval);
        let deltas = &mut self.deltas;

        cycle(&mut self.ledger, ctx.as_ref(), tick, |original, tick| {
            if !deltas.contains_key(&original.asset) && remaining <= interval - 2.0 * GRACE_SECS {
                let mut delta =
                    (tick.price(&original.asset) - original.target_price) / original.target_price;
                if original.is_sell() {
                    delta = -delta;
                }
                deltas.insert(original.asset.clone(), delta);
            }
            match deltas.get(&original.asset) {
                None => false,
                Some(delta) => *delta >= 0.0 || remaining <= FORCE_TRADE_SECS,
            }
        })
    }

    fn adjust(&mut self, order: &mut Order, _tick: &Tick) {
        quote_touch(self.ctx.as_ref(), order);
    }

    fn observe(&mut self, report: &ExecutionReport) {
        self.ledger.observe(report);
    }
}
