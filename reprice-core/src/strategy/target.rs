//! Target and Ticker — stateless repricing strategies.
//!
//! Both return the registered intentions themselves, repriced every cycle,
//! and rely entirely on the caller's diff-and-repost behavior; they do no
//! splitting and no fill accounting.
//!
//! Known limitation, kept deliberately: neither strategy accounts for
//! in-flight cancellation latency, so a slow cancel can coincide with a
//! stale repost (double buy / double sell). Use a ledger-based strategy when
//! that matters.

use super::{log_intentions, Strategy};
use crate::domain::{ExecutionReport, Order, Tick};
use crate::market::MarketContext;
use std::sync::Arc;

/// Always reprices to the original fixed target, ignoring the market.
pub struct Target {
    ctx: Arc<dyn MarketContext>,
    intentions: Vec<Order>,
}

impl Target {
    pub fn new(ctx: Arc<dyn MarketContext>) -> Self {
        Self {
            ctx,
            intentions: Vec::new(),
        }
    }

    fn price(ctx: &dyn MarketContext, order: &mut Order) {
        order.desired.price = Some(ctx.adjust_price(&order.asset, order.target_price));
    }
}

impl Strategy for Target {
    fn name(&self) -> &'static str {
        "target"
    }

    fn register(&mut self, intentions: Vec<Order>) {
        log_intentions(self.ctx.as_ref(), &intentions);
        self.intentions = intentions;
    }

    fn get_orders(&mut self, _tick: &Tick) -> Vec<Order> {
        for order in &mut self.intentions {
            Self::price(self.ctx.as_ref(), order);
        }
        self.intentions
            .iter()
            .filter(|o| o.amount > 0.0)
            .cloned()
            .collect()
    }

    fn adjust(&mut self, order: &mut Order, _tick: &Tick) {
        Self::price(self.ctx.as_ref(), order);
    }

    fn observe(&mut self, report: &ExecutionReport) {
        if let Some(order) = self.intentions.iter_mut().find(|o| o.id == report.order_id) {
            order.observed = report.observed.clone();
        }
    }
}

/// Always reprices to the current tick price.
pub struct Ticker {
    ctx: Arc<dyn MarketContext>,
    intentions: Vec<Order>,
}

impl Ticker {
    pub fn new(ctx: Arc<dyn MarketContext>) -> Self {
        Self {
            ctx,
            intentions: Vec::new(),
        }
    }

    fn price(ctx: &dyn MarketContext, order: &mut Order, tick: &Tick) {
        order.desired.price = Some(ctx.adjust_price(&order.asset, tick.price(&order.asset)));
    }
}

impl Strategy for Ticker {
    fn name(&self) -> &'static str {
        "ticker"
    }

    fn register(&mut self, intentions: Vec<Order>) {
        log_intentions(self.ctx.as_ref(), &intentions);
        self.intentions = intentions;
    }

    fn get_orders(&mut self, tick: &Tick) -> Vec<Order> {
        for order in &mut self.intentions {
            Self::price(self.ctx.as_ref(), order, tick);
        }
        self.intentions
            .iter()
            .filter(|o| o.amount > 0.0)
            .cloned()
            .collect()
    }

    fn adjust(&mut self, order: &mut Order, tick: &Tick) {
        Self::price(self.ctx.as_ref(), order, tick);
    }

    fn observe(&mut self, report: &ExecutionReport) {
        if let Some(order) = self.intentions.iter_mut().find(|o| o.id == report.order_id) {
            order.observed = report.observed.clone();
        }
    }
}
