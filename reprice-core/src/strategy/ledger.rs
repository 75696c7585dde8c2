//! Order ledger — the reconciliation skeleton shared by the askbid, waitnsee,
//! delta and newdelta strategies.
//!
//! The ledger holds the registered originals and the pending working orders
//! derived from them, and implements the partial-failure core of the control
//! loop:
//! - exactly-once folding of a working order's fill into its original
//!   (completed orders and cancels that landed before posting)
//! - at-most-one-live-working-order per (asset, role), enforced by
//!   cancel-before-replace: while a cancel is in flight the slot stays
//!   occupied and nothing new is posted
//! - replace-if-changed with optional negligible-change suppression
//!
//! Cancellation is cooperative and may span multiple cycles: `mark_cancel` is
//! a request, and the order remains in the pending list until the execution
//! layer's observed state confirms it is done.

use crate::domain::{ExecutionReport, Order, Role};
use crate::market::MarketContext;
use std::collections::HashSet;
use tracing::debug;

/// Relative drift below which a cancel/repost is not worth the churn.
#[derive(Debug, Clone, Copy)]
pub struct ChangeThresholds {
    /// Amount drift as a fraction of the original order's amount.
    pub amount: f64,
    /// Price drift as a fraction of the order's target price.
    pub price: f64,
}

/// Originals plus pending working orders for one strategy instance.
#[derive(Debug, Default)]
pub struct OrderLedger {
    originals: Vec<Order>,
    pending: Vec<Order>,
}

impl OrderLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the originals and reset the pending list.
    pub fn register(&mut self, intentions: Vec<Order>) {
        self.originals = intentions;
        self.pending.clear();
    }

    pub fn originals(&self) -> &[Order] {
        &self.originals
    }

    pub fn pending(&self) -> &[Order] {
        &self.pending
    }

    pub fn original(&self, asset: &str) -> Option<&Order> {
        self.originals.iter().find(|o| o.asset == asset)
    }

    pub fn any_original(&self) -> Option<&Order> {
        self.originals.first()
    }

    /// Apply an observed-state snapshot to the order it addresses. Snapshots
    /// for orders already settled and dropped are ignored; their fill has
    /// been folded in already.
    pub fn observe(&mut self, report: &ExecutionReport) {
        if let Some(order) = self
            .pending
            .iter_mut()
            .chain(self.originals.iter_mut())
            .find(|o| o.id == report.order_id)
        {
            order.observed = report.observed.clone();
        }
    }

    /// Fold finished working orders back into their originals.
    ///
    /// A working order is finished when it is completed, or when it was
    /// marked for cancellation and never made it onto the venue. Its fill is
    /// credited to the original exactly once and the order leaves the pending
    /// list, which is what prevents double counting on later cycles.
    ///
    /// Returns the assets that saw a positive fill in this pass.
    pub fn settle(&mut self) -> HashSet<String> {
        let mut filled_assets = HashSet::new();
        let mut i = 0;
        while i < self.pending.len() {
            let finished = {
                let o = &self.pending[i];
                !o.accounted_for
                    && (o.observed.completed || (o.to_cancel && !o.observed.posted))
            };
            if !finished {
                i += 1;
                continue;
            }
            let mut order = self.pending.remove(i);
            order.accounted_for = true;
            let filled = order.observed.filled;
            debug!(id = order.id.0, asset = %order.asset, filled, "working order settled");
            if let Some(original) = self.originals.iter_mut().find(|o| o.asset == order.asset) {
                original.observed.filled += filled;
            }
            if filled > 0.0 {
                filled_assets.insert(order.asset);
            }
        }
        filled_assets
    }

    /// First pending working order occupying the (asset, role) slot.
    ///
    /// Orders pending cancellation still occupy their slot: a cancel in
    /// flight must block the replacement post until it is confirmed.
    pub fn live_working(&mut self, asset: &str, role: Role) -> Option<&mut Order> {
        self.pending
            .iter_mut()
            .find(|o| o.asset == asset && o.role == role && !o.accounted_for)
    }

    pub fn push(&mut self, order: Order) {
        self.pending.push(order);
    }

    /// Reconcile one (asset, role) slot against a freshly sized and priced
    /// candidate.
    ///
    /// - `to_trade == 0`: cancel whatever occupies the slot.
    /// - empty slot: post the candidate.
    /// - occupied slot: cancel-and-replace if amount, resting price, or kind
    ///   drifted — unless both drifts are below `thresholds` (negligible
    ///   change), in which case the resting order is left alone. The actual
    ///   replacement is posted on a later cycle, once the cancel lands.
    ///
    /// `candidate` must be `Some` whenever `to_trade > 0`. Returns the amount
    /// released by a cancellation issued here (for the caller's remainder
    /// bookkeeping).
    pub fn reconcile_sized(
        &mut self,
        asset: &str,
        role: Role,
        original_amount: f64,
        to_trade: f64,
        candidate: Option<Order>,
        thresholds: ChangeThresholds,
    ) -> f64 {
        if to_trade == 0.0 {
            if let Some(live) = self.live_working(asset, role) {
                debug!(id = live.id.0, asset = %live.asset, "nothing to trade, cancelling slot");
                live.mark_cancel();
                return live.amount;
            }
            return 0.0;
        }

        let candidate = candidate.expect("candidate required when to_trade > 0");
        if self.live_working(asset, role).is_none() {
            // Post only into an empty slot; a cancel in flight blocks this.
            self.push(candidate);
            return 0.0;
        }
        let live = self.live_working(asset, role).unwrap();

        let drifted = live.amount != to_trade
            || live.observed.actual_price != candidate.desired.price
            || live.kind != candidate.kind;
        if !drifted {
            return 0.0;
        }
        let amount_change = (live.amount - to_trade).abs() / original_amount;
        let price_change = match (live.observed.actual_price, candidate.desired.price) {
            (Some(actual), Some(desired)) => (actual - desired).abs() / live.target_price,
            _ => 1.0,
        };
        let negligible = (live.observed.actual_price == candidate.desired.price
            && amount_change < thresholds.amount)
            || (live.amount == candidate.amount && price_change < thresholds.price);
        if negligible {
            debug!(
                id = live.id.0,
                asset = %live.asset,
                amount_change,
                price_change,
                "negligible change, keeping resting order"
            );
            return 0.0;
        }
        debug!(id = live.id.0, asset = %live.asset, "cancel for replacement");
        live.mark_cancel();
        live.amount
    }

    /// Pending orders with positive amount, cloned as the cycle's desired set.
    pub fn desired_set(&self) -> Vec<Order> {
        self.pending
            .iter()
            .filter(|o| o.amount > 0.0)
            .cloned()
            .collect()
    }

    /// Seconds left in the current trading interval, measured from the first
    /// original's creation. Zero when nothing is registered.
    pub fn remaining_time(&self, interval_secs: f64) -> f64 {
        match self.any_original() {
            Some(o) => {
                let elapsed = (o.clock.now() - o.created_at).num_milliseconds() as f64 / 1000.0;
                interval_secs - elapsed
            }
            None => 0.0,
        }
    }

    /// Per-original fill progress through the context log hook.
    pub fn log_progress(&self, ctx: &dyn MarketContext) {
        for o in &self.originals {
            let pct = if o.amount > 0.0 {
                o.observed.filled / o.amount * 100.0
            } else {
                0.0
            };
            ctx.log(&format!(
                "{} executed at: {:.2} ({:.0}/{:.0})",
                o.asset, pct, o.observed.filled, o.amount,
            ));
        }
    }
}
