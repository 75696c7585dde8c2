//! DynLayers — split one intention into layered working orders, each biased
//! to a different price skew, to probe liquidity incrementally.
//!
//! Layers are tried in priority order 3, 2, 4, 1, 5. Layer 5 is the stop-loss
//! layer; the rest are limit layers. Each layer takes a weighted chunk of the
//! original amount, split into at most two unequal pieces so no single large
//! block hits the venue. Per cycle, orders migrate between layers: the last
//! standing stop-loss order demotes to a limit layer (and locks there), and
//! limit orders bubble up one layer as higher layers empty out.

use super::pricing::toward_favorable;
use super::{log_intentions, Strategy};
use crate::domain::{ExecutionReport, Order, OrderKind, Tick};
use crate::market::MarketContext;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::debug;

/// Layer priority order: which layer gets its chunk carved out first.
const LAYERS: [u8; 5] = [3, 2, 4, 1, 5];

const STOP_LOSS_LAYERS: [u8; 1] = [5];

/// Where the last standing stop-loss order is demoted to.
const STOP_LOSS_TO_LIMIT_LAYER: u8 = 3;

/// Limit orders never promote past this layer.
const HIGHEST_LIMIT_LAYER: u8 = 4;

/// Chunks split into two pieces of roughly this ratio.
const SPLIT_RATIO: f64 = 1.2;

/// Price skew building blocks. Layers 1 and 2 sit behind the tick by the
/// outer step; layers 3..5 sit a fraction of the inner step ahead.
const INNER_STEP: f64 = 0.0001;
const OUTER_STEP: f64 = 0.0003;
const SKEW_FRACTION: f64 = 0.65;

fn layer_weight(layer: u8) -> f64 {
    match layer {
        1 => 0.02,
        2 => 0.10,
        3 => 0.10,
        4 => 0.30,
        _ => 0.48,
    }
}

fn layer_skew(layer: u8) -> f64 {
    match layer {
        1 | 2 => -OUTER_STEP,
        _ => SKEW_FRACTION * INNER_STEP,
    }
}

fn is_stop_loss_layer(layer: u8) -> bool {
    STOP_LOSS_LAYERS.contains(&layer)
}

fn kind_for_layer(layer: u8) -> OrderKind {
    if is_stop_loss_layer(layer) {
        OrderKind::StopLoss
    } else {
        OrderKind::Limit
    }
}

/// What this order's live peers (same asset, not completed) look like,
/// captured before migrating the order itself.
struct PeerView {
    /// A peer of the same layer is already posted.
    same_layer_posted: bool,
    /// Any peer still occupies a limit layer.
    any_limit_peer: bool,
    /// A peer occupies the next layer up.
    next_layer_occupied: bool,
}

pub struct DynLayers {
    ctx: Arc<dyn MarketContext>,
    orders: Vec<Order>,
}

impl DynLayers {
    pub fn new(ctx: Arc<dyn MarketContext>) -> Self {
        Self {
            ctx,
            orders: Vec::new(),
        }
    }

    /// The working-order set produced by the last `register`.
    pub fn split_orders(&self) -> &[Order] {
        &self.orders
    }

    /// Split a chunk into at most two unequal pieces. The first piece may
    /// round to zero for small chunks; the remainder still ships.
    fn split_amount(amount: f64) -> Vec<f64> {
        let first = (amount / SPLIT_RATIO).trunc();
        if first == amount {
            vec![first]
        } else {
            vec![first, amount - first]
        }
    }

    /// This layer's weighted chunk of the original, quantized to venue lots.
    fn chunk_of(ctx: &dyn MarketContext, original: &Order, layer: u8) -> f64 {
        let chunk = original.amount * layer_weight(layer);
        let signed = if original.is_buy() { chunk } else { -chunk };
        ctx.adjust_amount(&original.asset, signed, ctx.reference_price())
            .abs()
    }

    /// Split one original into layered working orders. Conservation: the
    /// piece amounts plus any leftover folded into the first piece always sum
    /// to the original amount exactly.
    fn split(ctx: &dyn MarketContext, original: &Order) -> Vec<Order> {
        let mut res: Vec<Order> = Vec::new();
        let mut remaining = original.amount;
        for layer in LAYERS {
            let amount = Self::chunk_of(ctx, original, layer).min(remaining);
            if amount == 0.0 {
                continue;
            }
            for piece in Self::split_amount(amount) {
                let mut working = original.derive_working(piece, kind_for_layer(layer));
                working.layer = Some(layer);
                remaining -= piece;
                res.push(working);
            }
        }

        // Every chunk rounded to zero: fall back to the original, unsplit,
        // at the highest-priority layer.
        if res.is_empty() {
            let mut working = original.clone();
            working.layer = Some(LAYERS[0]);
            working.layer_locked = false;
            return vec![working];
        }

        if remaining > 0.0 {
            res[0].amount += remaining;
        }
        res
    }

    fn peer_view(&self, order: &Order) -> PeerView {
        let mut view = PeerView {
            same_layer_posted: false,
            any_limit_peer: false,
            next_layer_occupied: false,
        };
        let next_layer = order.layer.map(|l| l + 1);
        for peer in &self.orders {
            if peer.asset != order.asset || peer.id == order.id || peer.observed.completed {
                continue;
            }
            if peer.observed.posted && peer.layer == order.layer {
                view.same_layer_posted = true;
            }
            if let Some(layer) = peer.layer {
                if !is_stop_loss_layer(layer) {
                    view.any_limit_peer = true;
                }
            }
            if peer.layer == next_layer && next_layer.is_some() {
                view.next_layer_occupied = true;
            }
        }
        view
    }

    fn migrate(view: &PeerView, order: &mut Order) {
        let Some(layer) = order.layer else {
            return;
        };
        if is_stop_loss_layer(layer) {
            // Demote the last standing stop-loss order and pin it down.
            if !view.any_limit_peer {
                debug!(id = order.id.0, asset = %order.asset, "stop-loss demoted to limit layer");
                order.layer = Some(STOP_LOSS_TO_LIMIT_LAYER);
                order.layer_locked = true;
            }
        } else if layer != HIGHEST_LIMIT_LAYER && !view.next_layer_occupied {
            // Bubble up as higher layers empty out.
            order.layer = Some(layer + 1);
        }
        // The layer type may have changed with the layer.
        order.desired.kind = kind_for_layer(order.layer.unwrap_or(layer));
    }

    fn adjust_with(ctx: &dyn MarketContext, view: &PeerView, order: &mut Order, tick: &Tick) {
        if view.same_layer_posted {
            // A peer already covers this layer; sit out the cycle. This is
            // suppression, not cancellation.
            order.desired.price = None;
            return;
        }
        if !order.layer_locked {
            Self::migrate(view, order);
        }
        let layer = order.layer.unwrap_or(LAYERS[0]);
        let skew = 1.0 + layer_skew(layer);
        let anchor = tick.price(&order.asset);
        let raw = if order.is_buy() {
            anchor * skew
        } else {
            anchor / skew
        };
        let price = toward_favorable(order.side, raw);
        order.desired.price = Some(ctx.adjust_price(&order.asset, price));
    }
}

impl Strategy for DynLayers {
    fn name(&self) -> &'static str {
        "dynlayers"
    }

    fn register(&mut self, intentions: Vec<Order>) {
        log_intentions(self.ctx.as_ref(), &intentions);
        let mut orders: Vec<Order> = intentions
            .iter()
            .flat_map(|o| Self::split(self.ctx.as_ref(), o))
            .filter(|o| !o.observed.completed)
            .collect();
        // Smaller probing orders first, before the larger pieces go out.
        orders.sort_by(|a, b| {
            a.amount
                .partial_cmp(&b.amount)
                .unwrap_or(Ordering::Equal)
                .then(a.layer.cmp(&b.layer))
        });
        self.orders = orders;
    }

    fn get_orders(&mut self, tick: &Tick) -> Vec<Order> {
        for i in 0..self.orders.len() {
            let view = self.peer_view(&self.orders[i]);
            Self::adjust_with(self.ctx.as_ref(), &view, &mut self.orders[i], tick);
        }
        self.orders
            .iter()
            .filter(|o| o.amount > 0.0 && !o.observed.completed)
            .cloned()
            .collect()
    }

    fn adjust(&mut self, order: &mut Order, tick: &Tick) {
        let view = self.peer_view(order);
        Self::adjust_with(self.ctx.as_ref(), &view, order, tick);
    }

    fn observe(&mut self, report: &ExecutionReport) {
        if let Some(order) = self.orders.iter_mut().find(|o| o.id == report.order_id) {
            order.observed = report.observed.clone();
        }
    }
}
