//! Order entity: one unit of trading intent plus its execution progress.
//!
//! Two kinds of order coexist:
//! - **original orders** — one per asset, the total intention; never posted
//!   directly, they accumulate `filled` as derived orders execute.
//! - **working orders** — derived from an original's remaining amount via
//!   [`Order::derive_working`]; these are what the execution layer actually
//!   posts and cancels.
//!
//! State is split by owner. Strategies write [`DesiredState`]; the execution
//! layer owns [`ObservedState`] and publishes it back each cycle as
//! [`ExecutionReport`] snapshots. Neither side touches the other's half.

use super::clock::Clock;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ORDER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-wide unique order identifier. The execution layer addresses
/// orders by id when reporting observed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub u64);

impl OrderId {
    /// Allocate a fresh id.
    pub fn next() -> Self {
        Self(NEXT_ORDER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn is_buy(self) -> bool {
        matches!(self, Side::Buy)
    }

    /// Lowercase verb for log lines.
    pub fn verb(self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

/// Venue order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderKind {
    Limit,
    StopLoss,
}

/// Reconciliation role. Strategies that run limit and stop-loss orders side
/// by side keep at most one live working order per (asset, role).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Limit,
    StopLoss,
}

impl Role {
    fn for_kind(kind: OrderKind) -> Self {
        match kind {
            OrderKind::Limit => Role::Limit,
            OrderKind::StopLoss => Role::StopLoss,
        }
    }
}

/// What the strategy wants the venue order to look like.
///
/// `price == None` is the one and only cancel signal; strategies pair it with
/// `Order::to_cancel` via [`Order::mark_cancel`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesiredState {
    pub price: Option<f64>,
    pub kind: OrderKind,
}

/// What the execution layer has observed on the venue. Written only by the
/// execution layer; the engine reads whatever snapshot was last published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedState {
    /// Order is currently resting on the venue.
    pub posted: bool,
    /// Price at which it rests, if posted.
    pub actual_price: Option<f64>,
    /// Terminally done: fully filled or cancellation confirmed.
    pub completed: bool,
    /// Cumulative executed amount.
    pub filled: f64,
}

impl Default for ObservedState {
    fn default() -> Self {
        Self {
            posted: false,
            actual_price: None,
            completed: false,
            filled: 0.0,
        }
    }
}

/// Observed-state snapshot published by the execution layer for one order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub order_id: OrderId,
    pub observed: ObservedState,
}

/// A trading order.
#[derive(Debug, Clone)]
pub struct Order {
    // Identity — immutable after creation.
    pub id: OrderId,
    pub asset: String,
    pub side: Side,
    pub kind: OrderKind,
    pub amount: f64,
    pub target_price: f64,
    pub created_at: DateTime<Utc>,
    pub clock: Clock,

    // Written by the strategy each cycle.
    pub desired: DesiredState,

    // Written by the execution layer, read by the strategy.
    pub observed: ObservedState,

    // Reconciliation bookkeeping, owned by the strategy.
    /// Cancellation has been requested. Cooperative: the order stays live
    /// until `observed` confirms the cancel landed.
    pub to_cancel: bool,
    /// This order's fill has been folded into its original. Guards the fold
    /// against double counting.
    pub accounted_for: bool,
    /// Which per-asset slot this order occupies for cancel-before-replace.
    pub role: Role,

    // Strategy-specific tags.
    pub layer: Option<u8>,
    pub layer_locked: bool,
    pub wild: bool,
}

impl Order {
    pub fn new(
        asset: impl Into<String>,
        side: Side,
        amount: f64,
        target_price: f64,
        kind: OrderKind,
        clock: Clock,
    ) -> Self {
        let created_at = clock.now();
        Self {
            id: OrderId::next(),
            asset: asset.into(),
            side,
            kind,
            amount,
            target_price,
            created_at,
            clock,
            desired: DesiredState { price: None, kind },
            observed: ObservedState::default(),
            to_cancel: false,
            accounted_for: false,
            role: Role::for_kind(kind),
            layer: None,
            layer_locked: false,
            wild: false,
        }
    }

    /// Derive a fresh working order from this (original) order: same asset,
    /// side, target price and clock, with the given amount and kind.
    pub fn derive_working(&self, amount: f64, kind: OrderKind) -> Self {
        Self::new(
            self.asset.clone(),
            self.side,
            amount,
            self.target_price,
            kind,
            self.clock.clone(),
        )
    }

    /// Unexecuted amount.
    pub fn remaining(&self) -> f64 {
        self.amount - self.observed.filled
    }

    pub fn is_buy(&self) -> bool {
        self.side.is_buy()
    }

    pub fn is_sell(&self) -> bool {
        !self.side.is_buy()
    }

    /// Request cancellation: clears the desired price (the cancel signal)
    /// and flags the order. The two always travel together.
    pub fn mark_cancel(&mut self) {
        self.desired.price = None;
        self.to_cancel = true;
    }
}
