//! Adjustment strategies — pluggable policies that decide, once per cycle,
//! what orders should currently be resting on the venue.
//!
//! A strategy never posts or cancels anything itself. It expresses desired
//! state; the execution layer diffs the returned set against reality (posts
//! new orders, cancels removed or price-cleared ones, leaves the rest alone)
//! and publishes observed-state snapshots back through [`Strategy::observe`].

pub mod askbid;
pub mod delta;
pub mod dynlayers;
pub mod ledger;
pub mod newdelta;
pub(crate) mod pricing;
pub mod target;
pub mod waitnsee;

pub use askbid::AskBid;
pub use delta::Delta;
pub use dynlayers::DynLayers;
pub use ledger::{ChangeThresholds, OrderLedger};
pub use newdelta::NewDelta;
pub use target::{Target, Ticker};
pub use waitnsee::WaitNSee;

use crate::config::EngineParams;
use crate::domain::{ExecutionReport, Order, Tick};
use crate::market::MarketContext;
use std::sync::Arc;
use thiserror::Error;

/// Strategy used when no name is configured.
pub const DEFAULT_STRATEGY: &str = "delta";

/// All registered strategy names.
pub const STRATEGY_NAMES: [&str; 7] = [
    "target",
    "ticker",
    "dynlayers",
    "delta",
    "newdelta",
    "askbid",
    "waitnsee",
];

/// Errors from strategy construction.
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),
}

/// One adjustment strategy.
///
/// The outer scheduler calls [`register`](Strategy::register) once when
/// intentions are (re)established, then [`get_orders`](Strategy::get_orders)
/// once per cycle. The engine is single-threaded per strategy instance; all
/// order mutation happens inside these calls.
pub trait Strategy: Send {
    /// Registry name of this strategy.
    fn name(&self) -> &'static str;

    /// Store the intentions as the source of truth and reset per-registration
    /// bookkeeping.
    fn register(&mut self, intentions: Vec<Order>);

    /// The full set of orders that should currently be live, every order
    /// already priced. Never contains an order with non-positive amount.
    fn get_orders(&mut self, tick: &Tick) -> Vec<Order>;

    /// Per-order pricing primitive: mutate `desired` in place. Idempotent for
    /// an unchanged tick. Used internally by `get_orders` and by tests.
    fn adjust(&mut self, order: &mut Order, tick: &Tick);

    /// Ingest an observed-state snapshot from the execution layer.
    fn observe(&mut self, report: &ExecutionReport);
}

/// Build a strategy by registry name; `None` selects [`DEFAULT_STRATEGY`].
pub fn create(
    name: Option<&str>,
    ctx: Arc<dyn MarketContext>,
    params: &EngineParams,
) -> Result<Box<dyn Strategy>, StrategyError> {
    match name.unwrap_or(DEFAULT_STRATEGY) {
        "target" => Ok(Box::new(Target::new(ctx))),
        "ticker" => Ok(Box::new(Ticker::new(ctx))),
        "askbid" => Ok(Box::new(AskBid::new(ctx))),
        "waitnsee" => Ok(Box::new(WaitNSee::new(ctx))),
        "dynlayers" => Ok(Box::new(DynLayers::new(ctx))),
        "delta" => Ok(Box::new(Delta::new(ctx, params.delta.clone()))),
        "newdelta" => Ok(Box::new(NewDelta::new(ctx, params.newdelta.clone()))),
        other => Err(StrategyError::UnknownStrategy(other.to_string())),
    }
}

/// Log one line per registered intention through the context hook.
pub(crate) fn log_intentions(ctx: &dyn MarketContext, intentions: &[Order]) {
    for order in intentions {
        ctx.log(&format!(
            "To {}: {:.0} {} @ {}",
            order.side.verb(),
            order.amount,
            order.asset,
            order.target_price,
        ));
    }
}
