//! Reprice Core — price-adjustment and order-lifecycle engine.
//!
//! Given a set of trading intentions (buy/sell some amount of an asset by a
//! deadline) and a market-data snapshot per scheduling cycle, this crate
//! decides what orders should currently be resting on the venue and
//! reconciles that desired state against orders already posted, partially
//! filled, or pending cancellation:
//! - Domain types (orders with split desired/observed state, ticks, clocks)
//! - The `Strategy` trait plus a name-keyed factory
//! - Seven concrete adjustment strategies (target, ticker, askbid, waitnsee,
//!   dynlayers, delta, newdelta)
//! - A shared reconciliation ledger with exactly-once fill accounting and
//!   cancel-before-replace semantics
//!
//! The crate performs no I/O and spawns no threads. The exchange connectivity
//! layer, market-data feed, and outer scheduler are external collaborators:
//! they post/cancel the orders a strategy asks for and publish observed-state
//! snapshots back through [`Strategy::observe`].

pub mod config;
pub mod domain;
pub mod market;
pub mod strategy;

pub use config::{ConfigError, DeltaParams, EngineParams, NewDeltaParams};
pub use domain::{
    Clock, DesiredState, ExecutionReport, ObservedState, Order, OrderId, OrderKind, Role, Side,
    Tick, TimeSource,
};
pub use market::MarketContext;
pub use strategy::{Strategy, StrategyError, DEFAULT_STRATEGY};
