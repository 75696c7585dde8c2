//! Shared test fixtures: a scriptable market context and clock helpers.

// Each test binary compiles its own copy; not every binary uses every helper.
#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use reprice_core::domain::{Clock, ManualClock};
use reprice_core::market::MarketContext;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Scriptable venue: cent price grid, whole-unit lots, per-asset mid quotes
/// with a symmetric spread, and a captured log.
pub struct FakeMarket {
    state: Mutex<State>,
}

struct State {
    mid: HashMap<String, f64>,
    spread: f64,
    wild: bool,
    interval: f64,
    reference: f64,
    logs: Vec<String>,
}

impl FakeMarket {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State {
                mid: HashMap::new(),
                spread: 0.10,
                wild: false,
                interval: 180.0,
                reference: 50.0,
                logs: Vec::new(),
            }),
        })
    }

    pub fn set_mid(&self, asset: &str, mid: f64) {
        self.state.lock().unwrap().mid.insert(asset.into(), mid);
    }

    pub fn set_spread(&self, spread: f64) {
        self.state.lock().unwrap().spread = spread;
    }

    pub fn set_wild(&self, wild: bool) {
        self.state.lock().unwrap().wild = wild;
    }

    pub fn set_interval(&self, interval: f64) {
        self.state.lock().unwrap().interval = interval;
    }

    pub fn logs(&self) -> Vec<String> {
        self.state.lock().unwrap().logs.clone()
    }

    fn mid_of(&self, asset: &str) -> f64 {
        *self
            .state
            .lock()
            .unwrap()
            .mid
            .get(asset)
            .unwrap_or(&50.0)
    }
}

impl MarketContext for FakeMarket {
    fn adjust_price(&self, _asset: &str, price: f64) -> f64 {
        (price * 100.0).round() / 100.0
    }

    fn adjust_amount(&self, _asset: &str, amount: f64, _reference_price: f64) -> f64 {
        amount.trunc()
    }

    fn bid(&self, asset: &str) -> f64 {
        self.mid_of(asset) - self.state.lock().unwrap().spread / 2.0
    }

    fn ask(&self, asset: &str) -> f64 {
        self.mid_of(asset) + self.state.lock().unwrap().spread / 2.0
    }

    fn reference_price(&self) -> f64 {
        self.state.lock().unwrap().reference
    }

    fn is_wild_price_move(&self, _asset: &str, _is_buy: bool) -> bool {
        self.state.lock().unwrap().wild
    }

    fn trading_interval(&self) -> f64 {
        self.state.lock().unwrap().interval
    }

    fn log(&self, message: &str) {
        self.state.lock().unwrap().logs.push(message.to_string());
    }
}

/// A manually driven clock pinned to a fixed start, plus its handle.
pub fn manual_clock() -> (Arc<ManualClock>, Clock) {
    let start: DateTime<Utc> = "2026-01-05T14:30:00Z".parse().unwrap();
    let source = Arc::new(ManualClock::new(start));
    let clock = Clock::new(source.clone());
    (source, clock)
}

pub fn advance(source: &ManualClock, secs: i64) {
    source.advance(Duration::seconds(secs));
}
