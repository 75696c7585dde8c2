//! Cent-granularity rounding toward the favorable or unfavorable side.
//!
//! "Favorable" rounding never makes an order less likely to execute at its
//! stated level: buys round down, sells round up. "Unfavorable" is the
//! opposite and is used under urgency or wild price moves.

use crate::domain::Side;

fn round_cents(price: f64, f: impl Fn(f64) -> f64) -> f64 {
    f(price * 100.0) / 100.0
}

pub(crate) fn toward_favorable(side: Side, price: f64) -> f64 {
    match side {
        Side::Buy => round_cents(price, f64::floor),
        Side::Sell => round_cents(price, f64::ceil),
    }
}

pub(crate) fn toward_unfavorable(side: Side, price: f64) -> f64 {
    match side {
        Side::Buy => round_cents(price, f64::ceil),
        Side::Sell => round_cents(price, f64::floor),
    }
}
