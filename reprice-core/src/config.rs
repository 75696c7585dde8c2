//! Strategy parameter configuration.
//!
//! Each parameterized strategy gets a typed struct, populated once from TOML
//! and passed by reference at construction. A reload takes effect by
//! rebuilding the strategy with fresh params. TOML layout:
//!
//! ```toml
//! strategy = "delta"
//!
//! [delta]
//! grace_period = 30.0
//! delta_good_cap = -1.0
//!
//! [newdelta]
//! a3 = 2.0
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors from loading engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Tuning parameters for the `delta` strategy.
///
/// `delta` is the signed percentage gap between the current price and the
/// original target (favorable drift is negative for buys after the sign
/// flip). Sizing picks a band by delta and takes the better of a time-based
/// base rate and a power-law rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeltaParams {
    /// Seconds before the interval deadline at which urgency kicks in:
    /// everything remaining is traded and pricing moves to the worse side.
    pub grace_period: f64,
    /// Deltas above this (market moved badly against us) trade nothing.
    pub delta_bad_cap: f64,
    /// Deltas below this (market moved well in our favor) trade everything.
    pub delta_good_cap: f64,
    /// Negative-delta power law: `par_n1 * |delta|^exp_n1 / den_n1`.
    pub par_n1: f64,
    pub exp_n1: f64,
    pub den_n1: f64,
    /// Fraction traded when delta is exactly zero.
    pub par_z: f64,
    /// Positive-delta power law: `par_p * |delta|^exp_p1 / den_n1`.
    pub par_p: f64,
    pub exp_p1: f64,
    /// Time-based base rate `v_t = a1 * progress^l1 / (t/2)^l2`.
    pub a1: f64,
    pub l1: f64,
    pub l2: f64,
    /// Relative amount change (vs. original amount) below which a
    /// cancel/repost is suppressed.
    pub amount_threshold: f64,
    /// Relative price change (vs. target price) below which a cancel/repost
    /// is suppressed.
    pub price_threshold: f64,
}

impl Default for DeltaParams {
    fn default() -> Self {
        Self {
            grace_period: 30.0,
            delta_bad_cap: 0.5,
            delta_good_cap: -1.0,
            par_n1: 0.5,
            exp_n1: 1.4,
            den_n1: 100.0,
            par_z: 0.05,
            par_p: 0.2,
            exp_p1: 1.2,
            a1: 1.0,
            l1: 1.0,
            l2: 0.5,
            amount_threshold: 0.01,
            price_threshold: 0.001,
        }
    }
}

/// Tuning parameters for the `newdelta` strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewDeltaParams {
    /// Deltas above this trade nothing.
    pub delta_bad_cap: f64,
    /// Negative-delta power law: `par_n1 * |delta|^exp_n1`.
    pub par_n1: f64,
    pub exp_n1: f64,
    /// Fraction traded when delta is exactly zero.
    pub par_z: f64,
    /// Positive-delta power law: `par_p1 * |delta|^exp_p1`.
    pub par_p1: f64,
    pub exp_p1: f64,
    /// Base rate `v_t = a1 * progress^l1 / (a2 * (t/2)^l2) * a3 * count`,
    /// where `count` escalates each cycle an asset sees no fill.
    pub a1: f64,
    pub a2: f64,
    pub a3: f64,
    pub l1: f64,
    pub l2: f64,
    /// Negligible-change suppression thresholds, as in [`DeltaParams`].
    pub amount_threshold: f64,
    pub price_threshold: f64,
}

impl Default for NewDeltaParams {
    fn default() -> Self {
        Self {
            delta_bad_cap: 0.5,
            par_n1: 0.5,
            exp_n1: 1.4,
            par_z: 0.05,
            par_p1: 0.2,
            exp_p1: 1.2,
            a1: 1.0,
            a2: 1.0,
            a3: 1.0,
            l1: 1.0,
            l2: 0.5,
            amount_threshold: 0.01,
            price_threshold: 0.001,
        }
    }
}

/// Root of the engine configuration file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineParams {
    /// Strategy name to instantiate; `None` selects the default.
    pub strategy: Option<String>,
    pub delta: DeltaParams,
    pub newdelta: NewDeltaParams,
}

impl EngineParams {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}
