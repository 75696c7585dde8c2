//! Tick: one scheduling cycle's snapshot of asset reference prices.

use std::collections::HashMap;

/// Snapshot mapping asset → current reference price.
#[derive(Debug, Clone, Default)]
pub struct Tick {
    prices: HashMap<String, f64>,
}

impl Tick {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        Self {
            prices: pairs
                .into_iter()
                .map(|(asset, price)| (asset.to_string(), price))
                .collect(),
        }
    }

    pub fn insert(&mut self, asset: impl Into<String>, price: f64) {
        self.prices.insert(asset.into(), price);
    }

    /// Price for an asset the caller has registered intentions for.
    ///
    /// A missing entry is a caller contract violation — the feed must supply
    /// a price for every registered asset — and is fatal, not recovered.
    pub fn price(&self, asset: &str) -> f64 {
        match self.prices.get(asset) {
            Some(price) => *price,
            None => panic!("tick is missing a price for registered asset {asset:?}"),
        }
    }

    pub fn get(&self, asset: &str) -> Option<f64> {
        self.prices.get(asset).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}
