//! Market context: the collaborator that supplies venue data and rules.
//!
//! The engine consumes quotes, quantization, wild-move detection and the
//! configured trading interval through this trait; it never talks to a venue
//! itself. Implementations live in the connectivity layer (or in test
//! fixtures).

/// Venue/market services consumed by the adjustment strategies.
pub trait MarketContext: Send + Sync {
    /// Quantize a price to the venue tick size for this asset.
    fn adjust_price(&self, asset: &str, price: f64) -> f64;

    /// Quantize an amount to the venue lot size for this asset. The sign of
    /// `amount` is the trade direction; `reference_price` is the current
    /// portfolio reference price used for value-based lot rules.
    fn adjust_amount(&self, asset: &str, amount: f64, reference_price: f64) -> f64;

    /// Best bid.
    fn bid(&self, asset: &str) -> f64;

    /// Best ask.
    fn ask(&self, asset: &str) -> f64;

    /// Current portfolio reference price used when quantizing amounts.
    fn reference_price(&self) -> f64;

    /// Whether the asset's price is currently making an abnormal jump in the
    /// direction that hurts this side.
    fn is_wild_price_move(&self, asset: &str, is_buy: bool) -> bool;

    /// Configured length of one trading interval, in seconds.
    fn trading_interval(&self) -> f64;

    /// Operator-facing log line. Side effect only.
    fn log(&self, message: &str);
}
