//! # Indicator Library
//!
//! Deterministic, stateless functions over an ordered bar (or close) sequence.
//! Every function returns `None` when the input is shorter than its lookback, so
//! callers are forced to handle "insufficient data" before using a value.

pub mod macd;
pub mod moving_average;
pub mod oscillators;
pub mod supertrend;
pub mod volatility;

pub use macd::{macd, Macd};
pub use moving_average::{ema, sma};
pub use oscillators::{momentum, rsi, stochastic, Stochastic};
pub use supertrend::{supertrend, SuperTrend};
pub use volatility::{atr, atr_ratio, atr_series, true_range};

use core_types::Bar;

/// Extracts the close prices of a bar window.
pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Extracts the volumes of a bar window.
pub fn volumes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.volume).collect()
}
