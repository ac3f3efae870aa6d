//! Supertrend: an ATR-banded trailing stop that flips between support and
//! resistance when the close breaks through the active band.

use crate::volatility::atr_series;
use core_types::{Bar, Direction};

/// The trend state at the last bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuperTrend {
    pub direction: Direction,
    /// The active band: support when trending up, resistance when trending down.
    pub level: f64,
    /// The direction changed on the last bar.
    pub flipped: bool,
}

pub fn supertrend(bars: &[Bar], period: usize, multiplier: f64) -> Option<SuperTrend> {
    let atr = atr_series(bars, period);
    // Needs two ATR values so that `flipped` is meaningful.
    if atr.len() < 2 {
        return None;
    }

    let start = period;
    let first = &bars[start];
    let hl2 = (first.high + first.low) / 2.0;
    let mut upper = hl2 + multiplier * atr[0];
    let mut lower = hl2 - multiplier * atr[0];
    let mut direction = if first.close >= hl2 {
        Direction::Up
    } else {
        Direction::Down
    };
    let mut flipped = false;

    for (k, &range) in atr.iter().enumerate().skip(1) {
        let bar = &bars[start + k];
        let prev_close = bars[start + k - 1].close;
        let hl2 = (bar.high + bar.low) / 2.0;
        let basic_upper = hl2 + multiplier * range;
        let basic_lower = hl2 - multiplier * range;

        // Bands only ratchet toward price unless the previous close broke them.
        upper = if basic_upper < upper || prev_close > upper {
            basic_upper
        } else {
            upper
        };
        lower = if basic_lower > lower || prev_close < lower {
            basic_lower
        } else {
            lower
        };

        let next = match direction {
            Direction::Up if bar.close < lower => Direction::Down,
            Direction::Down if bar.close > upper => Direction::Up,
            current => current,
        };
        flipped = next != direction;
        direction = next;
    }

    let level = match direction {
        Direction::Up => lower,
        Direction::Down => upper,
    };
    Some(SuperTrend {
        direction,
        level,
        flipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::make_bars;

    #[test]
    fn uptrend_has_support_below_price() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let bars = make_bars(&closes);
        let st = supertrend(&bars, 10, 3.0).unwrap();
        assert_eq!(st.direction, Direction::Up);
        assert!(st.level < bars[bars.len() - 1].close);
        assert!(!st.flipped);
    }

    #[test]
    fn crash_flips_to_downtrend() {
        let mut closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        closes.push(60.0);
        let st = supertrend(&make_bars(&closes), 10, 3.0).unwrap();
        assert_eq!(st.direction, Direction::Down);
        assert!(st.flipped);
        assert!(st.level > 60.0);
    }

    #[test]
    fn insufficient_data() {
        let bars = make_bars(&[1.0; 11]);
        assert!(supertrend(&bars, 10, 3.0).is_none());
        assert!(supertrend(&make_bars(&[1.0; 12]), 10, 3.0).is_some());
    }
}
