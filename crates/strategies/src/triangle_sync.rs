use crate::error::StrategyError;
use crate::Strategy;
use configuration::TriangleSyncParams;
use core_types::{Bar, Candidate, Direction, StrategyId};
use indicators::{atr, closes, macd, rsi, sma, volumes};

/// The Triangle Sync Breakout rule.
///
/// The look-back window preceding the newest bar must be compressing (its range
/// is small relative to ATR, or the swing highs and lows of both halves line up),
/// the newest close must break out of it, and RSI, MACD histogram and volume
/// must all agree with the breakout.
pub struct TriangleSync {
    params: TriangleSyncParams,
}

impl TriangleSync {
    pub fn new(params: TriangleSyncParams) -> Result<Self, StrategyError> {
        if params.lookback < 4 {
            return Err(StrategyError::InvalidParameters(
                "Triangle look-back must cover at least 4 bars".to_string(),
            ));
        }
        if params.atr_period == 0 || params.rsi_period == 0 || params.volume_period == 0 {
            return Err(StrategyError::InvalidParameters(
                "Indicator periods cannot be zero".to_string(),
            ));
        }
        if params.macd.fast >= params.macd.slow {
            return Err(StrategyError::InvalidParameters(
                "MACD fast period must be less than slow period".to_string(),
            ));
        }
        Ok(Self { params })
    }

    fn is_converging(&self, window: &[Bar], atr: f64) -> bool {
        let highest = window.iter().map(|b| b.high).fold(f64::MIN, f64::max);
        let lowest = window.iter().map(|b| b.low).fold(f64::MAX, f64::min);
        if highest - lowest < self.params.atr_multiple * atr {
            return true;
        }

        let (early, late) = window.split_at(window.len() / 2);
        let swing_high = |half: &[Bar]| half.iter().map(|b| b.high).fold(f64::MIN, f64::max);
        let swing_low = |half: &[Bar]| half.iter().map(|b| b.low).fold(f64::MAX, f64::min);
        let close_enough =
            |a: f64, b: f64| (a - b).abs() <= self.params.swing_tolerance * a.abs().max(b.abs());

        close_enough(swing_high(early), swing_high(late))
            && close_enough(swing_low(early), swing_low(late))
    }
}

impl Strategy for TriangleSync {
    fn id(&self) -> StrategyId {
        StrategyId::TriangleSync
    }

    fn evaluate(&self, bars: &[Bar]) -> Option<Candidate> {
        let n = bars.len();
        let lookback = self.params.lookback;
        if n < lookback + 1 {
            return None;
        }
        let history = &bars[..n - 1];
        let window = &history[n - 1 - lookback..];
        let latest = &bars[n - 1];

        let resistance = window.iter().map(|b| b.high).fold(f64::MIN, f64::max);
        let support = window.iter().map(|b| b.low).fold(f64::MAX, f64::min);
        let direction = if latest.close > resistance {
            Direction::Up
        } else if latest.close < support {
            Direction::Down
        } else {
            return None;
        };

        let atr = atr(history, self.params.atr_period)?;
        if !self.is_converging(window, atr) {
            return None;
        }

        let all_closes = closes(bars);
        let rsi = rsi(&all_closes, self.params.rsi_period)?;
        let m = &self.params.macd;
        let histogram = macd(&all_closes, m.fast, m.slow, m.signal)?.histogram;
        let average_volume = sma(&volumes(history), self.params.volume_period)?;

        tracing::debug!(%direction, rsi, histogram, volume = latest.volume, average_volume, "TriangleSync: breakout.");

        let momentum_agrees = match direction {
            Direction::Up => rsi > 50.0 && histogram > 0.0,
            Direction::Down => rsi < 50.0 && histogram < 0.0,
        };
        if !momentum_agrees || latest.volume <= average_volume {
            return None;
        }

        Some(Candidate {
            strategy: self.id(),
            direction,
            entry_price: latest.close,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::bar;

    fn rule() -> TriangleSync {
        TriangleSync::new(TriangleSyncParams::default()).unwrap()
    }

    /// A tight 100.0 / 100.2 chop.
    fn coil(len: usize) -> Vec<Bar> {
        (0..len)
            .map(|i| {
                let c = 100.0 + 0.2 * (i % 2) as f64;
                bar(c, c + 0.05, c - 0.05, c, i as i64 * 60)
            })
            .collect()
    }

    fn with_breakout(mut bars: Vec<Bar>, close: f64, volume: f64) -> Vec<Bar> {
        let ts = bars.len() as i64 * 60;
        let open = bars[bars.len() - 1].close;
        let mut b = bar(open, open.max(close) + 0.05, open.min(close) - 0.05, close, ts);
        b.volume = volume;
        bars.push(b);
        bars
    }

    #[test]
    fn breakout_up_with_volume() {
        let bars = with_breakout(coil(60), 100.7, 500.0);
        let c = rule().evaluate(&bars).unwrap();
        assert_eq!(c.direction, Direction::Up);
        assert_eq!(c.entry_price, 100.7);
    }

    #[test]
    fn breakdown_with_volume() {
        let bars = with_breakout(coil(60), 99.5, 500.0);
        let c = rule().evaluate(&bars).unwrap();
        assert_eq!(c.direction, Direction::Down);
    }

    #[test]
    fn breakout_without_volume_is_ignored() {
        let bars = with_breakout(coil(60), 100.7, 100.0);
        assert!(rule().evaluate(&bars).is_none());
    }

    #[test]
    fn inside_the_range_is_ignored() {
        let bars = with_breakout(coil(60), 100.1, 500.0);
        assert!(rule().evaluate(&bars).is_none());
    }

    #[test]
    fn trending_window_is_not_a_triangle() {
        let bars: Vec<Bar> = (0..60)
            .map(|i| {
                let c = 100.0 + i as f64;
                bar(c - 0.5, c + 0.05, c - 0.55, c, i * 60)
            })
            .collect();
        let bars = with_breakout(bars, 162.0, 500.0);
        assert!(rule().evaluate(&bars).is_none());
    }
}
