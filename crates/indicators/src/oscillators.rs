use core_types::Bar;

const RSI_EPSILON: f64 = 1e-10;

/// Wilder-smoothed Relative Strength Index of the last close.
///
/// The seed averages the first `period` price changes; later changes are
/// smoothed with `alpha = 1 / period`. The loss average is padded with a tiny
/// epsilon instead of special-casing zero, so a series with no losses reads
/// ~100 and a perfectly flat series reads 0.
pub fn rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }

    let mut changes = closes.windows(2).map(|w| w[1] - w[0]);
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for change in changes.by_ref().take(period) {
        if change > 0.0 {
            avg_gain += change;
        } else {
            avg_loss -= change;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;

    let alpha = 1.0 / period as f64;
    for change in changes {
        avg_gain = alpha * change.max(0.0) + (1.0 - alpha) * avg_gain;
        avg_loss = alpha * (-change).max(0.0) + (1.0 - alpha) * avg_loss;
    }

    let rs = avg_gain / (avg_loss + RSI_EPSILON);
    Some(100.0 - 100.0 / (1.0 + rs))
}

/// Stochastic oscillator at the last bar, together with the previous bar's
/// values so that %K/%D crosses can be detected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stochastic {
    pub k: f64,
    pub d: f64,
    pub prev_k: f64,
    pub prev_d: f64,
}

impl Stochastic {
    /// %K moved from at-or-below %D to above it on the last bar.
    pub fn crossed_up(&self) -> bool {
        self.prev_k <= self.prev_d && self.k > self.d
    }

    /// %K moved from at-or-above %D to below it on the last bar.
    pub fn crossed_down(&self) -> bool {
        self.prev_k >= self.prev_d && self.k < self.d
    }
}

/// %K from the rolling `k_period` high/low extremes, %D as the `d_period` mean of %K.
///
/// A window with no range reads 50. Needs `k_period + d_period` bars.
pub fn stochastic(bars: &[Bar], k_period: usize, d_period: usize) -> Option<Stochastic> {
    if k_period == 0 || d_period == 0 || bars.len() < k_period + d_period {
        return None;
    }

    let k_values: Vec<f64> = bars
        .windows(k_period)
        .map(|window| {
            let highest = window.iter().map(|b| b.high).fold(f64::MIN, f64::max);
            let lowest = window.iter().map(|b| b.low).fold(f64::MAX, f64::min);
            let close = window[window.len() - 1].close;
            let range = highest - lowest;
            if range > 0.0 {
                100.0 * (close - lowest) / range
            } else {
                50.0
            }
        })
        .collect();

    let n = k_values.len();
    let mean = |slice: &[f64]| slice.iter().sum::<f64>() / slice.len() as f64;

    Some(Stochastic {
        k: k_values[n - 1],
        d: mean(&k_values[n - d_period..]),
        prev_k: k_values[n - 2],
        prev_d: mean(&k_values[n - 1 - d_period..n - 1]),
    })
}

/// `close[t] - close[t - period]`.
pub fn momentum(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() <= period {
        return None;
    }
    let last = closes.len() - 1;
    Some(closes[last] - closes[last - period])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{assert_approx, make_bars};

    #[test]
    fn rsi_all_gains_is_near_100() {
        let closes = [100.0, 101.0, 102.0, 103.0, 104.0, 105.0];
        assert_approx(rsi(&closes, 3).unwrap(), 100.0, 1e-6);
    }

    #[test]
    fn rsi_all_losses_is_zero() {
        let closes = [105.0, 104.0, 103.0, 102.0, 101.0, 100.0];
        assert_approx(rsi(&closes, 3).unwrap(), 0.0, 1e-6);
    }

    #[test]
    fn rsi_mixed_seed() {
        // Changes: +0.34, -0.25, -0.48 → avg gain 0.34/3, avg loss 0.73/3
        let closes = [44.0, 44.34, 44.09, 43.61];
        let expected = 100.0 - 100.0 / (1.0 + 0.34 / 0.73);
        assert_approx(rsi(&closes, 3).unwrap(), expected, 1e-6);
    }

    #[test]
    fn rsi_balanced_alternation_sits_near_midline() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i % 2) as f64).collect();
        let value = rsi(&closes, 10).unwrap();
        assert!((45.0..=55.0).contains(&value), "rsi was {value}");
    }

    #[test]
    fn rsi_requires_period_changes() {
        assert!(rsi(&[1.0, 2.0, 3.0], 3).is_none());
        assert!(rsi(&[1.0, 2.0, 3.0, 4.0], 3).is_some());
    }

    #[test]
    fn stochastic_at_top_of_range() {
        let bars = make_bars(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let s = stochastic(&bars, 3, 2).unwrap();
        // window high = 6.5, low = 3.5, close = 6 → 83.33
        assert_approx(s.k, 250.0 / 3.0, 1e-9);
        assert_approx(s.d, 250.0 / 3.0, 1e-9);
    }

    #[test]
    fn stochastic_detects_cross_up() {
        // Falling into the lows, then a sharp reversal.
        let bars = make_bars(&[10.0, 9.0, 8.0, 7.0, 6.0, 5.0, 9.0]);
        let s = stochastic(&bars, 3, 3).unwrap();
        assert!(s.prev_k < 20.0);
        assert!(s.crossed_up());
        assert!(!s.crossed_down());
    }

    #[test]
    fn stochastic_flat_window_reads_midline() {
        let bars: Vec<Bar> = make_bars(&[5.0; 6])
            .into_iter()
            .map(|b| Bar { high: b.close, low: b.close, ..b })
            .collect();
        let s = stochastic(&bars, 3, 2).unwrap();
        assert_eq!(s.k, 50.0);
    }

    #[test]
    fn stochastic_insufficient_data() {
        let bars = make_bars(&[1.0, 2.0, 3.0, 4.0]);
        assert!(stochastic(&bars, 3, 2).is_none());
    }

    #[test]
    fn momentum_difference() {
        let closes = [1.0, 2.0, 4.0, 7.0];
        assert_eq!(momentum(&closes, 2), Some(5.0));
        assert_eq!(momentum(&closes, 4), None);
    }
}
