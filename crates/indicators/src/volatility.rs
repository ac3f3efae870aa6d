use core_types::Bar;

/// True range of every bar that has a predecessor.
///
/// Element `i` of the result belongs to bar `i + 1`.
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    bars.windows(2)
        .map(|w| {
            let prev_close = w[0].close;
            let bar = &w[1];
            (bar.high - bar.low)
                .max((bar.high - prev_close).abs())
                .max((bar.low - prev_close).abs())
        })
        .collect()
}

/// Rolling mean of the true range.
///
/// Element `k` of the result belongs to bar `period + k`; the series is empty
/// when fewer than `period + 1` bars are available.
pub fn atr_series(bars: &[Bar], period: usize) -> Vec<f64> {
    if period == 0 {
        return Vec::new();
    }
    let tr = true_range(bars);
    if tr.len() < period {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(tr.len() - period + 1);
    let mut sum: f64 = tr[..period].iter().sum();
    out.push(sum / period as f64);
    for i in period..tr.len() {
        sum += tr[i] - tr[i - period];
        out.push(sum / period as f64);
    }
    out
}

/// Average true range at the last bar.
pub fn atr(bars: &[Bar], period: usize) -> Option<f64> {
    atr_series(bars, period).last().copied()
}

/// Current ATR divided by the mean of the last `window` ATR values.
///
/// Values below 1 mean the market is quieter than it has recently been.
pub fn atr_ratio(bars: &[Bar], period: usize, window: usize) -> Option<f64> {
    if window == 0 {
        return None;
    }
    let series = atr_series(bars, period);
    if series.len() < window {
        return None;
    }
    let recent = &series[series.len() - window..];
    let average = recent.iter().sum::<f64>() / window as f64;
    if average <= 0.0 {
        return None;
    }
    series.last().map(|current| current / average)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{assert_approx, make_bars};

    #[test]
    fn true_range_uses_gap_to_previous_close() {
        let mut bars = make_bars(&[10.0, 10.0]);
        bars[1].high = 13.0;
        bars[1].low = 12.0;
        bars[1].close = 12.5;
        assert_eq!(true_range(&bars), vec![3.0]);
    }

    #[test]
    fn atr_is_rolling_mean_of_true_range() {
        // Unit steps with a 1.0 high-low range → TR = 1.5 everywhere.
        let bars = make_bars(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let series = atr_series(&bars, 2);
        assert_eq!(series.len(), 3);
        for v in series {
            assert_approx(v, 1.5, 1e-12);
        }
    }

    #[test]
    fn atr_insufficient_data() {
        let bars = make_bars(&[1.0, 2.0]);
        assert!(atr(&bars, 2).is_none());
        assert!(atr(&make_bars(&[1.0, 2.0, 3.0]), 2).is_some());
    }

    #[test]
    fn ratio_of_steady_market_is_one() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i % 2) as f64).collect();
        let ratio = atr_ratio(&make_bars(&closes), 14, 30).unwrap();
        assert_approx(ratio, 1.0, 1e-9);
    }

    #[test]
    fn ratio_drops_when_market_goes_quiet() {
        let mut closes: Vec<f64> = (0..60).map(|i| 100.0 + 2.0 * (i % 2) as f64).collect();
        closes.extend(std::iter::repeat(101.0).take(14));
        let mut bars = make_bars(&closes);
        for bar in bars.iter_mut().skip(60) {
            bar.high = bar.close + 0.05;
            bar.low = bar.close - 0.05;
        }
        let ratio = atr_ratio(&bars, 14, 30).unwrap();
        assert!(ratio < 0.6, "ratio was {ratio}");
    }
}
