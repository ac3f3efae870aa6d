use ta::indicators::MovingAverageConvergenceDivergence;
use ta::Next;

/// The three MACD lines at the most recent bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Macd {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// MACD over `closes`: fast EMA minus slow EMA, its own EMA as the signal line,
/// and their difference as the histogram.
///
/// Requires at least `slow + signal` closes so the signal line has warmed up.
pub fn macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Option<Macd> {
    if fast == 0 || slow == 0 || signal == 0 || fast >= slow {
        return None;
    }
    if closes.len() < slow + signal {
        return None;
    }
    let mut indicator = MovingAverageConvergenceDivergence::new(fast, slow, signal).ok()?;
    let mut last = None;
    for &close in closes {
        let out = indicator.next(close);
        last = Some(Macd {
            macd: out.macd,
            signal: out.signal,
            histogram: out.histogram,
        });
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::assert_approx;

    #[test]
    fn flat_series_has_zero_lines() {
        let closes = [50.0; 60];
        let m = macd(&closes, 12, 26, 9).unwrap();
        assert_approx(m.macd, 0.0, 1e-9);
        assert_approx(m.histogram, 0.0, 1e-9);
    }

    #[test]
    fn rising_series_has_positive_macd() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let m = macd(&closes, 12, 26, 9).unwrap();
        assert!(m.macd > 0.0);
        assert_approx(m.histogram, m.macd - m.signal, 1e-9);
    }

    #[test]
    fn requires_warm_up() {
        let closes = [1.0; 34];
        assert!(macd(&closes, 12, 26, 9).is_none());
        assert!(macd(&[1.0; 35], 12, 26, 9).is_some());
    }

    #[test]
    fn rejects_inverted_periods() {
        assert!(macd(&[1.0; 100], 26, 12, 9).is_none());
    }
}
