use crate::error::StrategyError;
use crate::Strategy;
use configuration::FvgFlipParams;
use core_types::{Bar, Candidate, Direction, StrategyId};
use indicators::{closes, rsi};

/// The Fair-Value-Gap Flip rule.
///
/// Looks for a gap between the bar three back and the newest bar (the middle
/// bar's body leaves an imbalance neither side overlaps) and fires when a
/// short RSI is re-testing the midline.
pub struct FvgFlip {
    params: FvgFlipParams,
}

impl FvgFlip {
    pub fn new(params: FvgFlipParams) -> Result<Self, StrategyError> {
        if params.rsi_period == 0 {
            return Err(StrategyError::InvalidParameters(
                "FVG RSI period cannot be zero".to_string(),
            ));
        }
        if !(0.0..=50.0).contains(&params.rsi_band) {
            return Err(StrategyError::InvalidParameters(
                "FVG RSI band must lie within [0, 50]".to_string(),
            ));
        }
        Ok(Self { params })
    }

    fn gap_direction(bars: &[Bar]) -> Option<Direction> {
        let n = bars.len();
        if n < 3 {
            return None;
        }
        let (origin, latest) = (&bars[n - 3], &bars[n - 1]);
        if origin.high < latest.low {
            Some(Direction::Up)
        } else if origin.low > latest.high {
            Some(Direction::Down)
        } else {
            None
        }
    }
}

impl Strategy for FvgFlip {
    fn id(&self) -> StrategyId {
        StrategyId::FvgFlip
    }

    fn evaluate(&self, bars: &[Bar]) -> Option<Candidate> {
        let direction = Self::gap_direction(bars)?;
        let rsi = rsi(&closes(bars), self.params.rsi_period)?;

        tracing::debug!(%direction, rsi, "FvgFlip: gap found.");
        if (rsi - 50.0).abs() > self.params.rsi_band {
            return None;
        }

        Some(Candidate {
            strategy: self.id(),
            direction,
            entry_price: bars[bars.len() - 1].close,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{bar, choppy};

    fn rule(band: f64) -> FvgFlip {
        FvgFlip::new(FvgFlipParams {
            rsi_period: 10,
            rsi_band: band,
        })
        .unwrap()
    }

    /// Choppy history ending in a bullish gap with a balanced RSI.
    fn bullish_gap() -> Vec<Bar> {
        let mut bars = choppy(30, 100.0);
        // bars[29] closed at 101; gap origin at 100.0 with high 100.1
        bars.push(bar(100.0, 100.1, 99.9, 100.0, 30 * 60));
        bars.push(bar(100.0, 101.05, 99.95, 100.95, 31 * 60));
        bars.push(bar(100.95, 101.1, 100.5, 101.0, 32 * 60));
        bars
    }

    #[test]
    fn fires_up_on_bullish_gap_at_midline() {
        let c = rule(10.0).evaluate(&bullish_gap()).unwrap();
        assert_eq!(c.direction, Direction::Up);
        assert_eq!(c.strategy, StrategyId::FvgFlip);
        assert_eq!(c.entry_price, 101.0);
    }

    #[test]
    fn fires_down_on_bearish_gap() {
        let mut bars = choppy(30, 100.0);
        bars.push(bar(101.0, 101.1, 100.9, 101.0, 30 * 60));
        bars.push(bar(101.0, 101.05, 100.0, 100.05, 31 * 60));
        bars.push(bar(100.05, 100.5, 99.9, 100.0, 32 * 60));
        let c = rule(10.0).evaluate(&bars).unwrap();
        assert_eq!(c.direction, Direction::Down);
    }

    #[test]
    fn no_gap_no_signal() {
        assert!(rule(50.0).evaluate(&choppy(40, 100.0)).is_none());
    }

    #[test]
    fn rsi_outside_band_blocks_signal() {
        // A steady climb makes every bar gap the one three back, but RSI is pinned high.
        let bars: Vec<Bar> = (0..30)
            .map(|i| {
                let c = 100.0 + i as f64;
                bar(c - 0.5, c + 0.1, c - 0.6, c, i * 60)
            })
            .collect();
        assert!(rule(5.0).evaluate(&bars).is_none());
    }

    #[test]
    fn invalid_band_is_rejected() {
        assert!(FvgFlip::new(FvgFlipParams { rsi_period: 10, rsi_band: 60.0 }).is_err());
        assert!(FvgFlip::new(FvgFlipParams { rsi_period: 0, rsi_band: 5.0 }).is_err());
    }
}
