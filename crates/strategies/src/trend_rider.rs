use crate::error::StrategyError;
use crate::Strategy;
use configuration::TrendRiderParams;
use core_types::{Bar, Candidate, Direction, StrategyId};
use indicators::{closes, ema, momentum, supertrend};

/// The Trend Rider + Momentum rule.
///
/// Price must be re-testing the long moving average or have just flipped the
/// supertrend line. The newest candle has to out-size the previous one in the
/// supertrend's direction, with momentum growing on the same side of zero.
pub struct TrendRider {
    params: TrendRiderParams,
}

impl TrendRider {
    pub fn new(params: TrendRiderParams) -> Result<Self, StrategyError> {
        if params.ma_period == 0 || params.supertrend_period == 0 || params.momentum_period == 0 {
            return Err(StrategyError::InvalidParameters(
                "Indicator periods cannot be zero".to_string(),
            ));
        }
        if params.supertrend_multiplier <= 0.0 {
            return Err(StrategyError::InvalidParameters(
                "Supertrend multiplier must be positive".to_string(),
            ));
        }
        Ok(Self { params })
    }
}

impl Strategy for TrendRider {
    fn id(&self) -> StrategyId {
        StrategyId::TrendRider
    }

    fn evaluate(&self, bars: &[Bar]) -> Option<Candidate> {
        let n = bars.len();
        if n < 2 {
            return None;
        }
        let (previous, latest) = (&bars[n - 2], &bars[n - 1]);

        let trend = supertrend(
            bars,
            self.params.supertrend_period,
            self.params.supertrend_multiplier,
        )?;
        let direction = trend.direction;

        let all_closes = closes(bars);
        let ma = ema(&all_closes, self.params.ma_period)?;
        let near_ma = (latest.close - ma).abs() <= self.params.ma_tolerance * ma.abs();
        if !(near_ma || trend.flipped) {
            return None;
        }

        if latest.body() <= previous.body() || latest.direction() != Some(direction) {
            return None;
        }

        let period = self.params.momentum_period;
        let now = momentum(&all_closes, period)?;
        let before = momentum(&all_closes[..n - 1], period)?;
        tracing::debug!(%direction, ma, near_ma, flipped = trend.flipped, now, before, "TrendRider: momentum check.");

        let momentum_agrees = match direction {
            Direction::Up => now > 0.0 && now > before,
            Direction::Down => now < 0.0 && now < before,
        };
        momentum_agrees.then(|| Candidate {
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

    fn rule() -> TrendRider {
        TrendRider::new(TrendRiderParams {
            ma_tolerance: 0.03,
            ..TrendRiderParams::default()
        })
        .unwrap()
    }

    /// A steady drift of `step` per bar with small bodies, then one wide candle of `last_body`.
    fn trend(step: f64, last_body: f64) -> Vec<Bar> {
        let mut bars: Vec<Bar> = (0..60)
            .map(|i| {
                let close = 100.0 + step * i as f64;
                let open = close - step / 2.0;
                bar(open, open.max(close) + 0.02, open.min(close) - 0.02, close, i * 60)
            })
            .collect();
        let open = bars[59].close;
        let close = open + last_body;
        bars.push(bar(open, open.max(close) + 0.02, open.min(close) - 0.02, close, 60 * 60));
        bars
    }

    #[test]
    fn accelerating_uptrend_fires_up() {
        let c = rule().evaluate(&trend(0.1, 0.3)).unwrap();
        assert_eq!(c.direction, Direction::Up);
        assert_eq!(c.strategy, StrategyId::TrendRider);
    }

    #[test]
    fn accelerating_downtrend_fires_down() {
        let c = rule().evaluate(&trend(-0.1, -0.3)).unwrap();
        assert_eq!(c.direction, Direction::Down);
    }

    #[test]
    fn small_candle_is_ignored() {
        assert!(rule().evaluate(&trend(0.1, 0.04)).is_none());
    }

    #[test]
    fn price_far_from_average_is_ignored() {
        let strict = TrendRider::new(TrendRiderParams {
            ma_tolerance: 0.0001,
            ..TrendRiderParams::default()
        })
        .unwrap();
        assert!(strict.evaluate(&trend(0.1, 0.3)).is_none());
    }
}
