use crate::error::StrategyError;
use crate::Strategy;
use configuration::StochMacdScalpParams;
use core_types::{Bar, Candidate, Direction, StrategyId};
use indicators::{closes, macd, rsi, stochastic};

/// The Stochastic/MACD Scalp rule.
///
/// %K crossing %D out of an extreme zone gives the direction; the MACD
/// histogram sign and a short RSI bias must agree with it.
pub struct StochMacdScalp {
    params: StochMacdScalpParams,
}

impl StochMacdScalp {
    pub fn new(params: StochMacdScalpParams) -> Result<Self, StrategyError> {
        if params.k_period == 0 || params.d_period == 0 || params.rsi_period == 0 {
            return Err(StrategyError::InvalidParameters(
                "Indicator periods cannot be zero".to_string(),
            ));
        }
        if params.oversold >= params.overbought {
            return Err(StrategyError::InvalidParameters(
                "Oversold level must be below overbought level".to_string(),
            ));
        }
        if params.macd.fast >= params.macd.slow {
            return Err(StrategyError::InvalidParameters(
                "MACD fast period must be less than slow period".to_string(),
            ));
        }
        Ok(Self { params })
    }
}

impl Strategy for StochMacdScalp {
    fn id(&self) -> StrategyId {
        StrategyId::StochMacdScalp
    }

    fn evaluate(&self, bars: &[Bar]) -> Option<Candidate> {
        let stoch = stochastic(bars, self.params.k_period, self.params.d_period)?;
        let direction = if stoch.crossed_up() && stoch.prev_k < self.params.oversold {
            Direction::Up
        } else if stoch.crossed_down() && stoch.prev_k > self.params.overbought {
            Direction::Down
        } else {
            return None;
        };

        let all_closes = closes(bars);
        let m = &self.params.macd;
        let histogram = macd(&all_closes, m.fast, m.slow, m.signal)?.histogram;
        let rsi = rsi(&all_closes, self.params.rsi_period)?;

        tracing::debug!(%direction, k = stoch.k, d = stoch.d, histogram, rsi, "StochMacdScalp: cross.");

        let agrees = match direction {
            Direction::Up => histogram > 0.0 && rsi > 50.0,
            Direction::Down => histogram < 0.0 && rsi < 50.0,
        };
        agrees.then(|| Candidate {
            strategy: self.id(),
            direction,
            entry_price: bars[bars.len() - 1].close,
        })
    }
}
