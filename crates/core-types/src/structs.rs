use crate::enums::{Direction, StrategyId};
use crate::error::CoreError;
use serde::{Deserialize, Serialize};

/// A single OHLCV bar. `timestamp` is the bar's open time in epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub timestamp: i64,
}

impl Bar {
    /// Rejects bars with non-finite fields. Such bars must never reach the store.
    pub fn validate(&self) -> Result<(), CoreError> {
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(CoreError::MalformedBar {
                    timestamp: self.timestamp,
                    reason: format!("{name} is not finite ({value})"),
                });
            }
        }
        Ok(())
    }

    /// Absolute size of the candle body.
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// The colour of the candle, `None` for a doji.
    pub fn direction(&self) -> Option<Direction> {
        if self.close > self.open {
            Some(Direction::Up)
        } else if self.close < self.open {
            Some(Direction::Down)
        } else {
            None
        }
    }
}

/// The inbound event shape delivered by the streaming collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarUpdate {
    pub instrument: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
    pub timestamp: i64,
}

impl BarUpdate {
    pub fn bar(&self) -> Bar {
        Bar {
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
            timestamp: self.timestamp,
        }
    }
}

/// A directional signal proposed by one of the confluence rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub strategy: StrategyId,
    pub direction: Direction,
    pub entry_price: f64,
}

/// A currency-pair instrument identifier such as `EURUSD_otc`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Instrument {
    symbol: String,
    base: Option<String>,
    quote: Option<String>,
}

impl Instrument {
    /// Splits the symbol into fixed-width 3-letter base and quote codes after
    /// stripping any market suffix (`_otc`, `-OTC`). Symbols that do not look
    /// like a currency pair keep `None` for both legs.
    pub fn parse(symbol: &str) -> Self {
        let stem = symbol
            .split(['_', '-', '.'])
            .next()
            .unwrap_or_default()
            .to_ascii_uppercase();

        let (base, quote) = if stem.len() >= 6 && stem.is_char_boundary(6) {
            let (base, rest) = stem.split_at(3);
            let quote = &rest[..3];
            if base.chars().all(|c| c.is_ascii_alphabetic())
                && quote.chars().all(|c| c.is_ascii_alphabetic())
            {
                (Some(base.to_string()), Some(quote.to_string()))
            } else {
                (None, None)
            }
        } else {
            (None, None)
        };

        Self {
            symbol: symbol.to_string(),
            base,
            quote,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn base(&self) -> Option<&str> {
        self.base.as_deref()
    }

    pub fn quote(&self) -> Option<&str> {
        self.quote.as_deref()
    }

    /// Iterates over the currency legs that could be parsed.
    pub fn currencies(&self) -> impl Iterator<Item = &str> {
        self.base().into_iter().chain(self.quote())
    }
}
