use ta::indicators::{ExponentialMovingAverage as Ema, SimpleMovingAverage as Sma};
use ta::Next;

/// Simple moving average of the last `period` values.
pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let mut sma = Sma::new(period).ok()?;
    let mut last = None;
    for &v in &values[values.len() - period..] {
        last = Some(sma.next(v));
    }
    last
}

/// Exponential moving average over the whole input, seeded with the first value.
pub fn ema(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let mut ema = Ema::new(period).ok()?;
    values.iter().fold(None, |_, &v| Some(ema.next(v)))
}
