use configuration::VolatilityParams;
use core_types::Bar;
use indicators::atr_ratio;

/// Per-instrument gate state. Instruments start enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolatilityState {
    pub enabled: bool,
    /// Epoch seconds of the last transition, `None` before the first one.
    pub last_transition: Option<i64>,
}

impl Default for VolatilityState {
    fn default() -> Self {
        Self {
            enabled: true,
            last_transition: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Paused,
    Resumed,
}

/// Hysteresis gate on the ratio of current ATR to its recent average.
///
/// Pauses below `low_threshold`, resumes at or above `high_threshold`, and never
/// transitions twice within `cooldown_secs`.
#[derive(Debug, Clone)]
pub struct VolatilityGate {
    params: VolatilityParams,
}

impl VolatilityGate {
    pub fn new(params: VolatilityParams) -> Self {
        Self { params }
    }

    pub fn ratio(&self, bars: &[Bar]) -> Option<f64> {
        atr_ratio(bars, self.params.atr_period, self.params.average_window)
    }

    pub fn observe(&self, state: &mut VolatilityState, ratio: f64, now: i64) -> Option<Transition> {
        let cooled_down = state
            .last_transition
            .is_none_or(|at| now - at >= self.params.cooldown_secs);
        if !cooled_down {
            return None;
        }

        let transition = if state.enabled && ratio < self.params.low_threshold {
            Transition::Paused
        } else if !state.enabled && ratio >= self.params.high_threshold {
            Transition::Resumed
        } else {
            return None;
        };

        state.enabled = transition == Transition::Resumed;
        state.last_transition = Some(now);
        Some(transition)
    }
}
