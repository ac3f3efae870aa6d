use crate::bar_store::BarStore;
use crate::pipeline::PendingAlert;
use crate::volatility::VolatilityState;
use core_types::Instrument;

/// Everything the engine tracks for one streamed instrument.
///
/// Always accessed behind the instrument's own lock, so bar updates and the
/// scheduled checks for the same instrument never interleave.
#[derive(Debug)]
pub struct InstrumentState {
    pub instrument: Instrument,
    pub bars: BarStore,
    pub volatility: VolatilityState,
    pub pending: Option<PendingAlert>,
    /// Epoch seconds of the last confirmed signal, for the alert cooldown.
    pub last_signal_at: Option<i64>,
    /// Epoch seconds (wall clock) of the last accepted bar update.
    pub last_update_at: i64,
}

impl InstrumentState {
    pub fn new(symbol: &str, capacity: usize, now: i64) -> Self {
        Self {
            instrument: Instrument::parse(symbol),
            bars: BarStore::new(capacity),
            volatility: VolatilityState::default(),
            pending: None,
            last_signal_at: None,
            last_update_at: now,
        }
    }

    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    pub fn cooling_down(&self, now: i64, cooldown_secs: i64) -> bool {
        self.last_signal_at
            .is_some_and(|at| now - at < cooldown_secs)
    }
}
