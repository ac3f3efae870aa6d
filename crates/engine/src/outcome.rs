use core_types::Direction;
use rust_decimal::prelude::*;
use std::sync::Mutex;

/// Running win/loss totals across every resolved alert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub total: u64,
    pub wins: u64,
    pub losses: u64,
}

impl Stats {
    /// Percentage of wins, rounded half away from zero to one decimal place.
    /// Zero before any alert has resolved.
    pub fn win_rate(&self) -> Decimal {
        if self.total == 0 {
            return Decimal::ZERO;
        }
        (Decimal::from(self.wins) * Decimal::ONE_HUNDRED / Decimal::from(self.total))
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
    }
}

/// An up alert wins when price closed above entry, a down alert when below.
/// An unchanged price is a loss.
pub fn is_win(direction: Direction, entry: f64, exit: f64) -> bool {
    match direction {
        Direction::Up => exit > entry,
        Direction::Down => exit < entry,
    }
}

/// Owns the statistics. Updates are serialized so `total == wins + losses` always holds.
#[derive(Debug, Default)]
pub struct OutcomeTracker {
    stats: Mutex<Stats>,
}

impl OutcomeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one outcome and returns the totals including it.
    pub fn record(&self, win: bool) -> Stats {
        let mut stats = self.stats.lock().unwrap_or_else(|e| e.into_inner());
        stats.total += 1;
        if win {
            stats.wins += 1;
        } else {
            stats.losses += 1;
        }
        *stats
    }

    pub fn snapshot(&self) -> Stats {
        *self.stats.lock().unwrap_or_else(|e| e.into_inner())
    }
}
