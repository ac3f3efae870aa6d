use chrono::{DateTime, Utc};
use core_types::{Candidate, Direction, StrategyId};
use uuid::Uuid;

/// A speculative alert awaiting its confirmation check.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAlert {
    pub id: Uuid,
    pub strategy: StrategyId,
    pub direction: Direction,
    pub entry_price: f64,
    pub created_at: DateTime<Utc>,
}

impl PendingAlert {
    pub fn new(candidate: Candidate, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            strategy: candidate.strategy,
            direction: candidate.direction,
            entry_price: candidate.entry_price,
            created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Confirmation {
    Confirmed,
    Lost { deviation: f64 },
}

/// Relative distance between the entry and the current price.
/// A non-positive entry has no meaningful deviation and reads as infinite.
pub fn deviation(entry: f64, current: f64) -> f64 {
    if entry <= 0.0 {
        return f64::INFINITY;
    }
    (current - entry).abs() / entry
}

/// An alert is lost once price has moved strictly more than `max_deviation` away.
pub fn confirm(entry: f64, current: f64, max_deviation: f64) -> Confirmation {
    let deviation = deviation(entry, current);
    if deviation > max_deviation {
        Confirmation::Lost { deviation }
    } else {
        Confirmation::Confirmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_move_confirms() {
        assert_eq!(confirm(100.0, 103.0, 0.05), Confirmation::Confirmed);
        assert_eq!(confirm(100.0, 96.0, 0.05), Confirmation::Confirmed);
    }

    #[test]
    fn large_move_is_lost() {
        match confirm(100.0, 106.0, 0.05) {
            Confirmation::Lost { deviation } => assert!((deviation - 0.06).abs() < 1e-12),
            other => panic!("expected a lost signal, got {other:?}"),
        }
    }

    #[test]
    fn zero_entry_is_always_lost() {
        assert!(matches!(confirm(0.0, 0.0, 0.05), Confirmation::Lost { .. }));
    }
}
