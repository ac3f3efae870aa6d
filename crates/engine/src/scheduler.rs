use core_types::{Direction, StrategyId};
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

/// A deferred check the engine asked to be woken up for.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduledCheck {
    /// Re-check a speculative alert after the confirmation delay.
    Confirm { instrument: String, alert_id: Uuid },
    /// Score a confirmed alert once it has expired.
    Outcome {
        instrument: String,
        alert_id: Uuid,
        strategy: StrategyId,
        direction: Direction,
        entry_price: f64,
        /// Epoch seconds at confirmation.
        confirmed_at: i64,
    },
}

/// Defers a check by a delay. Implementations must never call back into the
/// engine synchronously; the check is delivered later through the engine's
/// check channel.
pub trait Scheduler: Send + Sync {
    fn schedule(&self, delay: Duration, check: ScheduledCheck);
}

/// Schedules each check as a sleeping tokio task that sends it on a channel.
#[derive(Clone)]
pub struct TokioScheduler {
    tx: mpsc::UnboundedSender<ScheduledCheck>,
}

impl TokioScheduler {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ScheduledCheck>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, check: ScheduledCheck) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if tx.send(check).is_err() {
                tracing::debug!("Check channel closed; dropping scheduled check.");
            }
        });
    }
}
