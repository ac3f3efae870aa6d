use chrono::{DateTime, Utc};
use core_types::{Direction, StrategyId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A UTC trading session window, as reported in the startup banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub start_hour: u32,
    pub end_hour: u32,
}

/// The scored outcome of one confirmed alert, together with the running totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeResult {
    pub alert_id: Uuid,
    pub instrument: String,
    pub strategy: StrategyId,
    pub direction: Direction,
    pub entry_price: f64,
    pub exit_price: f64,
    pub win: bool,
    pub total: u64,
    pub wins: u64,
    pub losses: u64,
    /// Percentage, rounded to one decimal place.
    pub win_rate: Decimal,
}

/// Everything the engine tells the outside world.
///
/// The `#[serde(tag = "type", content = "payload")]` attribute serializes the enum into
/// `{"type": "SignalLost", "payload": {...}}`, which keeps it easy to forward as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Notification {
    /// Startup banner: whether the current time is inside a trading session.
    EngineStarted {
        active: bool,
        sessions: Vec<Session>,
        rules: Vec<StrategyId>,
    },
    /// A rule fired; the alert is pending confirmation.
    SpeculativeAlert {
        alert_id: Uuid,
        instrument: String,
        strategy: StrategyId,
        direction: Direction,
        entry_price: f64,
        created_at: DateTime<Utc>,
    },
    /// Price ran away from the entry before confirmation.
    SignalLost {
        alert_id: Uuid,
        instrument: String,
        strategy: StrategyId,
        direction: Direction,
        entry_price: f64,
        current_price: f64,
        deviation: f64,
    },
    /// The alert survived the confirmation delay.
    SignalConfirmed {
        alert_id: Uuid,
        instrument: String,
        strategy: StrategyId,
        direction: Direction,
        entry_price: f64,
        confirmed_price: f64,
        expiry_secs: f64,
    },
    VolatilityPaused { instrument: String, ratio: f64 },
    VolatilityResumed { instrument: String, ratio: f64 },
    TradeResult(TradeResult),
}

impl Notification {
    /// A stable name for the intent of this notification.
    pub fn intent(&self) -> &'static str {
        match self {
            Notification::EngineStarted { .. } => "engine-started",
            Notification::SpeculativeAlert { .. } => "speculative-alert",
            Notification::SignalLost { .. } => "signal-lost",
            Notification::SignalConfirmed { .. } => "signal-confirmed",
            Notification::VolatilityPaused { .. } => "volatility-paused",
            Notification::VolatilityResumed { .. } => "volatility-resumed",
            Notification::TradeResult(_) => "trade-result",
        }
    }

    /// The instrument this notification concerns, if any.
    pub fn instrument(&self) -> Option<&str> {
        match self {
            Notification::EngineStarted { .. } => None,
            Notification::SpeculativeAlert { instrument, .. }
            | Notification::SignalLost { instrument, .. }
            | Notification::SignalConfirmed { instrument, .. }
            | Notification::VolatilityPaused { instrument, .. }
            | Notification::VolatilityResumed { instrument, .. } => Some(instrument),
            Notification::TradeResult(result) => Some(&result.instrument),
        }
    }
}

fn arrow(direction: Direction) -> &'static str {
    match direction {
        Direction::Up => "📈",
        Direction::Down => "📉",
    }
}

/// Plain-text rendering, one message per notification.
impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::EngineStarted { active, sessions, rules } => {
                let status = if *active { "🟢 ACTIVE" } else { "🟡 STANDBY" };
                writeln!(f, "🤖 Signal engine: {status}")?;
                if sessions.is_empty() {
                    writeln!(f, "Sessions (UTC): always on")?;
                } else {
                    writeln!(f, "Sessions (UTC):")?;
                    for s in sessions {
                        writeln!(f, "• {:02}:00 - {:02}:00", s.start_hour, s.end_hour)?;
                    }
                }
                let names: Vec<&str> = rules.iter().map(|r| r.label()).collect();
                write!(f, "Rules: {}", names.join(", "))
            }
            Notification::SpeculativeAlert { instrument, strategy, direction, entry_price, .. } => write!(
                f,
                "⏳ Possible signal: {instrument} | {direction} {}\nStrategy: {strategy}\nEntry: {entry_price:.5}\nWaiting for confirmation...",
                arrow(*direction)
            ),
            Notification::SignalLost { instrument, strategy, direction, entry_price, current_price, deviation, .. } => write!(
                f,
                "❌ Signal lost: {instrument} | {direction}\nStrategy: {strategy}\nEntry: {entry_price:.5} → now {current_price:.5} ({:.2}% move)",
                deviation * 100.0
            ),
            Notification::SignalConfirmed { instrument, strategy, direction, entry_price, confirmed_price, expiry_secs, .. } => write!(
                f,
                "🎯 Signal: {instrument} | {direction} {}\nStrategy: {strategy}\nEntry: {confirmed_price:.5} (alerted at {entry_price:.5})\nExpiry: {expiry_secs:.0}s",
                arrow(*direction)
            ),
            Notification::VolatilityPaused { instrument, ratio } => write!(
                f,
                "💤 {instrument}: volatility too low (ATR ratio {ratio:.2}), signals paused"
            ),
            Notification::VolatilityResumed { instrument, ratio } => write!(
                f,
                "⚡ {instrument}: volatility back (ATR ratio {ratio:.2}), signals resumed"
            ),
            Notification::TradeResult(r) => {
                let verdict = if r.win { "✅ WIN" } else { "🔻 LOSS" };
                write!(
                    f,
                    "{verdict}: {} | {}\nStrategy: {}\nEntry: {:.5} → Exit: {:.5}\nRecord: {}W / {}L of {} | Win rate: {}%",
                    r.instrument, r.direction, r.strategy, r.entry_price, r.exit_price,
                    r.wins, r.losses, r.total, r.win_rate
                )
            }
        }
    }
}
