//! # Signal Engine
//!
//! The orchestrator of the live signal pipeline. For every bar update it runs
//! the instrument through the bar store, the gates and the rule set, and drives
//! the two-phase alert protocol:
//!
//! `Idle -> Speculative -> {Confirmed, Cancelled} -> Idle`
//!
//! Deferred work (confirmation and outcome checks) never runs inline. It is
//! handed to a [`Scheduler`] which feeds [`ScheduledCheck`]s back through a
//! channel, and the engine's [`SignalEngine::run`] loop handles them alongside
//! incoming bars. Notifications leave through a broadcast channel so the core
//! never waits on a slow notifier.

pub mod bar_store;
pub mod clock;
pub mod error;
pub mod news;
pub mod outcome;
pub mod pipeline;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod volatility;

pub use bar_store::{BarStore, StoreUpdate};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::EngineError;
pub use news::{active_currencies, NewsBlockSet, NewsGate, NewsRefresher};
pub use outcome::{is_win, OutcomeTracker, Stats};
pub use pipeline::{confirm, Confirmation, PendingAlert};
pub use scheduler::{ScheduledCheck, Scheduler, TokioScheduler};
pub use session::SessionGate;
pub use state::InstrumentState;
pub use volatility::{Transition, VolatilityGate, VolatilityState};

use configuration::{AlertParams, Config, EngineParams};
use core_types::{Bar, BarUpdate, Candidate, Direction, StrategyId};
use events::{Notification, Session, TradeResult};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use strategies::RuleSet;
use tokio::sync::{broadcast, mpsc, Mutex, RwLock};
use uuid::Uuid;

const NOTIFICATION_CAPACITY: usize = 1024;

/// What happened to a single bar update.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// Malformed or out-of-order bar; nothing changed.
    Rejected,
    /// Stored, but fewer than `min_bars` bars are available.
    Warming { bars: usize },
    VolatilityPaused,
    OutOfSession,
    NewsBlocked,
    /// A speculative alert is already waiting for confirmation.
    Pending,
    CoolingDown,
    NoSignal,
    Alerted(Candidate),
}

/// The result of handling one scheduled check.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    /// The instrument, alert or data the check refers to no longer exists.
    Skipped,
    Cancelled,
    Confirmed,
    Resolved(TradeResult),
}

type Registry = RwLock<HashMap<String, Arc<Mutex<InstrumentState>>>>;

pub struct SignalEngine {
    engine: EngineParams,
    alerts: AlertParams,
    rules: RuleSet,
    volatility: VolatilityGate,
    session: SessionGate,
    news: NewsGate,
    tracker: OutcomeTracker,
    scheduler: Arc<dyn Scheduler>,
    clock: Arc<dyn Clock>,
    notifications: broadcast::Sender<Notification>,
    instruments: Registry,
}

impl SignalEngine {
    /// Builds the engine from configuration.
    ///
    /// `blocks` is shared with the [`NewsRefresher`] that keeps it current.
    pub fn new(
        config: &Config,
        blocks: NewsBlockSet,
        scheduler: Arc<dyn Scheduler>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, EngineError> {
        config
            .validate()
            .map_err(|e| EngineError::Configuration(e.to_string()))?;
        let rules = RuleSet::from_config(&config.strategies)?;
        let (notifications, _) = broadcast::channel(NOTIFICATION_CAPACITY);

        Ok(Self {
            engine: config.engine.clone(),
            alerts: config.alerts.clone(),
            rules,
            volatility: VolatilityGate::new(config.volatility.clone()),
            session: SessionGate::new(config.session.windows.clone()),
            news: NewsGate::new(blocks, config.news.enabled),
            tracker: OutcomeTracker::new(),
            scheduler,
            clock,
            notifications,
            instruments: RwLock::new(HashMap::new()),
        })
    }

    /// A new receiver for every notification emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    pub fn rules(&self) -> Vec<StrategyId> {
        self.rules.ids()
    }

    pub fn stats(&self) -> Stats {
        self.tracker.snapshot()
    }

    /// The startup banner: whether we are currently inside a session.
    pub fn startup_notification(&self) -> Notification {
        Notification::EngineStarted {
            active: self.session.in_session(self.clock.now()),
            sessions: self
                .session
                .windows()
                .iter()
                .map(|w| Session {
                    start_hour: w.start_hour,
                    end_hour: w.end_hour,
                })
                .collect(),
            rules: self.rules.ids(),
        }
    }

    pub fn announce(&self) {
        self.emit(self.startup_notification());
    }

    /// The stored bars of `instrument`, oldest first.
    pub async fn bars(&self, instrument: &str) -> Option<Vec<Bar>> {
        let state = self.lookup(instrument).await?;
        let state = state.lock().await;
        Some(state.bars.to_vec())
    }

    pub async fn pending(&self, instrument: &str) -> Option<PendingAlert> {
        let state = self.lookup(instrument).await?;
        let state = state.lock().await;
        state.pending.clone()
    }

    /// Forgets an instrument. Checks still scheduled for it become no-ops.
    pub async fn remove_instrument(&self, instrument: &str) -> bool {
        let removed = self.instruments.write().await.remove(instrument).is_some();
        if removed {
            tracing::info!(instrument, "Instrument removed.");
        }
        removed
    }

    /// Processes one bar update for its instrument.
    pub async fn on_bar(&self, update: BarUpdate) -> Evaluation {
        let symbol = update.instrument.as_str();
        let bar = update.bar();
        // Malformed bars never create an instrument.
        if let Err(e) = bar.validate() {
            tracing::warn!(instrument = symbol, error = %e, "Dropping bar update.");
            return Evaluation::Rejected;
        }

        let now = self.clock.now();
        let now_secs = now.timestamp();
        let handle = self.get_or_create(symbol, now_secs).await;
        let mut guard = handle.lock().await;
        let state = &mut *guard;

        if state.bars.is_empty() {
            tracing::debug!(instrument = symbol, "First bar received.");
        }
        if let Err(e) = state.bars.update(bar) {
            tracing::warn!(instrument = symbol, error = %e, "Dropping bar update.");
            return Evaluation::Rejected;
        }
        state.last_update_at = now_secs;

        if state.bars.len() < self.engine.min_bars {
            return Evaluation::Warming {
                bars: state.bars.len(),
            };
        }
        if let Some(ratio) = self.volatility.ratio(state.bars.window()) {
            match self.volatility.observe(&mut state.volatility, ratio, now_secs) {
                Some(Transition::Paused) => {
                    tracing::info!(instrument = symbol, ratio, "Volatility too low, pausing.");
                    self.emit(Notification::VolatilityPaused {
                        instrument: symbol.to_string(),
                        ratio,
                    });
                }
                Some(Transition::Resumed) => {
                    tracing::info!(instrument = symbol, ratio, "Volatility recovered, resuming.");
                    self.emit(Notification::VolatilityResumed {
                        instrument: symbol.to_string(),
                        ratio,
                    });
                }
                None => {}
            }
        }
        if !state.volatility.enabled {
            return Evaluation::VolatilityPaused;
        }
        if !self.session.in_session(now) {
            return Evaluation::OutOfSession;
        }
        if self.news.is_blocked(&state.instrument).await {
            tracing::debug!(instrument = symbol, "News blackout in effect.");
            return Evaluation::NewsBlocked;
        }
        if state.pending.is_some() {
            return Evaluation::Pending;
        }
        if state.cooling_down(now_secs, self.alerts.cooldown_secs) {
            return Evaluation::CoolingDown;
        }

        let Some(candidate) = self.rules.evaluate(state.bars.window()) else {
            return Evaluation::NoSignal;
        };

        let alert = PendingAlert::new(candidate, now);
        tracing::info!(
            instrument = symbol,
            alert_id = %alert.id,
            strategy = %alert.strategy,
            direction = %alert.direction,
            entry = alert.entry_price,
            "Speculative alert."
        );
        self.emit(Notification::SpeculativeAlert {
            alert_id: alert.id,
            instrument: symbol.to_string(),
            strategy: alert.strategy,
            direction: alert.direction,
            entry_price: alert.entry_price,
            created_at: alert.created_at,
        });
        self.scheduler.schedule(
            Duration::from_secs_f64(self.alerts.confirm_delay_secs),
            ScheduledCheck::Confirm {
                instrument: symbol.to_string(),
                alert_id: alert.id,
            },
        );
        state.pending = Some(alert);

        Evaluation::Alerted(candidate)
    }

    /// Handles a check previously handed to the scheduler.
    pub async fn handle_check(&self, check: ScheduledCheck) -> CheckOutcome {
        match check {
            ScheduledCheck::Confirm {
                instrument,
                alert_id,
            } => self.confirm_alert(&instrument, alert_id).await,
            ScheduledCheck::Outcome {
                instrument,
                alert_id,
                strategy,
                direction,
                entry_price,
                confirmed_at,
            } => {
                self.resolve_outcome(&instrument, alert_id, strategy, direction, entry_price, confirmed_at)
                    .await
            }
        }
    }

    async fn confirm_alert(&self, instrument: &str, alert_id: Uuid) -> CheckOutcome {
        let Some(handle) = self.lookup(instrument).await else {
            tracing::debug!(instrument, %alert_id, "Confirmation for unknown instrument skipped.");
            return CheckOutcome::Skipped;
        };
        let mut state = handle.lock().await;

        let alert = match state.pending.take() {
            Some(alert) if alert.id == alert_id => alert,
            other => {
                state.pending = other;
                tracing::debug!(instrument, %alert_id, "Confirmation for a stale alert skipped.");
                return CheckOutcome::Skipped;
            }
        };
        let Some(current) = state.last_close() else {
            return CheckOutcome::Skipped;
        };

        match confirm(alert.entry_price, current, self.alerts.max_deviation) {
            Confirmation::Lost { deviation } => {
                tracing::info!(instrument, %alert_id, deviation, "Signal lost before confirmation.");
                self.emit(Notification::SignalLost {
                    alert_id,
                    instrument: instrument.to_string(),
                    strategy: alert.strategy,
                    direction: alert.direction,
                    entry_price: alert.entry_price,
                    current_price: current,
                    deviation,
                });
                CheckOutcome::Cancelled
            }
            Confirmation::Confirmed => {
                let now = self.clock.now().timestamp();
                state.last_signal_at = Some(now);
                tracing::info!(instrument, %alert_id, price = current, "Signal confirmed.");
                self.emit(Notification::SignalConfirmed {
                    alert_id,
                    instrument: instrument.to_string(),
                    strategy: alert.strategy,
                    direction: alert.direction,
                    entry_price: alert.entry_price,
                    confirmed_price: current,
                    expiry_secs: self.alerts.expiry_secs,
                });
                self.scheduler.schedule(
                    Duration::from_secs_f64(self.alerts.expiry_secs),
                    ScheduledCheck::Outcome {
                        instrument: instrument.to_string(),
                        alert_id,
                        strategy: alert.strategy,
                        direction: alert.direction,
                        entry_price: current,
                        confirmed_at: now,
                    },
                );
                CheckOutcome::Confirmed
            }
        }
    }

    async fn resolve_outcome(
        &self,
        instrument: &str,
        alert_id: Uuid,
        strategy: StrategyId,
        direction: Direction,
        entry_price: f64,
        confirmed_at: i64,
    ) -> CheckOutcome {
        let Some(handle) = self.lookup(instrument).await else {
            tracing::debug!(instrument, %alert_id, "Outcome for unknown instrument skipped.");
            return CheckOutcome::Skipped;
        };
        let state = handle.lock().await;

        let now = self.clock.now().timestamp();
        if now - state.last_update_at > self.alerts.stale_after() {
            tracing::warn!(
                instrument,
                %alert_id,
                silent_secs = now - state.last_update_at,
                "No recent data, skipping outcome."
            );
            return CheckOutcome::Skipped;
        }
        let Some(exit_price) = state.last_close() else {
            return CheckOutcome::Skipped;
        };
        drop(state);

        let win = is_win(direction, entry_price, exit_price);
        let stats = self.tracker.record(win);
        let result = TradeResult {
            alert_id,
            instrument: instrument.to_string(),
            strategy,
            direction,
            entry_price,
            exit_price,
            win,
            total: stats.total,
            wins: stats.wins,
            losses: stats.losses,
            win_rate: stats.win_rate(),
        };
        tracing::info!(
            instrument,
            %alert_id,
            win,
            held_secs = now - confirmed_at,
            win_rate = %result.win_rate,
            "Alert resolved."
        );
        self.emit(Notification::TradeResult(result.clone()));
        CheckOutcome::Resolved(result)
    }

    /// The main event loop. Runs until the bar stream ends.
    pub async fn run(
        self: Arc<Self>,
        mut bars: mpsc::Receiver<BarUpdate>,
        mut checks: mpsc::UnboundedReceiver<ScheduledCheck>,
    ) {
        tracing::info!(rules = ?self.rules.ids(), "Signal engine running. Waiting for bars...");
        loop {
            tokio::select! {
                update = bars.recv() => match update {
                    Some(update) => {
                        let evaluation = self.on_bar(update).await;
                        tracing::trace!(?evaluation, "Bar processed.");
                    }
                    None => {
                        tracing::warn!("Bar stream ended.");
                        break;
                    }
                },
                Some(check) = checks.recv() => {
                    let outcome = self.handle_check(check).await;
                    tracing::trace!(?outcome, "Scheduled check handled.");
                }
            }
        }
    }

    fn emit(&self, notification: Notification) {
        // A send only fails when nobody is subscribed.
        if self.notifications.send(notification).is_err() {
            tracing::debug!("No notification subscribers.");
        }
    }

    async fn lookup(&self, instrument: &str) -> Option<Arc<Mutex<InstrumentState>>> {
        self.instruments.read().await.get(instrument).cloned()
    }

    async fn get_or_create(&self, instrument: &str, now: i64) -> Arc<Mutex<InstrumentState>> {
        if let Some(existing) = self.lookup(instrument).await {
            return existing;
        }
        let mut registry = self.instruments.write().await;
        registry
            .entry(instrument.to_string())
            .or_insert_with(|| {
                tracing::info!(instrument, "Tracking new instrument.");
                Arc::new(Mutex::new(InstrumentState::new(
                    instrument,
                    self.engine.max_bars,
                    now,
                )))
            })
            .clone()
    }
}
