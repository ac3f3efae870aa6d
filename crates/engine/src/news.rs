use crate::clock::Clock;
use crate::error::EngineError;
use api_client::{CalendarEvent, CalendarSource};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use configuration::NewsParams;
use core_types::Instrument;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{interval, Duration, MissedTickBehavior};

/// The set of currency codes currently under a news blackout.
///
/// Cloning shares the underlying set. It is only ever replaced wholesale, so a
/// reader sees either the previous refresh or the next one, never a mix.
#[derive(Debug, Clone, Default)]
pub struct NewsBlockSet {
    inner: Arc<RwLock<HashSet<String>>>,
}

impl NewsBlockSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn replace(&self, currencies: HashSet<String>) {
        *self.inner.write().await = currencies;
    }

    pub async fn contains(&self, currency: &str) -> bool {
        self.inner.read().await.contains(currency)
    }

    pub async fn snapshot(&self) -> HashSet<String> {
        self.inner.read().await.clone()
    }
}

/// Blocks instruments whose base or quote currency is in the blackout set.
#[derive(Debug, Clone)]
pub struct NewsGate {
    blocks: NewsBlockSet,
    enabled: bool,
}

impl NewsGate {
    pub fn new(blocks: NewsBlockSet, enabled: bool) -> Self {
        Self { blocks, enabled }
    }

    pub async fn is_blocked(&self, instrument: &Instrument) -> bool {
        if !self.enabled {
            return false;
        }
        let blocked = self.blocks.inner.read().await;
        instrument.currencies().any(|c| blocked.contains(c))
    }
}

/// Currencies with a qualifying event inside `[now - after, now + before]`.
pub fn active_currencies(
    events: &[CalendarEvent],
    now: DateTime<Utc>,
    minutes_before: i64,
    minutes_after: i64,
    impacts: &[String],
) -> HashSet<String> {
    let window_start = now - ChronoDuration::minutes(minutes_after);
    let window_end = now + ChronoDuration::minutes(minutes_before);

    events
        .iter()
        .filter(|e| impacts.iter().any(|i| i.eq_ignore_ascii_case(&e.impact)))
        .filter(|e| {
            let at = e.time_utc();
            at >= window_start && at <= window_end
        })
        .map(|e| e.currency.to_ascii_uppercase())
        .collect()
}

/// Periodically rebuilds the blackout set from a calendar source.
///
/// Runs as a background task next to the engine. A failed fetch keeps the
/// previous set in place until the next tick.
pub struct NewsRefresher {
    source: Arc<dyn CalendarSource>,
    blocks: NewsBlockSet,
    params: NewsParams,
    clock: Arc<dyn Clock>,
}

impl NewsRefresher {
    pub fn new(
        source: Arc<dyn CalendarSource>,
        blocks: NewsBlockSet,
        params: NewsParams,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            source,
            blocks,
            params,
            clock,
        }
    }

    /// Fetches the calendar once and swaps in the new set.
    pub async fn refresh(&self) -> Result<HashSet<String>, EngineError> {
        let events = self.source.fetch_events().await?;
        let active = active_currencies(
            &events,
            self.clock.now(),
            self.params.minutes_before,
            self.params.minutes_after,
            &self.params.impacts,
        );
        self.blocks.replace(active.clone()).await;
        Ok(active)
    }

    pub async fn start(self) {
        tracing::info!(
            every_secs = self.params.refresh_interval_secs,
            "Starting news blackout refresher."
        );
        let mut timer = interval(Duration::from_secs(self.params.refresh_interval_secs.max(1)));
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            // The first tick is immediate.
            timer.tick().await;

            match self.refresh().await {
                Ok(active) if active.is_empty() => tracing::debug!("No news blackout active."),
                Ok(active) => tracing::info!(currencies = ?active, "News blackout active."),
                Err(e) => tracing::warn!(error = %e, "Calendar refresh failed; keeping previous blackout set."),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use api_client::ApiError;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn event(currency: &str, impact: &str, at: DateTime<Utc>) -> CalendarEvent {
        CalendarEvent {
            title: format!("{currency} release"),
            currency: currency.to_string(),
            date: at.fixed_offset(),
            impact: impact.to_string(),
        }
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 12, 0, 0).unwrap()
    }

    fn high() -> Vec<String> {
        vec!["High".to_string()]
    }

    #[test]
    fn window_edges() {
        let now = noon();
        let events = vec![
            event("USD", "High", now + ChronoDuration::minutes(3)),
            event("EUR", "High", now - ChronoDuration::minutes(10)),
            event("JPY", "High", now + ChronoDuration::minutes(6)),
            event("GBP", "High", now - ChronoDuration::minutes(16)),
            event("CHF", "Medium", now),
        ];
        let active = active_currencies(&events, now, 5, 15, &high());
        assert_eq!(active, HashSet::from(["USD".to_string(), "EUR".to_string()]));
    }

    #[tokio::test]
    async fn gate_blocks_either_leg() {
        let blocks = NewsBlockSet::new();
        blocks
            .replace(HashSet::from(["USD".to_string(), "EUR".to_string()]))
            .await;
        let gate = NewsGate::new(blocks, true);

        assert!(gate.is_blocked(&Instrument::parse("EURUSD_otc")).await);
        assert!(gate.is_blocked(&Instrument::parse("USDJPY_otc")).await);
        assert!(!gate.is_blocked(&Instrument::parse("GBPJPY_otc")).await);
    }

    #[tokio::test]
    async fn disabled_gate_never_blocks() {
        let blocks = NewsBlockSet::new();
        blocks.replace(HashSet::from(["USD".to_string()])).await;
        let gate = NewsGate::new(blocks, false);
        assert!(!gate.is_blocked(&Instrument::parse("EURUSD_otc")).await);
    }

    struct FlakyCalendar {
        fail: AtomicBool,
        events: Vec<CalendarEvent>,
    }

    #[async_trait]
    impl CalendarSource for FlakyCalendar {
        async fn fetch_events(&self) -> Result<Vec<CalendarEvent>, ApiError> {
            if self.fail.load(Ordering::SeqCst) {
                Err(ApiError::ApiError("503 Service Unavailable".to_string()))
            } else {
                Ok(self.events.clone())
            }
        }
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_set() {
        let now = noon();
        let source = Arc::new(FlakyCalendar {
            fail: AtomicBool::new(false),
            events: vec![event("USD", "High", now + ChronoDuration::minutes(2))],
        });
        let blocks = NewsBlockSet::new();
        let refresher = NewsRefresher::new(
            source.clone(),
            blocks.clone(),
            NewsParams::default(),
            Arc::new(ManualClock::new(now)),
        );

        refresher.refresh().await.unwrap();
        assert!(blocks.contains("USD").await);

        source.fail.store(true, Ordering::SeqCst);
        assert!(refresher.refresh().await.is_err());
        assert_eq!(blocks.snapshot().await, HashSet::from(["USD".to_string()]));
    }
}
