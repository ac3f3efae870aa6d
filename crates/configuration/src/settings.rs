use crate::error::ConfigError;
use core_types::StrategyId;
use serde::Deserialize;

/// Upper bound for the alert delays, in seconds.
pub const MAX_ALERT_DELAY_SECS: f64 = 86_400.0;

/// The root configuration structure for the entire application.
///
/// Every section falls back to its `Default`, so an empty file is a valid config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineParams,
    pub volatility: VolatilityParams,
    pub news: NewsParams,
    pub session: SessionParams,
    pub alerts: AlertParams,
    pub strategies: Strategies,
    pub telegram: TelegramConfig,
    pub feed: FeedConfig,
}

impl Config {
    /// Rejects configurations that would make the engine misbehave silently.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::ValidationError(msg.to_string()));

        if self.engine.max_bars == 0 || self.engine.min_bars > self.engine.max_bars {
            return invalid("engine.min_bars must be <= engine.max_bars and max_bars > 0");
        }
        let thresholds = [self.volatility.low_threshold, self.volatility.high_threshold];
        if thresholds.iter().any(|t| !t.is_finite()) {
            return invalid("volatility thresholds must be finite");
        }
        if self.volatility.low_threshold > self.volatility.high_threshold {
            return invalid("volatility.low_threshold must not exceed volatility.high_threshold");
        }
        if self.volatility.atr_period == 0 || self.volatility.average_window == 0 {
            return invalid("volatility periods cannot be zero");
        }
        // NaN fails every comparison, so each check is written to accept only valid values.
        if !(self.alerts.max_deviation.is_finite() && self.alerts.max_deviation > 0.0) {
            return invalid("alerts.max_deviation must be a positive finite number");
        }
        let delays = [self.alerts.confirm_delay_secs, self.alerts.expiry_secs];
        if !delays.iter().all(|d| (0.0..=MAX_ALERT_DELAY_SECS).contains(d)) {
            return invalid("alert delays must lie within [0, 86400] seconds");
        }
        if self.strategies.enabled.is_empty() {
            return invalid("strategies.enabled must name at least one rule");
        }
        for window in &self.session.windows {
            if window.start_hour >= window.end_hour || window.end_hour > 24 {
                return invalid("session windows must satisfy start_hour < end_hour <= 24");
            }
        }
        Ok(())
    }
}

/// Bar store sizing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineParams {
    /// Capacity of each instrument's bar history. Oldest bars are evicted first.
    pub max_bars: usize,
    /// Rules are not evaluated until this many bars are stored.
    pub min_bars: usize,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            max_bars: 200,
            min_bars: 100,
        }
    }
}

/// Parameters for the ATR-ratio volatility gate.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VolatilityParams {
    pub atr_period: usize,
    /// Number of recent ATR values the current ATR is compared against.
    pub average_window: usize,
    /// Below this ratio an enabled instrument is paused.
    pub low_threshold: f64,
    /// At or above this ratio a paused instrument is resumed.
    pub high_threshold: f64,
    /// Minimum seconds between two transitions of the same instrument.
    pub cooldown_secs: i64,
}

impl Default for VolatilityParams {
    fn default() -> Self {
        Self {
            atr_period: 14,
            average_window: 30,
            low_threshold: 0.6,
            high_threshold: 0.9,
            cooldown_secs: 300,
        }
    }
}

/// Parameters for the economic-calendar news blackout.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NewsParams {
    pub enabled: bool,
    pub calendar_url: String,
    pub refresh_interval_secs: u64,
    pub minutes_before: i64,
    pub minutes_after: i64,
    /// Impact levels that trigger a blackout (e.g. "High").
    pub impacts: Vec<String>,
}

impl Default for NewsParams {
    fn default() -> Self {
        Self {
            enabled: true,
            calendar_url: "https://nfs.faireconomy.media/ff_calendar_thisweek.json".to_string(),
            refresh_interval_secs: 120,
            minutes_before: 5,
            minutes_after: 15,
            impacts: vec!["High".to_string()],
        }
    }
}

/// A half-open UTC hour range `[start_hour, end_hour)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SessionWindow {
    pub start_hour: u32,
    pub end_hour: u32,
}

/// Trading session windows. An empty list means the market is always in session.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionParams {
    pub windows: Vec<SessionWindow>,
}

impl Default for SessionParams {
    fn default() -> Self {
        Self {
            windows: vec![
                SessionWindow { start_hour: 8, end_hour: 12 },
                SessionWindow { start_hour: 13, end_hour: 16 },
            ],
        }
    }
}

/// Timing of the two-phase alert protocol.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlertParams {
    pub confirm_delay_secs: f64,
    pub expiry_secs: f64,
    /// Relative price move (0.05 = 5%) above which a speculative alert is cancelled.
    pub max_deviation: f64,
    /// Seconds after a confirmed signal during which new candidates are ignored.
    pub cooldown_secs: i64,
    /// An outcome check is skipped when the instrument has been silent this long.
    /// Defaults to `expiry_secs`.
    pub stale_after_secs: Option<i64>,
}

impl AlertParams {
    pub fn stale_after(&self) -> i64 {
        self.stale_after_secs
            .unwrap_or(self.expiry_secs.ceil() as i64)
    }
}

impl Default for AlertParams {
    fn default() -> Self {
        Self {
            confirm_delay_secs: 7.0,
            expiry_secs: 60.0,
            max_deviation: 0.05,
            cooldown_secs: 60,
            stale_after_secs: None,
        }
    }
}

/// Contains the parameter sets for all available rules.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Strategies {
    /// Which rules run. Evaluation order is always the fixed priority order.
    pub enabled: Vec<StrategyId>,
    pub fvg_flip: FvgFlipParams,
    pub triangle_sync: TriangleSyncParams,
    pub stoch_macd_scalp: StochMacdScalpParams,
    pub trend_rider: TrendRiderParams,
}

impl Default for Strategies {
    fn default() -> Self {
        Self {
            enabled: StrategyId::ALL.to_vec(),
            fvg_flip: FvgFlipParams::default(),
            triangle_sync: TriangleSyncParams::default(),
            stoch_macd_scalp: StochMacdScalpParams::default(),
            trend_rider: TrendRiderParams::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct MacdParams {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }
}

/// Parameters for the fair-value-gap midline re-test rule.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FvgFlipParams {
    pub rsi_period: usize,
    /// Half-width of the RSI band around 50.
    pub rsi_band: f64,
}

impl Default for FvgFlipParams {
    fn default() -> Self {
        Self {
            rsi_period: 10,
            rsi_band: 5.0,
        }
    }
}

/// Parameters for the converging-range breakout rule.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TriangleSyncParams {
    pub lookback: usize,
    pub atr_period: usize,
    /// The range counts as converging when narrower than this many ATRs.
    pub atr_multiple: f64,
    /// Relative tolerance for swing highs/lows of both halves to count as equal.
    pub swing_tolerance: f64,
    pub rsi_period: usize,
    pub volume_period: usize,
    pub macd: MacdParams,
}

impl Default for TriangleSyncParams {
    fn default() -> Self {
        Self {
            lookback: 20,
            atr_period: 14,
            atr_multiple: 3.0,
            swing_tolerance: 0.0005,
            rsi_period: 14,
            volume_period: 20,
            macd: MacdParams::default(),
        }
    }
}

/// Parameters for the stochastic cross scalp rule.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StochMacdScalpParams {
    pub k_period: usize,
    pub d_period: usize,
    pub oversold: f64,
    pub overbought: f64,
    pub rsi_period: usize,
    pub macd: MacdParams,
}

impl Default for StochMacdScalpParams {
    fn default() -> Self {
        Self {
            k_period: 14,
            d_period: 3,
            oversold: 20.0,
            overbought: 80.0,
            rsi_period: 7,
            macd: MacdParams::default(),
        }
    }
}

/// Parameters for the trend-following momentum rule.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TrendRiderParams {
    pub ma_period: usize,
    /// Relative distance from the moving average that counts as a touch.
    pub ma_tolerance: f64,
    pub supertrend_period: usize,
    pub supertrend_multiplier: f64,
    pub momentum_period: usize,
}

impl Default for TrendRiderParams {
    fn default() -> Self {
        Self {
            ma_period: 50,
            ma_tolerance: 0.001,
            supertrend_period: 10,
            supertrend_multiplier: 3.0,
            momentum_period: 10,
        }
    }
}

/// Credentials for the Telegram notifier. Both empty means alerts are only logged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub token: String,
    pub chat_id: String,
}

/// Where bar updates are streamed from.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub url: String,
    /// Instruments to subscribe to. Empty means "whatever the feed sends".
    pub instruments: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.alerts.stale_after(), 60);
        assert_eq!(config.strategies.enabled.len(), 4);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: Config = toml::from_str(
            r#"
            [volatility]
            low_threshold = 0.5

            [strategies]
            enabled = ["fvg_flip", "trend_rider"]

            [strategies.fvg_flip]
            rsi_band = 10.0
            "#,
        )
        .unwrap();

        assert_eq!(config.volatility.low_threshold, 0.5);
        assert_eq!(config.volatility.high_threshold, 0.9);
        assert_eq!(
            config.strategies.enabled,
            vec![StrategyId::FvgFlip, StrategyId::TrendRider]
        );
        assert_eq!(config.strategies.fvg_flip.rsi_band, 10.0);
        assert_eq!(config.strategies.fvg_flip.rsi_period, 10);
        assert_eq!(config.engine.min_bars, 100);
    }

    #[test]
    fn inverted_hysteresis_is_rejected() {
        let mut config = Config::default();
        config.volatility.low_threshold = 0.95;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn bad_session_window_is_rejected() {
        let mut config = Config::default();
        config.session.windows = vec![SessionWindow { start_hour: 16, end_hour: 13 }];
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_finite_alert_timing_is_rejected() {
        for bad in [f64::NAN, f64::INFINITY, -1.0, MAX_ALERT_DELAY_SECS + 1.0] {
            let mut config = Config::default();
            config.alerts.expiry_secs = bad;
            assert!(config.validate().is_err(), "expiry_secs = {bad} accepted");

            let mut config = Config::default();
            config.alerts.confirm_delay_secs = bad;
            assert!(config.validate().is_err(), "confirm_delay_secs = {bad} accepted");
        }
    }

    #[test]
    fn nan_deviation_and_thresholds_are_rejected() {
        let mut config = Config::default();
        config.alerts.max_deviation = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.alerts.max_deviation = f64::INFINITY;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.volatility.low_threshold = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.volatility.high_threshold = f64::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_rule_list_is_rejected() {
        let mut config = Config::default();
        config.strategies.enabled.clear();
        assert!(config.validate().is_err());
    }
}
