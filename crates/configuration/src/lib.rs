// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    AlertParams, Config, EngineParams, FeedConfig, FvgFlipParams, MacdParams, NewsParams, SessionParams,
    SessionWindow, StochMacdScalpParams, Strategies, TelegramConfig, TrendRiderParams,
    TriangleSyncParams, VolatilityParams, MAX_ALERT_DELAY_SECS,
};
pub use error::ConfigError;

/// Loads the application configuration.
///
/// Values are layered: built-in defaults, then the TOML file at `path` (optional),
/// then `CONFLUENCE__SECTION__KEY` environment variables. The result is validated
/// before it is returned.
pub fn load_config(path: &str) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .add_source(
            config::Environment::with_prefix("CONFLUENCE")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("feed.instruments")
                .with_list_parse_key("news.impacts"),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(rules = ?config.strategies.enabled, "Configuration loaded.");
    Ok(config)
}
