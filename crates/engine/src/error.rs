use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Strategy error: {0}")]
    Strategy(#[from] strategies::StrategyError),

    #[error("Calendar source error: {0}")]
    Calendar(#[from] api_client::ApiError),
}
