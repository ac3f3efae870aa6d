use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file or an environment override could not be read or deserialized.
    #[error("Failed to read configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    /// The values parsed but describe an engine that cannot run correctly.
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}
