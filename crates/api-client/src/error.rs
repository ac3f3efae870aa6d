use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to build or send the HTTP request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("The API request returned an error: {0}")]
    ApiError(String),

    #[error("Failed to deserialize the API response: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("Invalid feed URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
