use crate::error::ApiError;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use serde::Deserialize;

/// One scheduled economic release.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CalendarEvent {
    pub title: String,
    /// The affected currency code, e.g. "USD".
    #[serde(rename = "country")]
    pub currency: String,
    pub date: DateTime<FixedOffset>,
    /// "High", "Medium", "Low" or "Holiday".
    pub impact: String,
}

impl CalendarEvent {
    pub fn time_utc(&self) -> DateTime<Utc> {
        self.date.with_timezone(&Utc)
    }
}

/// The generic interface for anything that can list upcoming economic events.
/// The news refresher depends on this trait so that the HTTP client can be
/// swapped for a fake in tests.
#[async_trait]
pub trait CalendarSource: Send + Sync {
    async fn fetch_events(&self) -> Result<Vec<CalendarEvent>, ApiError>;
}

/// Fetches the weekly ForexFactory calendar export.
#[derive(Clone)]
pub struct ForexFactoryCalendar {
    client: reqwest::Client,
    url: String,
}

impl ForexFactoryCalendar {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl CalendarSource for ForexFactoryCalendar {
    async fn fetch_events(&self) -> Result<Vec<CalendarEvent>, ApiError> {
        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to decode error response".to_string());
            return Err(ApiError::ApiError(format!("{status}: {error_text}")));
        }

        let body = response.text().await?;
        let events: Vec<CalendarEvent> = serde_json::from_str(&body)?;
        tracing::debug!(count = events.len(), "Fetched economic calendar.");
        Ok(events)
    }
}
