use crate::error::AlerterError;
use async_trait::async_trait;
use configuration::TelegramConfig;
use events::Notification;
use reqwest::Client;
use serde::Serialize;
use tokio::sync::broadcast;
pub mod error;

/// Anything that can deliver a rendered notification to a human.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_message(&self, message: &str) -> Result<(), AlerterError>;
}

/// The JSON payload for the Telegram `sendMessage` endpoint.
#[derive(Debug, Serialize)]
struct SendMessagePayload<'a> {
    chat_id: &'a str,
    text: &'a str,
    disable_web_page_preview: bool,
}

/// A client for sending messages to the Telegram Bot API.
///
/// Messages go out as plain text, so notification text needs no escaping.
pub struct TelegramAlerter {
    client: Client,
    token: String,
    chat_id: String,
}

impl TelegramAlerter {
    /// Creates a new `TelegramAlerter`.
    ///
    /// Returns `None` if the token or chat_id is missing from the configuration,
    /// allowing the system to gracefully fall back to logging.
    pub fn new(config: &TelegramConfig) -> Option<Self> {
        if config.token.is_empty() || config.chat_id.is_empty() {
            tracing::warn!("Telegram alerter is not configured (missing token or chat_id).");
            return None;
        }
        Some(Self {
            client: Client::new(),
            token: config.token.clone(),
            chat_id: config.chat_id.clone(),
        })
    }
}

#[async_trait]
impl Notifier for TelegramAlerter {
    async fn send_message(&self, message: &str) -> Result<(), AlerterError> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.token);

        let payload = SendMessagePayload {
            chat_id: &self.chat_id,
            text: message,
            disable_web_page_preview: true,
        };

        let response = self.client.post(&url).json(&payload).send().await?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to decode error response".to_string());
            return Err(AlerterError::ApiError(error_text));
        }

        Ok(())
    }
}

/// Writes every notification to the log instead of a chat.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_message(&self, message: &str) -> Result<(), AlerterError> {
        tracing::info!(target: "alerts", "{message}");
        Ok(())
    }
}

/// A long-running service that forwards every engine `Notification` to a notifier.
///
/// Delivery failures are logged and never stop the service. It exits when the
/// engine drops its sender.
pub async fn run_alerter_service<N: Notifier + ?Sized>(
    notifier: &N,
    mut event_rx: broadcast::Receiver<Notification>,
) {
    tracing::info!("Alerter service started. Listening for notifications.");

    loop {
        match event_rx.recv().await {
            Ok(notification) => {
                let intent = notification.intent();
                let instrument = notification.instrument().unwrap_or("-");
                if let Err(e) = notifier.send_message(&notification.to_string()).await {
                    tracing::error!(error = ?e, intent, instrument, "Failed to deliver notification.");
                }
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!("Alerter service lagged, skipped {} messages.", n);
            }
            Err(broadcast::error::RecvError::Closed) => {
                tracing::info!("Notification channel closed. Alerter service shutting down.");
                break;
            }
        }
    }
}
