use crate::error::ApiError;
use core_types::BarUpdate;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::collections::HashSet;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use url::Url;

/// A text frame from the feed carries either one update or a batch.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeedFrame {
    One(BarUpdate),
    Many(Vec<BarUpdate>),
}

/// Decodes a text frame into bar updates, keeping only the wanted instruments.
/// An empty filter keeps everything. Frames that are not bar updates yield nothing.
pub fn parse_frame(text: &str, wanted: &HashSet<String>) -> Vec<BarUpdate> {
    let updates = match serde_json::from_str::<FeedFrame>(text) {
        Ok(FeedFrame::One(update)) => vec![update],
        Ok(FeedFrame::Many(updates)) => updates,
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring non-bar frame.");
            return Vec::new();
        }
    };
    updates
        .into_iter()
        .filter(|u| wanted.is_empty() || wanted.contains(&u.instrument))
        .collect()
}

/// Handles connection to a WebSocket bar feed and forwards decoded updates.
pub struct BarFeed {
    url: Url,
    instruments: Vec<String>,
}

impl BarFeed {
    pub fn new(url: &str, instruments: Vec<String>) -> Result<Self, ApiError> {
        Ok(Self {
            url: Url::parse(url)?,
            instruments,
        })
    }

    /// Spawns the connection task and returns the receiving end immediately.
    ///
    /// The task reconnects every 5 seconds after a failure and exits once the
    /// receiver is dropped.
    pub fn subscribe(self) -> mpsc::Receiver<BarUpdate> {
        let (tx, rx) = mpsc::channel(10_000);
        let wanted: HashSet<String> = self.instruments.iter().cloned().collect();
        let subscribe_msg = (!self.instruments.is_empty()).then(|| {
            serde_json::json!({ "action": "subscribe", "instruments": self.instruments }).to_string()
        });

        tokio::spawn(async move {
            loop {
                tracing::info!(url = %self.url, "Connecting to bar feed...");
                match connect_async(self.url.as_str()).await {
                    Ok((mut stream, _)) => {
                        tracing::info!("Bar feed connection established.");
                        if let Some(msg) = &subscribe_msg {
                            if let Err(e) = stream.send(Message::Text(msg.clone())).await {
                                tracing::error!(error = %e, "Failed to send subscription.");
                            }
                        }
                        while let Some(msg) = stream.next().await {
                            match msg {
                                Ok(Message::Text(text)) => {
                                    for update in parse_frame(&text, &wanted) {
                                        if tx.send(update).await.is_err() {
                                            tracing::info!("Receiver dropped. Closing bar feed.");
                                            return;
                                        }
                                    }
                                }
                                Ok(Message::Close(frame)) => {
                                    tracing::info!("Bar feed closed: {:?}", frame);
                                    break;
                                }
                                Ok(_) => {}
                                Err(e) => {
                                    tracing::error!("Bar feed message error: {}", e);
                                    break;
                                }
                            }
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Bar feed connection error.");
                    }
                }
                if tx.is_closed() {
                    return;
                }
                tracing::warn!("Bar feed disconnected. Reconnecting in 5 seconds...");
                tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;
            }
        });

        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_and_batched_frames() {
        let wanted = HashSet::new();
        let one = r#"{"instrument":"EURUSD_otc","open":1,"high":2,"low":0.5,"close":1.5,"volume":10,"timestamp":60}"#;
        assert_eq!(parse_frame(one, &wanted).len(), 1);

        let many = format!("[{one},{one}]");
        assert_eq!(parse_frame(&many, &wanted).len(), 2);
    }

    #[test]
    fn filters_unwanted_instruments() {
        let wanted: HashSet<String> = ["GBPJPY_otc".to_string()].into_iter().collect();
        let one = r#"{"instrument":"EURUSD_otc","open":1,"high":2,"low":0.5,"close":1.5,"timestamp":60}"#;
        assert!(parse_frame(one, &wanted).is_empty());
    }

    #[test]
    fn garbage_frames_are_ignored() {
        assert!(parse_frame(r#"{"pong":true}"#, &HashSet::new()).is_empty());
        assert!(parse_frame("not json", &HashSet::new()).is_empty());
    }

    #[test]
    fn rejects_bad_url() {
        assert!(BarFeed::new("not a url", vec![]).is_err());
    }
}
