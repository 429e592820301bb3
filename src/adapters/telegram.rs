use std::time::Duration;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::WatchError;
use crate::fmt::alert::Alert;
use crate::services::notify::Notifier;

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

#[derive(Serialize, Debug)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    disable_notification: bool,
}

/// Delivers alerts through the Telegram Bot API `sendMessage` method.
#[derive(Clone, Debug)]
pub struct TelegramNotifier {
    client: reqwest::Client,
    endpoint: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(
        api_url: &str,
        token: &str,
        chat_id: &str,
        timeout: Duration,
    ) -> Result<Self, WatchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WatchError::Config(format!("http client: {e}")))?;
        Ok(Self {
            client,
            endpoint: format!("{}/bot{}/sendMessage", api_url.trim_end_matches('/'), token),
            chat_id: chat_id.to_string(),
        })
    }
}

impl Notifier for TelegramNotifier {
    #[instrument(skip_all, fields(kind = ?alert.kind))]
    async fn send(&self, alert: &Alert) -> Result<(), WatchError> {
        let payload = SendMessage {
            chat_id: &self.chat_id,
            text: &alert.text,
            disable_notification: false,
        };
        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WatchError::Notify(format!(
                "telegram answered {status}: {body}"
            )));
        }
        debug!("alert delivered");
        Ok(())
    }
}
