use async_trait::async_trait;
use serde_json::json;
use sift_core::ports::Notifier;
use sift_core::{Error, Result};

/// Telegram Bot API sender. A receiver must have messaged the bot at least
/// once before the bot is allowed to message them.
pub struct TelegramBot {
    http: reqwest::Client,
    send_url: String,
}

impl TelegramBot {
    pub fn new(token: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|err| Error::Delivery(format!("failed to build http client: {err}")))?;

        Ok(Self {
            http,
            send_url: format!("https://api.telegram.org/bot{token}/sendMessage"),
        })
    }
}

#[async_trait]
impl Notifier for TelegramBot {
    async fn send(&self, text: &str, chat_id: &str) -> Result<()> {
        let resp = self
            .http
            .post(&self.send_url)
            .json(&json!({ "chat_id": chat_id, "text": text }))
            .send()
            .await
            .map_err(|err| Error::Delivery(format!("send to <{chat_id}>: {err}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Delivery(format!(
                "send to <{chat_id}>: http {status}"
            )));
        }

        Ok(())
    }
}
