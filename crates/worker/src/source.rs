use async_trait::async_trait;
use sift_core::ports::MessageSource;
use sift_core::types::SourceMessage;
use sift_core::{Error, Result};

/// Window size for channels that have never been crawled. Pulling the full
/// history of a busy channel on first registration would flood the store.
const NEW_CHANNEL_BATCH: usize = 100;

/// Client for the MTProto gateway sidecar that owns the Telegram user
/// session. The gateway exposes channel history as plain JSON, oldest first
/// when an offset is given.
pub struct TelegramGateway {
    http: reqwest::Client,
    base_url: String,
}

impl TelegramGateway {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|err| Error::Source(format!("failed to build http client: {err}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl MessageSource for TelegramGateway {
    async fn fetch(&self, channel_id: &str, since: Option<i64>) -> Result<Vec<SourceMessage>> {
        let url = format!("{}/channels/{}/messages", self.base_url, channel_id);
        let request = match since {
            Some(offset_id) => self
                .http
                .get(&url)
                .query(&[("offset_id", offset_id.to_string())]),
            None => self
                .http
                .get(&url)
                .query(&[("limit", NEW_CHANNEL_BATCH.to_string())]),
        };

        let resp = request
            .send()
            .await
            .map_err(|err| Error::Source(format!("fetch from <{channel_id}>: {err}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Source(format!(
                "fetch from <{channel_id}>: http {status}"
            )));
        }

        resp.json()
            .await
            .map_err(|err| Error::Source(format!("fetch from <{channel_id}>: {err}")))
    }
}
