//! Contracts between the engines and their collaborators. The store crate
//! implements the registries over the search index; the worker implements the
//! Telegram-facing ports.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::{Channel, Post, SourceMessage, Subscriber};

#[async_trait]
pub trait ChannelRegistry: Send + Sync {
    async fn exists(&self, id: &str) -> Result<bool>;
    async fn get(&self, id: &str) -> Result<Option<Channel>>;
    async fn list_all(&self) -> Result<Vec<Channel>>;
    async fn list_active(&self) -> Result<Vec<Channel>>;
    /// Registers a channel. Re-registering an existing id merges the incoming
    /// themes into the stored ones instead of failing. Returns the stored id.
    async fn register(&self, channel: &Channel) -> Result<String>;
    async fn set_active(&self, id: &str, is_active: bool) -> Result<()>;
    async fn update_themes(&self, id: &str, themes: &[String]) -> Result<()>;
    /// Moves the crawl offset forward; a stale `offset_id` is ignored.
    async fn update_offset(&self, id: &str, offset_id: i64) -> Result<()>;
}

#[async_trait]
pub trait SubscriberRegistry: Send + Sync {
    async fn exists(&self, id: &str) -> Result<bool>;
    async fn list(&self, is_subscribed: bool) -> Result<Vec<Subscriber>>;
    /// Fails with `Error::AlreadyExists` when the id is taken.
    async fn register(&self, subscriber: &Subscriber) -> Result<String>;
    async fn set_subscribed(&self, id: &str, is_subscribed: bool) -> Result<()>;
    async fn update_keywords(&self, id: &str, theme: &str, keywords: &[String]) -> Result<()>;
    /// Moves the per-theme watermark forward; never backwards.
    async fn advance_watermark(&self, id: &str, theme: &str, ts: DateTime<Utc>) -> Result<()>;
}

#[async_trait]
pub trait MessageRegistry: Send + Sync {
    /// Returns false when a post with the same composite id already exists.
    async fn ingest(&self, post: &Post) -> Result<bool>;
    /// Posts labeled with `theme`, matching any of `keywords`, strictly newer
    /// than `after`. Order is not guaranteed; callers sort.
    async fn matched(
        &self,
        theme: &str,
        keywords: &[String],
        after: DateTime<Utc>,
    ) -> Result<Vec<Post>>;
}

#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Messages newer than `since`, oldest first. `since = None` returns only a
    /// bounded window of the most recent messages.
    async fn fetch(&self, channel_id: &str, since: Option<i64>) -> Result<Vec<SourceMessage>>;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str, chat_id: &str) -> Result<()>;
}
