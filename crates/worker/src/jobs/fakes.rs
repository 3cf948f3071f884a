//! In-memory implementations of the ports, mirroring the store adapters'
//! observable behavior closely enough for engine tests.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sift_core::ports::{
    ChannelRegistry, MessageRegistry, MessageSource, Notifier, SubscriberRegistry,
};
use sift_core::types::{Channel, Post, SourceMessage, Subscriber};
use sift_core::{Error, Result};

/// Serves the same message set for every channel, filtered by offset. Channels
/// listed in `fail_channels` error out, standing in for an unreachable remote.
pub struct FakeSource {
    pub messages: Vec<SourceMessage>,
    pub fail_channels: HashSet<String>,
}

impl FakeSource {
    pub fn new(messages: Vec<SourceMessage>) -> Self {
        Self {
            messages,
            fail_channels: HashSet::new(),
        }
    }
}

#[async_trait]
impl MessageSource for FakeSource {
    async fn fetch(&self, channel_id: &str, since: Option<i64>) -> Result<Vec<SourceMessage>> {
        if self.fail_channels.contains(channel_id) {
            return Err(Error::Source(format!("unreachable channel <{channel_id}>")));
        }

        let mut batch: Vec<SourceMessage> = match since {
            Some(offset_id) => self
                .messages
                .iter()
                .filter(|message| message.id > offset_id)
                .cloned()
                .collect(),
            None => self.messages.clone(),
        };
        batch.sort_by_key(|message| message.id);
        Ok(batch)
    }
}

pub struct FakeChannels {
    pub channels: Mutex<Vec<Channel>>,
}

impl FakeChannels {
    pub fn new(channels: Vec<Channel>) -> Self {
        Self {
            channels: Mutex::new(channels),
        }
    }

    pub fn offset_of(&self, id: &str) -> Option<i64> {
        self.channels
            .lock()
            .unwrap()
            .iter()
            .find(|channel| channel.id == id)
            .and_then(|channel| channel.offset_id)
    }
}

#[async_trait]
impl ChannelRegistry for FakeChannels {
    async fn exists(&self, id: &str) -> Result<bool> {
        Ok(self
            .channels
            .lock()
            .unwrap()
            .iter()
            .any(|channel| channel.id == id))
    }

    async fn get(&self, id: &str) -> Result<Option<Channel>> {
        Ok(self
            .channels
            .lock()
            .unwrap()
            .iter()
            .find(|channel| channel.id == id)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<Channel>> {
        Ok(self.channels.lock().unwrap().clone())
    }

    async fn list_active(&self) -> Result<Vec<Channel>> {
        Ok(self
            .channels
            .lock()
            .unwrap()
            .iter()
            .filter(|channel| channel.is_active)
            .cloned()
            .collect())
    }

    async fn register(&self, channel: &Channel) -> Result<String> {
        let id = channel.id.to_lowercase();
        let mut channels = self.channels.lock().unwrap();
        if let Some(existing) = channels.iter_mut().find(|existing| existing.id == id) {
            existing.themes = existing.merged_themes(&channel.themes);
        } else {
            let mut stored = channel.clone();
            stored.id = id.clone();
            channels.push(stored);
        }
        Ok(id)
    }

    async fn set_active(&self, id: &str, is_active: bool) -> Result<()> {
        let mut channels = self.channels.lock().unwrap();
        match channels.iter_mut().find(|channel| channel.id == id) {
            Some(channel) => {
                channel.is_active = is_active;
                Ok(())
            }
            None => Err(Error::NotFound {
                kind: "channel",
                id: id.to_string(),
            }),
        }
    }

    async fn update_themes(&self, id: &str, themes: &[String]) -> Result<()> {
        let mut channels = self.channels.lock().unwrap();
        match channels.iter_mut().find(|channel| channel.id == id) {
            Some(channel) => {
                channel.themes = themes.to_vec();
                Ok(())
            }
            None => Err(Error::NotFound {
                kind: "channel",
                id: id.to_string(),
            }),
        }
    }

    async fn update_offset(&self, id: &str, offset_id: i64) -> Result<()> {
        let mut channels = self.channels.lock().unwrap();
        match channels.iter_mut().find(|channel| channel.id == id) {
            Some(channel) => {
                channel.advance_offset(offset_id);
                Ok(())
            }
            None => Err(Error::NotFound {
                kind: "channel",
                id: id.to_string(),
            }),
        }
    }
}

#[derive(Default)]
pub struct FakeMessages {
    pub posts: Mutex<Vec<Post>>,
}

impl FakeMessages {
    pub fn with_posts(posts: Vec<Post>) -> Self {
        Self {
            posts: Mutex::new(posts),
        }
    }
}

/// Mirrors the query-string semantics: any keyword may match, and a keyword
/// containing spaces requires all of its words.
fn keyword_match(text: &str, keywords: &[String]) -> bool {
    let text = text.to_lowercase();
    keywords.iter().any(|keyword| {
        keyword
            .split_whitespace()
            .all(|word| text.contains(&word.to_lowercase()))
    })
}

#[async_trait]
impl MessageRegistry for FakeMessages {
    async fn ingest(&self, post: &Post) -> Result<bool> {
        let mut posts = self.posts.lock().unwrap();
        if posts.iter().any(|existing| existing.id == post.id) {
            return Ok(false);
        }
        posts.push(post.clone());
        Ok(true)
    }

    async fn matched(
        &self,
        theme: &str,
        keywords: &[String],
        after: DateTime<Utc>,
    ) -> Result<Vec<Post>> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|post| post.themes.iter().any(|t| t == theme))
            .filter(|post| post.timestamp > after)
            .filter(|post| {
                post.text
                    .as_deref()
                    .is_some_and(|text| keyword_match(text, keywords))
            })
            .cloned()
            .collect())
    }
}

pub struct FakeSubscribers {
    pub subscribers: Mutex<Vec<Subscriber>>,
}

impl FakeSubscribers {
    pub fn new(subscribers: Vec<Subscriber>) -> Self {
        Self {
            subscribers: Mutex::new(subscribers),
        }
    }
}

#[async_trait]
impl SubscriberRegistry for FakeSubscribers {
    async fn exists(&self, id: &str) -> Result<bool> {
        Ok(self
            .subscribers
            .lock()
            .unwrap()
            .iter()
            .any(|subscriber| subscriber.id == id))
    }

    async fn list(&self, is_subscribed: bool) -> Result<Vec<Subscriber>> {
        Ok(self
            .subscribers
            .lock()
            .unwrap()
            .iter()
            .filter(|subscriber| subscriber.is_subscribed == is_subscribed)
            .cloned()
            .collect())
    }

    async fn register(&self, subscriber: &Subscriber) -> Result<String> {
        let mut subscribers = self.subscribers.lock().unwrap();
        if subscribers.iter().any(|existing| existing.id == subscriber.id) {
            return Err(Error::AlreadyExists {
                kind: "subscriber",
                id: subscriber.id.clone(),
            });
        }
        subscribers.push(subscriber.clone());
        Ok(subscriber.id.clone())
    }

    async fn set_subscribed(&self, id: &str, is_subscribed: bool) -> Result<()> {
        let mut subscribers = self.subscribers.lock().unwrap();
        match subscribers.iter_mut().find(|subscriber| subscriber.id == id) {
            Some(subscriber) => {
                subscriber.is_subscribed = is_subscribed;
                Ok(())
            }
            None => Err(Error::NotFound {
                kind: "subscriber",
                id: id.to_string(),
            }),
        }
    }

    async fn update_keywords(&self, id: &str, theme: &str, keywords: &[String]) -> Result<()> {
        let mut subscribers = self.subscribers.lock().unwrap();
        match subscribers.iter_mut().find(|subscriber| subscriber.id == id) {
            Some(subscriber) => {
                subscriber.upsert_theme(theme, keywords);
                Ok(())
            }
            None => Err(Error::NotFound {
                kind: "subscriber",
                id: id.to_string(),
            }),
        }
    }

    async fn advance_watermark(&self, id: &str, theme: &str, ts: DateTime<Utc>) -> Result<()> {
        let mut subscribers = self.subscribers.lock().unwrap();
        match subscribers.iter_mut().find(|subscriber| subscriber.id == id) {
            Some(subscriber) => {
                subscriber.advance_watermark(theme, ts);
                Ok(())
            }
            None => Err(Error::NotFound {
                kind: "subscriber",
                id: id.to_string(),
            }),
        }
    }
}

#[derive(Default)]
pub struct FakeNotifier {
    /// (chat_id, text) pairs in send order.
    pub sent: Mutex<Vec<(String, String)>>,
    pub fail_containing: Option<String>,
}

impl FakeNotifier {
    pub fn failing_on(fragment: &str) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_containing: Some(fragment.to_string()),
        }
    }
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn send(&self, text: &str, chat_id: &str) -> Result<()> {
        if let Some(fragment) = &self.fail_containing {
            if text.contains(fragment.as_str()) {
                return Err(Error::Delivery(format!("send to <{chat_id}>: http 502")));
            }
        }
        self.sent
            .lock()
            .unwrap()
            .push((chat_id.to_string(), text.to_string()));
        Ok(())
    }
}
