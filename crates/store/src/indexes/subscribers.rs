use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sift_core::ports::SubscriberRegistry;
use sift_core::types::Subscriber;
use sift_core::{Error, Result};

use crate::client::SearchStore;

const INDEX: &str = "subscriber";

pub struct SubscriberIndex {
    store: Arc<SearchStore>,
}

impl SubscriberIndex {
    pub fn new(store: Arc<SearchStore>) -> Self {
        Self { store }
    }

    async fn get(&self, id: &str) -> Result<Option<Subscriber>> {
        let mut found: Vec<Subscriber> = self
            .store
            .read(INDEX, json!({ "match": { "_id": id } }))
            .await?;

        if found.len() == 1 {
            Ok(Some(found.remove(0)))
        } else {
            Ok(None)
        }
    }

    /// Theme lists are embedded in the subscriber document, so both keyword
    /// and watermark changes go through a read-modify-write of the whole list.
    /// Single-writer process; no concurrent mutation to guard against.
    async fn write_themes(&self, subscriber: &Subscriber) -> Result<()> {
        let updated = self
            .store
            .update(
                INDEX,
                &subscriber.id,
                json!({ "subscribed_themes": subscriber.subscribed_themes }),
            )
            .await?;
        if !updated {
            return Err(Error::NotFound {
                kind: "subscriber",
                id: subscriber.id.clone(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SubscriberRegistry for SubscriberIndex {
    async fn exists(&self, id: &str) -> Result<bool> {
        self.store.exists(INDEX, id).await
    }

    async fn list(&self, is_subscribed: bool) -> Result<Vec<Subscriber>> {
        self.store
            .read(INDEX, json!({ "term": { "is_subscribed": is_subscribed } }))
            .await
    }

    async fn register(&self, subscriber: &Subscriber) -> Result<String> {
        let document = json!({
            "username": subscriber.username,
            "is_subscribed": subscriber.is_subscribed,
            "subscribed_themes": subscriber.subscribed_themes,
        });

        match self
            .store
            .create(INDEX, document, Some(&subscriber.id))
            .await?
        {
            Some(id) => Ok(id),
            None => Err(Error::AlreadyExists {
                kind: "subscriber",
                id: subscriber.id.clone(),
            }),
        }
    }

    async fn set_subscribed(&self, id: &str, is_subscribed: bool) -> Result<()> {
        let updated = self
            .store
            .update(INDEX, id, json!({ "is_subscribed": is_subscribed }))
            .await?;
        if !updated {
            return Err(Error::NotFound {
                kind: "subscriber",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn update_keywords(&self, id: &str, theme: &str, keywords: &[String]) -> Result<()> {
        let Some(mut subscriber) = self.get(id).await? else {
            return Err(Error::NotFound {
                kind: "subscriber",
                id: id.to_string(),
            });
        };

        subscriber.upsert_theme(theme, keywords);
        self.write_themes(&subscriber).await
    }

    async fn advance_watermark(&self, id: &str, theme: &str, ts: DateTime<Utc>) -> Result<()> {
        let Some(mut subscriber) = self.get(id).await? else {
            return Err(Error::NotFound {
                kind: "subscriber",
                id: id.to_string(),
            });
        };

        // Nothing to persist when the theme is gone or the watermark would
        // move backwards.
        if !subscriber.advance_watermark(theme, ts) {
            return Ok(());
        }

        self.write_themes(&subscriber).await
    }
}
