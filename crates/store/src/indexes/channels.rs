use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use sift_core::ports::ChannelRegistry;
use sift_core::types::Channel;
use sift_core::{Error, Result};

use crate::client::SearchStore;

const INDEX: &str = "channel";

pub struct ChannelIndex {
    store: Arc<SearchStore>,
}

impl ChannelIndex {
    pub fn new(store: Arc<SearchStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ChannelRegistry for ChannelIndex {
    async fn exists(&self, id: &str) -> Result<bool> {
        self.store.exists(INDEX, id).await
    }

    async fn get(&self, id: &str) -> Result<Option<Channel>> {
        let mut found: Vec<Channel> = self
            .store
            .read(INDEX, json!({ "match": { "_id": id } }))
            .await?;

        if found.len() == 1 {
            Ok(Some(found.remove(0)))
        } else {
            Ok(None)
        }
    }

    async fn list_all(&self) -> Result<Vec<Channel>> {
        self.store.read(INDEX, json!({ "match_all": {} })).await
    }

    async fn list_active(&self) -> Result<Vec<Channel>> {
        self.store
            .read(INDEX, json!({ "term": { "is_active": true } }))
            .await
    }

    async fn register(&self, channel: &Channel) -> Result<String> {
        // channel ids are stored lowercase
        let id = channel.id.to_lowercase();

        if let Some(existing) = self.get(&id).await? {
            let merged = existing.merged_themes(&channel.themes);
            self.update_themes(&id, &merged).await?;
            return Ok(id);
        }

        let document = json!({
            "name": channel.name,
            "is_active": channel.is_active,
            "offset_id": channel.offset_id,
            "themes": channel.themes,
        });
        self.store.create(INDEX, document, Some(&id)).await?;

        Ok(id)
    }

    async fn set_active(&self, id: &str, is_active: bool) -> Result<()> {
        let updated = self
            .store
            .update(INDEX, id, json!({ "is_active": is_active }))
            .await?;
        if !updated {
            return Err(Error::NotFound {
                kind: "channel",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn update_themes(&self, id: &str, themes: &[String]) -> Result<()> {
        let updated = self
            .store
            .update(INDEX, id, json!({ "themes": themes }))
            .await?;
        if !updated {
            return Err(Error::NotFound {
                kind: "channel",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn update_offset(&self, id: &str, offset_id: i64) -> Result<()> {
        let Some(mut channel) = self.get(id).await? else {
            return Err(Error::NotFound {
                kind: "channel",
                id: id.to_string(),
            });
        };

        // Nothing to persist when the stored offset is already past it.
        if !channel.advance_offset(offset_id) {
            return Ok(());
        }

        let updated = self
            .store
            .update(INDEX, id, json!({ "offset_id": channel.offset_id }))
            .await?;
        if !updated {
            return Err(Error::NotFound {
                kind: "channel",
                id: id.to_string(),
            });
        }
        Ok(())
    }
}
