use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sift_core::ports::MessageRegistry;
use sift_core::query::build_query_string;
use sift_core::types::Post;
use sift_core::Result;

use crate::client::SearchStore;

const INDEX: &str = "message";

pub struct MessageIndex {
    store: Arc<SearchStore>,
}

impl MessageIndex {
    pub fn new(store: Arc<SearchStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl MessageRegistry for MessageIndex {
    async fn ingest(&self, post: &Post) -> Result<bool> {
        let document = json!({
            "text": post.text,
            "themes": post.themes,
            "channel_id": post.channel_id,
            "timestamp": post.timestamp,
        });

        let created = self.store.create(INDEX, document, Some(&post.id)).await?;
        Ok(created.is_some())
    }

    async fn matched(
        &self,
        theme: &str,
        keywords: &[String],
        after: DateTime<Utc>,
    ) -> Result<Vec<Post>> {
        let query = json!({
            "bool": {
                "must": [
                    { "query_string": { "query": build_query_string(keywords) } },
                    { "term": { "themes": { "value": theme } } }
                ],
                "filter": [
                    { "range": { "timestamp": { "gt": after.to_rfc3339() } } }
                ]
            }
        });

        self.store.read(INDEX, query).await
    }
}
