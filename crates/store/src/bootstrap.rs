//! First-time index setup. The match queries depend on exact-value fields:
//! dynamic mapping would index `themes` as analyzed text and quietly break
//! term matching, so the mappings are created explicitly before any ingest.

use serde_json::{json, Value};
use sift_core::Result;
use tracing::info;

use crate::client::SearchStore;

fn channel_mappings() -> Value {
    json!({
        "mappings": {
            "properties": {
                "name": { "type": "text" },
                "themes": { "type": "keyword" },
                "offset_id": { "type": "long" },
                "is_active": { "type": "boolean" }
            }
        }
    })
}

fn subscriber_mappings() -> Value {
    json!({
        "mappings": {
            "properties": {
                "username": { "type": "keyword" },
                "is_subscribed": { "type": "boolean" },
                "subscribed_themes": {
                    "properties": {
                        "theme": { "type": "keyword" },
                        "keywords": { "type": "keyword" },
                        "last_notified_at": { "type": "date" }
                    }
                }
            }
        }
    })
}

fn message_mappings() -> Value {
    json!({
        "mappings": {
            "properties": {
                "text": { "type": "text" },
                "themes": { "type": "keyword" },
                "channel_id": { "type": "keyword" },
                "timestamp": { "type": "date" }
            }
        }
    })
}

/// Creates the three indexes with their mappings. Already-existing indexes
/// are left untouched, so re-running setup on a provisioned cluster is safe.
pub async fn create_indexes(store: &SearchStore) -> Result<()> {
    let indexes = [
        ("channel", channel_mappings()),
        ("subscriber", subscriber_mappings()),
        ("message", message_mappings()),
    ];

    for (index, mappings) in indexes {
        let created = store.create_index(index, mappings).await?;
        if created {
            info!(index, "index created");
        } else {
            info!(index, "index already exists");
        }
    }

    Ok(())
}
