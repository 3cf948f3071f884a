use sift_core::ports::{ChannelRegistry, MessageRegistry, MessageSource};
use sift_core::types::{Channel, Post};
use sift_core::Result;
use tracing::{debug, error, info};

/// One crawl cycle: every active channel, strictly in sequence. A failure on
/// one channel is logged and the remaining channels still run.
pub async fn run(
    source: &dyn MessageSource,
    channels: &dyn ChannelRegistry,
    messages: &dyn MessageRegistry,
) -> Result<()> {
    let active = channels.list_active().await?;
    info!(channel_count = active.len(), "crawl cycle started");

    for channel in &active {
        if let Err(err) = crawl_channel(source, channels, messages, channel).await {
            error!(channel_id = %channel.id, %err, "channel crawl failed");
        }
    }

    Ok(())
}

/// Fetches everything newer than the channel's offset (or a bounded recent
/// window for a never-crawled channel), ingests it with the channel's current
/// themes, and advances the offset to the largest message id seen. An empty
/// fetch leaves the offset untouched.
pub async fn crawl_channel(
    source: &dyn MessageSource,
    channels: &dyn ChannelRegistry,
    messages: &dyn MessageRegistry,
    channel: &Channel,
) -> Result<()> {
    let fetched = source.fetch(&channel.id, channel.offset_id).await?;

    let mut max_message_id: Option<i64> = None;
    let mut ingested = 0usize;

    for message in &fetched {
        max_message_id = Some(max_message_id.map_or(message.id, |current| current.max(message.id)));

        let post = Post {
            id: composite_id(&channel.id, message.id),
            text: message.text.clone(),
            themes: channel.themes.clone(),
            channel_id: channel.id.clone(),
            timestamp: message.date,
        };

        if messages.ingest(&post).await? {
            ingested += 1;
        } else {
            debug!(post_id = %post.id, "already ingested");
        }
    }

    if let Some(offset_id) = max_message_id {
        channels.update_offset(&channel.id, offset_id).await?;
    }

    info!(
        channel_id = %channel.id,
        fetched = fetched.len(),
        ingested,
        "channel crawled"
    );

    Ok(())
}

/// Message ids are only unique within their own channel; joining with the
/// channel id makes them globally unique.
pub fn composite_id(channel_id: &str, message_id: i64) -> String {
    format!("{channel_id}-{message_id}")
}
