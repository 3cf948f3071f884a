use chrono::{DateTime, Utc};
use sift_core::ports::{MessageRegistry, Notifier, SubscriberRegistry};
use sift_core::time::today_midnight_utc;
use sift_core::types::SubscribedTheme;
use sift_core::Result;
use tracing::{error, info, warn};

/// One notification cycle: every subscribed subscriber, every theme entry,
/// strictly in sequence. A failure on one theme is logged and the remaining
/// themes and subscribers still run.
pub async fn run(
    subscribers: &dyn SubscriberRegistry,
    messages: &dyn MessageRegistry,
    notifier: &dyn Notifier,
) -> Result<()> {
    let subscribed = subscribers.list(true).await?;
    info!(subscriber_count = subscribed.len(), "notify cycle started");

    for subscriber in &subscribed {
        for entry in &subscriber.subscribed_themes {
            if let Err(err) =
                notify_theme(subscribers, messages, notifier, &subscriber.id, entry).await
            {
                error!(
                    subscriber_id = %subscriber.id,
                    theme = %entry.theme,
                    %err,
                    "theme notification failed"
                );
            }
        }
    }

    Ok(())
}

async fn notify_theme(
    subscribers: &dyn SubscriberRegistry,
    messages: &dyn MessageRegistry,
    notifier: &dyn Notifier,
    subscriber_id: &str,
    entry: &SubscribedTheme,
) -> Result<()> {
    // A theme that has never been notified starts from today midnight UTC so
    // a fresh subscription does not replay the whole backlog.
    let after = entry.last_notified_at.unwrap_or_else(today_midnight_utc);

    let mut matches = messages
        .matched(&entry.theme, &entry.keywords, after)
        .await?;
    // The store does not guarantee order; ascending timestamps make the
    // watermark advance deterministic.
    matches.sort_by_key(|post| post.timestamp);

    let mut delivered_up_to: Option<DateTime<Utc>> = None;
    for post in &matches {
        let Some(text) = post.text.as_deref() else {
            continue;
        };

        match notifier.send(text, subscriber_id).await {
            // Ascending order, so the latest success carries the max timestamp.
            Ok(()) => delivered_up_to = Some(post.timestamp),
            // TODO: record failed sends in the store; once a later post in the
            // batch succeeds the watermark moves past this one and it is never
            // retried.
            Err(err) => warn!(post_id = %post.id, %err, "delivery failed"),
        }
    }

    if let Some(ts) = delivered_up_to {
        subscribers
            .advance_watermark(subscriber_id, &entry.theme, ts)
            .await?;
        info!(subscriber_id, theme = %entry.theme, watermark = %ts, "watermark advanced");
    }

    Ok(())
}
