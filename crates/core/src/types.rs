use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A crawl target. `offset_id` is the largest provider-native message id
/// seen so far; `None` means the channel has never been crawled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub themes: Vec<String>,
    pub offset_id: Option<i64>,
    pub is_active: bool,
}

impl Channel {
    /// Union of the stored themes and `incoming`, first-seen order, no duplicates.
    pub fn merged_themes(&self, incoming: &[String]) -> Vec<String> {
        let mut merged = self.themes.clone();
        for theme in incoming {
            if !merged.contains(theme) {
                merged.push(theme.clone());
            }
        }
        merged
    }

    /// Moves the crawl offset forward to `offset_id`. Returns false when the
    /// stored offset is already at or past it.
    pub fn advance_offset(&mut self, offset_id: i64) -> bool {
        if self.offset_id.is_some_and(|current| offset_id <= current) {
            return false;
        }

        self.offset_id = Some(offset_id);
        true
    }
}

/// An ingested post. The id is the channel id joined with the provider-native
/// message id, which makes re-ingestion a no-op at the store level. Themes are
/// copied from the channel at ingest time and never relabeled afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub text: Option<String>,
    pub themes: Vec<String>,
    pub channel_id: String,
    pub timestamp: DateTime<Utc>,
}

/// A message as returned by the message source, before ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMessage {
    pub id: i64,
    pub text: Option<String>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribedTheme {
    pub theme: String,
    pub keywords: Vec<String>,
    pub last_notified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscriber {
    pub id: String,
    pub username: Option<String>,
    pub is_subscribed: bool,
    pub subscribed_themes: Vec<SubscribedTheme>,
}

impl Subscriber {
    /// Replaces the keyword list of an existing theme entry, or appends a new
    /// entry with an unset watermark. At most one entry per theme name.
    pub fn upsert_theme(&mut self, theme: &str, keywords: &[String]) {
        match self
            .subscribed_themes
            .iter_mut()
            .find(|entry| entry.theme == theme)
        {
            Some(entry) => entry.keywords = keywords.to_vec(),
            None => self.subscribed_themes.push(SubscribedTheme {
                theme: theme.to_string(),
                keywords: keywords.to_vec(),
                last_notified_at: None,
            }),
        }
    }

    /// Moves a theme's watermark forward to `ts`. Returns false when the theme
    /// is not subscribed or `ts` would move the watermark backwards.
    pub fn advance_watermark(&mut self, theme: &str, ts: DateTime<Utc>) -> bool {
        let Some(entry) = self
            .subscribed_themes
            .iter_mut()
            .find(|entry| entry.theme == theme)
        else {
            return false;
        };

        if entry.last_notified_at.is_some_and(|current| ts <= current) {
            return false;
        }

        entry.last_notified_at = Some(ts);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn channel(themes: &[&str]) -> Channel {
        Channel {
            id: "deals_sg".to_string(),
            name: "Deals SG".to_string(),
            themes: themes.iter().map(|t| t.to_string()).collect(),
            offset_id: None,
            is_active: true,
        }
    }

    fn subscriber(themes: Vec<SubscribedTheme>) -> Subscriber {
        Subscriber {
            id: "1001".to_string(),
            username: None,
            is_subscribed: true,
            subscribed_themes: themes,
        }
    }

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn merged_themes_deduplicates() {
        let channel = channel(&["food", "promo"]);
        let merged = channel.merged_themes(&["promo".to_string(), "travel".to_string()]);
        assert_eq!(merged, vec!["food", "promo", "travel"]);
    }

    #[test]
    fn merged_themes_with_no_incoming_is_unchanged() {
        let channel = channel(&["food"]);
        assert_eq!(channel.merged_themes(&[]), vec!["food"]);
    }

    #[test]
    fn advance_offset_only_moves_forward() {
        let mut channel = channel(&["food"]);
        channel.offset_id = Some(9);

        assert!(!channel.advance_offset(3));
        assert_eq!(channel.offset_id, Some(9));

        assert!(channel.advance_offset(12));
        assert_eq!(channel.offset_id, Some(12));
    }

    #[test]
    fn advance_offset_sets_initial_value() {
        let mut channel = channel(&["food"]);
        assert!(channel.advance_offset(5));
        assert_eq!(channel.offset_id, Some(5));
    }

    #[test]
    fn upsert_theme_replaces_existing_keywords_and_keeps_watermark() {
        let mut sub = subscriber(vec![SubscribedTheme {
            theme: "food".to_string(),
            keywords: vec!["chicken".to_string()],
            last_notified_at: Some(ts(100)),
        }]);

        sub.upsert_theme("food", &["sushi".to_string()]);

        assert_eq!(sub.subscribed_themes.len(), 1);
        assert_eq!(sub.subscribed_themes[0].keywords, vec!["sushi"]);
        assert_eq!(sub.subscribed_themes[0].last_notified_at, Some(ts(100)));
    }

    #[test]
    fn upsert_theme_appends_new_entry_with_unset_watermark() {
        let mut sub = subscriber(vec![]);

        sub.upsert_theme("travel", &["flight".to_string()]);

        assert_eq!(sub.subscribed_themes.len(), 1);
        assert_eq!(sub.subscribed_themes[0].theme, "travel");
        assert_eq!(sub.subscribed_themes[0].last_notified_at, None);
    }

    #[test]
    fn advance_watermark_only_moves_forward() {
        let mut sub = subscriber(vec![SubscribedTheme {
            theme: "food".to_string(),
            keywords: vec![],
            last_notified_at: Some(ts(200)),
        }]);

        assert!(!sub.advance_watermark("food", ts(150)));
        assert_eq!(sub.subscribed_themes[0].last_notified_at, Some(ts(200)));

        assert!(sub.advance_watermark("food", ts(300)));
        assert_eq!(sub.subscribed_themes[0].last_notified_at, Some(ts(300)));
    }

    #[test]
    fn advance_watermark_sets_initial_value() {
        let mut sub = subscriber(vec![SubscribedTheme {
            theme: "food".to_string(),
            keywords: vec![],
            last_notified_at: None,
        }]);

        assert!(sub.advance_watermark("food", ts(50)));
        assert_eq!(sub.subscribed_themes[0].last_notified_at, Some(ts(50)));
    }

    #[test]
    fn advance_watermark_ignores_unknown_theme() {
        let mut sub = subscriber(vec![]);
        assert!(!sub.advance_watermark("food", ts(50)));
    }
}
