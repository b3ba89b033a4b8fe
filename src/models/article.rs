use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// One normalized entry taken from a proxied feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Article {
    pub title: String,
    pub link: String,
    pub description: String,
    pub pub_date: Option<DateTime<Utc>>,
    pub author: String,
    /// Empty when the item carried neither a thumbnail nor an enclosure.
    pub thumbnail: String,
    pub categories: Vec<String>,
    pub source: String,
}

impl Article {
    pub fn has_known_author(&self) -> bool {
        !self.author.is_empty() && self.author != UNKNOWN_AUTHOR
    }

    pub fn has_thumbnail(&self) -> bool {
        !self.thumbnail.is_empty()
    }
}

/// Contents of the cache slot: the last batch and when it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub articles: Vec<Article>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}
