use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Reads an explicit `null` as the default value, like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Body returned by the feed-to-JSON proxy.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub feed: FeedInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<FeedItem>,
}

impl FeedResponse {
    pub fn is_error(&self) -> bool {
        self.status.as_deref() == Some("error")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedInfo {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "pubDate")]
    pub pub_date: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    // The proxy sends `{}` or `[]` when an item has no enclosure.
    #[serde(default)]
    pub enclosure: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Vec<Value>,
}

impl FeedItem {
    pub fn enclosure_link(&self) -> Option<&str> {
        self.enclosure
            .as_ref()
            .and_then(|e| e.get("link"))
            .and_then(Value::as_str)
            .filter(|link| !link.is_empty())
    }

    pub fn category_names(&self) -> Vec<String> {
        self.categories
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// A feed entry read from an OPML subscription list.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSubscription {
    pub title: String,
    pub url: String,
}
