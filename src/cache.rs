use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::db::KeyValueStore;
use crate::error::Result;
use crate::models::{Article, CacheRecord};

/// The single cache slot holding the latest rendered batch.
pub struct ArticleCache {
    store: Arc<dyn KeyValueStore>,
    key: String,
    ttl: Duration,
}

impl ArticleCache {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>, ttl: Duration) -> Self {
        Self {
            store,
            key: key.into(),
            ttl,
        }
    }

    pub async fn cache_articles(&self, articles: &[Article]) -> Result<()> {
        self.cache_articles_at(articles, Utc::now().timestamp_millis())
            .await
    }

    pub(crate) async fn cache_articles_at(&self, articles: &[Article], timestamp: i64) -> Result<()> {
        let record = CacheRecord {
            articles: articles.to_vec(),
            timestamp,
        };
        let json = serde_json::to_string(&record)?;
        self.store.set(&self.key, json).await
    }

    /// Returns the cached batch while it is younger than the update
    /// interval. Expired, missing or unreadable records are misses.
    pub async fn get_cached_articles(&self) -> Option<Vec<Article>> {
        self.get_cached_articles_at(Utc::now().timestamp_millis())
            .await
    }

    pub(crate) async fn get_cached_articles_at(&self, now: i64) -> Option<Vec<Article>> {
        let raw = match self.store.get(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Failed to read article cache: {}", e);
                return None;
            }
        };

        let record: CacheRecord = match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Discarding unreadable article cache: {}", e);
                return None;
            }
        };

        let age = now.saturating_sub(record.timestamp);
        let ttl = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);
        if age >= ttl {
            tracing::debug!("Article cache expired ({} ms old)", age);
            return None;
        }

        Some(record.articles)
    }

    pub async fn clear(&self) -> Result<()> {
        self.store.remove(&self.key).await
    }
}
