use std::time::Duration;

use futures::future::join_all;
use reqwest::Client;

use crate::config::AggregatorConfig;
use crate::error::{AppError, Result};
use crate::models::FeedResponse;

/// Fetches feeds through the feed-to-JSON proxy.
pub struct FeedFetcher {
    client: Client,
    proxy_base: String,
    feeds: Vec<String>,
}

impl FeedFetcher {
    pub fn new(config: &AggregatorConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("site-feeds/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            proxy_base: config.proxy_base.clone(),
            feeds: config.feeds.clone(),
        })
    }

    pub fn proxy_url(&self, feed_url: &str) -> String {
        format!("{}{}", self.proxy_base, urlencoding::encode(feed_url))
    }

    /// Single attempt; any failure is logged and yields `None`.
    pub async fn fetch_feed(&self, feed_url: &str) -> Option<FeedResponse> {
        match self.request_feed(feed_url).await {
            Ok(response) => {
                tracing::debug!(
                    "Fetched {} items from {}",
                    response.items.len(),
                    feed_url
                );
                Some(response)
            }
            Err(e) => {
                tracing::warn!(feed = %feed_url, "Failed to fetch feed: {}", e);
                None
            }
        }
    }

    async fn request_feed(&self, feed_url: &str) -> Result<FeedResponse> {
        let response = self.client.get(self.proxy_url(feed_url)).send().await?;

        if !response.status().is_success() {
            return Err(AppError::Status(response.status()));
        }

        let bytes = response.bytes().await?;
        let feed: FeedResponse = serde_json::from_slice(&bytes)?;

        if feed.is_error() {
            return Err(AppError::Proxy(
                feed.message.unwrap_or_else(|| "unknown proxy error".to_string()),
            ));
        }

        Ok(feed)
    }

    /// Fetches every configured feed concurrently and keeps the successes,
    /// in configuration order.
    pub async fn fetch_all_feeds(&self) -> Vec<FeedResponse> {
        let results = join_all(self.feeds.iter().map(|url| self.fetch_feed(url))).await;

        let responses: Vec<FeedResponse> = results.into_iter().flatten().collect();
        if responses.len() < self.feeds.len() {
            tracing::debug!(
                "{} of {} feeds failed",
                self.feeds.len() - responses.len(),
                self.feeds.len()
            );
        }

        responses
    }
}
