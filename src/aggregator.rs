use std::sync::Arc;

use tokio::sync::Mutex;

use crate::cache::ArticleCache;
use crate::config::AggregatorConfig;
use crate::db::KeyValueStore;
use crate::error::Result;
use crate::feed::{parse_feed_items, sort_articles_by_date, FeedFetcher};
use crate::models::{Article, FeedResponse};
use crate::render::{generate_article_html, Container, ERROR_HTML, LOADING_HTML};

/// What a render pass ended up showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayOutcome {
    /// Rendered this many articles from a fresh cache slot.
    Cached(usize),
    /// Rendered this many articles fetched from the feeds.
    Fetched(usize),
    /// Every feed failed; the error placeholder is showing.
    FeedsUnavailable,
    /// The render target could not be written.
    MissingContainer,
    /// Another pass was already running.
    Busy,
}

pub struct FeedAggregator {
    config: AggregatorConfig,
    fetcher: FeedFetcher,
    cache: ArticleCache,
    container: Arc<dyn Container>,
    render_lock: Mutex<()>,
}

impl FeedAggregator {
    pub fn new(
        config: AggregatorConfig,
        store: Arc<dyn KeyValueStore>,
        container: Arc<dyn Container>,
    ) -> Result<Self> {
        config.validate()?;

        let fetcher = FeedFetcher::new(&config)?;
        let cache = ArticleCache::new(store, config.cache_key.clone(), config.update_interval());

        Ok(Self {
            config,
            fetcher,
            cache,
            container,
            render_lock: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    pub fn cache(&self) -> &ArticleCache {
        &self.cache
    }

    pub async fn fetch_all_feeds(&self) -> Vec<FeedResponse> {
        self.fetcher.fetch_all_feeds().await
    }

    /// Loading placeholder, then cached articles if fresh, otherwise a full
    /// fetch. Never fails; the outcome says what was shown.
    pub async fn display_articles(&self) -> DisplayOutcome {
        let Ok(_guard) = self.render_lock.try_lock() else {
            tracing::debug!("Render pass already running, skipping");
            return DisplayOutcome::Busy;
        };

        self.render_pass().await
    }

    /// Drops the cached batch and renders from the feeds.
    pub async fn refresh(&self) -> DisplayOutcome {
        let Ok(_guard) = self.render_lock.try_lock() else {
            tracing::debug!("Render pass already running, skipping refresh");
            return DisplayOutcome::Busy;
        };

        if let Err(e) = self.cache.clear().await {
            tracing::warn!("Failed to clear article cache: {}", e);
        }

        self.render_pass().await
    }

    async fn render_pass(&self) -> DisplayOutcome {
        if !self.render(LOADING_HTML) {
            return DisplayOutcome::MissingContainer;
        }

        if let Some(articles) = self.cache.get_cached_articles().await {
            tracing::debug!("Serving {} cached articles", articles.len());
            return match self.render_articles(&articles) {
                Some(count) => DisplayOutcome::Cached(count),
                None => DisplayOutcome::MissingContainer,
            };
        }

        let responses = self.fetch_all_feeds().await;
        if responses.is_empty() {
            tracing::warn!("No feeds could be fetched");
            if !self.render(ERROR_HTML) {
                return DisplayOutcome::MissingContainer;
            }
            return DisplayOutcome::FeedsUnavailable;
        }

        let mut articles: Vec<Article> = responses.iter().flat_map(parse_feed_items).collect();
        sort_articles_by_date(&mut articles);

        if let Err(e) = self.cache.cache_articles(&articles).await {
            tracing::warn!("Failed to cache articles: {}", e);
        }

        tracing::info!(
            "Fetched {} articles from {} of {} feeds",
            articles.len(),
            responses.len(),
            self.config.feeds.len()
        );

        match self.render_articles(&articles) {
            Some(count) => DisplayOutcome::Fetched(count),
            None => DisplayOutcome::MissingContainer,
        }
    }

    fn render_articles(&self, articles: &[Article]) -> Option<usize> {
        let html = generate_article_html(articles, self.config.max_articles);
        self.render(&html)
            .then(|| articles.len().min(self.config.max_articles))
    }

    fn render(&self, html: &str) -> bool {
        match self.container.set_inner_html(html) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(
                    container = %self.container.selector(),
                    "Failed to render articles: {}",
                    e
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::render::{MemoryContainer, EMPTY_HTML};
    use crate::test_utils::{article, config_for, StubProxy, GOOD_FEED, SECOND_FEED};

    fn aggregator(
        config: AggregatorConfig,
        container: &MemoryContainer,
    ) -> (Arc<MemoryStore>, FeedAggregator) {
        let store = Arc::new(MemoryStore::new());
        let aggregator =
            FeedAggregator::new(config, store.clone(), Arc::new(container.clone())).unwrap();
        (store, aggregator)
    }

    #[tokio::test]
    async fn one_failing_feed_still_renders_the_other() {
        let proxy = StubProxy::start().await;
        let container = MemoryContainer::new("#rss-feed");
        let (_, aggregator) = aggregator(
            config_for(&proxy, &[GOOD_FEED, "https://broken.example/rss"]),
            &container,
        );

        assert_eq!(aggregator.fetch_all_feeds().await.len(), 1);

        let outcome = aggregator.display_articles().await;
        assert_eq!(outcome, DisplayOutcome::Fetched(3));

        let html = container.html().unwrap();
        assert_eq!(html.matches("<article class=\"rss-article\">").count(), 3);
        assert!(!html.contains("rss-error"));
        assert!(!html.contains("<script>"));

        // Newest first
        let newest = html.find("Newest post").unwrap();
        let middle = html.find("&quot;Quoted&quot;").unwrap();
        let oldest = html.find("Oldest post").unwrap();
        assert!(newest < middle && middle < oldest);
    }

    #[tokio::test]
    async fn merges_feeds_by_date_and_respects_max_articles() {
        let proxy = StubProxy::start().await;
        let container = MemoryContainer::new("#rss-feed");
        let config = AggregatorConfig {
            max_articles: 2,
            ..config_for(&proxy, &[GOOD_FEED, SECOND_FEED])
        };
        let (_, aggregator) = aggregator(config, &container);

        assert_eq!(aggregator.display_articles().await, DisplayOutcome::Fetched(2));

        let html = container.html().unwrap();
        assert!(html.contains("Newest post"));
        // 2026-03-02 09:00 beats the second feed's 08:00 entry
        assert!(html.contains("Quoted"));
        assert!(!html.contains("Second feed post"));

        let cached = aggregator.cache().get_cached_articles().await.unwrap();
        assert_eq!(cached.len(), 4);
        assert_eq!(cached[2].title, "Second feed post");
    }

    #[tokio::test]
    async fn all_feeds_failing_shows_error_and_caches_nothing() {
        let proxy = StubProxy::start().await;
        let container = MemoryContainer::new("#rss-feed");
        let (store, aggregator) = aggregator(
            config_for(&proxy, &["https://broken.example/rss", "https://garbage.example/rss"]),
            &container,
        );

        assert_eq!(
            aggregator.display_articles().await,
            DisplayOutcome::FeedsUnavailable
        );
        assert_eq!(container.html().as_deref(), Some(ERROR_HTML));
        assert!(store.get("rss_feed_cache").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn fresh_cache_skips_the_network() {
        let proxy = StubProxy::start().await;
        let container = MemoryContainer::new("#rss-feed");
        let (_, aggregator) = aggregator(config_for(&proxy, &[GOOD_FEED]), &container);

        aggregator
            .cache()
            .cache_articles(&[article("From cache", 7)])
            .await
            .unwrap();

        assert_eq!(aggregator.display_articles().await, DisplayOutcome::Cached(1));
        assert!(container.html().unwrap().contains("From cache"));
        assert_eq!(proxy.hits(), 0);
    }

    #[tokio::test]
    async fn refresh_ignores_the_cache() {
        let proxy = StubProxy::start().await;
        let container = MemoryContainer::new("#rss-feed");
        let (_, aggregator) = aggregator(config_for(&proxy, &[GOOD_FEED]), &container);

        aggregator
            .cache()
            .cache_articles(&[article("Stale", 7)])
            .await
            .unwrap();

        assert_eq!(aggregator.refresh().await, DisplayOutcome::Fetched(3));
        assert!(!container.html().unwrap().contains("Stale"));
        assert_eq!(proxy.hits(), 1);
    }

    #[tokio::test]
    async fn empty_feed_renders_empty_state() {
        let container = MemoryContainer::new("#rss-feed");
        let store = Arc::new(MemoryStore::new());
        let proxy = StubProxy::start().await;
        let aggregator =
            FeedAggregator::new(config_for(&proxy, &[GOOD_FEED]), store, Arc::new(container.clone()))
                .unwrap();

        aggregator.cache().cache_articles(&[]).await.unwrap();
        assert_eq!(aggregator.display_articles().await, DisplayOutcome::Cached(0));
        assert_eq!(container.html().as_deref(), Some(EMPTY_HTML));
    }

    #[tokio::test]
    async fn missing_container_stops_before_fetching() {
        let proxy = StubProxy::start().await;
        let container = MemoryContainer::detached("#nowhere");
        let (_, aggregator) = aggregator(config_for(&proxy, &[GOOD_FEED]), &container);

        assert_eq!(
            aggregator.display_articles().await,
            DisplayOutcome::MissingContainer
        );
        assert_eq!(proxy.hits(), 0);
    }

    #[tokio::test]
    async fn overlapping_pass_is_skipped() {
        let proxy = StubProxy::start().await;
        let container = MemoryContainer::new("#rss-feed");
        let (_, aggregator) = aggregator(config_for(&proxy, &[GOOD_FEED]), &container);

        let _held = aggregator.render_lock.lock().await;
        assert_eq!(aggregator.display_articles().await, DisplayOutcome::Busy);
        assert_eq!(aggregator.refresh().await, DisplayOutcome::Busy);
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let config = AggregatorConfig {
            feeds: Vec::new(),
            ..Default::default()
        };
        let result = FeedAggregator::new(
            config,
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryContainer::new("#rss-feed")),
        );
        assert!(result.is_err());
    }
}
