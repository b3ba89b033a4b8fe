use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::{AppError, Result};
use crate::feed::opml::parse_opml_file;

pub const DEFAULT_PROXY_BASE: &str = "https://api.rss2json.com/v1/api.json?rss_url=";
pub const DEFAULT_CACHE_KEY: &str = "rss_feed_cache";
pub const DEFAULT_CONTAINER: &str = "#rss-feed";
pub const DEFAULT_MAX_ARTICLES: usize = 10;
pub const DEFAULT_UPDATE_INTERVAL_MS: u64 = 60 * 60 * 1000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const APP_DIR: &str = "site-feeds";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub aggregator: AggregatorConfig,
    pub cache: CacheConfig,
    pub seo: SeoConfig,
    pub log: LogConfig,
    /// Directory relative paths in the file are resolved against.
    #[serde(skip)]
    base_dir: PathBuf,
}

/// Settings for fetching, caching and rendering feeds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Prefix the url-encoded feed URL is appended to.
    pub proxy_base: String,
    pub feeds: Vec<String>,
    /// OPML subscription list whose feeds are appended to `feeds` on load.
    pub feeds_opml: Option<PathBuf>,
    pub max_articles: usize,
    pub update_interval_ms: u64,
    /// Selector naming the render target.
    pub container: String,
    pub request_timeout_secs: u64,
    pub cache_key: String,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            proxy_base: DEFAULT_PROXY_BASE.to_string(),
            feeds: vec![
                "https://blog.rust-lang.org/feed.xml".to_string(),
                "https://this-week-in-rust.org/rss.xml".to_string(),
            ],
            feeds_opml: None,
            max_articles: DEFAULT_MAX_ARTICLES,
            update_interval_ms: DEFAULT_UPDATE_INTERVAL_MS,
            container: DEFAULT_CONTAINER.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            cache_key: DEFAULT_CACHE_KEY.to_string(),
        }
    }
}

impl AggregatorConfig {
    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        check_http_url("proxy_base", &self.proxy_base)?;

        if self.feeds.is_empty() {
            return Err(AppError::Config("at least one feed is required".to_string()));
        }
        for feed in &self.feeds {
            check_http_url("feeds", feed)?;
        }

        if self.max_articles == 0 {
            return Err(AppError::Config("max_articles must be positive".to_string()));
        }
        if self.update_interval_ms == 0 {
            return Err(AppError::Config(
                "update_interval_ms must be positive".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(AppError::Config(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        if self.container.trim().is_empty() {
            return Err(AppError::Config("container must not be empty".to_string()));
        }
        if self.cache_key.trim().is_empty() {
            return Err(AppError::Config("cache_key must not be empty".to_string()));
        }

        Ok(())
    }
}

fn check_http_url(field: &str, value: &str) -> Result<()> {
    let url = Url::parse(value)
        .map_err(|e| AppError::Config(format!("{field}: invalid URL {value:?}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(AppError::Config(format!(
            "{field}: unsupported scheme {scheme:?} in {value:?}"
        ))),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// SQLite database holding the cache slot.
    pub path: Option<PathBuf>,
}

impl CacheConfig {
    /// Returns the configured database path, falling back to the user cache
    /// directory. The parent directory is created if needed.
    pub fn resolve_path(&self) -> Result<PathBuf> {
        let path = match &self.path {
            Some(path) => path.clone(),
            None => dirs::cache_dir()
                .ok_or_else(|| AppError::Config("no cache directory available".to_string()))?
                .join(APP_DIR)
                .join("cache.db"),
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        Ok(path)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SeoConfig {
    pub site_name: String,
    /// Twitter handle emitted as `twitter:site`.
    pub twitter_site: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub file: Option<PathBuf>,
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
    }

    /// Loads the config file at `path`, or the default location when `path`
    /// is `None`, then imports OPML feeds and validates. A missing default
    /// file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::read(path)?.resolve()
    }

    /// Reads the TOML file alone, without touching the OPML list or
    /// validating. `resolve` finishes the job.
    pub fn read(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (Some(path.to_path_buf()), true),
            None => (Self::default_path(), false),
        };

        let mut config = match &path {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(path)?;
                Self::from_toml_str(&content)?
            }
            Some(path) if required => {
                return Err(AppError::Config(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            _ => Self::default(),
        };

        config.base_dir = path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Ok(config)
    }

    /// Appends the OPML feeds and validates the aggregator settings.
    pub fn resolve(mut self) -> Result<Self> {
        self.import_opml_feeds()?;
        self.aggregator.validate()?;
        Ok(self)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn import_opml_feeds(&mut self) -> Result<()> {
        let Some(opml_path) = &self.aggregator.feeds_opml else {
            return Ok(());
        };

        let opml_path = if opml_path.is_relative() {
            self.base_dir.join(opml_path)
        } else {
            opml_path.clone()
        };

        let subscriptions = parse_opml_file(&opml_path)?;
        tracing::debug!(
            "Imported {} feeds from {}",
            subscriptions.len(),
            opml_path.display()
        );

        for subscription in subscriptions {
            if self.aggregator.feeds.contains(&subscription.url) {
                tracing::debug!(
                    feed = %subscription.url,
                    "Skipping duplicate '{}'",
                    subscription.title
                );
                continue;
            }
            tracing::debug!(feed = %subscription.url, "Adding '{}'", subscription.title);
            self.aggregator.feeds.push(subscription.url);
        }

        Ok(())
    }
}
