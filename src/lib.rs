//! Feed aggregation and SEO head tooling for static websites.
//!
//! [`FeedAggregator`] pulls RSS feeds through a feed-to-JSON proxy, caches the
//! merged batch and renders it into a [`render::Container`].
//! [`seo::MetaUpdater`] rewrites a page head to describe an article.

pub mod aggregator;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod feed;
pub mod models;
pub mod render;
pub mod scheduler;
pub mod seo;

#[cfg(test)]
mod test_utils;

pub use aggregator::{DisplayOutcome, FeedAggregator};
pub use config::Config;
pub use error::{AppError, Result};
pub use scheduler::{AutoUpdater, UpdateHandle, UpdateJob};
