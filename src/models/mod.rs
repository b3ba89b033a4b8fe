mod article;
mod feed;

pub use article::{Article, CacheRecord, UNKNOWN_AUTHOR};
pub use feed::{FeedInfo, FeedItem, FeedResponse, FeedSubscription};
