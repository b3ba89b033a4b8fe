mod fetcher;
pub mod opml;
mod parser;

pub use fetcher::FeedFetcher;
pub use parser::{
    parse_feed_items, parse_pub_date, sanitize_html, sort_articles_by_date, truncate_chars,
    MAX_DESCRIPTION_CHARS,
};
