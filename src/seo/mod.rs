//! Page head updates for article pages and the text helpers they use.

mod head;
mod meta;
mod structured_data;
mod text;

pub use head::{has_body_content, HeadDocument, HeadElement};
pub use meta::{MetaAttribute, MetaUpdater};
pub use structured_data::{article_item_list, article_schema};
pub use text::{extract_keywords, is_stop_word, slugify};
