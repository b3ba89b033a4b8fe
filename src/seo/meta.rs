use crate::config::SeoConfig;
use crate::models::Article;

use super::head::HeadDocument;
use super::structured_data::article_item_list;
use super::text::extract_keywords;

const KEYWORD_COUNT: usize = 10;

/// Attribute a meta tag is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaAttribute {
    /// `<meta name="...">`, e.g. description and Twitter Card tags.
    Name,
    /// `<meta property="...">`, used by Open Graph.
    Property,
}

impl MetaAttribute {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Property => "property",
        }
    }
}

/// Find-or-create updates of a page head.
pub struct MetaUpdater {
    config: SeoConfig,
}

impl MetaUpdater {
    pub fn new(config: SeoConfig) -> Self {
        Self { config }
    }

    /// Sets `content` on the meta tag keyed by `key`. Empty content is ignored.
    pub fn update_meta_tag(
        &self,
        head: &mut HeadDocument,
        key: &str,
        content: &str,
        kind: MetaAttribute,
    ) {
        if content.is_empty() {
            return;
        }
        head.find_or_create("meta", &[(kind.as_str(), key)])
            .set_attr("content", content);
    }

    pub fn update_title(&self, head: &mut HeadDocument, title: &str) {
        if title.is_empty() {
            return;
        }
        head.find_or_create("title", &[]).text = title.to_string();
    }

    pub fn set_canonical_url(&self, head: &mut HeadDocument, url: &str) {
        if url.is_empty() {
            return;
        }
        head.find_or_create("link", &[("rel", "canonical")])
            .set_attr("href", url);
    }

    /// Replaces the page's JSON-LD block with an `ItemList` of `articles`.
    pub fn add_structured_data(&self, head: &mut HeadDocument, articles: &[Article]) {
        let data = article_item_list(articles);
        let body = match serde_json::to_string_pretty(&data) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("Failed to serialize structured data: {}", e);
                return;
            }
        };
        head.find_or_create("script", &[("type", "application/ld+json")])
            .text = body;
    }

    /// Points every title, description and social tag at `article`.
    pub fn update_article_meta(&self, head: &mut HeadDocument, article: &Article) {
        use MetaAttribute::{Name, Property};

        let title = if self.config.site_name.is_empty() {
            article.title.clone()
        } else {
            format!("{} | {}", article.title, self.config.site_name)
        };
        self.update_title(head, &title);

        let keywords =
            extract_keywords(&format!("{} {}", article.title, article.description), KEYWORD_COUNT);

        self.update_meta_tag(head, "description", &article.description, Name);
        self.update_meta_tag(head, "keywords", &keywords.join(", "), Name);

        self.update_meta_tag(head, "og:type", "article", Property);
        self.update_meta_tag(head, "og:title", &article.title, Property);
        self.update_meta_tag(head, "og:description", &article.description, Property);
        self.update_meta_tag(head, "og:url", &article.link, Property);
        self.update_meta_tag(head, "og:image", &article.thumbnail, Property);
        self.update_meta_tag(head, "og:site_name", &self.config.site_name, Property);

        let card = if article.has_thumbnail() {
            "summary_large_image"
        } else {
            "summary"
        };
        self.update_meta_tag(head, "twitter:card", card, Name);
        self.update_meta_tag(head, "twitter:title", &article.title, Name);
        self.update_meta_tag(head, "twitter:description", &article.description, Name);
        self.update_meta_tag(head, "twitter:image", &article.thumbnail, Name);
        if let Some(site) = &self.config.twitter_site {
            self.update_meta_tag(head, "twitter:site", site, Name);
        }

        if let Some(date) = article.pub_date {
            self.update_meta_tag(head, "article:published_time", &date.to_rfc3339(), Property);
        }
        if article.has_known_author() {
            self.update_meta_tag(head, "article:author", &article.author, Property);
        }
        if let Some(section) = article.categories.first() {
            self.update_meta_tag(head, "article:section", section, Property);
        }

        self.set_canonical_url(head, &article.link);
    }
}
