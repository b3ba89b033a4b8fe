use chrono::{DateTime, Utc};
use url::Url;

use crate::models::Article;

pub const LOADING_HTML: &str = r#"<div class="rss-loading">Loading articles...</div>"#;
pub const ERROR_HTML: &str =
    r#"<div class="rss-error">Unable to load articles. Please try again later.</div>"#;
pub const EMPTY_HTML: &str = r#"<p class="rss-empty">No articles available.</p>"#;

/// Renders the first `max_articles` articles as cards.
///
/// Every article field is escaped before interpolation and links are limited
/// to http(s).
pub fn generate_article_html(articles: &[Article], max_articles: usize) -> String {
    if articles.is_empty() || max_articles == 0 {
        return EMPTY_HTML.to_string();
    }

    let mut buf = String::new();
    for article in articles.iter().take(max_articles) {
        buf.push_str(&render_article(article));
    }
    buf
}

fn render_article(article: &Article) -> String {
    let title = escape_html(&article.title);
    let link = escape_html(&safe_url(&article.link));

    let mut buf = String::from("<article class=\"rss-article\">\n");

    if article.has_thumbnail() {
        buf.push_str(&format!(
            "  <div class=\"article-thumbnail\"><img src=\"{}\" alt=\"{}\" loading=\"lazy\"></div>\n",
            escape_html(&safe_url(&article.thumbnail)),
            title
        ));
    }

    buf.push_str("  <div class=\"article-content\">\n");
    buf.push_str(&format!(
        "    <h3 class=\"article-title\"><a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a></h3>\n",
        link, title
    ));

    buf.push_str("    <div class=\"article-meta\">");
    buf.push_str(&format!(
        "<span class=\"article-source\">{}</span>",
        escape_html(&article.source)
    ));
    if let Some(date) = article.pub_date {
        buf.push_str(&format!(
            "<time class=\"article-date\" datetime=\"{}\">{}</time>",
            date.to_rfc3339(),
            format_date(&date)
        ));
    }
    if article.has_known_author() {
        buf.push_str(&format!(
            "<span class=\"article-author\">by {}</span>",
            escape_html(&article.author)
        ));
    }
    buf.push_str("</div>\n");

    buf.push_str(&format!(
        "    <p class=\"article-description\">{}</p>\n",
        escape_html(&article.description)
    ));

    if !article.categories.is_empty() {
        buf.push_str("    <div class=\"article-categories\">");
        for category in &article.categories {
            buf.push_str(&format!(
                "<span class=\"category-tag\">{}</span>",
                escape_html(category)
            ));
        }
        buf.push_str("</div>\n");
    }

    buf.push_str("  </div>\n</article>\n");
    buf
}

/// e.g. "Jan 5, 2026"
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%b %-d, %Y").to_string()
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Keeps absolute http(s) URLs, anything else becomes `#`.
pub fn safe_url(raw: &str) -> String {
    match Url::parse(raw.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => url.to_string(),
        _ => "#".to_string(),
    }
}
