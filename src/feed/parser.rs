use chrono::{DateTime, NaiveDateTime, Utc};
use scraper::Html;

use crate::models::{Article, FeedResponse, UNKNOWN_AUTHOR};

pub const MAX_DESCRIPTION_CHARS: usize = 200;

/// Maps every proxied item to an [`Article`], one output per input item.
pub fn parse_feed_items(response: &FeedResponse) -> Vec<Article> {
    let source = response
        .feed
        .title
        .as_deref()
        .map(sanitize_html)
        .unwrap_or_default();

    response
        .items
        .iter()
        .map(|item| {
            let description = item
                .description
                .as_deref()
                .map(sanitize_html)
                .unwrap_or_default();

            let author = item
                .author
                .as_deref()
                .map(sanitize_html)
                .filter(|a| !a.is_empty())
                .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());

            let thumbnail = item
                .thumbnail
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .or_else(|| item.enclosure_link())
                .unwrap_or_default()
                .to_string();

            Article {
                title: item.title.as_deref().map(sanitize_html).unwrap_or_default(),
                link: item
                    .link
                    .as_deref()
                    .map(str::trim)
                    .unwrap_or_default()
                    .to_string(),
                description: truncate_chars(&description, MAX_DESCRIPTION_CHARS),
                pub_date: item.pub_date.as_deref().and_then(parse_pub_date),
                author,
                thumbnail,
                categories: item.category_names(),
                source: source.clone(),
            }
        })
        .collect()
}

/// Newest first. Ties keep their input order and undated articles go last.
pub fn sort_articles_by_date(articles: &mut [Article]) {
    articles.sort_by(|a, b| match (a.pub_date, b.pub_date) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

/// Strips markup, decodes entities and collapses whitespace.
pub fn sanitize_html(input: &str) -> String {
    if input.trim().is_empty() {
        return String::new();
    }

    let fragment = Html::parse_fragment(input);
    let text: String = fragment.root_element().text().collect();

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}

pub fn parse_pub_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    // RFC3339 (e.g., "2026-01-11T12:34:56+00:00")
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Proxy format, always UTC (e.g., "2026-01-11 12:34:56")
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    // Raw RSS (e.g., "Sun, 11 Jan 2026 12:34:56 GMT")
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn response(value: serde_json::Value) -> FeedResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn one_article_per_item_with_defaults() {
        let response = response(json!({
            "status": "ok",
            "feed": { "title": "Example Blog" },
            "items": [
                {
                    "title": "<b>Hello</b> &amp; welcome",
                    "link": "https://example.com/1",
                    "description": "<p>First   <em>post</em></p>",
                    "pubDate": "2026-01-11 12:34:56",
                    "author": "Ada",
                    "thumbnail": "https://example.com/1.png",
                    "enclosure": {},
                    "categories": ["rust", "", 42]
                },
                {
                    "title": "Bare item",
                    "enclosure": []
                },
                {
                    "title": "Enclosure only",
                    "author": "   ",
                    "enclosure": { "link": "https://example.com/3.jpg" }
                }
            ]
        }));

        let articles = parse_feed_items(&response);
        assert_eq!(articles.len(), 3);

        let first = &articles[0];
        assert_eq!(first.title, "Hello & welcome");
        assert_eq!(first.description, "First post");
        assert_eq!(first.author, "Ada");
        assert_eq!(first.thumbnail, "https://example.com/1.png");
        assert_eq!(first.categories, vec!["rust"]);
        assert_eq!(first.source, "Example Blog");
        assert_eq!(
            first.pub_date,
            Some(Utc.with_ymd_and_hms(2026, 1, 11, 12, 34, 56).unwrap())
        );

        let bare = &articles[1];
        assert_eq!(bare.author, "Unknown");
        assert_eq!(bare.thumbnail, "");
        assert!(bare.categories.is_empty());
        assert_eq!(bare.link, "");
        assert_eq!(bare.description, "");
        assert!(bare.pub_date.is_none());

        assert_eq!(articles[2].author, "Unknown");
        assert_eq!(articles[2].thumbnail, "https://example.com/3.jpg");
    }

    #[test]
    fn null_collections_read_as_empty() {
        let response: FeedResponse = serde_json::from_value(json!({
            "status": "ok",
            "feed": { "title": "Example Blog" },
            "items": [
                { "title": "No tags", "categories": null },
                { "title": "Tagged", "categories": ["x"] }
            ]
        }))
        .unwrap();

        let articles = parse_feed_items(&response);
        assert_eq!(articles.len(), 2);
        assert!(articles[0].categories.is_empty());
        assert_eq!(articles[1].categories, vec!["x"]);

        let response: FeedResponse =
            serde_json::from_value(json!({ "feed": null, "items": null })).unwrap();
        assert!(parse_feed_items(&response).is_empty());
    }

    #[test]
    fn description_is_truncated_after_sanitizing() {
        let long = format!("<div>{}</div>", "é".repeat(500));
        let response = response(json!({
            "feed": { "title": "Feed" },
            "items": [{ "title": "Long", "description": long }]
        }));

        let articles = parse_feed_items(&response);
        assert_eq!(articles[0].description.chars().count(), MAX_DESCRIPTION_CHARS);
        assert!(!articles[0].description.contains('<'));
    }

    #[test]
    fn missing_items_parse_to_nothing() {
        let response = response(json!({ "feed": {} }));
        assert!(parse_feed_items(&response).is_empty());
    }

    #[test]
    fn sanitize_drops_markup() {
        assert_eq!(
            sanitize_html("<script>x</script><img src=x onerror=alert(1)>Safe &lt;text&gt;"),
            "xSafe <text>"
        );
        assert_eq!(sanitize_html("   "), "");
    }

    #[test]
    fn parses_known_date_formats() {
        let expected = Utc.with_ymd_and_hms(2026, 1, 11, 12, 34, 56).unwrap();
        assert_eq!(parse_pub_date("2026-01-11T12:34:56Z"), Some(expected));
        assert_eq!(parse_pub_date("2026-01-11 12:34:56"), Some(expected));
        assert_eq!(parse_pub_date("Sun, 11 Jan 2026 12:34:56 +0000"), Some(expected));
        assert_eq!(parse_pub_date("yesterday"), None);
    }

    fn dated(title: &str, day: Option<u32>) -> Article {
        Article {
            title: title.into(),
            link: String::new(),
            description: String::new(),
            pub_date: day.map(|d| Utc.with_ymd_and_hms(2026, 1, d, 0, 0, 0).unwrap()),
            author: UNKNOWN_AUTHOR.into(),
            thumbnail: String::new(),
            categories: Vec::new(),
            source: String::new(),
        }
    }

    #[test]
    fn sort_is_descending_and_stable() {
        let mut articles = vec![
            dated("undated", None),
            dated("old", Some(1)),
            dated("tie-a", Some(5)),
            dated("new", Some(9)),
            dated("tie-b", Some(5)),
        ];

        sort_articles_by_date(&mut articles);

        let titles: Vec<_> = articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["new", "tie-a", "tie-b", "old", "undated"]);
        assert!(articles
            .windows(2)
            .filter_map(|w| Some((w[0].pub_date?, w[1].pub_date?)))
            .all(|(a, b)| a >= b));
    }
}
