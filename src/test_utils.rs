//! Shared fixtures: a stub feed proxy and article builders.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{TimeZone, Utc};
use serde_json::json;
use tokio::net::TcpListener;

use crate::config::AggregatorConfig;
use crate::models::{Article, UNKNOWN_AUTHOR};

pub const GOOD_FEED: &str = "https://good.example/rss";
pub const SECOND_FEED: &str = "https://second.example/rss";

/// Local stand-in for the feed-to-JSON proxy.
///
/// `GOOD_FEED` answers with three items, `SECOND_FEED` with one, the
/// `garbage` and `proxy-error` hosts with malformed and error bodies, and
/// everything else with HTTP 500.
pub struct StubProxy {
    pub base: String,
    hits: Arc<AtomicUsize>,
}

impl StubProxy {
    pub async fn start() -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/proxy", get(proxy))
            .with_state(hits.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind listener");
        let addr = listener.local_addr().expect("Failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base: format!("http://{}/proxy?rss_url=", addr),
            hits,
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn proxy(
    State(hits): State<Arc<AtomicUsize>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    hits.fetch_add(1, Ordering::SeqCst);

    match params.get("rss_url").map(String::as_str) {
        Some(GOOD_FEED) => Json(good_feed_body()).into_response(),
        Some(SECOND_FEED) => Json(json!({
            "status": "ok",
            "feed": { "title": "Second Feed" },
            "items": [{
                "title": "Second feed post",
                "link": "https://second.example/1",
                "description": "Middle of the pack",
                "pubDate": "2026-03-02 08:00:00"
            }]
        }))
        .into_response(),
        Some("https://garbage.example/rss") => (StatusCode::OK, "<rss>not json</rss>").into_response(),
        Some("https://proxy-error.example/rss") => Json(json!({
            "status": "error",
            "message": "Cannot download this RSS feed"
        }))
        .into_response(),
        _ => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

fn good_feed_body() -> serde_json::Value {
    json!({
        "status": "ok",
        "feed": { "title": "Good Feed" },
        "items": [
            {
                "title": "Oldest post",
                "link": "https://good.example/1",
                "description": "<p>The first one</p>",
                "pubDate": "2026-03-01 09:00:00",
                "author": "Grace",
                "categories": ["history"]
            },
            {
                "title": "Newest <em>post</em>",
                "link": "https://good.example/3",
                "description": "Fresh & shiny",
                "pubDate": "2026-03-03 09:00:00",
                "thumbnail": "https://good.example/3.png"
            },
            {
                "title": "\"Quoted\" <script>alert('x')</script>",
                "link": "https://good.example/2",
                "description": "Middle",
                "pubDate": "2026-03-02 09:00:00",
                "enclosure": { "link": "https://good.example/2.jpg" }
            }
        ]
    })
}

pub fn config_for(proxy: &StubProxy, feeds: &[&str]) -> AggregatorConfig {
    AggregatorConfig {
        proxy_base: proxy.base.clone(),
        feeds: feeds.iter().map(|f| f.to_string()).collect(),
        request_timeout_secs: 5,
        ..Default::default()
    }
}

pub fn article(title: &str, day: u32) -> Article {
    Article {
        title: title.to_string(),
        link: format!("https://example.com/{day}"),
        description: format!("About {title}"),
        pub_date: Some(Utc.with_ymd_and_hms(2026, 1, day, 12, 0, 0).unwrap()),
        author: UNKNOWN_AUTHOR.to_string(),
        thumbnail: String::new(),
        categories: Vec::new(),
        source: "Example Feed".to_string(),
    }
}
