use serde_json::{json, Map, Value};

use crate::models::Article;

/// schema.org `ItemList` describing `articles`, positions starting at 1.
pub fn article_item_list(articles: &[Article]) -> Value {
    let items: Vec<Value> = articles
        .iter()
        .enumerate()
        .map(|(index, article)| {
            json!({
                "@type": "ListItem",
                "position": index + 1,
                "item": article_schema(article),
            })
        })
        .collect();

    json!({
        "@context": "https://schema.org",
        "@type": "ItemList",
        "numberOfItems": items.len(),
        "itemListElement": items,
    })
}

pub fn article_schema(article: &Article) -> Value {
    let mut schema = Map::new();
    schema.insert("@type".into(), json!("Article"));
    schema.insert("headline".into(), json!(article.title));

    if !article.description.is_empty() {
        schema.insert("description".into(), json!(article.description));
    }
    if !article.link.is_empty() {
        schema.insert("url".into(), json!(article.link));
    }
    if let Some(date) = article.pub_date {
        schema.insert("datePublished".into(), json!(date.to_rfc3339()));
    }
    if article.has_known_author() {
        schema.insert(
            "author".into(),
            json!({ "@type": "Person", "name": article.author }),
        );
    }
    if article.has_thumbnail() {
        schema.insert("image".into(), json!(article.thumbnail));
    }
    if !article.source.is_empty() {
        schema.insert(
            "publisher".into(),
            json!({ "@type": "Organization", "name": article.source }),
        );
    }
    if !article.categories.is_empty() {
        schema.insert("keywords".into(), json!(article.categories.join(", ")));
    }

    Value::Object(schema)
}
