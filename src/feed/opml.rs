use opml::{Outline, OPML};
use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::FeedSubscription;

/// Reads every feed of an OPML subscription list, folders included.
pub fn parse_opml_file(path: &Path) -> Result<Vec<FeedSubscription>> {
    let content = std::fs::read_to_string(path)?;
    parse_opml(&content)
}

pub fn parse_opml(content: &str) -> Result<Vec<FeedSubscription>> {
    let opml = OPML::from_str(content).map_err(|e| AppError::OpmlParse(e.to_string()))?;

    let mut feeds = Vec::new();
    collect_feeds(&opml.body.outlines, &mut feeds);

    Ok(feeds)
}

fn collect_feeds(outlines: &[Outline], feeds: &mut Vec<FeedSubscription>) {
    for outline in outlines {
        if let Some(xml_url) = outline.xml_url.as_deref().map(str::trim) {
            if !xml_url.is_empty() {
                feeds.push(FeedSubscription {
                    title: outline.text.clone(),
                    url: xml_url.to_string(),
                });
            }
        }

        // Folders nest further outlines
        if !outline.outlines.is_empty() {
            collect_feeds(&outline.outlines, feeds);
        }
    }
}
