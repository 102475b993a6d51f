//! RSS feed generation.
//!
//! The feed is built from exactly the query the page builder uses for the
//! feed area, so feed items and blog pages always agree on membership and
//! order.

use rss::{ChannelBuilder, GuidBuilder, Item, ItemBuilder, validation::Validate};
use tracing::warn;

use super::document::ContentDocument;
use super::index::ContentIndex;
use super::markdown::{FEED_EXCERPT_LENGTH, MarkdownError, excerpt, render_markdown};
use super::pages::area_query;
use crate::config::RootConfig;

#[derive(thiserror::Error, Debug)]
pub enum FeedError {
    #[error("failed to render feed item {slug}: {source}")]
    Markdown {
        slug: String,
        source: MarkdownError,
    },

    #[error("rss validation failed: {0}")]
    Validation(String),
}

/// Build the RSS document for the configured feed area.
///
/// Returns `None` when the feed is disabled or the site has no absolute URL
/// to build item links from.
pub fn build_feed(config: &RootConfig, index: &ContentIndex) -> Result<Option<String>, FeedError> {
    if !config.feed.enabled {
        return Ok(None);
    }
    let Some(site_url) = config.site.url.as_deref() else {
        warn!("site.url is not set, skipping the RSS feed");
        return Ok(None);
    };
    let Some(area) = config.area(&config.feed.area) else {
        warn!(
            area = %config.feed.area,
            "feed area is not in the area table, skipping the RSS feed"
        );
        return Ok(None);
    };

    let mut items = Vec::new();
    for doc in index.query(&area_query(area)) {
        if doc.front_matter.date.is_none() {
            warn!(slug = %doc.slug, "feed item has no date, leaving it out of the feed");
            continue;
        }
        items.push(doc_to_item(doc, site_url, config)?);
    }

    let pub_date = items.first().and_then(|item| item.pub_date.clone());

    let channel = ChannelBuilder::default()
        .title(config.feed.title.as_deref().unwrap_or(&config.site.title))
        .link(site_url)
        .description(&config.site.description)
        .generator("areagen".to_string())
        .managing_editor(config.site.author.clone())
        .pub_date(pub_date)
        .items(items)
        .build();

    channel
        .validate()
        .map_err(|e| FeedError::Validation(e.to_string()))?;
    Ok(Some(channel.to_string()))
}

/// Join the site URL and a route.
pub fn absolute_url(site_url: &str, route: &str) -> String {
    format!("{}{}", site_url.trim_end_matches('/'), route)
}

fn doc_to_item(
    doc: &ContentDocument,
    site_url: &str,
    config: &RootConfig,
) -> Result<Item, FeedError> {
    let fm = &doc.front_matter;
    let link = absolute_url(site_url, doc.slug.as_str());
    let content = render_markdown(&doc.body, &config.markdown).map_err(|e| FeedError::Markdown {
        slug: doc.slug.to_string(),
        source: e,
    })?;
    let description = fm
        .description
        .clone()
        .unwrap_or_else(|| excerpt(&doc.body, FEED_EXCERPT_LENGTH));
    let author = fm
        .author
        .clone()
        .unwrap_or_else(|| config.site.default_author.clone());

    Ok(ItemBuilder::default()
        .title(Some(doc.title()))
        .link(Some(link.clone()))
        .guid(GuidBuilder::default().permalink(true).value(link).build())
        .description(Some(description))
        .pub_date(fm.date.map(|d| d.to_rfc2822()))
        .author(Some(author))
        .content(Some(content))
        .build())
}
