//! Feed body parsing

use super::item::{fields, Item};
use crate::error::ParseError;

/// Turns a response body into an ordered sequence of items
///
/// Implementations must preserve document order; the engine appends items
/// exactly as returned.
pub trait FeedParser: Send + Sync {
    fn parse(&self, body: &str) -> Result<Vec<Item>, ParseError>;
}

/// RSS 2.0 parser backed by the `rss` crate
///
/// Standard item elements map to the names in [`fields`]. Namespaced
/// extension elements (ezRSS publishes `torrent:*`) are exposed as
/// `prefix:name` using the first value found.
#[derive(Debug, Clone, Copy, Default)]
pub struct RssParser;

impl RssParser {
    pub fn new() -> Self {
        Self
    }

    fn convert(item: &rss::Item) -> Item {
        let mut out = Item::new();

        let standard = [
            (fields::TITLE, item.title()),
            (fields::LINK, item.link()),
            (fields::DESCRIPTION, item.description()),
            (fields::AUTHOR, item.author()),
            (fields::COMMENTS, item.comments()),
            (fields::PUB_DATE, item.pub_date()),
            (fields::GUID, item.guid().map(|g| g.value())),
            (fields::ENCLOSURE, item.enclosure().map(|e| e.url())),
        ];
        for (name, value) in standard {
            if let Some(value) = value {
                out = out.with_field(name, value.trim());
            }
        }

        if !item.categories().is_empty() {
            let categories: Vec<&str> = item.categories().iter().map(|c| c.name()).collect();
            out = out.with_field(fields::CATEGORY, categories.join(", "));
        }

        for (prefix, elements) in item.extensions() {
            for (name, values) in elements {
                if let Some(value) = values.iter().find_map(|ext| ext.value()) {
                    out = out.with_field(format!("{}:{}", prefix, name), value.trim());
                }
            }
        }

        out
    }
}

impl FeedParser for RssParser {
    fn parse(&self, body: &str) -> Result<Vec<Item>, ParseError> {
        let channel = rss::Channel::read_from(body.as_bytes())
            .map_err(|e| ParseError::Malformed(e.to_string()))?;

        Ok(channel.items().iter().map(Self::convert).collect())
    }
}
