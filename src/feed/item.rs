//! Feed item record

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field names produced by [`RssParser`](super::RssParser)
pub mod fields {
    pub const TITLE: &str = "title";
    pub const LINK: &str = "link";
    pub const DESCRIPTION: &str = "description";
    pub const GUID: &str = "guid";
    pub const PUB_DATE: &str = "pubDate";
    pub const AUTHOR: &str = "author";
    pub const COMMENTS: &str = "comments";
    pub const CATEGORY: &str = "category";
    pub const ENCLOSURE: &str = "enclosure";
}

/// A single parsed feed entry
///
/// Fields are plain strings keyed by name. Items are read-only once built;
/// filtering only ever keeps or drops whole items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Item {
    fields: BTreeMap<String, String>,
}

impl Item {
    /// Create an item with no fields
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Get a field value by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Whether the field is present
    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn title(&self) -> Option<&str> {
        self.get(fields::TITLE)
    }

    pub fn link(&self) -> Option<&str> {
        self.get(fields::LINK)
    }

    /// Raw publish date as found in the feed
    pub fn pub_date(&self) -> Option<&str> {
        self.get(fields::PUB_DATE)
    }

    /// Publish date parsed as RFC 2822; `None` if absent or unparseable
    pub fn published(&self) -> Option<DateTime<FixedOffset>> {
        self.pub_date()
            .and_then(|d| DateTime::parse_from_rfc2822(d.trim()).ok())
    }

    /// Iterate over `(name, value)` pairs in name order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Item
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_field_access() {
        let item = Item::new()
            .with_field(fields::TITLE, "Show S01E01")
            .with_field(fields::LINK, "http://example.com/1.torrent");

        assert_eq!(item.title(), Some("Show S01E01"));
        assert_eq!(item.link(), Some("http://example.com/1.torrent"));
        assert_eq!(item.get("missing"), None);
        assert!(item.has(fields::TITLE));
        assert_eq!(item.len(), 2);
    }

    #[test]
    fn test_published_parses_rfc2822() {
        let item = Item::new().with_field(fields::PUB_DATE, "Mon, 01 Nov 2010 20:15:00 -0400");
        let published = item.published().unwrap();
        assert_eq!(published.year(), 2010);
        assert_eq!(published.month(), 11);

        let bad = Item::new().with_field(fields::PUB_DATE, "yesterday");
        assert!(bad.published().is_none());
    }

    #[test]
    fn test_serializes_as_flat_object() {
        let item: Item = [("title", "A"), ("link", "B")].into_iter().collect();
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(json, r#"{"link":"B","title":"A"}"#);
    }
}
