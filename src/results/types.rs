//! Result storage types

use crate::feed::Item;
use serde::{Deserialize, Serialize};

/// How registered filters treat the fetched items
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Filters discard non-matching items from the stored results for good
    #[default]
    Prune,
    /// Stored results stay intact; the view is derived from a copy
    Preserve,
}

/// Items per subject, ordered by first-seen subject
///
/// Item order within a subject is the order they were appended in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawStorage {
    entries: Vec<(String, Vec<Item>)>,
}

impl RawStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push items onto the end of a subject's sequence, creating it if absent
    pub fn append<I>(&mut self, subject: impl Into<String>, items: I)
    where
        I: IntoIterator<Item = Item>,
    {
        let subject = subject.into();
        match self.entries.iter_mut().find(|(s, _)| *s == subject) {
            Some((_, existing)) => existing.extend(items),
            None => self.entries.push((subject, items.into_iter().collect())),
        }
    }

    /// Items stored for a subject
    pub fn get(&self, subject: &str) -> Option<&[Item]> {
        self.entries
            .iter()
            .find(|(s, _)| s == subject)
            .map(|(_, items)| items.as_slice())
    }

    pub(crate) fn get_mut(&mut self, subject: &str) -> Option<&mut Vec<Item>> {
        self.entries
            .iter_mut()
            .find(|(s, _)| s == subject)
            .map(|(_, items)| items)
    }

    /// Subjects in first-seen order
    pub fn subjects(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(s, _)| s.as_str())
    }

    /// `(subject, items)` pairs in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Item])> {
        self.entries
            .iter()
            .map(|(s, items)| (s.as_str(), items.as_slice()))
    }

    /// All items concatenated in subject order
    pub fn flatten(&self) -> Vec<Item> {
        self.entries
            .iter()
            .flat_map(|(_, items)| items.iter().cloned())
            .collect()
    }

    /// Number of subjects
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of items across subjects
    pub fn item_count(&self) -> usize {
        self.entries.iter().map(|(_, items)| items.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titled(title: &str) -> Item {
        Item::new().with_field("title", title)
    }

    #[test]
    fn test_append_keeps_first_seen_order() {
        let mut storage = RawStorage::new();
        storage.append("Foo", vec![titled("f1")]);
        storage.append("Bar", vec![titled("b1")]);
        storage.append("Foo", vec![titled("f2")]);

        assert_eq!(storage.subjects().collect::<Vec<_>>(), vec!["Foo", "Bar"]);
        assert_eq!(storage.get("Foo").unwrap().len(), 2);
        assert_eq!(storage.item_count(), 3);

        let titles: Vec<_> = storage
            .flatten()
            .iter()
            .filter_map(|i| i.title().map(String::from))
            .collect();
        assert_eq!(titles, vec!["f1", "f2", "b1"]);
    }

    #[test]
    fn test_append_empty_creates_subject() {
        let mut storage = RawStorage::new();
        storage.append("Foo", Vec::new());
        assert_eq!(storage.len(), 1);
        assert_eq!(storage.get("Foo"), Some(&[][..]));
        assert!(storage.get("Bar").is_none());
    }
}
