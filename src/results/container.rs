//! Lazily loaded, filterable result set

use super::filter::{Filter, Where};
use super::types::{FilterMode, RawStorage};
use crate::error::SearchError;
use crate::feed::Item;
use crate::search::Search;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use tracing::debug;

static NO_ERRORS: Lazy<HashMap<String, String>> = Lazy::new(HashMap::new);

/// Items found for a search, with the filters registered on them
///
/// Nothing is fetched until the items are first read. Filters can be added at
/// any time; each registration drops the cached view, which is rebuilt on the
/// next read by applying every filter in registration order.
///
/// Under [`FilterMode::Prune`] applying filters discards the non-matching
/// items from [`results`](ResultSet::results) permanently.
#[derive(Debug, Default)]
pub struct ResultSet {
    source: Option<Search>,
    results: RawStorage,
    filters: Vec<Filter>,
    view: Option<Vec<Item>>,
    mode: FilterMode,
}

impl ResultSet {
    /// Create a set with no source attached
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached set with the given filter mode
    pub fn with_mode(mode: FilterMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Create a set that loads from `source` on first read
    pub fn with_source(source: Search) -> Self {
        Self {
            mode: source.filter_mode(),
            source: Some(source),
            ..Self::default()
        }
    }

    /// Append items for a subject, creating its sequence if absent
    pub fn append<I>(&mut self, subject: impl Into<String>, items: I) -> &mut Self
    where
        I: IntoIterator<Item = Item>,
    {
        self.results.append(subject, items);
        self
    }

    /// Register filters
    ///
    /// Accepts a [`Where`] clause, or anything convertible into one such as a
    /// [`Predicate`](super::Predicate).
    pub fn pick(&mut self, clause: impl Into<Where>) -> &mut Self {
        self.view = None;
        self.filters.extend(clause.into().into_filters());
        self
    }

    /// Alias for [`pick`](ResultSet::pick)
    pub fn filter(&mut self, clause: impl Into<Where>) -> &mut Self {
        self.pick(clause)
    }

    /// Registered filters in evaluation order
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// All items after filtering, fetching first if needed
    ///
    /// A set with no source attached yields nothing.
    pub fn all(&mut self) -> Result<&[Item], SearchError> {
        if self.source.is_none() {
            return Ok(&[]);
        }
        self.load()
    }

    /// Iterate over the filtered items
    ///
    /// Reading may fetch, so this returns a `Result`. Once a read has
    /// succeeded, `&ResultSet` iterates the same view without it.
    pub fn iter(&mut self) -> Result<std::slice::Iter<'_, Item>, SearchError> {
        Ok(self.all()?.iter())
    }

    /// Number of filtered items
    pub fn len(&mut self) -> Result<usize, SearchError> {
        Ok(self.all()?.len())
    }

    pub fn is_empty(&mut self) -> Result<bool, SearchError> {
        Ok(self.all()?.is_empty())
    }

    /// Owned copy of the filtered items
    pub fn to_vec(&mut self) -> Result<Vec<Item>, SearchError> {
        Ok(self.all()?.to_vec())
    }

    /// Consume the set, returning the filtered items
    pub fn into_items(mut self) -> Result<Vec<Item>, SearchError> {
        self.all()?;
        Ok(self.view.take().unwrap_or_default())
    }

    /// Per-subject failures recorded by the source
    pub fn errors(&self) -> &HashMap<String, String> {
        match &self.source {
            Some(source) => source.errors(),
            None => &*NO_ERRORS,
        }
    }

    /// Stored items per subject
    pub fn results(&self) -> &RawStorage {
        &self.results
    }

    pub fn source(&self) -> Option<&Search> {
        self.source.as_ref()
    }

    /// Mutable access to the source, e.g. to adjust concurrency before reading
    pub fn source_mut(&mut self) -> Option<&mut Search> {
        self.source.as_mut()
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    /// Fetch if the source has not been fetched, then return the cached view
    fn load(&mut self) -> Result<&[Item], SearchError> {
        if let Some(mut source) = self.source.take() {
            let fetched = if source.is_fetched() {
                Ok(())
            } else {
                source.fetch(self).map(|_| ())
            };
            self.source = Some(source);
            fetched?;
        }

        if self.view.is_none() {
            let view = self.apply_filters();
            self.view = Some(view);
        }

        Ok(self.view.as_deref().unwrap_or(&[]))
    }

    fn apply_filters(&mut self) -> Vec<Item> {
        debug!(
            filters = self.filters.len(),
            subjects = self.results.len(),
            mode = ?self.mode,
            "Applying filters"
        );

        match self.mode {
            FilterMode::Prune => {
                prune(&mut self.results, &self.filters);
                self.results.flatten()
            }
            FilterMode::Preserve => {
                let mut working = self.results.clone();
                prune(&mut working, &self.filters);
                working.flatten()
            }
        }
    }
}

/// Iterates the view computed by the last read
///
/// Yields nothing before the first read, or after a filter registration
/// until the set is read again.
impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.view.as_deref().unwrap_or(&[]).iter()
    }
}

/// Keep only the items each filter accepts, in filter order
///
/// Unscoped filters visit subjects in sorted order; a scoped filter naming an
/// absent subject does nothing.
fn prune(storage: &mut RawStorage, filters: &[Filter]) {
    for filter in filters {
        let mut targets: Vec<String> = storage
            .subjects()
            .filter(|subject| filter.scope.applies_to(subject))
            .map(String::from)
            .collect();
        targets.sort();
        targets.dedup();

        for name in targets {
            if let Some(items) = storage.get_mut(&name) {
                items.retain(|item| filter.predicate.test(item));
            }
        }
    }
}
