//! Scoped filters over feed items

use crate::feed::Item;
use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// Which subjects a filter applies to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Scope {
    /// Every subject present when the filter is applied
    #[default]
    All,
    /// Exactly one subject
    Subject(String),
}

impl Scope {
    pub fn applies_to(&self, subject: &str) -> bool {
        match self {
            Self::All => true,
            Self::Subject(name) => name == subject,
        }
    }
}

/// The value side of a field filter
///
/// Strings compare by equality, regular expressions by pattern match.
#[derive(Debug, Clone)]
pub enum FieldValue {
    Exact(String),
    Pattern(Regex),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Exact(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Exact(value)
    }
}

impl From<Regex> for FieldValue {
    fn from(pattern: Regex) -> Self {
        Self::Pattern(pattern)
    }
}

impl From<&Regex> for FieldValue {
    fn from(pattern: &Regex) -> Self {
        Self::Pattern(pattern.clone())
    }
}

type CustomFn = dyn Fn(&Item) -> bool + Send + Sync;

/// A boolean test over one item, resolved when the filter is registered
#[derive(Clone)]
pub enum Predicate {
    /// Field equals the value exactly
    Equals { field: String, value: String },
    /// Field matches the pattern
    Matches { field: String, pattern: Regex },
    /// Caller-supplied test
    Custom(Arc<CustomFn>),
}

impl Predicate {
    /// Expand a field/value pair
    pub fn field(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        let field = field.into();
        match value.into() {
            FieldValue::Exact(value) => Self::Equals { field, value },
            FieldValue::Pattern(pattern) => Self::Matches { field, pattern },
        }
    }

    pub fn custom<F>(test: F) -> Self
    where
        F: Fn(&Item) -> bool + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(test))
    }

    /// Evaluate against an item; a missing field never matches
    pub fn test(&self, item: &Item) -> bool {
        match self {
            Self::Equals { field, value } => item.get(field) == Some(value.as_str()),
            Self::Matches { field, pattern } => {
                item.get(field).map_or(false, |v| pattern.is_match(v))
            }
            Self::Custom(test) => test(item),
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equals { field, value } => f
                .debug_struct("Equals")
                .field("field", field)
                .field("value", value)
                .finish(),
            Self::Matches { field, pattern } => f
                .debug_struct("Matches")
                .field("field", field)
                .field("pattern", &pattern.as_str())
                .finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A predicate bound to a scope
#[derive(Debug, Clone)]
pub struct Filter {
    pub scope: Scope,
    pub predicate: Predicate,
}

impl Filter {
    pub fn new(scope: Scope, predicate: Predicate) -> Self {
        Self { scope, predicate }
    }
}

/// Builder for one filter registration
///
/// Starts scoped to all subjects. [`scope`](Where::scope) switches the scope
/// for every clause that follows, so one registration can target several
/// subjects:
///
/// ```
/// use feedsift::Where;
/// use regex::Regex;
///
/// let clause = Where::subject("Foo")
///     .field("title", Regex::new("S02").unwrap())
///     .scope("Bar")
///     .test(|item| item.link().is_some());
/// assert_eq!(clause.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Where {
    scope: Scope,
    filters: Vec<Filter>,
}

impl Where {
    /// Start a clause applying to all subjects
    pub fn new() -> Self {
        Self::default()
    }

    /// Alias for [`Where::new`]
    pub fn all() -> Self {
        Self::new()
    }

    /// Start a clause scoped to one subject
    pub fn subject(name: impl Into<String>) -> Self {
        Self::new().scope(name)
    }

    /// Scope every following clause to `name`
    pub fn scope(mut self, name: impl Into<String>) -> Self {
        self.scope = Scope::Subject(name.into());
        self
    }

    /// Add a field/value filter with the current scope
    pub fn field(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.push(Predicate::field(field, value));
        self
    }

    /// Add one filter per field/value pair, in iteration order
    pub fn fields<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        for (field, value) in pairs {
            self.push(Predicate::field(field, value));
        }
        self
    }

    /// Add a custom predicate with the current scope
    pub fn test<F>(mut self, test: F) -> Self
    where
        F: Fn(&Item) -> bool + Send + Sync + 'static,
    {
        self.push(Predicate::custom(test));
        self
    }

    /// Add an already built predicate with the current scope
    pub fn predicate(mut self, predicate: Predicate) -> Self {
        self.push(predicate);
        self
    }

    fn push(&mut self, predicate: Predicate) {
        self.filters.push(Filter::new(self.scope.clone(), predicate));
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn into_filters(self) -> Vec<Filter> {
        self.filters
    }
}

impl From<Predicate> for Where {
    fn from(predicate: Predicate) -> Self {
        Self::new().predicate(predicate)
    }
}

impl From<Filter> for Where {
    fn from(filter: Filter) -> Self {
        Self {
            scope: filter.scope.clone(),
            filters: vec![filter],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::fields;

    fn item(title: &str) -> Item {
        Item::new().with_field(fields::TITLE, title)
    }

    #[test]
    fn test_string_value_is_equality() {
        let predicate = Predicate::field("title", "S02E05");
        assert!(matches!(predicate, Predicate::Equals { .. }));
        assert!(predicate.test(&item("S02E05")));
        assert!(!predicate.test(&item("Foo S02E05")));
    }

    #[test]
    fn test_regex_value_is_pattern() {
        let predicate = Predicate::field("title", Regex::new("S02").unwrap());
        assert!(matches!(predicate, Predicate::Matches { .. }));
        assert!(predicate.test(&item("Foo S02E05")));
        assert!(!predicate.test(&item("Foo S03E02")));
    }

    #[test]
    fn test_missing_field_never_matches() {
        let empty = Item::new();
        assert!(!Predicate::field("title", "").test(&empty));
        assert!(!Predicate::field("title", Regex::new(".*").unwrap()).test(&empty));
    }

    #[test]
    fn test_custom_predicate() {
        let predicate = Predicate::custom(|i| i.title().map_or(false, |t| t.len() > 3));
        assert!(predicate.test(&item("long title")));
        assert!(!predicate.test(&item("abc")));
        assert_eq!(format!("{:?}", predicate), "Custom(..)");
    }

    #[test]
    fn test_where_defaults_to_all_subjects() {
        let filters = Where::new().field("title", "x").into_filters();
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].scope, Scope::All);
    }

    #[test]
    fn test_where_scope_switches_midway() {
        let filters = Where::new()
            .field("title", "a")
            .scope("Foo")
            .fields([("title", "b"), ("link", "c")])
            .scope("Bar")
            .test(|_| true)
            .into_filters();

        let scopes: Vec<_> = filters.iter().map(|f| f.scope.clone()).collect();
        assert_eq!(
            scopes,
            vec![
                Scope::All,
                Scope::Subject("Foo".to_string()),
                Scope::Subject("Foo".to_string()),
                Scope::Subject("Bar".to_string()),
            ]
        );
    }

    #[test]
    fn test_scope_applies_to() {
        assert!(Scope::All.applies_to("anything"));
        assert!(Scope::Subject("Foo".into()).applies_to("Foo"));
        assert!(!Scope::Subject("Foo".into()).applies_to("foo"));
    }
}
