//! Search options, subjects and request templating

use crate::network::FeedRequest;
use serde::{Deserialize, Serialize};
use url::Url;

/// Construction options for a [`Search`](super::Search)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Use https instead of http
    pub secure: bool,
    /// Ask the service for exact show-name matches
    pub exact: bool,
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set secure transport
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Set exact matching
    pub fn with_exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    fn scheme(&self) -> &'static str {
        if self.secure {
            "https"
        } else {
            "http"
        }
    }

    /// Build the search URL for one subject
    ///
    /// `endpoint` is host and path without a scheme. The date, quality and
    /// release group parameters are always sent empty.
    pub fn search_url(&self, endpoint: &str, subject: &str) -> Result<Url, url::ParseError> {
        let mut params = vec![
            ("show_name", subject),
            ("date", ""),
            ("quality", ""),
            ("release_group", ""),
            ("mode", "rss"),
        ];
        if self.exact {
            params.push(("show_name_exact", "true"));
        }

        let base = format!("{}://{}", self.scheme(), endpoint.trim_start_matches('/'));
        Url::parse_with_params(&base, params)
    }

    /// Build the request for one subject
    pub fn request_for(&self, endpoint: &str, subject: &str) -> Result<FeedRequest, url::ParseError> {
        Ok(FeedRequest::new(subject, self.search_url(endpoint, subject)?))
    }
}

/// One or many subject names
///
/// Duplicates are kept: every entry produces its own request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Subjects(Vec<String>);

impl Subjects {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for Subjects {
    fn from(subject: &str) -> Self {
        Self(vec![subject.to_string()])
    }
}

impl From<String> for Subjects {
    fn from(subject: String) -> Self {
        Self(vec![subject])
    }
}

impl From<Vec<String>> for Subjects {
    fn from(subjects: Vec<String>) -> Self {
        Self(subjects)
    }
}

impl From<Vec<&str>> for Subjects {
    fn from(subjects: Vec<&str>) -> Self {
        Self(subjects.into_iter().map(String::from).collect())
    }
}

impl From<&[&str]> for Subjects {
    fn from(subjects: &[&str]) -> Self {
        Self(subjects.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Subjects {
    fn from(subjects: [&str; N]) -> Self {
        Self(subjects.iter().map(|s| s.to_string()).collect())
    }
}

/// Whether the fetch barrier has completed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchState {
    #[default]
    Pending,
    Fetched,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query_pairs(url: &Url) -> Vec<(String, String)> {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn test_default_url() {
        let url = SearchOptions::default()
            .search_url("ezrss.it/search/index.php", "Foo")
            .unwrap();

        assert_eq!(url.scheme(), "http");
        assert_eq!(url.host_str(), Some("ezrss.it"));
        assert_eq!(url.path(), "/search/index.php");
        assert_eq!(
            query_pairs(&url),
            vec![
                ("show_name".to_string(), "Foo".to_string()),
                ("date".to_string(), String::new()),
                ("quality".to_string(), String::new()),
                ("release_group".to_string(), String::new()),
                ("mode".to_string(), "rss".to_string()),
            ]
        );
    }

    #[test]
    fn test_secure_and_exact() {
        let options = SearchOptions::new().with_secure(true).with_exact(true);
        let url = options.search_url("ezrss.it/search/index.php", "Foo").unwrap();

        assert_eq!(url.scheme(), "https");
        assert!(query_pairs(&url).contains(&("show_name_exact".to_string(), "true".to_string())));
    }

    #[test]
    fn test_subject_is_encoded() {
        let url = SearchOptions::default()
            .search_url("ezrss.it/search/index.php", "Law & Order")
            .unwrap();

        assert!(!url.as_str().contains("Law & Order"));
        assert_eq!(query_pairs(&url)[0].1, "Law & Order");
    }

    #[test]
    fn test_invalid_endpoint() {
        let result = SearchOptions::default().search_url("", "Foo");
        assert!(result.is_err());
    }

    #[test]
    fn test_subjects_one_or_many() {
        assert_eq!(Subjects::from("Foo").as_slice(), &["Foo".to_string()]);
        assert_eq!(Subjects::from(["Foo", "Bar", "Foo"]).len(), 3);
        assert!(Subjects::from(Vec::<String>::new()).is_empty());
    }
}
