//! Settings structures for feedsift configuration

use crate::results::FilterMode;
use crate::search::SearchOptions;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Main settings structure, loaded from `settings.yml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub search: SearchSettings,
    pub outgoing: OutgoingSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse settings from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(content)?;
        Ok(settings)
    }

    /// Merge with environment variables (FEEDSIFT_* prefix)
    pub fn merge_env(&mut self) {
        self.merge_vars(std::env::vars());
    }

    /// Merge `FEEDSIFT_*` overrides from an arbitrary variable source
    ///
    /// Values that fail to parse are ignored.
    pub fn merge_vars<I, K, V>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, val) in vars {
            let val = val.as_ref();
            match key.as_ref() {
                "FEEDSIFT_ENDPOINT" => self.search.endpoint = val.to_string(),
                "FEEDSIFT_SECURE" => {
                    if let Ok(secure) = val.parse() {
                        self.search.secure = secure;
                    }
                }
                "FEEDSIFT_EXACT" => {
                    if let Ok(exact) = val.parse() {
                        self.search.exact = exact;
                    }
                }
                "FEEDSIFT_MAX_CONCURRENCY" => {
                    if let Ok(n) = val.parse() {
                        self.search.max_concurrency = n;
                    }
                }
                "FEEDSIFT_REQUEST_TIMEOUT" => {
                    if let Ok(seconds) = val.parse() {
                        self.outgoing.request_timeout = Some(seconds);
                    }
                }
                "FEEDSIFT_USER_AGENT" => self.outgoing.user_agent = Some(val.to_string()),
                _ => {}
            }
        }
    }

    /// Construction options derived from the search section
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            secure: self.search.secure,
            exact: self.search.exact,
        }
    }
}

/// Search behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Search endpoint without scheme; the scheme follows `secure`
    pub endpoint: String,
    /// Use https
    pub secure: bool,
    /// Ask the service for exact show-name matches
    pub exact: bool,
    /// Maximum number of requests in flight
    pub max_concurrency: usize,
    /// How filters treat the fetched items
    pub filter_mode: FilterMode,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            endpoint: crate::DEFAULT_ENDPOINT.to_string(),
            secure: false,
            exact: false,
            max_concurrency: crate::DEFAULT_MAX_CONCURRENCY,
            filter_mode: FilterMode::default(),
        }
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Request timeout in seconds (none = no timeout)
    pub request_timeout: Option<f64>,
    /// Idle connections kept per host
    pub pool_maxsize: usize,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// User agent string (none = feedsift/<version>)
    pub user_agent: Option<String>,
    /// Proxy settings
    pub proxies: ProxySettings,
    /// Extra headers to send
    pub extra_headers: HashMap<String, String>,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: None,
            pool_maxsize: crate::DEFAULT_MAX_CONCURRENCY,
            verify_ssl: true,
            user_agent: None,
            proxies: ProxySettings::default(),
            extra_headers: HashMap::new(),
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.search.endpoint, "ezrss.it/search/index.php");
        assert_eq!(settings.search.max_concurrency, 20);
        assert!(!settings.search.secure);
        assert!(!settings.search.exact);
        assert_eq!(settings.search.filter_mode, FilterMode::Prune);
        assert!(settings.outgoing.request_timeout.is_none());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
search:
  secure: true
  max_concurrency: 4
  filter_mode: preserve
outgoing:
  request_timeout: 2.5
"#;
        let settings = Settings::from_yaml(yaml).unwrap();
        assert!(settings.search.secure);
        assert!(!settings.search.exact);
        assert_eq!(settings.search.max_concurrency, 4);
        assert_eq!(settings.search.filter_mode, FilterMode::Preserve);
        assert_eq!(settings.search.endpoint, "ezrss.it/search/index.php");
        assert_eq!(settings.outgoing.request_timeout, Some(2.5));
        assert!(settings.outgoing.verify_ssl);
    }

    #[test]
    fn test_merge_vars() {
        let mut settings = Settings::default();
        settings.merge_vars([
            ("FEEDSIFT_EXACT", "true"),
            ("FEEDSIFT_MAX_CONCURRENCY", "5"),
            ("FEEDSIFT_SECURE", "not-a-bool"),
            ("FEEDSIFT_ENDPOINT", "localhost:8080/search"),
            ("UNRELATED", "x"),
        ]);

        assert!(settings.search.exact);
        assert!(!settings.search.secure);
        assert_eq!(settings.search.max_concurrency, 5);
        assert_eq!(settings.search.endpoint, "localhost:8080/search");
    }

    #[test]
    fn test_search_options() {
        let mut settings = Settings::default();
        settings.search.exact = true;
        let options = settings.search_options();
        assert!(options.exact);
        assert!(!options.secure);
    }
}
