//! feedsift: concurrent RSS search with composable result filtering
//!
//! A [`Search`] issues one request per subject against a feed search service,
//! at most [`DEFAULT_MAX_CONCURRENCY`] at a time by default, and collects the
//! parsed items. A [`ResultSet`] wraps a search, fetches lazily on first read
//! and narrows the items with filters registered through [`Where`].
//!
//! ```no_run
//! use feedsift::{Search, SearchOptions, Where};
//! use regex::Regex;
//!
//! let mut results = Search::new(["Foo", "Bar"], SearchOptions::default()).into_result_set();
//! results.pick(Where::new().field("title", Regex::new("S02").unwrap()));
//!
//! for item in results.iter()? {
//!     println!("{}", item.title().unwrap_or_default());
//! }
//! for (subject, body) in results.errors() {
//!     eprintln!("{}: {}", subject, body);
//! }
//! # Ok::<(), feedsift::SearchError>(())
//! ```

pub mod config;
pub mod error;
pub mod feed;
pub mod network;
pub mod results;
pub mod search;

pub use config::Settings;
pub use error::SearchError;
pub use feed::Item;
pub use results::{FilterMode, Predicate, ResultSet, Where};
pub use search::{Search, SearchOptions, Subjects};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Search service endpoint, without scheme
pub const DEFAULT_ENDPOINT: &str = "ezrss.it/search/index.php";

/// Maximum number of requests in flight per fetch
pub const DEFAULT_MAX_CONCURRENCY: usize = 20;

/// Search for `subjects` and return every item found
///
/// Blocks until all requests have completed. Per-subject failures are
/// dropped; use [`Search::into_result_set`] to inspect them.
pub fn search(
    subjects: impl Into<Subjects>,
    options: SearchOptions,
) -> Result<Vec<Item>, SearchError> {
    Search::new(subjects, options).into_result_set().into_items()
}
