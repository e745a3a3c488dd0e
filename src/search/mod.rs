//! Search orchestration module
//!
//! Builds one request per subject, runs them concurrently against the feed
//! service and hands the parsed items to a result set.

mod executor;
mod models;

pub use executor::Search;
pub use models::*;
