//! HTTP networking module
//!
//! Defines the [`Transport`] seam the search engine dispatches requests
//! through, and the default `reqwest`-backed [`HttpClient`].

mod client;
mod transport;

pub use client::HttpClient;
pub use transport::{FeedRequest, FeedResponse, Transport};

#[cfg(test)]
pub(crate) mod testing;
