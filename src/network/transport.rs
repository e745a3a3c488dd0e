//! Transport seam between the search engine and the network

use crate::error::TransportError;
use async_trait::async_trait;
use url::Url;

/// One outbound search request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRequest {
    /// Subject the request searches for; completions are routed by it
    pub subject: String,
    /// Fully templated search URL
    pub url: Url,
}

impl FeedRequest {
    pub fn new(subject: impl Into<String>, url: Url) -> Self {
        Self {
            subject: subject.into(),
            url,
        }
    }
}

/// Response to a [`FeedRequest`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl FeedResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Success is strictly HTTP 200; any other status is a per-subject failure
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Executes search requests
///
/// The engine bounds concurrency itself; implementations only need to be
/// safe to call from many tasks at once. Connection-level concerns
/// (timeouts, pooling, proxies) belong to the implementation.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &FeedRequest) -> Result<FeedResponse, TransportError>;
}
