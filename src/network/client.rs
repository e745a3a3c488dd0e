//! HTTP client for feed search requests

use super::transport::{FeedRequest, FeedResponse, Transport};
use crate::config::OutgoingSettings;
use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Accept header for feed requests
const ACCEPT_FEED: &str = "application/rss+xml,application/xml;q=0.9,text/xml;q=0.8,*/*;q=0.5";

/// `reqwest`-backed [`Transport`]
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    user_agent: String,
    extra_headers: HashMap<String, String>,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, TransportError> {
        Self::with_settings(&OutgoingSettings::default())
    }

    /// Create a new HTTP client with custom settings
    pub fn with_settings(settings: &OutgoingSettings) -> Result<Self, TransportError> {
        let user_agent = settings
            .user_agent
            .clone()
            .unwrap_or_else(default_user_agent);

        let mut builder = Client::builder()
            .pool_max_idle_per_host(settings.pool_maxsize)
            .user_agent(user_agent.clone())
            .gzip(true)
            .brotli(true);

        // No timeout unless configured
        if let Some(seconds) = settings.request_timeout {
            let timeout = Duration::try_from_secs_f64(seconds)
                .map_err(|_| TransportError::InvalidTimeout(seconds))?;
            builder = builder.timeout(timeout);
        }

        // SSL verification
        if !settings.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }

        // Proxy settings
        if let Some(ref proxy_url) = settings.proxies.all {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        } else {
            if let Some(ref http) = settings.proxies.http {
                builder = builder.proxy(reqwest::Proxy::http(http)?);
            }
            if let Some(ref https) = settings.proxies.https {
                builder = builder.proxy(reqwest::Proxy::https(https)?);
            }
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            user_agent,
            extra_headers: settings.extra_headers.clone(),
        })
    }

    /// Get current user agent
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Read status and body; headers are not retained
    async fn parse_response(response: Response) -> Result<FeedResponse, TransportError> {
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(FeedResponse { status, body })
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn execute(&self, request: &FeedRequest) -> Result<FeedResponse, TransportError> {
        let mut req_builder = self
            .client
            .get(request.url.as_str())
            .header("Accept", ACCEPT_FEED);

        for (key, value) in &self.extra_headers {
            req_builder = req_builder.header(key, value);
        }

        debug!(subject = %request.subject, url = %request.url, "Sending search request");

        let response = req_builder.send().await?;

        Self::parse_response(response).await
    }
}

fn default_user_agent() -> String {
    format!("feedsift/{}", crate::VERSION)
}
