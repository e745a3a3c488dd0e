//! Scripted transport for engine tests

use super::transport::{FeedRequest, FeedResponse, Transport};
use crate::error::TransportError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

enum Reply {
    Respond(FeedResponse),
    Fail(String),
}

struct Script {
    reply: Reply,
    delay: Duration,
}

/// Answers requests by subject, recording every call
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    scripts: HashMap<String, Script>,
    requests: Mutex<Vec<FeedRequest>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, subject: &str, status: u16, body: &str) -> Self {
        self.scripts.insert(
            subject.to_string(),
            Script {
                reply: Reply::Respond(FeedResponse::new(status, body)),
                delay: Duration::ZERO,
            },
        );
        self
    }

    pub fn fail(mut self, subject: &str, message: &str) -> Self {
        self.scripts.insert(
            subject.to_string(),
            Script {
                reply: Reply::Fail(message.to_string()),
                delay: Duration::ZERO,
            },
        );
        self
    }

    /// Delay the reply for an already scripted subject
    pub fn delay(mut self, subject: &str, delay: Duration) -> Self {
        if let Some(script) = self.scripts.get_mut(subject) {
            script.delay = delay;
        }
        self
    }

    /// Number of requests executed so far
    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<FeedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Highest number of requests observed in flight at once
    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: &FeedRequest) -> Result<FeedResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let script = self.scripts.get(&request.subject);
        let delay = script.map(|s| s.delay).unwrap_or(Duration::ZERO);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        } else {
            tokio::task::yield_now().await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match script.map(|s| &s.reply) {
            Some(Reply::Respond(response)) => Ok(response.clone()),
            Some(Reply::Fail(message)) => Err(TransportError::Other(message.clone())),
            None => Ok(FeedResponse::new(404, "Not Found")),
        }
    }
}

/// Build an RSS body whose items carry the given titles
pub(crate) fn rss_with_titles(titles: &[&str]) -> String {
    let items: String = titles
        .iter()
        .map(|t| {
            format!(
                "<item><title>{}</title><link>http://example.com/{}</link></item>",
                t, t
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0"?><rss version="2.0"><channel><title>results</title>{}</channel></rss>"#,
        items
    )
}
