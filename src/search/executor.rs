//! Search execution and orchestration

use super::models::{FetchState, SearchOptions, Subjects};
use crate::config::Settings;
use crate::error::SearchError;
use crate::feed::{FeedParser, Item, RssParser};
use crate::network::{FeedRequest, HttpClient, Transport};
use crate::results::{FilterMode, ResultSet};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Search executor that queries the feed service for every subject
///
/// Each subject becomes one request. Requests run concurrently, at most
/// [`max_concurrency`](Search::max_concurrency) at a time, and the fetch
/// blocks until all of them have completed. Non-200 responses and transport
/// failures are recorded per subject in [`errors`](Search::errors); a body
/// the parser rejects aborts the whole batch.
pub struct Search {
    /// Subjects to search for, duplicates included
    subjects: Vec<String>,
    /// Scheme and exact-match options
    options: SearchOptions,
    /// Search endpoint without scheme
    endpoint: String,
    /// Maximum number of requests in flight
    max_concurrency: usize,
    /// Filter mode handed to the result set
    filter_mode: FilterMode,
    /// Request transport; the default HTTP client is built on first fetch
    transport: Option<Arc<dyn Transport>>,
    /// Feed body parser
    parser: Arc<dyn FeedParser>,
    /// Failed responses by subject
    errors: HashMap<String, String>,
    state: FetchState,
}

impl Search {
    /// Create a new search
    pub fn new(subjects: impl Into<Subjects>, options: SearchOptions) -> Self {
        Self {
            subjects: subjects.into().into_inner(),
            options,
            endpoint: crate::DEFAULT_ENDPOINT.to_string(),
            max_concurrency: crate::DEFAULT_MAX_CONCURRENCY,
            filter_mode: FilterMode::default(),
            transport: None,
            parser: Arc::new(RssParser::new()),
            errors: HashMap::new(),
            state: FetchState::Pending,
        }
    }

    /// Create a search configured from settings, including its HTTP client
    pub fn from_settings(
        subjects: impl Into<Subjects>,
        settings: &Settings,
    ) -> Result<Self, SearchError> {
        let client = HttpClient::with_settings(&settings.outgoing)?;

        Ok(Self::new(subjects, settings.search_options())
            .with_endpoint(settings.search.endpoint.clone())
            .with_max_concurrency(settings.search.max_concurrency)
            .with_filter_mode(settings.search.filter_mode)
            .with_transport(Arc::new(client)))
    }

    /// Set the search endpoint (host and path, no scheme)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the maximum number of concurrent requests
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.set_max_concurrency(max);
        self
    }

    /// Set the filter mode used by [`into_result_set`](Search::into_result_set)
    pub fn with_filter_mode(mut self, mode: FilterMode) -> Self {
        self.filter_mode = mode;
        self
    }

    /// Use a custom transport
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use a custom feed parser
    pub fn with_parser(mut self, parser: Arc<dyn FeedParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Change the concurrency limit; values below 1 are raised to 1
    pub fn set_max_concurrency(&mut self, max: usize) {
        self.max_concurrency = max.max(1);
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    pub fn options(&self) -> SearchOptions {
        self.options
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn filter_mode(&self) -> FilterMode {
        self.filter_mode
    }

    /// Whether the fetch barrier has completed
    pub fn is_fetched(&self) -> bool {
        self.state == FetchState::Fetched
    }

    /// Failed response bodies by subject
    pub fn errors(&self) -> &HashMap<String, String> {
        &self.errors
    }

    /// Wrap this search in a result set that fetches on first read
    pub fn into_result_set(self) -> ResultSet {
        ResultSet::with_source(self)
    }

    /// Build one request per subject
    pub fn requests(&self) -> Result<Vec<FeedRequest>, SearchError> {
        self.subjects
            .iter()
            .map(|subject| {
                self.options
                    .request_for(&self.endpoint, subject)
                    .map_err(|source| SearchError::InvalidEndpoint {
                        endpoint: self.endpoint.clone(),
                        source,
                    })
            })
            .collect()
    }

    /// Run every request and append the results to `sink`, blocking the caller
    ///
    /// Outside any runtime the barrier runs on a private one. Inside a
    /// multi-thread runtime it runs in place on the calling worker; inside a
    /// current-thread runtime it runs on a helper thread with its own runtime,
    /// so tasks of the caller's runtime do not progress until it returns.
    /// Async callers should prefer [`fetch_async`](Search::fetch_async). Once
    /// the search has been fetched, further calls leave `sink` untouched.
    pub fn fetch<'a>(&mut self, sink: &'a mut ResultSet) -> Result<&'a mut ResultSet, SearchError> {
        if self.is_fetched() {
            debug!("Search already fetched, skipping");
            return Ok(sink);
        }

        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                debug!("Fetching on the caller's runtime");
                tokio::task::block_in_place(move || handle.block_on(self.fetch_async(sink)))
            }
            Ok(_) => {
                debug!("Fetching on a helper thread");
                let this = &mut *self;
                std::thread::scope(move |scope| {
                    scope
                        .spawn(move || this.fetch_blocking(sink))
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                })
            }
            Err(_) => self.fetch_blocking(sink),
        }
    }

    /// Run the barrier on a private runtime owned by this call
    fn fetch_blocking<'a>(
        &mut self,
        sink: &'a mut ResultSet,
    ) -> Result<&'a mut ResultSet, SearchError> {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
            .min(self.max_concurrency)
            .max(1);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(workers)
            .thread_name("feedsift-fetch")
            .enable_all()
            .build()?;

        runtime.block_on(self.fetch_async(sink))
    }

    /// Async version of [`fetch`](Search::fetch)
    pub async fn fetch_async<'a>(
        &mut self,
        sink: &'a mut ResultSet,
    ) -> Result<&'a mut ResultSet, SearchError> {
        if self.is_fetched() {
            debug!("Search already fetched, skipping");
            return Ok(sink);
        }

        let requests = self.requests()?;
        let transport = self.transport()?;
        let start = Instant::now();

        info!(
            "Searching {} subjects with up to {} concurrent requests",
            requests.len(),
            self.max_concurrency
        );

        let harvest = dispatch(
            requests,
            transport,
            Arc::clone(&self.parser),
            self.max_concurrency,
        )
        .await?;

        info!(
            "Search finished in {:?}: {} succeeded, {} failed",
            start.elapsed(),
            harvest.completed.len(),
            harvest.failed.len()
        );

        for (subject, items) in harvest.completed {
            sink.append(subject, items);
        }
        self.errors.extend(harvest.failed);
        self.state = FetchState::Fetched;

        Ok(sink)
    }

    fn transport(&mut self) -> Result<Arc<dyn Transport>, SearchError> {
        match &self.transport {
            Some(transport) => Ok(Arc::clone(transport)),
            None => {
                let client: Arc<dyn Transport> = Arc::new(HttpClient::new()?);
                self.transport = Some(Arc::clone(&client));
                Ok(client)
            }
        }
    }
}

impl fmt::Debug for Search {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Search")
            .field("subjects", &self.subjects)
            .field("options", &self.options)
            .field("endpoint", &self.endpoint)
            .field("max_concurrency", &self.max_concurrency)
            .field("filter_mode", &self.filter_mode)
            .field("errors", &self.errors)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// What a worker reports for one request
enum Outcome {
    Items(Vec<Item>),
    Failed(String),
    Malformed(crate::error::ParseError),
}

struct Completion {
    subject: String,
    outcome: Outcome,
}

/// Outcomes gathered by the aggregator, in completion order
#[derive(Default)]
struct Harvest {
    completed: Vec<(String, Vec<Item>)>,
    failed: HashMap<String, String>,
}

/// Fan requests out over a bounded pool and gather the outcomes
///
/// Workers only send messages; this function is the single owner of the
/// harvest. Returning early drops the join set, aborting unfinished workers.
async fn dispatch(
    requests: Vec<FeedRequest>,
    transport: Arc<dyn Transport>,
    parser: Arc<dyn FeedParser>,
    max_concurrency: usize,
) -> Result<Harvest, SearchError> {
    let permits = Arc::new(Semaphore::new(max_concurrency.max(1)));
    let (tx, mut rx) = mpsc::unbounded_channel::<Completion>();
    let mut workers = JoinSet::new();
    // Requests per subject still owed a completion
    let mut outstanding: HashMap<String, usize> = HashMap::new();

    for request in requests {
        *outstanding.entry(request.subject.clone()).or_default() += 1;

        let permits = Arc::clone(&permits);
        let transport = Arc::clone(&transport);
        let parser = Arc::clone(&parser);
        let tx = tx.clone();

        workers.spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };

            let outcome = match transport.execute(&request).await {
                Ok(response) if response.is_ok() => match parser.parse(&response.body) {
                    Ok(items) => Outcome::Items(items),
                    Err(e) => Outcome::Malformed(e),
                },
                Ok(response) => {
                    warn!(subject = %request.subject, status = response.status, "Search request failed");
                    Outcome::Failed(response.body)
                }
                Err(e) => {
                    warn!(subject = %request.subject, error = %e, "Search request failed");
                    Outcome::Failed(e.to_string())
                }
            };

            let _ = tx.send(Completion {
                subject: request.subject,
                outcome,
            });
        });
    }
    drop(tx);

    let mut harvest = Harvest::default();
    while let Some(Completion { subject, outcome }) = rx.recv().await {
        if let Some(count) = outstanding.get_mut(&subject) {
            *count -= 1;
        }
        match outcome {
            Outcome::Items(items) => {
                debug!(subject = %subject, items = items.len(), "Search request completed");
                harvest.completed.push((subject, items));
            }
            Outcome::Failed(payload) => {
                harvest.failed.insert(subject, payload);
            }
            Outcome::Malformed(source) => {
                warn!(subject = %subject, error = %source, "Aborting search on malformed feed");
                return Err(SearchError::Parse { subject, source });
            }
        }
    }

    while let Some(joined) = workers.join_next().await {
        let Err(e) = joined else { continue };
        if !e.is_panic() {
            continue;
        }

        let mut missing: Vec<&String> = outstanding
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(subject, _)| subject)
            .collect();
        missing.sort();
        let subject = missing.first().map(|s| s.to_string()).unwrap_or_default();
        let message = panic_message(e.into_panic());

        warn!(subject = %subject, panic = %message, "Aborting search on worker panic");
        return Err(SearchError::Worker { subject, message });
    }

    Ok(harvest)
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unknown panic".to_string()),
    }
}
