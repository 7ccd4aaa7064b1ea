//! Web search with exponential backoff and silent degradation.
//!
//! # Architecture
//!
//! - [`SearchProvider`]: Core trait for a fallible search transport
//! - [`TavilyClient`]: Tavily REST implementation of [`SearchProvider`]
//! - [`RetrySearch`]: Decorator that adds retry logic to any [`SearchProvider`]
//! - [`SearchGateway`]: Infallible front door used by the aggregators
//!
//! # Degraded Mode
//!
//! A gateway built without a provider (no API key configured) answers every
//! query with an empty list and never touches the network. A gateway whose
//! provider keeps failing also answers with an empty list once retries are
//! exhausted. Callers therefore never see a search error.

use crate::models::SearchResult;
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";

/// Trait for a fallible web search transport.
pub trait SearchProvider {
    /// Run `query` and return at most `max_results` hits.
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, Box<dyn Error>>;
}

/// Tavily web search client.
pub struct TavilyClient {
    api_key: String,
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Serialize)]
struct TavilySearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct TavilySearchResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    title: Option<String>,
    content: Option<String>,
    url: Option<String>,
}

impl TavilyClient {
    pub fn new(api_key: String, client: reqwest::Client) -> Self {
        Self {
            api_key,
            client,
            endpoint: TAVILY_SEARCH_URL.to_string(),
        }
    }

    #[cfg(test)]
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }
}

impl fmt::Debug for TavilyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TavilyClient")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl SearchProvider for TavilyClient {
    #[instrument(level = "debug", skip(self))]
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, Box<dyn Error>> {
        let request = TavilySearchRequest {
            api_key: &self.api_key,
            query,
            max_results,
        };

        let resp: TavilySearchResponse = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(resp
            .results
            .into_iter()
            .map(|r| SearchResult {
                title: r.title.unwrap_or_default(),
                content: r.content.unwrap_or_default(),
                url: r.url.unwrap_or_default(),
            })
            .collect())
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`SearchProvider`].
///
/// The backoff itself lives in [`RetryPolicy`].
pub struct RetrySearch<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T> RetrySearch<T>
where
    T: SearchProvider,
{
    /// Wrap `inner` with the default [`RetryPolicy`].
    pub fn new(inner: T) -> Self {
        Self::with_policy(inner, RetryPolicy::default())
    }

    pub fn with_policy(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    #[cfg(test)]
    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T> fmt::Debug for RetrySearch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetrySearch")
            .field("policy", &self.policy)
            .finish()
    }
}

impl<T> SearchProvider for RetrySearch<T>
where
    T: SearchProvider,
{
    #[instrument(level = "debug", skip(self))]
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, Box<dyn Error>> {
        self.policy
            .run("search", || self.inner.search(query, max_results))
            .await
    }
}

/// Search front door used by every aggregator.
///
/// Never fails: no provider or an exhausted provider both yield an empty list.
pub struct SearchGateway<T> {
    backend: Option<RetrySearch<T>>,
}

impl<T> SearchGateway<T>
where
    T: SearchProvider,
{
    /// Gateway backed by `provider` with the default retry policy.
    pub fn new(provider: T) -> Self {
        Self::with_retry(RetrySearch::new(provider))
    }

    pub fn with_retry(backend: RetrySearch<T>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// Gateway that answers every query with an empty list.
    pub fn disabled() -> Self {
        Self { backend: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// The underlying provider, if search is enabled.
    #[cfg(test)]
    pub fn provider(&self) -> Option<&T> {
        self.backend.as_ref().map(RetrySearch::inner)
    }

    #[instrument(level = "info", skip(self))]
    pub async fn search(&self, query: &str, max_results: usize) -> Vec<SearchResult> {
        let Some(backend) = &self.backend else {
            debug!("search disabled; returning no results");
            return Vec::new();
        };
        let t0 = Instant::now();
        match backend.search(query, max_results).await {
            Ok(results) => {
                info!(
                    count = results.len(),
                    elapsed_ms = t0.elapsed().as_millis() as u64,
                    "search succeeded"
                );
                results
            }
            Err(e) => {
                error!(error = %e, "search failed; continuing with no results");
                Vec::new()
            }
        }
    }
}

impl SearchGateway<TavilyClient> {
    /// Tavily-backed gateway when a non-blank key is present, disabled otherwise.
    pub fn tavily(api_key: Option<String>, client: reqwest::Client) -> Self {
        match api_key.filter(|k| !k.trim().is_empty()) {
            Some(key) => {
                info!("Tavily search enabled");
                Self::new(TavilyClient::new(key, client))
            }
            None => {
                warn!("TAVILY_API_KEY not set; search results will be empty");
                Self::disabled()
            }
        }
    }
}

impl<T> fmt::Debug for SearchGateway<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchGateway")
            .field("enabled", &self.backend.is_some())
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::http::testing::TestServer;
    use std::sync::Mutex;

    fn flaky(failures: usize) -> FlakySearch {
        FlakySearch {
            failures,
            results: vec![result("t", "c", "https://example.com")],
            attempts: Mutex::new(0),
        }
    }

    #[tokio::test]
    async fn test_disabled_gateway_returns_nothing() {
        let gateway: SearchGateway<StubSearch> = SearchGateway::disabled();
        assert!(!gateway.is_enabled());
        assert!(gateway.search("比亚迪", 10).await.is_empty());
        assert!(gateway.search("", 0).await.is_empty());
    }

    #[tokio::test]
    async fn test_tavily_gateway_without_key_is_disabled() {
        let client = reqwest::Client::new();
        assert!(!SearchGateway::tavily(None, client.clone()).is_enabled());
        assert!(!SearchGateway::tavily(Some("  ".to_string()), client.clone()).is_enabled());
        assert!(SearchGateway::tavily(Some("key".to_string()), client).is_enabled());
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_failures() {
        let gateway = fast_gateway(flaky(2));
        let results = gateway.search("q", 5).await;
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_three_attempts() {
        let retry = RetrySearch::with_policy(flaky(10), RetryPolicy::fast());
        assert!(retry.search("q", 5).await.is_err());
        assert_eq!(*retry.inner().attempts.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_exhausted_gateway_returns_empty() {
        let gateway = fast_gateway(flaky(10));
        assert!(gateway.search("q", 5).await.is_empty());
    }

    #[tokio::test]
    async fn test_tavily_maps_missing_fields_to_empty() {
        let body = r#"{"results":[
            {"title":null,"content":"比亚迪海豹 上市","url":"https://a"},
            {"url":"https://b"}
        ]}"#;
        let server = TestServer::start(200, "application/json", body).await;
        let tavily = TavilyClient::new("tvly-key".to_string(), reqwest::Client::new())
            .with_endpoint(&server.url("/search"));

        let results = tavily.search("新能源", 7).await.unwrap();
        assert_eq!(
            results,
            vec![result("", "比亚迪海豹 上市", "https://a"), result("", "", "https://b")]
        );

        let request = server.requests().remove(0);
        assert!(request.starts_with("POST /search"));
        assert!(request.contains(r#""api_key":"tvly-key""#));
        assert!(request.contains(r#""max_results":7"#));
        assert!(request.contains("新能源"));
    }

    #[tokio::test]
    async fn test_tavily_error_status_is_retried_then_degrades() {
        let server = TestServer::start(500, "application/json", "{}").await;
        let tavily = TavilyClient::new("tvly-key".to_string(), reqwest::Client::new())
            .with_endpoint(&server.url("/search"));
        assert!(tavily.search("q", 5).await.is_err());

        let gateway = fast_gateway(tavily);
        assert!(gateway.search("q", 5).await.is_empty());
        assert_eq!(server.requests().len(), 4);
    }

    #[tokio::test]
    async fn test_gateway_exposes_provider() {
        let gateway = fast_gateway(StubSearch::new());
        gateway.search("q", 3).await;
        assert_eq!(gateway.provider().unwrap().queries(), vec!["q"]);

        let disabled: SearchGateway<StubSearch> = SearchGateway::disabled();
        assert!(disabled.provider().is_none());
    }

    #[tokio::test]
    async fn test_stub_truncates_to_max_results() {
        let stub = StubSearch::new().respond(
            "nev",
            vec![
                result("a", "", "https://a"),
                result("b", "", "https://b"),
            ],
        );
        let gateway = fast_gateway(stub);
        assert_eq!(gateway.search("nev news", 1).await.len(), 1);
    }
}
