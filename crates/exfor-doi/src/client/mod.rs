//! Crossref works API client.
//!
//! Provides an async HTTP client with:
//! - Contact identification via `User-Agent` (Crossref polite pool)
//! - Client-side token-bucket rate limiting at the declared rate
//! - Status mapping into [`ClientError`]
//!
//! Requests are never retried; a failed query is simply a failed query.

use std::num::NonZeroU32;
use std::sync::Arc;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use url::Url;

use crate::config::{Config, api, fields};
use crate::error::{ClientError, ClientResult};
use crate::models::{WorkItem, WorksQuery, WorksResponse};

/// Anything that can answer a works search.
///
/// The pipeline only depends on this trait, so tests can substitute canned
/// results or failures without a server.
#[async_trait::async_trait]
pub trait WorksSearch: Send + Sync {
    /// Run one search and return at most `query.rows` items in ranking order.
    async fn search_works(&self, query: &WorksQuery) -> ClientResult<Vec<WorkItem>>;
}

/// Crossref API client.
#[derive(Clone)]
pub struct CrossrefClient {
    /// HTTP client with identification headers.
    client: Client,

    /// Shared request budget.
    limiter: Arc<DefaultDirectRateLimiter>,

    /// Works search endpoint.
    base_url: Url,

    /// Declared requests per second.
    rate_limit_per_second: u32,
}

impl CrossrefClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the endpoint or a header value is invalid, or if HTTP
    /// client initialization fails.
    pub fn new(config: &Config) -> ClientResult<Self> {
        let rate = NonZeroU32::new(config.rate_limit_per_second).unwrap_or(NonZeroU32::MIN);

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, header_value(&config.contact_header)?);
        headers.insert(
            HeaderName::from_static("x-rate-limit-limit"),
            header_value(&rate.to_string())?,
        );
        headers.insert(
            HeaderName::from_static("x-rate-limit-interval"),
            HeaderValue::from_static(api::RATE_LIMIT_INTERVAL),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            limiter: Arc::new(RateLimiter::direct(Quota::per_second(rate))),
            base_url: Url::parse(&config.base_url)?,
            rate_limit_per_second: rate.get(),
        })
    }

    /// Full request URL for a query.
    #[must_use]
    pub fn works_url(&self, query: &WorksQuery) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("query.title", &query.title)
            .append_pair("query.bibliographic", &query.bibliographic)
            .append_pair("select", &fields::SELECT.join(","))
            .append_pair("rows", &query.rows.to_string());
        url
    }

    /// Handle API response status codes.
    async fn handle_response(&self, response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(1);
            return Err(ClientError::rate_limited(retry_after));
        }

        let reason = match status.canonical_reason() {
            Some(reason) => reason.to_string(),
            None => body_excerpt(&response.text().await.unwrap_or_default()),
        };
        Err(ClientError::status(status.as_u16(), reason))
    }
}

#[async_trait::async_trait]
impl WorksSearch for CrossrefClient {
    async fn search_works(&self, query: &WorksQuery) -> ClientResult<Vec<WorkItem>> {
        self.limiter.until_ready().await;

        let url = self.works_url(query);
        tracing::debug!(%url, "Querying Crossref");

        let response = self.client.get(url).send().await?;
        let response = self.handle_response(response).await?;

        let body = response.text().await?;
        let parsed: WorksResponse = serde_json::from_str(&body)?;

        let mut items = parsed.into_items();
        items.truncate(query.rows);
        Ok(items)
    }
}

impl std::fmt::Debug for CrossrefClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrossrefClient")
            .field("base_url", &self.base_url.as_str())
            .field("rate_limit_per_second", &self.rate_limit_per_second)
            .finish()
    }
}

/// First [`api::MAX_REASON_CHARS`] characters of an error body, whitespace collapsed.
fn body_excerpt(body: &str) -> String {
    let collapsed = body.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(api::MAX_REASON_CHARS).collect()
}

fn header_value(value: &str) -> ClientResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| ClientError::InvalidHeader(value.to_string()))
}
