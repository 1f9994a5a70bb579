//! Configuration for the Crossref DOI enrichment pipeline.

use std::time::Duration;

/// API configuration constants.
pub mod api {
    use std::time::Duration;

    /// Crossref works search endpoint.
    pub const WORKS_API: &str = "https://api.crossref.org/works";

    /// Client identification sent with every request. Crossref routes
    /// requests carrying a `mailto` to its polite pool.
    pub const CONTACT_HEADER: &str =
        "IAEA NDS (https://nds.iaea.org/; mailto:nds.contact-point@iaea.org) EXFOR_BIB_Parser/1.0";

    /// Requests per second the client declares and enforces.
    pub const RATE_LIMIT_PER_SECOND: u32 = 20;

    /// Interval advertised alongside the declared rate.
    pub const RATE_LIMIT_INTERVAL: &str = "1s";

    /// Candidates requested per query.
    pub const MAX_RESULTS: usize = 5;

    /// Longest response body excerpt kept as an error reason.
    pub const MAX_REASON_CHARS: usize = 200;

    /// Request timeout.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
}

/// Fields requested from the works API.
pub mod fields {
    /// Only what the matcher reads.
    pub const SELECT: &[&str] = &["title", "author", "DOI"];
}

/// Score a candidate must strictly exceed on both axes to be accepted.
pub const ACCEPTANCE_THRESHOLD: f64 = 0.8;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Works search endpoint (overridden for mock servers).
    pub base_url: String,

    /// Value of the `User-Agent` header, including a contact address.
    pub contact_header: String,

    /// Maximum candidates requested and kept per query.
    pub max_results: usize,

    /// Title similarity a match must exceed.
    pub title_threshold: f64,

    /// Author similarity a match must exceed.
    pub author_threshold: f64,

    /// Client-side request budget per second.
    pub rate_limit_per_second: u32,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,
}

impl Config {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: api::WORKS_API.to_string(),
            contact_header: api::CONTACT_HEADER.to_string(),
            max_results: api::MAX_RESULTS,
            title_threshold: ACCEPTANCE_THRESHOLD,
            author_threshold: ACCEPTANCE_THRESHOLD,
            rate_limit_per_second: api::RATE_LIMIT_PER_SECOND,
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
        }
    }

    /// Create a test configuration pointing at a mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            base_url: format!("{}/works", base_url.trim_end_matches('/')),
            contact_header: "exfor-doi-tests (mailto:tests@example.org)".to_string(),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            rate_limit_per_second: 1000, // effectively unthrottled
            ..Self::new()
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Recognised: `CROSSREF_API_URL`, `CROSSREF_MAILTO`, `CROSSREF_RATE_LIMIT`.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::new();

        if let Ok(url) = std::env::var("CROSSREF_API_URL") {
            config.base_url = url;
        }
        if let Ok(mailto) = std::env::var("CROSSREF_MAILTO") {
            config = config.with_mailto(&mailto);
        }
        if let Ok(rate) = std::env::var("CROSSREF_RATE_LIMIT") {
            config.rate_limit_per_second = rate
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid CROSSREF_RATE_LIMIT {rate:?}: {e}"))?;
        }

        Ok(config)
    }

    /// Replace the contact address in the `User-Agent`.
    #[must_use]
    pub fn with_mailto(mut self, mailto: &str) -> Self {
        self.contact_header = format!(
            "exfor-doi/{} (https://nds.iaea.org/; mailto:{mailto})",
            env!("CARGO_PKG_VERSION")
        );
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.base_url, api::WORKS_API);
        assert_eq!(config.max_results, 5);
        assert!((config.title_threshold - 0.8).abs() < f64::EPSILON);
        assert!((config.author_threshold - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn test_config_for_testing_appends_works_path() {
        let config = Config::for_testing("http://127.0.0.1:9999/");
        assert_eq!(config.base_url, "http://127.0.0.1:9999/works");
        assert_eq!(config.max_results, api::MAX_RESULTS);
    }

    #[test]
    fn test_with_mailto_sets_contact() {
        let config = Config::new().with_mailto("someone@example.org");
        assert!(config.contact_header.contains("mailto:someone@example.org"));
    }

    #[test]
    fn test_fields() {
        assert_eq!(fields::SELECT.join(","), "title,author,DOI");
    }
}
