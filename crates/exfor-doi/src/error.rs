//! Error types for the DOI enrichment pipeline.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.

use std::path::PathBuf;
use std::time::Duration;

/// Errors from the HTTP client layer.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, timeout, etc.)
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    /// The configured endpoint could not be turned into a request URL
    #[error("Invalid URL")]
    InvalidUrl(#[from] url::ParseError),

    /// A configured header value is not valid HTTP
    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    /// Rate limited by Crossref (429 response)
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Suggested wait time before retry
        retry_after: Duration,
    },

    /// Any other non-success status
    #[error("{status} {reason}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Canonical reason phrase, or the response body when there is none
        reason: String,
    },

    /// JSON parsing error
    #[error("Failed to parse response")]
    Parse(#[from] serde_json::Error),
}

impl ClientError {
    /// Create a rate limited error with retry-after duration.
    #[must_use]
    pub fn rate_limited(seconds: u64) -> Self {
        Self::RateLimited { retry_after: Duration::from_secs(seconds) }
    }

    /// Create a status error.
    #[must_use]
    pub fn status(status: u16, reason: impl Into<String>) -> Self {
        Self::Status { status, reason: reason.into() }
    }

    /// HTTP status code, when the server answered at all.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::RateLimited { .. } => Some(429),
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True when the request itself failed (transport or status), as opposed
    /// to a successful response that could not be decoded.
    #[must_use]
    pub const fn is_retrieval_failure(&self) -> bool {
        matches!(self, Self::Http(_) | Self::RateLimited { .. } | Self::Status { .. })
    }
}

/// Errors from reading the source table and writing artifacts.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// Filesystem error on a specific path
    #[error("I/O error on {path}")]
    Io {
        /// Path being read or written
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// JSON encoding or decoding failed
    #[error("JSON error in {path}")]
    Json {
        /// File being processed
        path: PathBuf,
        /// Underlying error
        source: serde_json::Error,
    },

    /// CSV encoding or decoding failed
    #[error("CSV error in {path}")]
    Csv {
        /// File being processed
        path: PathBuf,
        /// Underlying error
        source: csv::Error,
    },

    /// Snapshot header does not match what the reader expects
    #[error("Snapshot {path} holds {found}, expected {expected}")]
    SnapshotMismatch {
        /// Snapshot file
        path: PathBuf,
        /// Kind and version the caller asked for
        expected: String,
        /// Kind and version found in the file
        found: String,
    },

    /// Source file extension is neither `.csv` nor `.json`
    #[error("Unsupported source format: {0}")]
    UnsupportedFormat(PathBuf),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json { path: path.into(), source }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv { path: path.into(), source }
    }
}

/// Per-record failures inside the matching pipeline.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// The search request failed
    #[error("retrieval failed for entry {entry_id}")]
    Retrieval {
        /// Source entry
        entry_id: String,
        /// Client failure
        #[source]
        source: ClientError,
    },

    /// The record lacks a field the query needs
    #[error("entry {entry_id} has no {field}")]
    MalformedRecord {
        /// Source entry
        entry_id: String,
        /// Missing field name
        field: &'static str,
    },

    /// Anything else that went wrong while processing one record
    #[error("processing failed for entry {entry_id}")]
    Scoring {
        /// Source entry
        entry_id: String,
        /// Underlying cause
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl PipelineError {
    /// Create a malformed record error.
    #[must_use]
    pub fn malformed(entry_id: impl Into<String>, field: &'static str) -> Self {
        Self::MalformedRecord { entry_id: entry_id.into(), field }
    }

    /// Wrap an arbitrary failure for one record.
    #[must_use]
    pub fn scoring(
        entry_id: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Scoring { entry_id: entry_id.into(), source: source.into() }
    }

    /// Entry the failure belongs to.
    #[must_use]
    pub fn entry_id(&self) -> &str {
        match self {
            Self::Retrieval { entry_id, .. }
            | Self::MalformedRecord { entry_id, .. }
            | Self::Scoring { entry_id, .. } => entry_id,
        }
    }

    /// Missing fields are an expected condition, not a failure to report.
    #[must_use]
    pub const fn is_expected(&self) -> bool {
        matches!(self, Self::MalformedRecord { .. })
    }
}

/// Render an error and every `source()` beneath it, outermost first.
#[must_use]
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut current = err.source();
    while let Some(cause) = current {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        current = cause.source();
    }
    out
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type alias for per-record pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
