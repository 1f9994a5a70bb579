//! Candidate matching and decision pipeline.
//!
//! Per record: [`retriever`] queries Crossref, [`ranker`] scores and selects
//! the most probable candidate, [`acceptance`] decides whether it becomes an
//! authoritative DOI. [`batch`] drives this over the whole table and
//! [`merge`] folds accepted matches back into the EXFOR table.

pub mod acceptance;
pub mod batch;
pub mod merge;
pub mod ranker;
pub mod retriever;

use std::sync::Arc;

pub use acceptance::AcceptanceFilter;
pub use batch::{BatchDriver, BatchReport, InterruptAction, StopSignal};
pub use merge::{MergeStats, merge_doi_table, run_merge};

use crate::client::WorksSearch;
use crate::config::Config;
use crate::diagnostics::DiagnosticsSink;
use crate::error::{PipelineError, PipelineResult};
use crate::models::{CandidateMatch, SourceRecord};

/// Shared collaborators for matching.
#[derive(Clone)]
pub struct MatchContext {
    /// Works search backend, the Crossref client outside tests.
    pub search: Arc<dyn WorksSearch>,
    /// Receives per-record failures.
    pub diagnostics: Arc<dyn DiagnosticsSink>,
    /// Result limit and acceptance thresholds.
    pub config: Config,
}

impl MatchContext {
    #[must_use]
    pub fn new(
        search: Arc<dyn WorksSearch>,
        diagnostics: Arc<dyn DiagnosticsSink>,
        config: Config,
    ) -> Self {
        Self { search, diagnostics, config }
    }

    #[must_use]
    pub fn acceptance(&self) -> AcceptanceFilter {
        AcceptanceFilter::from_config(&self.config)
    }
}

impl std::fmt::Debug for MatchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchContext").field("config", &self.config).finish()
    }
}

/// Outcome of matching one record.
#[derive(Debug, Clone, Default)]
pub struct RecordMatch {
    /// Every scored candidate, in API order.
    pub candidates: Vec<CandidateMatch>,
    /// The candidate with the highest title similarity.
    pub most_probable: Option<CandidateMatch>,
}

/// Retrieve, score and select for a single record.
pub async fn match_record(ctx: &MatchContext, record: &SourceRecord) -> PipelineResult<RecordMatch> {
    let candidates = retriever::retrieve(ctx, record).await?;

    let surname = retriever::surname(record.first_author_or_empty())
        .ok_or_else(|| PipelineError::malformed(&record.entry_id, "first_author"))?;
    let candidates = ranker::score(record, surname, candidates);
    let most_probable = ranker::most_probable(&candidates).cloned();

    Ok(RecordMatch { candidates, most_probable })
}
