//! Candidate retrieval for one source record.

use std::sync::LazyLock;

use regex::Regex;

use super::MatchContext;
use crate::diagnostics::{DiagnosticEvent, FailureKind};
use crate::error::{PipelineError, PipelineResult, error_chain};
use crate::models::{Candidate, SourceRecord, WorksQuery};

/// A bare initial such as "M" or "J-P".
static INITIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\p{Lu}(-\p{Lu})?$").expect("valid initial pattern"));

/// Surname part of an EXFOR author string.
///
/// Segments are separated by "."; the last segment that is not a bare initial
/// wins, so both "M.Brischetto" and "Brischetto.M" give "Brischetto". If every
/// segment is an initial the last one is returned.
#[must_use]
pub fn surname(first_author: &str) -> Option<&str> {
    let segments: Vec<&str> =
        first_author.split('.').map(str::trim).filter(|s| !s.is_empty()).collect();

    segments
        .iter()
        .rev()
        .find(|s| !INITIAL.is_match(s))
        .or_else(|| segments.last())
        .copied()
}

/// Build the works query for a record.
///
/// Records without a title or first author cannot be queried.
pub fn build_query(record: &SourceRecord, rows: usize) -> PipelineResult<WorksQuery> {
    let title = record.title_or_empty().trim();
    if title.is_empty() {
        return Err(PipelineError::malformed(&record.entry_id, "title"));
    }
    let surname = surname(record.first_author_or_empty())
        .ok_or_else(|| PipelineError::malformed(&record.entry_id, "first_author"))?;

    Ok(WorksQuery::new(title, surname, record.year(), rows))
}

/// Fetch up to `max_results` candidates for a record.
///
/// A failed request is reported to the diagnostics sink and yields no
/// candidates. A response that arrived but could not be decoded is returned
/// as an error.
pub async fn retrieve(ctx: &MatchContext, record: &SourceRecord) -> PipelineResult<Vec<Candidate>> {
    let query = build_query(record, ctx.config.max_results)?;

    match ctx.search.search_works(&query).await {
        Ok(items) => Ok(items
            .into_iter()
            .take(ctx.config.max_results)
            .map(|item| item.into_candidate())
            .collect()),
        Err(e) if e.is_retrieval_failure() => {
            let err = PipelineError::Retrieval { entry_id: record.entry_id.clone(), source: e };
            ctx.diagnostics.record(DiagnosticEvent::new(
                &record.entry_id,
                FailureKind::Retrieval,
                error_chain(&err),
            ));
            Ok(Vec::new())
        }
        Err(e) => Err(PipelineError::scoring(&record.entry_id, e)),
    }
}
