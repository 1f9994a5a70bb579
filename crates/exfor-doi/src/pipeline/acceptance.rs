//! Acceptance decision for most-probable candidates.

use crate::config::{ACCEPTANCE_THRESHOLD, Config};
use crate::models::{AcceptedMatch, CandidateMatch};

/// Both similarities must strictly exceed their threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcceptanceFilter {
    /// Title similarity must be strictly greater than this.
    pub title_threshold: f64,
    /// Author similarity must be strictly greater than this.
    pub author_threshold: f64,
}

impl AcceptanceFilter {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self { title_threshold: config.title_threshold, author_threshold: config.author_threshold }
    }

    #[must_use]
    pub fn accepts(&self, row: &CandidateMatch) -> bool {
        row.title_similarity > self.title_threshold && row.author_similarity > self.author_threshold
    }

    /// Accepted rows, sorted by entry id (stable for equal ids).
    #[must_use]
    pub fn apply(&self, rows: &[CandidateMatch]) -> Vec<AcceptedMatch> {
        let mut accepted: Vec<AcceptedMatch> = rows
            .iter()
            .filter(|row| self.accepts(row))
            .map(|row| AcceptedMatch { candidate: row.clone(), accepted: true })
            .collect();
        accepted.sort_by(|a, b| a.entry_id().cmp(b.entry_id()));
        accepted
    }
}

impl Default for AcceptanceFilter {
    fn default() -> Self {
        Self { title_threshold: ACCEPTANCE_THRESHOLD, author_threshold: ACCEPTANCE_THRESHOLD }
    }
}
