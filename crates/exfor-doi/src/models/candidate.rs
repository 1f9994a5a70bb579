//! Crossref candidates and their scored form.

use serde::{Deserialize, Serialize};

use super::SourceRecord;

/// Surname recorded when Crossref returns no author for a work.
pub const UNKNOWN_AUTHOR: &str = "unknown";

/// One search hit, before scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// First title of the work.
    pub title: Option<String>,
    /// DOI of the work.
    pub doi: Option<String>,
    /// Family name of the first author, or [`UNKNOWN_AUTHOR`].
    pub first_author_surname: String,
}

/// A candidate scored against the record it was retrieved for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateMatch {
    /// EXFOR entry the query was built from.
    pub source_entry_id: String,
    /// EXFOR title as stored, before title-casing.
    pub source_title: String,
    /// EXFOR first author as stored (e.g. "M.Brischetto").
    pub source_first_author: String,
    /// EXFOR main reference code.
    pub source_main_reference: String,
    /// First Crossref title, if the work has one.
    pub candidate_title: Option<String>,
    /// Crossref DOI, if returned.
    pub candidate_doi: Option<String>,
    /// Family name of the first Crossref author, or "unknown".
    pub candidate_first_author_surname: String,
    /// Similarity of the title-cased source title to the candidate title.
    pub title_similarity: f64,
    /// Similarity of the title-cased source surname to the candidate surname.
    pub author_similarity: f64,
}

impl CandidateMatch {
    /// Pair a candidate with its source record; scores start at zero.
    #[must_use]
    pub fn unscored(record: &SourceRecord, candidate: Candidate) -> Self {
        Self {
            source_entry_id: record.entry_id.clone(),
            source_title: record.title_or_empty().to_string(),
            source_first_author: record.first_author_or_empty().to_string(),
            source_main_reference: record.main_reference_or_empty().to_string(),
            candidate_title: candidate.title,
            candidate_doi: candidate.doi,
            candidate_first_author_surname: candidate.first_author_surname,
            title_similarity: 0.0,
            author_similarity: 0.0,
        }
    }
}

/// A most-probable candidate that passed the acceptance filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptedMatch {
    /// The accepted row, serialized inline.
    #[serde(flatten)]
    pub candidate: CandidateMatch,
    /// Always true once the filter has passed the row.
    pub accepted: bool,
}

impl AcceptedMatch {
    /// Entry the match belongs to.
    #[must_use]
    pub fn entry_id(&self) -> &str {
        &self.candidate.source_entry_id
    }

    /// DOI the match contributes, if Crossref supplied one.
    #[must_use]
    pub fn doi(&self) -> Option<&str> {
        self.candidate.candidate_doi.as_deref().map(str::trim).filter(|d| !d.is_empty())
    }
}
