//! Candidate scoring and selection.

use crate::models::{Candidate, CandidateMatch, SourceRecord};
use crate::similarity::{similarity, title_case};

/// Score every candidate against the record.
///
/// Source title and surname are title-cased; Crossref values are compared as
/// returned. A candidate without a title scores as the empty string.
#[must_use]
pub fn score(record: &SourceRecord, surname: &str, candidates: Vec<Candidate>) -> Vec<CandidateMatch> {
    let source_title = title_case(record.title_or_empty());
    let source_surname = title_case(surname);

    candidates
        .into_iter()
        .map(|candidate| {
            let mut row = CandidateMatch::unscored(record, candidate);
            row.title_similarity =
                similarity(&source_title, row.candidate_title.as_deref().unwrap_or(""));
            row.author_similarity =
                similarity(&source_surname, &row.candidate_first_author_surname);
            row
        })
        .collect()
}

/// Row with the highest title similarity; the earliest one on ties.
#[must_use]
pub fn most_probable(rows: &[CandidateMatch]) -> Option<&CandidateMatch> {
    rows.iter().fold(None, |best, row| match best {
        Some(b) if b.title_similarity >= row.title_similarity => Some(b),
        _ => Some(row),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UNKNOWN_AUTHOR;

    fn candidate(title: Option<&str>, doi: &str, family: &str) -> Candidate {
        Candidate {
            title: title.map(str::to_string),
            doi: Some(doi.to_string()),
            first_author_surname: family.to_string(),
        }
    }

    fn record() -> SourceRecord {
        SourceRecord::new("A0001")
            .with_title("elastic scattering study")
            .with_first_author("M.Brischetto")
    }

    #[test]
    fn test_score_title_cases_source() {
        let rows = score(
            &record(),
            "brischetto",
            vec![candidate(Some("Elastic Scattering Study"), "10.1/x", "Brischetto")],
        );
        assert_eq!(rows.len(), 1);
        assert!((rows[0].title_similarity - 1.0).abs() < 1e-9);
        assert!((rows[0].author_similarity - 1.0).abs() < 1e-9);
        assert_eq!(rows[0].source_title, "elastic scattering study");
    }

    #[test]
    fn test_missing_title_scores_zero() {
        let rows = score(&record(), "Brischetto", vec![candidate(None, "10.1/x", UNKNOWN_AUTHOR)]);
        assert!(rows[0].title_similarity.abs() < 1e-9);
    }

    #[test]
    fn test_most_probable_picks_highest_title() {
        let rows = score(
            &record(),
            "Brischetto",
            vec![
                candidate(Some("Inelastic Scattering"), "10.1/a", "Brischetto"),
                candidate(Some("Elastic Scattering Study"), "10.1/b", "Other"),
                candidate(Some("Something Else"), "10.1/c", "Brischetto"),
            ],
        );
        let best = most_probable(&rows).unwrap();
        assert_eq!(best.candidate_doi.as_deref(), Some("10.1/b"));
    }

    #[test]
    fn test_most_probable_ties_keep_api_order() {
        let rows = score(
            &record(),
            "Brischetto",
            vec![
                candidate(Some("Elastic Scattering Study"), "10.1/first", "Brischetto"),
                candidate(Some("Elastic Scattering Study"), "10.1/second", "Brischetto"),
            ],
        );
        let best = most_probable(&rows).unwrap();
        assert_eq!(best.candidate_doi.as_deref(), Some("10.1/first"));
    }

    #[test]
    fn test_most_probable_empty() {
        assert!(most_probable(&[]).is_none());
    }
}
