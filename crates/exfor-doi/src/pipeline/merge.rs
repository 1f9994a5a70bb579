//! Merge of accepted Crossref matches into the EXFOR table.

use std::collections::HashMap;

use crate::error::StoreResult;
use crate::models::{AcceptedMatch, DoiRecord, DoiSource, SourceRecord};
use crate::store::{ArtifactStore, SourceProvider};

/// Build the final DOI table.
///
/// A native DOI always wins and is tagged `EXFOR`. Otherwise an accepted
/// match carrying a DOI fills it in, tagged `Crossref`; when an entry has
/// several accepted rows the last one counts. Output is sorted by entry id.
#[must_use]
pub fn merge_doi_table(source: &[SourceRecord], accepted: &[AcceptedMatch]) -> Vec<DoiRecord> {
    let crossref: HashMap<&str, &str> =
        accepted.iter().filter_map(|m| Some((m.entry_id(), m.doi()?))).collect();

    let mut table: Vec<DoiRecord> = source
        .iter()
        .map(|record| {
            let mut row = DoiRecord::from_source(record);
            if row.doi.is_some() {
                row.doi_source = Some(DoiSource::Exfor);
            } else if let Some(doi) = crossref.get(record.entry_id.as_str()) {
                row.doi = Some((*doi).to_string());
                row.doi_source = Some(DoiSource::Crossref);
            }
            row
        })
        .collect();

    table.sort_by(|a, b| a.entry_id.cmp(&b.entry_id));
    table
}

/// Counts by DOI provenance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Rows in the merged table.
    pub total: usize,
    /// Rows whose DOI came from EXFOR.
    pub exfor: usize,
    /// Rows filled from an accepted Crossref match.
    pub crossref: usize,
    /// Rows still without a DOI.
    pub missing: usize,
}

impl MergeStats {
    #[must_use]
    pub fn from_table(table: &[DoiRecord]) -> Self {
        table.iter().fold(Self { total: table.len(), ..Self::default() }, |mut stats, row| {
            match row.doi_source {
                Some(DoiSource::Exfor) => stats.exfor += 1,
                Some(DoiSource::Crossref) => stats.crossref += 1,
                None => stats.missing += 1,
            }
            stats
        })
    }
}

/// Load inputs, merge, and persist the DOI table.
pub fn run_merge(source: &dyn SourceProvider, store: &ArtifactStore) -> StoreResult<Vec<DoiRecord>> {
    let records = source.load_all()?;
    let accepted = store.read_accepted()?;

    let table = merge_doi_table(&records, &accepted);
    store.write_doi_table(&table)?;

    let stats = MergeStats::from_table(&table);
    tracing::info!(
        total = stats.total,
        exfor = stats.exfor,
        crossref = stats.crossref,
        missing = stats.missing,
        "DOI table written"
    );

    Ok(table)
}
