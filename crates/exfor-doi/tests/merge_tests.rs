//! Merge stage tests against real files in a temporary data directory.

use serde_json::json;

use exfor_doi::models::{AcceptedMatch, CandidateMatch, DoiSource};
use exfor_doi::pipeline::run_merge;
use exfor_doi::store::{ArtifactStore, FileSource, files};

fn accepted(entry: &str, doi: &str) -> AcceptedMatch {
    AcceptedMatch {
        candidate: CandidateMatch {
            source_entry_id: entry.to_string(),
            source_title: "Elastic Scattering Study".to_string(),
            source_first_author: "Brischetto.M".to_string(),
            source_main_reference: String::new(),
            candidate_title: Some("Elastic Scattering Study".to_string()),
            candidate_doi: Some(doi.to_string()),
            candidate_first_author_surname: "Brischetto".to_string(),
            title_similarity: 1.0,
            author_similarity: 1.0,
        },
        accepted: true,
    }
}

/// Writes the source table and returns a provider for it.
fn write_source(dir: &std::path::Path) -> FileSource {
    let path = dir.join("exfor.json");
    let rows = json!([
        {"entry": "C0003", "first_author": "X.Li", "title": "Unmatched Entry"},
        {"entry": "A0001", "first_author": "Brischetto.M", "title": "Elastic Scattering Study",
         "main_reference": "J,PR/C,109,024601,2024", "main_doi": null},
        {"entry": "B0002", "first_author": "A.J.Koning", "title": "Fission Yields",
         "main_doi": "10.2/y"}
    ]);
    std::fs::write(&path, serde_json::to_vec(&rows).unwrap()).unwrap();
    FileSource::new(path)
}

fn setup() -> (tempfile::TempDir, ArtifactStore, FileSource) {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path().join("data"));
    let source = write_source(dir.path());
    store
        .write_accepted(&[accepted("A0001", "10.1/x"), accepted("B0002", "10.9/other")])
        .unwrap();
    (dir, store, source)
}

// =============================================================================
// Merge Semantics
// =============================================================================

#[test]
fn test_merge_assigns_provenance() {
    let (_dir, store, source) = setup();

    let table = run_merge(&source, &store).unwrap();
    let ids: Vec<&str> = table.iter().map(|r| r.entry_id.as_str()).collect();
    assert_eq!(ids, ["A0001", "B0002", "C0003"]);

    assert_eq!(table[0].doi.as_deref(), Some("10.1/x"));
    assert_eq!(table[0].doi_source, Some(DoiSource::Crossref));

    // native DOI wins over an accepted match
    assert_eq!(table[1].doi.as_deref(), Some("10.2/y"));
    assert_eq!(table[1].doi_source, Some(DoiSource::Exfor));

    assert!(table[2].doi.is_none());
    assert!(table[2].doi_source.is_none());
}

#[test]
fn test_merge_keeps_every_source_record() {
    let (_dir, store, source) = setup();

    let table = run_merge(&source, &store).unwrap();
    assert_eq!(table.len(), 3);
    assert!(table.iter().all(|r| r.doi.is_some() == r.doi_source.is_some()));
    assert_eq!(table[0].main_reference.as_deref(), Some("J,PR/C,109,024601,2024"));
}

#[test]
fn test_merge_snapshot_round_trips() {
    let (_dir, store, source) = setup();

    let table = run_merge(&source, &store).unwrap();
    assert_eq!(store.read_doi_table().unwrap(), table);
}

#[test]
fn test_merge_export_is_keyed_by_entry() {
    let (_dir, store, source) = setup();
    run_merge(&source, &store).unwrap();

    let text = std::fs::read_to_string(store.path(files::DOI_EXPORT)).unwrap();
    let export: serde_json::Value = serde_json::from_str(&text).unwrap();

    assert_eq!(export["A0001"]["doi"], "10.1/x");
    assert_eq!(export["A0001"]["doi_source"], "Crossref");
    assert_eq!(export["B0002"]["doi_source"], "EXFOR");
    assert!(export["C0003"]["doi"].is_null());
    assert!(export["A0001"].get("entry_id").is_none());
}

#[test]
fn test_merge_is_idempotent() {
    let (_dir, store, source) = setup();

    run_merge(&source, &store).unwrap();
    let export_first = std::fs::read(store.path(files::DOI_EXPORT)).unwrap();
    let snapshot_first = std::fs::read(store.path(files::DOI_SNAPSHOT)).unwrap();

    run_merge(&source, &store).unwrap();
    assert_eq!(std::fs::read(store.path(files::DOI_EXPORT)).unwrap(), export_first);
    assert_eq!(std::fs::read(store.path(files::DOI_SNAPSHOT)).unwrap(), snapshot_first);
}

// =============================================================================
// Missing Inputs
// =============================================================================

#[test]
fn test_merge_without_accepted_snapshot_fails() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path().join("data"));
    let source = write_source(dir.path());

    let err = run_merge(&source, &store).unwrap_err();
    assert!(matches!(err, exfor_doi::StoreError::Io { .. }));
    assert!(!store.path(files::DOI_EXPORT).exists());
}

#[test]
fn test_merge_with_empty_accepted_keeps_native_dois() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path().join("data"));
    let source = write_source(dir.path());
    store.write_accepted(&[]).unwrap();

    let table = run_merge(&source, &store).unwrap();
    let sources: Vec<Option<DoiSource>> = table.iter().map(|r| r.doi_source).collect();
    assert_eq!(sources, [None, Some(DoiSource::Exfor), None]);
}
