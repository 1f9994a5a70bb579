//! Persisted artifacts of a run.
//!
//! Each table is written twice: a typed snapshot (`*.snapshot.json`, compact,
//! wrapped in a `{kind, version, rows}` header that is checked on load) and a
//! human-readable export (`*.json`, indented). Everything is regenerated per
//! run except the audit history, which is appended to.

mod audit;
mod source;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub use audit::AuditLog;
pub use source::{FileSource, SourceProvider, records_without_doi};

use crate::error::{StoreError, StoreResult};
use crate::models::{AcceptedMatch, CandidateMatch, DoiRecord, DoiSource};

/// Snapshot layout version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// File names inside the data directory.
pub mod files {
    pub const PROBABLE_SNAPSHOT: &str = "probable.snapshot.json";
    pub const PROBABLE_EXPORT: &str = "probable.json";
    pub const ACCEPTED_SNAPSHOT: &str = "crossref.snapshot.json";
    pub const ACCEPTED_EXPORT: &str = "crossref.json";
    pub const DOI_SNAPSHOT: &str = "doi.snapshot.json";
    pub const DOI_EXPORT: &str = "doi.json";
    pub const AUDIT_HISTORY: &str = "probables.txt";
}

const KIND_PROBABLE: &str = "probable";
const KIND_ACCEPTED: &str = "crossref";
const KIND_DOI: &str = "doi";

#[derive(Serialize)]
struct SnapshotOut<'a, T> {
    kind: &'a str,
    version: u32,
    rows: &'a [T],
}

#[derive(Deserialize)]
struct SnapshotIn<T> {
    kind: String,
    version: u32,
    rows: Vec<T>,
}

/// Row of the DOI export, keyed by entry id outside.
#[derive(Serialize)]
struct DoiIndexRow<'a> {
    first_author: Option<&'a str>,
    title: Option<&'a str>,
    main_reference: Option<&'a str>,
    doi: Option<&'a str>,
    doi_source: Option<DoiSource>,
}

/// Directory holding all artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of an artifact inside the store.
    #[must_use]
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Audit history appended to by every run.
    #[must_use]
    pub fn audit_log(&self) -> AuditLog {
        AuditLog::new(self.path(files::AUDIT_HISTORY))
    }

    /// Persist the most-probable candidate per record.
    pub fn write_candidates(&self, rows: &[CandidateMatch]) -> StoreResult<()> {
        self.write_snapshot(files::PROBABLE_SNAPSHOT, KIND_PROBABLE, rows)?;
        self.write_pretty(files::PROBABLE_EXPORT, &rows)
    }

    pub fn read_candidates(&self) -> StoreResult<Vec<CandidateMatch>> {
        self.read_snapshot(files::PROBABLE_SNAPSHOT, KIND_PROBABLE)
    }

    /// Persist the accepted matches.
    pub fn write_accepted(&self, rows: &[AcceptedMatch]) -> StoreResult<()> {
        self.write_snapshot(files::ACCEPTED_SNAPSHOT, KIND_ACCEPTED, rows)?;
        self.write_pretty(files::ACCEPTED_EXPORT, &rows)
    }

    pub fn read_accepted(&self) -> StoreResult<Vec<AcceptedMatch>> {
        self.read_snapshot(files::ACCEPTED_SNAPSHOT, KIND_ACCEPTED)
    }

    /// Persist the final DOI table; the export is an object keyed by entry id.
    pub fn write_doi_table(&self, rows: &[DoiRecord]) -> StoreResult<()> {
        self.write_snapshot(files::DOI_SNAPSHOT, KIND_DOI, rows)?;

        let index: BTreeMap<&str, DoiIndexRow<'_>> = rows
            .iter()
            .map(|r| {
                let row = DoiIndexRow {
                    first_author: r.first_author.as_deref(),
                    title: r.title.as_deref(),
                    main_reference: r.main_reference.as_deref(),
                    doi: r.doi.as_deref(),
                    doi_source: r.doi_source,
                };
                (r.entry_id.as_str(), row)
            })
            .collect();
        self.write_pretty(files::DOI_EXPORT, &index)
    }

    pub fn read_doi_table(&self) -> StoreResult<Vec<DoiRecord>> {
        self.read_snapshot(files::DOI_SNAPSHOT, KIND_DOI)
    }

    fn ensure_dir(&self) -> StoreResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| StoreError::io(&self.dir, e))
    }

    fn create(&self, name: &str) -> StoreResult<(PathBuf, BufWriter<File>)> {
        self.ensure_dir()?;
        let path = self.path(name);
        let file = File::create(&path).map_err(|e| StoreError::io(&path, e))?;
        Ok((path, BufWriter::new(file)))
    }

    fn write_snapshot<T: Serialize>(&self, name: &str, kind: &str, rows: &[T]) -> StoreResult<()> {
        let (path, mut writer) = self.create(name)?;
        let snapshot = SnapshotOut { kind, version: SNAPSHOT_VERSION, rows };
        serde_json::to_writer(&mut writer, &snapshot).map_err(|e| StoreError::json(&path, e))?;
        finish(&path, writer)
    }

    fn read_snapshot<T: DeserializeOwned>(&self, name: &str, kind: &str) -> StoreResult<Vec<T>> {
        let path = self.path(name);
        let file = File::open(&path).map_err(|e| StoreError::io(&path, e))?;
        let snapshot: SnapshotIn<T> = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| StoreError::json(&path, e))?;

        if snapshot.kind != kind || snapshot.version != SNAPSHOT_VERSION {
            return Err(StoreError::SnapshotMismatch {
                path,
                expected: format!("{kind} v{SNAPSHOT_VERSION}"),
                found: format!("{} v{}", snapshot.kind, snapshot.version),
            });
        }
        Ok(snapshot.rows)
    }

    fn write_pretty<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> StoreResult<()> {
        let (path, mut writer) = self.create(name)?;
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
        value.serialize(&mut serializer).map_err(|e| StoreError::json(&path, e))?;
        finish(&path, writer)
    }
}

fn finish(path: &Path, mut writer: BufWriter<File>) -> StoreResult<()> {
    writer.write_all(b"\n").map_err(|e| StoreError::io(path, e))?;
    writer.flush().map_err(|e| StoreError::io(path, e))
}
