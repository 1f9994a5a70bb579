//! EXFOR bibliographic source table.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::error::{StoreError, StoreResult};
use crate::models::SourceRecord;

/// Read access to the full bibliographic table.
pub trait SourceProvider {
    /// Every known record, in table order.
    fn load_all(&self) -> StoreResult<Vec<SourceRecord>>;
}

/// Source table dumped to disk as CSV (with header) or a JSON array.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_csv(&self) -> StoreResult<Vec<SourceRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| StoreError::csv(&self.path, e))?;

        reader
            .deserialize()
            .collect::<Result<Vec<SourceRecord>, _>>()
            .map_err(|e| StoreError::csv(&self.path, e))
    }

    fn load_json(&self) -> StoreResult<Vec<SourceRecord>> {
        let file = File::open(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| StoreError::json(&self.path, e))
    }
}

impl SourceProvider for FileSource {
    fn load_all(&self) -> StoreResult<Vec<SourceRecord>> {
        let extension = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let records = match extension.as_deref() {
            Some("csv") => self.load_csv()?,
            Some("json") => self.load_json()?,
            _ => return Err(StoreError::UnsupportedFormat(self.path.clone())),
        };

        tracing::info!(path = %self.path.display(), records = records.len(), "Loaded source table");
        Ok(records)
    }
}

/// Records EXFOR has no DOI for, in table order.
#[must_use]
pub fn records_without_doi(records: &[SourceRecord]) -> Vec<SourceRecord> {
    records.iter().filter(|r| r.lacks_doi()).cloned().collect()
}
