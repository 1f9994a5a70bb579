//! Space-delimited history of every scored candidate.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::error::{StoreError, StoreResult};
use crate::models::CandidateMatch;

/// Append-only audit dump, one line per candidate, no header.
///
/// Columns follow [`CandidateMatch`] field order; fields containing spaces
/// are quoted.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append all candidates of one query.
    pub fn append(&self, rows: &[CandidateMatch]) -> StoreResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StoreError::io(&self.path, e))?;

        let mut writer = csv::WriterBuilder::new()
            .delimiter(b' ')
            .has_headers(false)
            .from_writer(file);

        for row in rows {
            writer.serialize(row).map_err(|e| StoreError::csv(&self.path, e))?;
        }
        writer.flush().map_err(|e| StoreError::io(&self.path, e))
    }
}
