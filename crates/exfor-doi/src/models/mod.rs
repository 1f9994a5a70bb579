//! Data models for EXFOR records, Crossref results and pipeline rows.
//!
//! Optional fields use `#[serde(default)]` so partial rows and sparse API
//! responses deserialize cleanly.

mod candidate;
mod crossref;
mod record;

pub use candidate::{AcceptedMatch, Candidate, CandidateMatch, UNKNOWN_AUTHOR};
pub use crossref::{WorkAuthor, WorkItem, WorksMessage, WorksQuery, WorksResponse};
pub use record::{DoiRecord, DoiSource, SourceRecord};
