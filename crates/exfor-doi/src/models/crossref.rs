//! Crossref works API request and response shapes.
//!
//! Only the fields requested through `select=title,author,DOI` are modelled.
//! Every field tolerates being missing or `null`.

use serde::{Deserialize, Serialize};

use super::candidate::{Candidate, UNKNOWN_AUTHOR};

/// Top-level works search response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorksResponse {
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub message: Option<WorksMessage>,
}

impl WorksResponse {
    /// Items in API ranking order.
    #[must_use]
    pub fn into_items(self) -> Vec<WorkItem> {
        self.message.and_then(|m| m.items).unwrap_or_default()
    }
}

/// The `message` body of a works search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WorksMessage {
    #[serde(default)]
    pub total_results: Option<u64>,

    #[serde(default)]
    pub items: Option<Vec<WorkItem>>,
}

/// One work in the search results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkItem {
    #[serde(default)]
    pub title: Option<Vec<String>>,

    #[serde(default)]
    pub author: Option<Vec<WorkAuthor>>,

    #[serde(rename = "DOI", default)]
    pub doi: Option<String>,
}

/// A contributor of a work.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkAuthor {
    #[serde(default)]
    pub given: Option<String>,

    #[serde(default)]
    pub family: Option<String>,
}

impl WorkItem {
    /// First title, if any.
    #[must_use]
    pub fn first_title(&self) -> Option<&str> {
        self.title.as_ref()?.first().map(String::as_str)
    }

    /// Family name of the first listed author, if any.
    #[must_use]
    pub fn first_author_family(&self) -> Option<&str> {
        self.author.as_ref()?.first()?.family.as_deref().filter(|f| !f.is_empty())
    }

    /// Extract the fields the matcher scores.
    #[must_use]
    pub fn into_candidate(self) -> Candidate {
        let title = self.first_title().map(str::to_string);
        let surname = self.first_author_family().unwrap_or(UNKNOWN_AUTHOR).to_string();
        Candidate {
            title,
            doi: self.doi.filter(|d| !d.is_empty()),
            first_author_surname: surname,
        }
    }
}

/// Parameters of one works search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorksQuery {
    /// `query.title`
    pub title: String,
    /// `query.bibliographic`, surname and year joined by ","
    pub bibliographic: String,
    /// `rows`
    pub rows: usize,
}

impl WorksQuery {
    /// Build a query from its parts.
    #[must_use]
    pub fn new(title: &str, surname: &str, year: Option<&str>, rows: usize) -> Self {
        let bibliographic = match year {
            Some(year) => format!("{surname},{year}"),
            None => surname.to_string(),
        };
        Self { title: title.to_string(), bibliographic, rows }
    }
}
