//! EXFOR bibliographic records and the merged DOI table.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

/// One entry of the EXFOR bibliographic table.
///
/// Column aliases accept the native EXFOR dump (`entry`, `main_doi`) as well
/// as the field names used here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// EXFOR entry number, the unique key.
    #[serde(alias = "entry")]
    pub entry_id: String,

    /// First author, initials and surname joined by "." (e.g. "M.Brischetto").
    #[serde(default)]
    pub first_author: Option<String>,

    /// Title of the main reference. Some entries have none.
    #[serde(default)]
    pub title: Option<String>,

    /// Main reference code (e.g. "J,PR/C,109,024601,2024").
    #[serde(default)]
    pub main_reference: Option<String>,

    /// DOI already known to EXFOR.
    #[serde(default, alias = "main_doi")]
    pub existing_doi: Option<String>,

    /// Publication year of the main reference. Tables exported with numeric
    /// columns carry it as an integer (or a float when the column has gaps).
    #[serde(default, deserialize_with = "year_from_any")]
    pub year: Option<String>,
}

/// Accepts a year written as a string, an integer, a whole float or null.
fn year_from_any<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_option(OptionalYear)
}

struct OptionalYear;

impl<'de> Visitor<'de> for OptionalYear {
    type Value = Option<String>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a year as a string or number, or null")
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(Year).map(Some)
    }
}

struct Year;

impl Visitor<'_> for Year {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a year as a string or number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(v.to_string())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        if v.is_finite() && v.fract().abs() < f64::EPSILON {
            Ok(format!("{v:.0}"))
        } else {
            Err(E::invalid_value(de::Unexpected::Float(v), &self))
        }
    }
}

impl SourceRecord {
    /// Create a record with only an entry id.
    #[must_use]
    pub fn new(entry_id: impl Into<String>) -> Self {
        Self { entry_id: entry_id.into(), ..Default::default() }
    }

    /// Set the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the first author.
    #[must_use]
    pub fn with_first_author(mut self, author: impl Into<String>) -> Self {
        self.first_author = Some(author.into());
        self
    }

    /// Set the main reference.
    #[must_use]
    pub fn with_main_reference(mut self, reference: impl Into<String>) -> Self {
        self.main_reference = Some(reference.into());
        self
    }

    /// Set the native DOI.
    #[must_use]
    pub fn with_doi(mut self, doi: impl Into<String>) -> Self {
        self.existing_doi = Some(doi.into());
        self
    }

    /// Set the year.
    #[must_use]
    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    /// Title, or "" when absent.
    #[must_use]
    pub fn title_or_empty(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    /// First author, or "" when absent.
    #[must_use]
    pub fn first_author_or_empty(&self) -> &str {
        self.first_author.as_deref().unwrap_or("")
    }

    /// Main reference, or "" when absent.
    #[must_use]
    pub fn main_reference_or_empty(&self) -> &str {
        self.main_reference.as_deref().unwrap_or("")
    }

    /// Native DOI, treating blank values as absent.
    #[must_use]
    pub fn native_doi(&self) -> Option<&str> {
        non_blank(self.existing_doi.as_deref())
    }

    /// Year, treating blank values as absent.
    #[must_use]
    pub fn year(&self) -> Option<&str> {
        non_blank(self.year.as_deref())
    }

    /// True when EXFOR has no DOI for this entry.
    #[must_use]
    pub fn lacks_doi(&self) -> bool {
        self.native_doi().is_none()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Where the DOI of a merged record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoiSource {
    /// Recorded in EXFOR itself.
    #[serde(rename = "EXFOR")]
    Exfor,
    /// Discovered through a Crossref match.
    #[serde(rename = "Crossref")]
    Crossref,
}

impl DoiSource {
    /// Label used in exports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exfor => "EXFOR",
            Self::Crossref => "Crossref",
        }
    }
}

impl std::fmt::Display for DoiSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the final DOI table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoiRecord {
    /// EXFOR entry number.
    pub entry_id: String,
    /// First author as recorded in EXFOR.
    pub first_author: Option<String>,
    /// Title as recorded in EXFOR.
    pub title: Option<String>,
    /// Main reference code.
    pub main_reference: Option<String>,
    /// Authoritative DOI, if any.
    pub doi: Option<String>,
    /// Provenance of `doi`.
    pub doi_source: Option<DoiSource>,
}

impl DoiRecord {
    /// Initial row for a source record: native DOI carried over, no source yet.
    #[must_use]
    pub fn from_source(record: &SourceRecord) -> Self {
        Self {
            entry_id: record.entry_id.clone(),
            first_author: record.first_author.clone(),
            title: record.title.clone(),
            main_reference: record.main_reference.clone(),
            doi: record.native_doi().map(str::to_string),
            doi_source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_doi_is_absent() {
        let record = SourceRecord::new("10001").with_doi("  ");
        assert!(record.native_doi().is_none());
        assert!(record.lacks_doi());
    }

    #[test]
    fn test_native_doi_is_trimmed() {
        let record = SourceRecord::new("10001").with_doi(" 10.2/y ");
        assert_eq!(record.native_doi(), Some("10.2/y"));
    }

    #[test]
    fn test_deserialize_exfor_column_names() {
        let json = serde_json::json!({
            "entry": "A0001",
            "first_author": "M.Brischetto",
            "title": "Elastic Scattering Study",
            "main_reference": "J,PR/C,109,024601,2024",
            "main_doi": null,
            "year": "2024"
        });
        let record: SourceRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.entry_id, "A0001");
        assert_eq!(record.year(), Some("2024"));
        assert!(record.lacks_doi());
    }

    #[test]
    fn test_year_accepts_numbers_and_null() {
        let rows = serde_json::json!([
            {"entry": "1", "year": 2024},
            {"entry": "2", "year": 1998.0},
            {"entry": "3", "year": "2019"},
            {"entry": "4", "year": null},
            {"entry": "5"}
        ]);
        let records: Vec<SourceRecord> = serde_json::from_value(rows).unwrap();
        let years: Vec<Option<&str>> = records.iter().map(SourceRecord::year).collect();
        assert_eq!(years, [Some("2024"), Some("1998"), Some("2019"), None, None]);
    }

    #[test]
    fn test_year_rejects_fractional_float() {
        let row = serde_json::json!({"entry": "1", "year": 2024.5});
        assert!(serde_json::from_value::<SourceRecord>(row).is_err());
    }

    #[test]
    fn test_doi_source_serializes_as_labels() {
        assert_eq!(serde_json::to_string(&DoiSource::Exfor).unwrap(), "\"EXFOR\"");
        assert_eq!(serde_json::to_string(&DoiSource::Crossref).unwrap(), "\"Crossref\"");
    }
}
