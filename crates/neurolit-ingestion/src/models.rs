//! Data models for the retrieval stage.

use serde::{Deserialize, Serialize};

/// One bibliographic record as retrieved from PubMed, before enrichment.
///
/// Every field except `pmid` is filled with a documented default when the
/// detail document omits it, so downstream stages never see a hole:
/// "No Title", "No Abstract", "Unknown Journal", empty date/DOI/authors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCitationRecord {
    pub pmid: String,
    pub title: String,
    pub abstract_text: String,
    pub journal: String,
    /// Partial dates allowed: "2024", "2024-03", or "2024-03-15".
    pub pub_date: String,
    pub doi: Option<String>,
    /// Display names, truncated to the first three for prompt compactness.
    pub authors: Vec<String>,
}

impl RawCitationRecord {
    pub const NO_TITLE: &'static str = "No Title";
    pub const NO_ABSTRACT: &'static str = "No Abstract";
    pub const UNKNOWN_JOURNAL: &'static str = "Unknown Journal";
}
