//! Structured paper records produced by the enrichment parser.

use serde::{Deserialize, Serialize};

/// One enriched literature record as exposed to presentation and export.
///
/// Immutable after parsing. The synthetic `id` is unique within the parse
/// call that produced it (segment index + monotonic counter); it carries no
/// content-derived meaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedPaper {
    pub id: String,
    pub title_en: String,
    pub title_zh: String,
    pub first_author: String,
    pub first_institution: String,
    pub corresponding_author: String,
    pub journal: String,
    pub publish_date: String,
    /// Composite "PMID: 12345678 / DOI: 10.x/..." free-text field.
    pub pmid_doi: String,
    /// Free text, may be "N/A".
    pub impact_factor: String,
    /// CAS quartile extracted from the impact-factor line, when present.
    pub cas_quartile: Option<String>,
    pub disease_type: String,
    pub research_type: String,
    pub sample_size: String,
    pub clinical_question: String,
    pub key_conclusions: String,
    pub abstract_text: String,
    pub clinical_endpoints: String,
    pub url: String,
    /// The delimited source segment, kept for debugging and fallback display.
    pub raw_block: String,
}
