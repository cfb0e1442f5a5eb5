//! First-seen-wins deduplication of parsed records.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

use neurolit_llm::models::EnrichedPaper;

lazy_static! {
    /// A PMID-like run of 6+ digits inside the free-text PMID/DOI field.
    static ref PMID_RE: Regex = Regex::new(r"\d{6,}").unwrap();
}

/// Dedup key precedence: numeric identifier from the PMID/DOI field if one
/// exists, otherwise a normalized prefix of the English title.
pub fn dedup_key(paper: &EnrichedPaper) -> String {
    if let Some(m) = PMID_RE.find(&paper.pmid_doi) {
        return format!("pmid:{}", m.as_str());
    }
    let normalized: String = paper
        .title_en
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .take(50)
        .collect();
    format!("title:{normalized}")
}

/// Collapse records denoting the same publication, keeping the first one
/// observed in parse order (first-seen-wins, not highest-quality-wins).
pub fn dedup_papers(papers: Vec<EnrichedPaper>) -> Vec<EnrichedPaper> {
    let mut seen = HashSet::new();
    papers
        .into_iter()
        .filter(|p| seen.insert(dedup_key(p)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper(id: &str, title: &str, pmid_doi: &str) -> EnrichedPaper {
        EnrichedPaper {
            id: id.to_string(),
            title_en: title.to_string(),
            title_zh: String::new(),
            first_author: String::new(),
            first_institution: String::new(),
            corresponding_author: String::new(),
            journal: String::new(),
            publish_date: String::new(),
            pmid_doi: pmid_doi.to_string(),
            impact_factor: "N/A".to_string(),
            cas_quartile: None,
            disease_type: String::new(),
            research_type: String::new(),
            sample_size: String::new(),
            clinical_question: String::new(),
            key_conclusions: String::new(),
            abstract_text: String::new(),
            clinical_endpoints: String::new(),
            url: String::new(),
            raw_block: String::new(),
        }
    }

    #[test]
    fn test_same_pmid_collapses_first_seen_wins() {
        let papers = vec![
            paper("a", "Original wording", "PMID: 38012345"),
            paper("b", "Different wording", "PMID: 38012345 / DOI: 10.1/x"),
            paper("c", "Third", "PMID: 38099999"),
        ];
        let out = dedup_papers(papers);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].id, "a");
        assert_eq!(out[1].id, "c");
    }

    #[test]
    fn test_short_digit_runs_do_not_count_as_pmid() {
        // 5 digits: falls through to the title key.
        let a = paper("a", "Same Title Here", "DOI: 10.1016/12345");
        let b = paper("b", "same title here!", "DOI: 10.1016/54321");
        let out = dedup_papers(vec![a, b]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "a");
    }

    #[test]
    fn test_title_key_normalizes_case_and_punctuation() {
        let a = paper("a", "Tofersen: a phase 3 trial", "N/A");
        let b = paper("b", "TOFERSEN — A Phase 3 Trial", "N/A");
        assert_eq!(dedup_key(&a), dedup_key(&b));
    }

    #[test]
    fn test_title_key_truncates_to_fifty_chars() {
        let long_a = format!("{}{}", "a".repeat(50), "different tail one");
        let long_b = format!("{}{}", "a".repeat(50), "completely other tail");
        let a = paper("a", &long_a, "N/A");
        let b = paper("b", &long_b, "N/A");
        assert_eq!(dedup_key(&a), dedup_key(&b));
    }

    #[test]
    fn test_distinct_pmids_survive() {
        let out = dedup_papers(vec![
            paper("a", "T", "PMID: 111111"),
            paper("b", "T", "PMID: 222222"),
        ]);
        // Same title but different PMIDs: both kept, PMID key wins.
        assert_eq!(out.len(), 2);
    }
}
