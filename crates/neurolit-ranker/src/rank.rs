//! Three-key composite ranking of the deduplicated result set.
//!
//! Keys, first non-zero decides:
//!   1. disease-facet rank ascending (ALS first);
//!   2. impact factor descending, records without a parsable positive value
//!      after records with one, both-unparsable ties carry on;
//!   3. category score ascending (registry/clinical-trial records last).
//! No fourth key: equal records keep their parse order (stable sort).

use std::cmp::Ordering;

use lazy_static::lazy_static;
use regex::Regex;

use neurolit_llm::models::EnrichedPaper;

use crate::classify::{category_score, disease_rank};

lazy_static! {
    /// Leading numeric token of the impact-factor field ("12.4 (Q1)" → 12.4).
    static ref LEADING_NUMBER: Regex = Regex::new(r"^\s*(\d+(?:\.\d+)?)").unwrap();
}

/// Parse the impact factor's leading numeric token. Zero and unparsable
/// values count as "no value" and sort after any positive one.
pub fn impact_factor_value(text: &str) -> Option<f64> {
    let v: f64 = LEADING_NUMBER.captures(text)?[1].parse().ok()?;
    (v > 0.0).then_some(v)
}

pub fn compare_papers(a: &EnrichedPaper, b: &EnrichedPaper) -> Ordering {
    // Key 1: disease facet rank, ascending.
    let rank_cmp = disease_rank(&a.disease_type).cmp(&disease_rank(&b.disease_type));
    if rank_cmp != Ordering::Equal {
        return rank_cmp;
    }

    // Key 2: impact factor, descending; missing sorts last.
    match (
        impact_factor_value(&a.impact_factor),
        impact_factor_value(&b.impact_factor),
    ) {
        (Some(va), Some(vb)) => {
            let if_cmp = vb.partial_cmp(&va).unwrap_or(Ordering::Equal);
            if if_cmp != Ordering::Equal {
                return if_cmp;
            }
        }
        (Some(_), None) => return Ordering::Less,
        (None, Some(_)) => return Ordering::Greater,
        (None, None) => {}
    }

    // Key 3: category score, ascending.
    category_score(&a.research_type, &a.url).cmp(&category_score(&b.research_type, &b.url))
}

/// Stable in-place sort under [`compare_papers`]. The order is fixed at this
/// point; later mutations (bookmarking) must not re-sort.
pub fn rank_papers(papers: &mut [EnrichedPaper]) {
    papers.sort_by(compare_papers);
}
