//! PubMed query construction from the user-facing topic and recency
//! selectors.
//!
//! The UI presents eleven disease facets plus an "All" aggregate. For a
//! single facet the query is the facet's label with its numeric menu prefix
//! ("3. ") and trailing parenthetical stripped, wrapped in parentheses. For
//! "All", every facet contributes a `[Title/Abstract]`-restricted synonym
//! group and the groups are OR'd together, so a record matching any single
//! facet's terms matches the aggregate query.

/// Canonical synonym groups, one per disease facet, in rank order.
/// Synonyms and abbreviations are OR'd within a group.
const FACET_TERMS: &[(&str, &[&str])] = &[
    ("ALS", &["amyotrophic lateral sclerosis", "ALS", "motor neuron disease"]),
    ("FTD", &["frontotemporal dementia", "FTD", "frontotemporal lobar degeneration"]),
    ("AD", &["Alzheimer's disease", "Alzheimer disease", "Alzheimer"]),
    ("PD", &["Parkinson's disease", "Parkinson disease", "Parkinson"]),
    ("HD", &["Huntington's disease", "Huntington disease", "Huntington"]),
    ("DLB", &["dementia with Lewy bodies", "Lewy body dementia", "DLB"]),
    ("MSA", &["multiple system atrophy", "MSA"]),
    ("PSP", &["progressive supranuclear palsy", "PSP"]),
    ("SCA", &["spinocerebellar ataxia", "SCA"]),
    ("CBD", &["corticobasal degeneration", "corticobasal syndrome", "CBD"]),
    ("OtherND", &["neurodegeneration", "neurodegenerative disease"]),
];

/// Menu labels shown to the user, in menu order.
pub const FACET_LABELS: [&str; 11] = [
    "1. Amyotrophic Lateral Sclerosis (ALS)",
    "2. Frontotemporal Dementia (FTD)",
    "3. Alzheimer's Disease (AD)",
    "4. Parkinson's Disease (PD)",
    "5. Huntington's Disease (HD)",
    "6. Dementia with Lewy Bodies (DLB)",
    "7. Multiple System Atrophy (MSA)",
    "8. Progressive Supranuclear Palsy (PSP)",
    "9. Spinocerebellar Ataxia (SCA)",
    "10. Corticobasal Degeneration (CBD)",
    "11. Other Neurodegenerative Diseases (other)",
];

/// Topic selector: one facet label as picked from the menu, or the
/// all-diseases aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Topic {
    All,
    Facet(String),
}

/// Recency selector. Any label the UI cannot map falls back to one week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recency {
    OneDay,
    ThreeDays,
    OneWeek,
    OneMonth,
}

impl Recency {
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "1 day" | "24h" | "1天" => Recency::OneDay,
            "3 days" | "3天" => Recency::ThreeDays,
            "1 week" | "1周" => Recency::OneWeek,
            "1 month" | "1个月" => Recency::OneMonth,
            _ => Recency::OneWeek,
        }
    }

    /// Lookback window in days, as passed to esearch's `reldate`.
    pub fn days(&self) -> u32 {
        match self {
            Recency::OneDay => 1,
            Recency::ThreeDays => 3,
            Recency::OneWeek => 7,
            Recency::OneMonth => 30,
        }
    }
}

/// Build the PubMed boolean query for a topic selection.
pub fn build_query(topic: &Topic) -> String {
    match topic {
        Topic::All => FACET_TERMS
            .iter()
            .map(|(_, terms)| facet_clause(terms))
            .collect::<Vec<_>>()
            .join(" OR "),
        Topic::Facet(label) => format!("({})", strip_label(label)),
    }
}

fn facet_clause(terms: &[&str]) -> String {
    let inner = terms
        .iter()
        .map(|t| format!("\"{t}\"[Title/Abstract]"))
        .collect::<Vec<_>>()
        .join(" OR ");
    format!("({inner})")
}

/// Strip the numeric menu prefix ("3. ") and a trailing parenthetical
/// annotation from a facet label, leaving the raw search text.
fn strip_label(label: &str) -> String {
    let mut s = label.trim();
    if let Some(dot) = s.find(". ") {
        if s[..dot].chars().all(|c| c.is_ascii_digit()) {
            s = &s[dot + 2..];
        }
    }
    if let Some(open) = s.rfind('(') {
        if s.ends_with(')') {
            s = &s[..open];
        }
    }
    s.trim().to_string()
}
