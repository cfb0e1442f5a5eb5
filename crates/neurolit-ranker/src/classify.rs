//! Pure classification maps over model-generated free text.
//!
//! Disease type and research type come back from the enrichment service as
//! prose with no schema enforcement beyond the prompt, so both maps are
//! permissive keyword lookups with an explicit unknown sentinel. They never
//! fail closed on text outside the eleven canonical facets.

/// Rank for text that matches no known facet (sorts last).
pub const UNKNOWN_RANK: u8 = 99;

/// (rank, substring keywords, abbreviation tokens) per facet.
const DISEASE_TABLE: &[(u8, &[&str], &[&str])] = &[
    (1, &["amyotrophic", "肌萎缩侧索", "渐冻", "motor neuron disease"], &["ALS", "MND"]),
    (2, &["frontotemporal", "额颞叶"], &["FTD", "FTLD"]),
    (3, &["alzheimer", "阿尔茨海默"], &["AD"]),
    (4, &["parkinson", "帕金森"], &["PD"]),
    (5, &["huntington", "亨廷顿"], &["HD"]),
    (6, &["lewy", "路易体"], &["DLB", "LBD"]),
    (7, &["multiple system atrophy", "多系统萎缩"], &["MSA"]),
    (8, &["supranuclear", "核上性麻痹"], &["PSP"]),
    (9, &["spinocerebellar", "脊髓小脑"], &["SCA"]),
    (10, &["corticobasal", "皮质基底"], &["CBD", "CBS"]),
];

/// Map disease-type free text to a rank, 1 (ALS) … 10 (CBD).
/// Unrecognized or general text ranks worst.
pub fn disease_rank(text: &str) -> u8 {
    let lower = text.to_lowercase();
    for (rank, keywords, abbrevs) in DISEASE_TABLE {
        if keywords.iter().any(|k| lower.contains(k)) {
            return *rank;
        }
        // Abbreviations only count as standalone tokens: "ALS" must not
        // fire on "trials".
        if abbrevs.iter().any(|a| has_token(text, a)) {
            return *rank;
        }
    }
    UNKNOWN_RANK
}

fn has_token(text: &str, token: &str) -> bool {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .any(|w| w == token)
}

const REGISTRY_TYPE_KEYWORDS: &[&str] = &[
    "registry",
    "registration",
    "clinical trial",
    "临床试验",
    "注册",
];

const REGISTRY_DOMAINS: &[&str] = &["clinicaltrials.gov", "chictr.org", "isrctn.com"];

/// Binary category score used as the last ranking key.
///
/// Clinical-trial/registry records score 1 and therefore sort after plain
/// literature. This direction is preserved from the existing product
/// behavior; see DESIGN.md before "fixing" it.
pub fn category_score(research_type: &str, url: &str) -> u8 {
    let rt = research_type.to_lowercase();
    let url = url.to_lowercase();
    if REGISTRY_TYPE_KEYWORDS.iter().any(|k| rt.contains(k))
        || REGISTRY_DOMAINS.iter().any(|d| url.contains(d))
    {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_facet_ranks() {
        assert_eq!(disease_rank("ALS"), 1);
        assert_eq!(disease_rank("肌萎缩侧索硬化（渐冻症）"), 1);
        assert_eq!(disease_rank("FTD（额颞叶痴呆）"), 2);
        assert_eq!(disease_rank("Alzheimer's disease"), 3);
        assert_eq!(disease_rank("帕金森病"), 4);
        assert_eq!(disease_rank("Huntington disease"), 5);
        assert_eq!(disease_rank("Dementia with Lewy bodies"), 6);
        assert_eq!(disease_rank("多系统萎缩"), 7);
        assert_eq!(disease_rank("Progressive supranuclear palsy"), 8);
        assert_eq!(disease_rank("SCA3"), 99); // "SCA3" is not the token "SCA"
        assert_eq!(disease_rank("spinocerebellar ataxia type 3"), 9);
        assert_eq!(disease_rank("CBD"), 10);
    }

    #[test]
    fn test_unknown_and_general_text_rank_worst() {
        assert_eq!(disease_rank("其他神经退行性疾病"), UNKNOWN_RANK);
        assert_eq!(disease_rank("general neurology"), UNKNOWN_RANK);
        assert_eq!(disease_rank(""), UNKNOWN_RANK);
        assert_eq!(disease_rank("N/A"), UNKNOWN_RANK);
    }

    #[test]
    fn test_abbreviation_requires_standalone_token() {
        // "trials" contains "als" but must not classify as ALS.
        assert_eq!(disease_rank("randomized controlled trials"), UNKNOWN_RANK);
        assert_eq!(disease_rank("phase 2 ALS study"), 1);
    }

    #[test]
    fn test_category_score_registry_signals() {
        assert_eq!(category_score("clinical trial registration", ""), 1);
        assert_eq!(category_score("临床试验注册", ""), 1);
        assert_eq!(
            category_score("cohort study", "https://clinicaltrials.gov/study/NCT05633459"),
            1
        );
        assert_eq!(category_score("meta-analysis", "https://pubmed.ncbi.nlm.nih.gov/1/"), 0);
        assert_eq!(category_score("N/A", ""), 0);
    }
}
