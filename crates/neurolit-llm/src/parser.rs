//! Markdown record parser.
//!
//! The enrichment service is instructed to emit one record per paper in a
//! fixed field grammar: a `### <EnglishTitle>` heading, bold Chinese field
//! labels, and a `---` delimiter between records. This parser is the other
//! half of that contract. It is a pure, total function: any string input
//! yields a (possibly empty) record list, never an error.
//!
//! Segments without the `### ` heading are silently skipped — that is how
//! inline batch-failure markers are absorbed without corrupting the result.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

use crate::models::EnrichedPaper;

pub const FIELD_DEFAULT: &str = "N/A";

lazy_static! {
    /// `**标签**: 值` (full-width or ASCII colon).
    static ref LABEL_LINE: Regex = Regex::new(r"^\*\*(.+?)\*\*\s*[:：]\s*(.*)$").unwrap();
    /// Trailing parenthetical on the impact-factor line, e.g. "12.4 (Q1)".
    static ref TRAILING_PAREN: Regex = Regex::new(r"[（(]([^()（）]+)[)）]\s*$").unwrap();
}

/// Parse concatenated enrichment output into structured records.
pub fn parse(text: &str) -> Vec<EnrichedPaper> {
    let mut papers = Vec::new();
    let mut counter = 0usize;

    for (seg_idx, segment) in text.split("---").enumerate() {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        if let Some(paper) = parse_segment(segment, seg_idx, counter) {
            papers.push(paper);
            counter += 1;
        }
    }
    papers
}

fn parse_segment(segment: &str, seg_idx: usize, counter: usize) -> Option<EnrichedPaper> {
    // A record is recognized only by its heading line.
    let title_en = segment
        .lines()
        .find_map(|l| l.trim().strip_prefix("### "))
        .map(str::trim)?
        .to_string();
    if title_en.is_empty() {
        return None;
    }

    let fields = collect_fields(segment);
    let get = |label: &str| -> String {
        fields
            .get(label)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| FIELD_DEFAULT.to_string())
    };

    let title_zh = match fields.get("中文标题").map(|v| v.trim()) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => title_en.clone(),
    };
    let impact_factor = get("影响因子");
    let cas_quartile = TRAILING_PAREN
        .captures(&impact_factor)
        .map(|c| c[1].trim().to_string());
    let url = fields
        .get("链接")
        .map(|v| v.trim().to_string())
        .unwrap_or_default();

    Some(EnrichedPaper {
        id: format!("paper-{seg_idx}-{counter}"),
        title_en,
        title_zh,
        first_author: get("第一作者"),
        first_institution: get("第一单位"),
        corresponding_author: get("通讯作者"),
        journal: get("期刊"),
        publish_date: get("发表日期"),
        pmid_doi: get("PMID/DOI"),
        impact_factor,
        cas_quartile,
        disease_type: get("疾病类型"),
        research_type: get("研究类型"),
        sample_size: get("样本量"),
        clinical_question: get("研究问题"),
        key_conclusions: get("结论要点"),
        abstract_text: get("摘要"),
        clinical_endpoints: get("临床终点详情"),
        url,
        raw_block: segment.to_string(),
    })
}

/// Label-anchored extraction: a field's value runs from its `**label**:`
/// line to the next label line (or end of segment), continuation lines
/// included.
fn collect_fields(segment: &str) -> HashMap<String, String> {
    let mut fields: HashMap<String, String> = HashMap::new();
    let mut current: Option<String> = None;

    for line in segment.lines() {
        let trimmed = line.trim();
        if let Some(caps) = LABEL_LINE.captures(trimmed) {
            let label = caps[1].trim().to_string();
            let value = caps[2].to_string();
            fields.insert(label.clone(), value);
            current = Some(label);
        } else if trimmed.starts_with("### ") {
            current = None;
        } else if let Some(ref label) = current {
            if !trimmed.is_empty() {
                let entry = fields.get_mut(label).unwrap();
                if !entry.is_empty() {
                    entry.push('\n');
                }
                entry.push_str(trimmed);
            }
        }
    }
    fields
}
