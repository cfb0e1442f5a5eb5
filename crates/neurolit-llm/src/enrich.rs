//! Enrichment batch processor.
//!
//! Raw PubMed records are partitioned into batches of ten and each batch is
//! sent as one grounded Gemini request. Batch size stays under the service's
//! response-length limit so every batch's output is syntactically complete
//! Markdown; a truncated trailing record would be dropped by the parser's
//! heading rule.
//!
//! Failures are isolated per batch: the batch index is recorded, a marker
//! block (with no `### ` heading, so the parser ignores it) stands in for
//! the lost records, and processing continues.

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use neurolit_common::{CancelToken, Result};
use neurolit_ingestion::models::RawCitationRecord;

use crate::backend::{
    GenerateRequest, GeminiBackend, GroundingCitation, Message, TextBackend,
};

pub const BATCH_SIZE: usize = 10;

/// Structured partial result of an enrichment run.
#[derive(Debug, Clone, Default)]
pub struct EnrichmentOutcome {
    /// Concatenated Markdown from every batch, failure markers inline.
    pub text: String,
    /// Grounding citations in batch order, deduplicated by URI.
    pub citations: Vec<GroundingCitation>,
    /// Zero-based indices of batches whose request failed.
    pub failed_batches: Vec<usize>,
}

#[async_trait]
pub trait Enricher: Send + Sync {
    async fn enrich(
        &self,
        records: &[RawCitationRecord],
        cancel: &CancelToken,
    ) -> Result<EnrichmentOutcome>;

    /// Whether the backing credential is present. Checked at pipeline entry
    /// before any network call.
    fn is_configured(&self) -> bool {
        true
    }
}

pub struct GeminiEnricher {
    backend: GeminiBackend,
}

impl GeminiEnricher {
    pub fn new(backend: GeminiBackend) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Enricher for GeminiEnricher {
    #[instrument(skip(self, records, cancel), fields(n_records = records.len()))]
    async fn enrich(
        &self,
        records: &[RawCitationRecord],
        cancel: &CancelToken,
    ) -> Result<EnrichmentOutcome> {
        enrich_in_batches(&self.backend, records, cancel).await
    }

    fn is_configured(&self) -> bool {
        self.backend.has_key()
    }
}

/// Sequentially process `records` in batches of [`BATCH_SIZE`] against any
/// text backend. One in-flight request at a time; cancellation is checked
/// before every call.
pub async fn enrich_in_batches(
    backend: &dyn TextBackend,
    records: &[RawCitationRecord],
    cancel: &CancelToken,
) -> Result<EnrichmentOutcome> {
    let mut outcome = EnrichmentOutcome::default();

    for (batch_idx, batch) in records.chunks(BATCH_SIZE).enumerate() {
        cancel.checkpoint()?;

        let req = GenerateRequest {
            messages: vec![Message::user(build_batch_prompt(batch))],
            enable_search: true,
            max_tokens: Some(16_384),
            temperature: Some(0.2),
        };

        match backend.generate(req).await {
            Ok(resp) => {
                info!(
                    batch = batch_idx,
                    n_records = batch.len(),
                    n_citations = resp.citations.len(),
                    "Enrichment batch complete"
                );
                outcome.text.push_str(resp.content.trim());
                outcome.text.push_str("\n---\n");
                outcome.citations.extend(resp.citations);
            }
            Err(e) => {
                warn!(batch = batch_idx, error = %e, "Enrichment batch failed, continuing");
                outcome.failed_batches.push(batch_idx);
                // No heading line, so the parser absorbs the marker.
                outcome.text.push_str(&format!(
                    "\n[第 {} 批文献处理失败: {}]\n---\n",
                    batch_idx + 1,
                    e
                ));
            }
        }
    }

    dedup_citations(&mut outcome.citations);
    Ok(outcome)
}

/// Keep the first citation per URI, preserving batch order.
fn dedup_citations(citations: &mut Vec<GroundingCitation>) {
    let mut seen = std::collections::HashSet::new();
    citations.retain(|c| seen.insert(c.uri.clone()));
}

const ELEVEN_FACETS: &str = "ALS（肌萎缩侧索硬化）、FTD（额颞叶痴呆）、AD（阿尔茨海默病）、\
PD（帕金森病）、HD（亨廷顿病）、DLB（路易体痴呆）、MSA（多系统萎缩）、\
PSP（进行性核上性麻痹）、SCA（脊髓小脑性共济失调）、CBD（皮质基底节变性）、\
其他神经退行性疾病";

/// One natural-language request covering every record in the batch, with the
/// fixed instruction template the parser's grammar depends on.
pub fn build_batch_prompt(batch: &[RawCitationRecord]) -> String {
    let mut prompt = String::new();
    prompt.push_str(&format!(
        "你是神经退行性疾病领域的文献情报助手。下面列出 {} 篇 PubMed 文献，\
         请逐篇生成结构化档案，一篇都不能遗漏。\n\n要求：\n\
         1. 每篇输出一条 Markdown 记录，以 \"### <英文标题>\" 开头，并以单独一行 \"---\" 结束。\n\
         2. 严格使用以下字段标签和顺序，每个字段单独一行：\n\
         **中文标题**、**第一作者**、**第一单位**、**通讯作者**、**期刊**、\
         **发表日期**（YYYY-MM-DD）、**PMID/DOI**、**影响因子**（数值，括注分区）、\
         **疾病类型**、**研究类型**、**样本量**、**链接**、**研究问题**、\
         **结论要点**、**摘要**、**临床终点详情**。\n\
         3. 影响因子与中科院分区必须通过联网检索核实最新数据；查不到时填 N/A。\n\
         4. 疾病类型必须归入以下 11 类之一：{}。\n\
         5. 摘要缺失时注明“全文不可用”。\n\n",
        batch.len(),
        ELEVEN_FACETS
    ));

    for (i, r) in batch.iter().enumerate() {
        prompt.push_str(&format!(
            "[{}] PMID: {}\nDOI: {}\n标题: {}\n期刊: {} ({})\n作者: {}\n摘要: {}\n\n",
            i + 1,
            r.pmid,
            r.doi.as_deref().unwrap_or("无"),
            r.title,
            r.journal,
            r.pub_date,
            r.authors.join(", "),
            r.abstract_text,
        ));
    }
    prompt
}
