//! neurolit-pipeline — end-to-end orchestration of one literature search.
//!
//! Stages run strictly sequentially (each stage's output is the next one's
//! input) with at most one in-flight external request:
//!   1. Build query from topic + recency
//!   2. esearch for PMIDs
//!   3. efetch raw records in chunks
//!   4. Enrich in grounded batches
//!   5. Parse the Markdown output
//!   6. Deduplicate and rank
//!
//! All transient failures are recovered inside the stages; only the
//! missing-credential and the two total-failure conditions (no identifiers,
//! no records) surface to the caller, each with its own message. A new
//! search cancels the previous one through the shared `CancelToken`.

use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{info, instrument};
use uuid::Uuid;

use neurolit_common::{CancelToken, NeurolitError};
use neurolit_ingestion::query::{build_query, Recency, Topic};
use neurolit_ingestion::sources::CitationSource;
use neurolit_llm::backend::GroundingCitation;
use neurolit_llm::enrich::Enricher;
use neurolit_llm::models::EnrichedPaper;
use neurolit_llm::parser;
use neurolit_ranker::{dedup_papers, rank_papers};

// ── Errors ────────────────────────────────────────────────────────────────────

/// The only conditions a search surfaces to the caller. The presentation
/// layer renders exactly one of these at a time, replacing any previous
/// result set.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("未配置 Gemini API 密钥，请设置 NEUROLIT_GEMINI_API_KEY 后重试。")]
    MissingCredential,

    /// Informational, not a failure: the window simply had no matches.
    #[error("所选主题在该时间范围内未找到文献，请扩大时间范围或更换主题。")]
    NoIdentifiers,

    /// Identifiers existed but every detail chunk failed.
    #[error("找到文献索引，但未能获取任何文献详情，请稍后重试。")]
    NoRecords,

    /// Distinguished from failure; rendered as "stopped", not as an error.
    #[error("检索已被用户停止。")]
    Cancelled,

    #[error("检索失败: {0}")]
    Internal(String),
}

impl From<NeurolitError> for SearchError {
    fn from(e: NeurolitError) -> Self {
        match e {
            NeurolitError::Cancelled => SearchError::Cancelled,
            other => SearchError::Internal(other.to_string()),
        }
    }
}

// ── Job / progress / result ───────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SearchJob {
    pub topic: Topic,
    pub recency: Recency,
}

/// Progress event emitted per stage (cloneable for broadcast).
#[derive(Debug, Clone, Serialize)]
pub struct SearchProgress {
    pub job_id: Uuid,
    pub stage: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SearchOutcome {
    pub job_id: Uuid,
    pub query: String,
    pub lookback_days: u32,
    pub pmids_found: usize,
    pub records_fetched: usize,
    pub failed_batches: Vec<usize>,
    pub papers: Vec<EnrichedPaper>,
    pub citations: Vec<GroundingCitation>,
    pub duration_ms: u64,
}

// ── Orchestrator ──────────────────────────────────────────────────────────────

/// Run one search end to end.
#[instrument(skip(source, enricher, cancel, progress_tx), fields(topic = ?job.topic))]
pub async fn run_search(
    job: SearchJob,
    source: &dyn CitationSource,
    enricher: &dyn Enricher,
    cancel: &CancelToken,
    progress_tx: Option<broadcast::Sender<SearchProgress>>,
) -> Result<SearchOutcome, SearchError> {
    // Credential check comes before any network call.
    if !enricher.is_configured() {
        return Err(SearchError::MissingCredential);
    }

    let job_id = Uuid::new_v4();
    let t0 = Instant::now();

    let emit = |stage: &str, message: String| {
        if let Some(ref tx) = progress_tx {
            let _ = tx.send(SearchProgress {
                job_id,
                stage: stage.to_string(),
                message,
            });
        }
    };

    let query = build_query(&job.topic);
    let lookback_days = job.recency.days();
    info!(job_id = %job_id, query = %query, lookback_days, "Starting literature search");
    emit("search", format!("正在检索近 {lookback_days} 天的文献…"));

    let pmids = source.search(&query, lookback_days, cancel).await?;
    if pmids.is_empty() {
        return Err(SearchError::NoIdentifiers);
    }
    emit("fetch", format!("找到 {} 篇文献，正在获取详情…", pmids.len()));

    let records = source.fetch(&pmids, cancel).await?;
    if records.is_empty() {
        return Err(SearchError::NoRecords);
    }
    emit(
        "enrich",
        format!("已获取 {} 篇详情，正在生成结构化档案…", records.len()),
    );

    let enrichment = enricher.enrich(&records, cancel).await?;

    emit("rank", "正在解析与排序…".to_string());
    let parsed = parser::parse(&enrichment.text);
    let mut papers = dedup_papers(parsed);
    rank_papers(&mut papers);

    let outcome = SearchOutcome {
        job_id,
        query,
        lookback_days,
        pmids_found: pmids.len(),
        records_fetched: records.len(),
        failed_batches: enrichment.failed_batches,
        papers,
        citations: enrichment.citations,
        duration_ms: t0.elapsed().as_millis() as u64,
    };

    info!(
        job_id = %job_id,
        pmids = outcome.pmids_found,
        records = outcome.records_fetched,
        papers = outcome.papers.len(),
        failed_batches = outcome.failed_batches.len(),
        duration_ms = outcome.duration_ms,
        "Search complete"
    );
    emit(
        "complete",
        format!("完成：{} 篇文献已排序。", outcome.papers.len()),
    );

    Ok(outcome)
}
