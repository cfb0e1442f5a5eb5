//! End-to-end pipeline tests over mocked collaborators.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use neurolit_common::{CancelToken, Result};
use neurolit_ingestion::models::RawCitationRecord;
use neurolit_ingestion::query::{Recency, Topic};
use neurolit_ingestion::sources::CitationSource;
use neurolit_llm::enrich::{Enricher, EnrichmentOutcome};
use neurolit_pipeline::{run_search, SearchError, SearchJob};

struct MockSource {
    ids: Vec<String>,
    records: Vec<RawCitationRecord>,
    search_calls: AtomicUsize,
}

impl MockSource {
    fn new(ids: Vec<&str>, records: Vec<RawCitationRecord>) -> Self {
        Self {
            ids: ids.into_iter().map(String::from).collect(),
            records,
            search_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CitationSource for MockSource {
    async fn search(
        &self,
        _query: &str,
        _lookback_days: u32,
        cancel: &CancelToken,
    ) -> Result<Vec<String>> {
        cancel.checkpoint()?;
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.ids.clone())
    }

    async fn fetch(
        &self,
        _pmids: &[String],
        cancel: &CancelToken,
    ) -> Result<Vec<RawCitationRecord>> {
        cancel.checkpoint()?;
        Ok(self.records.clone())
    }
}

struct MockEnricher {
    markdown: String,
    configured: bool,
    calls: AtomicUsize,
}

impl MockEnricher {
    fn new(markdown: &str) -> Self {
        Self {
            markdown: markdown.to_string(),
            configured: true,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Enricher for MockEnricher {
    async fn enrich(
        &self,
        _records: &[RawCitationRecord],
        cancel: &CancelToken,
    ) -> Result<EnrichmentOutcome> {
        cancel.checkpoint()?;
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(EnrichmentOutcome {
            text: self.markdown.clone(),
            citations: vec![],
            failed_batches: vec![],
        })
    }

    fn is_configured(&self) -> bool {
        self.configured
    }
}

fn raw(pmid: &str) -> RawCitationRecord {
    RawCitationRecord {
        pmid: pmid.to_string(),
        title: format!("Title {pmid}"),
        abstract_text: "No Abstract".to_string(),
        journal: "Unknown Journal".to_string(),
        pub_date: "2024-05".to_string(),
        doi: None,
        authors: vec!["A Author".to_string()],
    }
}

fn record_md(title: &str, pmid: &str, disease: &str, impact: &str) -> String {
    format!(
        "### {title}\n**中文标题**: {title}中文\n**PMID/DOI**: PMID: {pmid}\n\
         **影响因子**: {impact}\n**疾病类型**: {disease}\n**研究类型**: 队列研究\n---\n"
    )
}

fn als_job() -> SearchJob {
    SearchJob {
        topic: Topic::Facet("1. Amyotrophic Lateral Sclerosis (ALS)".to_string()),
        recency: Recency::OneWeek,
    }
}

#[tokio::test]
async fn test_end_to_end_als_scenario() {
    // Three records: disease types {ALS, ALS, AD}, impact {8.0, 3.0, 20.0}.
    // Expected order: the two ALS papers first (8.0 then 3.0), AD last.
    let source = MockSource::new(
        vec!["38000001", "38000002", "38000003"],
        vec![raw("38000001"), raw("38000002"), raw("38000003")],
    );
    let md = format!(
        "{}{}{}",
        record_md("Low-IF ALS paper", "38000002", "ALS", "3.0 (Q2)"),
        record_md("High-IF ALS paper", "38000001", "ALS", "8.0 (Q1)"),
        record_md("AD paper", "38000003", "AD", "20.0 (Q1)"),
    );
    let enricher = MockEnricher::new(&md);
    let cancel = CancelToken::new();

    let outcome = run_search(als_job(), &source, &enricher, &cancel, None)
        .await
        .unwrap();

    assert_eq!(outcome.pmids_found, 3);
    assert_eq!(outcome.records_fetched, 3);
    assert_eq!(outcome.papers.len(), 3);
    let titles: Vec<&str> = outcome.papers.iter().map(|p| p.title_en.as_str()).collect();
    assert_eq!(
        titles,
        vec!["High-IF ALS paper", "Low-IF ALS paper", "AD paper"]
    );
}

#[tokio::test]
async fn test_duplicate_pmids_collapse_in_result() {
    let source = MockSource::new(vec!["38000001"], vec![raw("38000001")]);
    let md = format!(
        "{}{}",
        record_md("First wording", "38000001", "ALS", "8.0"),
        record_md("Second wording", "38000001", "ALS", "9.0"),
    );
    let enricher = MockEnricher::new(&md);
    let cancel = CancelToken::new();

    let outcome = run_search(als_job(), &source, &enricher, &cancel, None)
        .await
        .unwrap();
    assert_eq!(outcome.papers.len(), 1);
    // First-seen wins, even though the duplicate has the higher IF.
    assert_eq!(outcome.papers[0].title_en, "First wording");
}

#[tokio::test]
async fn test_no_identifiers_short_circuits_before_enrichment() {
    let source = MockSource::new(vec![], vec![]);
    let enricher = MockEnricher::new("");
    let cancel = CancelToken::new();

    let err = run_search(als_job(), &source, &enricher, &cancel, None)
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::NoIdentifiers));
    assert_eq!(enricher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_no_records_is_distinct_from_no_identifiers() {
    let source = MockSource::new(vec!["38000001"], vec![]);
    let enricher = MockEnricher::new("");
    let cancel = CancelToken::new();

    let err = run_search(als_job(), &source, &enricher, &cancel, None)
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::NoRecords));
    assert_ne!(
        SearchError::NoRecords.to_string(),
        SearchError::NoIdentifiers.to_string()
    );
    assert_eq!(enricher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_credential_raised_before_any_network_call() {
    let source = MockSource::new(vec!["38000001"], vec![raw("38000001")]);
    let mut enricher = MockEnricher::new("");
    enricher.configured = false;
    let cancel = CancelToken::new();

    let err = run_search(als_job(), &source, &enricher, &cancel, None)
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::MissingCredential));
    assert_eq!(source.search_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_cancellation_surfaces_as_stopped() {
    let source = MockSource::new(vec!["38000001"], vec![raw("38000001")]);
    let enricher = MockEnricher::new("");
    let cancel = CancelToken::new();
    cancel.cancel();

    let err = run_search(als_job(), &source, &enricher, &cancel, None)
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Cancelled));
    assert_eq!(source.search_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_progress_events_reach_subscriber() {
    let source = MockSource::new(
        vec!["38000001"],
        vec![raw("38000001")],
    );
    let enricher = MockEnricher::new(&record_md("P", "38000001", "ALS", "1.0"));
    let cancel = CancelToken::new();
    let (tx, mut rx) = tokio::sync::broadcast::channel(16);

    run_search(als_job(), &source, &enricher, &cancel, Some(tx))
        .await
        .unwrap();

    let mut stages = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        stages.push(ev.stage);
    }
    assert_eq!(stages, vec!["search", "fetch", "enrich", "rank", "complete"]);
}
