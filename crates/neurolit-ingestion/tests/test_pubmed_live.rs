//! Live PubMed smoke test.
//!
//! Run with: cargo test --package neurolit-ingestion --test test_pubmed_live -- --ignored --nocapture

use neurolit_common::CancelToken;
use neurolit_ingestion::query::{build_query, Topic};
use neurolit_ingestion::sources::pubmed::PubMedClient;
use neurolit_ingestion::sources::CitationSource;

#[tokio::test]
#[ignore] // Requires network access
async fn test_pubmed_search_and_fetch_als() {
    let client = PubMedClient::new(None).unwrap();
    let cancel = CancelToken::new();

    let query = build_query(&Topic::Facet(
        "1. Amyotrophic Lateral Sclerosis (ALS)".to_string(),
    ));
    let pmids = client.search(&query, 30, &cancel).await.unwrap();
    println!("Found {} PMIDs", pmids.len());
    assert!(!pmids.is_empty(), "Should find at least one PMID in 30 days");

    let sample: Vec<String> = pmids.into_iter().take(3).collect();
    let records = client.fetch(&sample, &cancel).await.unwrap();
    for r in &records {
        println!("\n---");
        println!("PMID: {}", r.pmid);
        println!("Title: {}", r.title);
        println!("Journal: {} ({})", r.journal, r.pub_date);
    }
    assert!(!records.is_empty());
}
