//! PubMed E-utilities client.
//!
//! Endpoints used:
//!   esearch: https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esearch.fcgi
//!   efetch:  https://eutils.ncbi.nlm.nih.gov/entrez/eutils/efetch.fcgi

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, instrument, warn};

use neurolit_common::sandbox::SandboxClient;
use neurolit_common::{CancelToken, NeurolitError, Result};

use super::CitationSource;
use crate::models::RawCitationRecord;

const ESEARCH_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esearch.fcgi";
const EFETCH_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/efetch.fcgi";

/// Most recent matches requested from esearch.
const SEARCH_CAP: usize = 500;
/// efetch request-size limit.
const FETCH_CHUNK: usize = 50;

pub struct PubMedClient {
    client: SandboxClient,
    /// Optional NCBI API key for higher rate limits.
    api_key: Option<String>,
}

impl PubMedClient {
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Ok(Self {
            client: SandboxClient::new()?,
            api_key,
        })
    }

    fn key_param(&self, params: &mut Vec<(&'static str, String)>) {
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.clone()));
        }
    }

    async fn esearch(&self, query: &str, lookback_days: u32) -> Result<Vec<String>> {
        let mut params = vec![
            ("db", "pubmed".to_string()),
            ("term", query.to_string()),
            ("retmax", SEARCH_CAP.to_string()),
            ("sort", "date".to_string()),
            ("datetype", "pdat".to_string()),
            ("reldate", lookback_days.to_string()),
            ("retmode", "json".to_string()),
        ];
        self.key_param(&mut params);

        let resp = self
            .client
            .get(ESEARCH_URL)?
            .query(&params)
            .send()
            .await?
            .error_for_status()?;
        let body: serde_json::Value = resp.json().await?;

        // The idlist path is advisory: absence yields an empty list.
        let mut seen = std::collections::HashSet::new();
        let ids = body["esearchresult"]["idlist"]
            .as_array()
            .unwrap_or(&vec![])
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .filter(|id| seen.insert(id.clone()))
            .collect();
        Ok(ids)
    }

    async fn efetch_chunk(&self, pmids: &[String]) -> Result<Vec<RawCitationRecord>> {
        let mut params = vec![
            ("db", "pubmed".to_string()),
            ("id", pmids.join(",")),
            ("rettype", "abstract".to_string()),
            ("retmode", "xml".to_string()),
        ];
        self.key_param(&mut params);

        let xml = self
            .client
            .get(EFETCH_URL)?
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_pubmed_xml(&xml)
    }
}

#[async_trait]
impl CitationSource for PubMedClient {
    /// Search PubMed for records published within the lookback window.
    ///
    /// Never raises on transport or HTTP failure: logs and returns an empty
    /// list, which callers treat as "no results or transient failure".
    #[instrument(skip(self, cancel))]
    async fn search(
        &self,
        query: &str,
        lookback_days: u32,
        cancel: &CancelToken,
    ) -> Result<Vec<String>> {
        cancel.checkpoint()?;
        match self.esearch(query, lookback_days).await {
            Ok(ids) => {
                debug!(n = ids.len(), "PubMed esearch returned PMIDs");
                Ok(ids)
            }
            Err(NeurolitError::Cancelled) => Err(NeurolitError::Cancelled),
            Err(e) => {
                warn!(error = %e, "PubMed esearch failed, returning empty id list");
                Ok(vec![])
            }
        }
    }

    /// Fetch detail records in chunks of 50. A structurally malformed chunk
    /// is skipped whole; the remaining chunks still contribute records.
    #[instrument(skip(self, pmids, cancel), fields(n_ids = pmids.len()))]
    async fn fetch(
        &self,
        pmids: &[String],
        cancel: &CancelToken,
    ) -> Result<Vec<RawCitationRecord>> {
        if pmids.is_empty() {
            return Ok(vec![]);
        }

        let mut records = Vec::new();
        for chunk in pmids.chunks(FETCH_CHUNK) {
            cancel.checkpoint()?;
            match self.efetch_chunk(chunk).await {
                Ok(parsed) => records.extend(parsed),
                Err(NeurolitError::Cancelled) => return Err(NeurolitError::Cancelled),
                Err(e) => {
                    warn!(error = %e, n_ids = chunk.len(), "efetch chunk failed, skipping");
                }
            }
        }
        debug!(n_records = records.len(), "PubMed efetch complete");
        Ok(records)
    }
}

// ── XML parsing ───────────────────────────────────────────────────────────────

#[derive(Default)]
struct ArticleBuilder {
    pmid: String,
    title: String,
    journal: String,
    year: String,
    month: String,
    day: String,
    doi: Option<String>,
    authors: Vec<String>,
    /// (label, text) abstract segments in document order.
    abstract_segments: Vec<(Option<String>, String)>,
}

impl ArticleBuilder {
    fn finish(self) -> RawCitationRecord {
        let title = if self.title.trim().is_empty() {
            RawCitationRecord::NO_TITLE.to_string()
        } else {
            self.title.trim().to_string()
        };
        let journal = if self.journal.trim().is_empty() {
            RawCitationRecord::UNKNOWN_JOURNAL.to_string()
        } else {
            self.journal.trim().to_string()
        };

        let mut authors = self.authors;
        authors.truncate(3);

        RawCitationRecord {
            pmid: self.pmid,
            title,
            abstract_text: assemble_abstract(&self.abstract_segments),
            journal,
            pub_date: assemble_date(&self.year, &self.month, &self.day),
            doi: self.doi,
            authors,
        }
    }
}

/// Year-month-day joined with '-', trailing separators trimmed when the
/// finer-grained parts are absent ("2024-03-" → "2024-03").
fn assemble_date(year: &str, month: &str, day: &str) -> String {
    let mut date = format!("{year}-{month}-{day}");
    while date.ends_with('-') {
        date.pop();
    }
    date
}

/// Labeled segments are prefixed with their label and newline-joined;
/// a record with no abstract at all gets the documented default.
fn assemble_abstract(segments: &[(Option<String>, String)]) -> String {
    let non_empty: Vec<&(Option<String>, String)> = segments
        .iter()
        .filter(|(_, text)| !text.trim().is_empty())
        .collect();
    if non_empty.is_empty() {
        return RawCitationRecord::NO_ABSTRACT.to_string();
    }
    non_empty
        .iter()
        .map(|(label, text)| match label {
            Some(l) => format!("{}: {}", l, text.trim()),
            None => text.trim().to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse efetch abstract-mode XML (`<PubmedArticleSet>`) into raw records.
///
/// Field extraction is defensive: missing sub-elements become the documented
/// defaults rather than errors. A reader-level error aborts the whole chunk
/// with `NeurolitError::Xml` so the caller can drop it and move on.
pub fn parse_pubmed_xml(xml: &str) -> Result<Vec<RawCitationRecord>> {
    let mut records = Vec::new();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut current: Option<ArticleBuilder> = None;
    let mut in_pmid = false;
    let mut in_title = false;
    let mut in_abstract = false;
    let mut in_journal_title = false;
    let mut in_pub_date = false;
    let mut in_year = false;
    let mut in_month = false;
    let mut in_day = false;
    let mut in_author = false;
    let mut in_last_name = false;
    let mut in_fore_name = false;
    let mut in_collective = false;
    let mut in_doi_id = false;
    let mut current_last = String::new();
    let mut current_fore = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"PubmedArticle" => current = Some(ArticleBuilder::default()),
                b"PMID" => in_pmid = true,
                b"ArticleTitle" => in_title = true,
                b"AbstractText" => {
                    in_abstract = true;
                    if let Some(ref mut a) = current {
                        let label = e
                            .try_get_attribute("Label")
                            .ok()
                            .flatten()
                            .and_then(|attr| attr.unescape_value().ok())
                            .map(|v| v.to_string());
                        a.abstract_segments.push((label, String::new()));
                    }
                }
                b"Title" => in_journal_title = true,
                b"PubDate" => in_pub_date = true,
                b"Year" if in_pub_date => in_year = true,
                b"Month" if in_pub_date => in_month = true,
                b"Day" if in_pub_date => in_day = true,
                b"Author" => {
                    in_author = true;
                    current_last.clear();
                    current_fore.clear();
                }
                b"LastName" => in_last_name = true,
                b"ForeName" => in_fore_name = true,
                b"CollectiveName" => in_collective = true,
                b"ArticleId" => {
                    let id_type = e
                        .try_get_attribute("IdType")
                        .ok()
                        .flatten()
                        .and_then(|attr| attr.unescape_value().ok())
                        .map(|v| v.to_string());
                    in_doi_id = id_type.as_deref() == Some("doi");
                }
                _ => {}
            },
            Ok(Event::Text(ref e)) => {
                let text = e.unescape().unwrap_or_default().to_string();
                if let Some(ref mut a) = current {
                    if in_pmid && a.pmid.is_empty() {
                        a.pmid = text.clone();
                    }
                    // Titles and abstracts may carry inline markup; append
                    // rather than overwrite so split text events survive.
                    if in_title {
                        a.title.push_str(&text);
                    }
                    if in_abstract {
                        if let Some((_, seg)) = a.abstract_segments.last_mut() {
                            seg.push_str(&text);
                        }
                    }
                    if in_journal_title && a.journal.is_empty() {
                        a.journal = text.clone();
                    }
                    if in_year && a.year.is_empty() {
                        a.year = text.clone();
                    }
                    if in_month && a.month.is_empty() {
                        a.month = text.clone();
                    }
                    if in_day && a.day.is_empty() {
                        a.day = text.clone();
                    }
                    if in_last_name {
                        current_last = text.clone();
                    }
                    if in_fore_name {
                        current_fore = text.clone();
                    }
                    if in_collective && in_author {
                        current_last = text.clone();
                    }
                    if in_doi_id && a.doi.is_none() {
                        a.doi = Some(text.clone());
                    }
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"PMID" => in_pmid = false,
                b"ArticleTitle" => in_title = false,
                b"AbstractText" => in_abstract = false,
                b"Title" => in_journal_title = false,
                b"PubDate" => in_pub_date = false,
                b"Year" => in_year = false,
                b"Month" => in_month = false,
                b"Day" => in_day = false,
                b"LastName" => in_last_name = false,
                b"ForeName" => in_fore_name = false,
                b"CollectiveName" => in_collective = false,
                b"ArticleId" => in_doi_id = false,
                b"Author" => {
                    if in_author {
                        if let Some(ref mut a) = current {
                            let name = if current_fore.is_empty() {
                                current_last.clone()
                            } else {
                                format!("{current_fore} {current_last}")
                            };
                            if !name.trim().is_empty() {
                                a.authors.push(name);
                            }
                        }
                        in_author = false;
                    }
                }
                b"PubmedArticle" => {
                    if let Some(a) = current.take() {
                        if !a.pmid.is_empty() {
                            records.push(a.finish());
                        } else {
                            warn!("Skipping article with no PMID");
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(NeurolitError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(records)
}
