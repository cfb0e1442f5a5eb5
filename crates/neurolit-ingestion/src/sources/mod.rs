//! Citation database clients.

pub mod pubmed;

use async_trait::async_trait;

use neurolit_common::{CancelToken, Result};

use crate::models::RawCitationRecord;

/// Interface to an external citation database. The pipeline depends on this
/// seam rather than a concrete client so tests can substitute a mock.
#[async_trait]
pub trait CitationSource: Send + Sync {
    /// Date-sorted identifier search within a lookback window.
    ///
    /// Transient failures are absorbed: an empty list means "no results or
    /// transient failure", never a hard error. Only cancellation propagates.
    async fn search(
        &self,
        query: &str,
        lookback_days: u32,
        cancel: &CancelToken,
    ) -> Result<Vec<String>>;

    /// Retrieve raw detail records for a list of identifiers.
    async fn fetch(
        &self,
        pmids: &[String],
        cancel: &CancelToken,
    ) -> Result<Vec<RawCitationRecord>>;
}
