use reqwest::{Client, ClientBuilder};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

use crate::error::NeurolitError;

/// A sandbox-capped HTTP client that only allows requests to approved
/// domains. The pipeline talks to exactly two external services; anything
/// else is a programming error and is refused before a socket is opened.
#[derive(Debug, Clone)]
pub struct SandboxClient {
    client: Client,
    allowlist: HashSet<String>,
}

impl SandboxClient {
    /// Creates a new SandboxClient with the default allowlist.
    pub fn new() -> Result<Self, NeurolitError> {
        let mut allowlist = HashSet::new();
        let domains = vec![
            "eutils.ncbi.nlm.nih.gov",           // PubMed E-utilities
            "generativelanguage.googleapis.com", // Gemini
            "localhost",                         // mock servers in tests
            "127.0.0.1",
        ];

        for d in domains {
            allowlist.insert(d.to_string());
        }

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| NeurolitError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, allowlist })
    }

    /// Appends an exact hostname to the allowlist.
    pub fn allow_domain(&mut self, domain: &str) {
        self.allowlist.insert(domain.to_string());
    }

    /// Validates if a URL is permitted under the current sandbox policy.
    pub fn is_allowed(&self, url: &str) -> bool {
        if let Ok(parsed) = Url::parse(url) {
            if let Some(host) = parsed.host_str() {
                for allowed in &self.allowlist {
                    if host == allowed || host.ends_with(&format!(".{allowed}")) {
                        return true;
                    }
                }
            }
        }
        false
    }

    pub fn get(&self, url: &str) -> Result<reqwest::RequestBuilder, NeurolitError> {
        if !self.is_allowed(url) {
            return Err(NeurolitError::Security(format!(
                "domain not in allowlist for URL {url}"
            )));
        }
        Ok(self.client.get(url))
    }

    pub fn post(&self, url: &str) -> Result<reqwest::RequestBuilder, NeurolitError> {
        if !self.is_allowed(url) {
            return Err(NeurolitError::Security(format!(
                "domain not in allowlist for URL {url}"
            )));
        }
        Ok(self.client.post(url))
    }
}
