//! Configuration loading.
//! Reads neurolit.toml from the current directory or the path in
//! NEUROLIT_CONFIG; every field has a default so the file is optional.
//! The Gemini key may come from the file or, preferably, from the
//! NEUROLIT_GEMINI_API_KEY environment variable.

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_model")]
    pub model: String,
    /// Prefer NEUROLIT_GEMINI_API_KEY over putting the key on disk.
    #[serde(default)]
    pub api_key: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: String::new(),
        }
    }
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Optional NCBI API key for higher esearch/efetch rate limits.
    #[serde(default)]
    pub pubmed_api_key: Option<String>,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let path =
            std::env::var("NEUROLIT_CONFIG").unwrap_or_else(|_| "neurolit.toml".to_string());
        if !Path::new(&path).exists() {
            return Ok(Config::default());
        }
        let raw = std::fs::read_to_string(&path)?;
        let config = toml::from_str(&raw)?;
        Ok(config)
    }

    /// Resolved Gemini credential: environment first, then the config file.
    pub fn gemini_api_key(&self) -> String {
        std::env::var("NEUROLIT_GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .unwrap_or_else(|| self.llm.api_key.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_fields_absent() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.llm.model, "gemini-2.5-flash");
        assert!(config.llm.api_key.is_empty());
        assert!(config.search.pubmed_api_key.is_none());
    }

    #[test]
    fn test_partial_file_parses() {
        let config: Config = toml::from_str(
            "[llm]\nmodel = \"gemini-2.5-pro\"\n\n[search]\npubmed_api_key = \"k\"\n",
        )
        .unwrap();
        assert_eq!(config.llm.model, "gemini-2.5-pro");
        assert_eq!(config.search.pubmed_api_key.as_deref(), Some("k"));
    }
}
