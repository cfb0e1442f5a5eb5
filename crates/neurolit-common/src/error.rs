use thiserror::Error;

#[derive(Debug, Error)]
pub enum NeurolitError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("XML parse error: {0}")]
    Xml(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network capabilities capped: {0}")]
    Security(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    /// Search was cancelled by the user. Distinct from failure: callers
    /// surface this as an informational "stopped" state, not an error banner.
    #[error("stopped by user")]
    Cancelled,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, NeurolitError>;
