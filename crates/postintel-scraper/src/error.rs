use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by source (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("endpoint not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("collector run returned no usable data for {target}")]
    EmptyRun { target: String },

    #[error("media payload exceeds {limit_bytes} byte ceiling: {url}")]
    Oversize { limit_bytes: usize, url: String },

    #[error("normalization error: {reason}")]
    Normalization { reason: String },
}
