use thiserror::Error;

/// Errors surfaced by the analysis pipeline.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Transport-level failure talking to the completion endpoint.
    #[error("completion request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The completion endpoint rejected the request.
    #[error("completion endpoint returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The completion endpoint answered 2xx but the body was not usable.
    #[error("malformed completion response: {reason}")]
    MalformedResponse { reason: String },

    /// Post kinds the analysis templates do not cover (mixed galleries).
    #[error("post kind {kind:?} is not supported for analysis")]
    UnsupportedKind { kind: String },

    /// The stored post has no usable media payload to attach.
    #[error("post {external_id} has no stored media to analyze")]
    MissingMedia { external_id: String },

    /// No stored post with that upstream id.
    #[error("no stored post with external id {external_id}")]
    UnknownPost { external_id: String },

    #[error(transparent)]
    Db(#[from] postintel_db::DbError),
}

impl AnalysisError {
    /// Whether a retry could plausibly succeed. Network failures and
    /// server-side rejections are worth retrying; everything else is
    /// terminal.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        match self {
            AnalysisError::Http(_) => true,
            AnalysisError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
