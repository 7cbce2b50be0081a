//! Output shape of the template parsers.

/// Fields recovered from one model response.
///
/// Both template parsers produce this struct; the analysis-only template
/// leaves the script-specific fields empty. At most one of `prompt` /
/// `prompt_sequence` is ever set, matching whether the response carried a
/// single consolidated image prompt or a numbered per-image series.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionFields {
    /// Strategy summary (labeled sub-fields joined), or the whole response
    /// when no recognizable headings were found.
    pub summary: String,
    /// Why the post worked, as claimed by the model.
    pub success_factors: String,
    /// Adaptation insight for our own account.
    pub strategy_note: String,
    /// Ready-to-post copy text.
    pub copy_text: String,
    /// Single consolidated image prompt.
    pub prompt: Option<String>,
    /// Ordered per-image prompts for gallery posts.
    pub prompt_sequence: Option<Vec<String>>,
}
