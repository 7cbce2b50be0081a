//! LLM-backed extraction of strategy insights from stored posts.
//!
//! The pipeline is: template selection by post kind, multimodal completion
//! with the post's stored media attached, tolerant parsing of the
//! structured response, upsert keyed on `(user_id, external_id)`.

pub mod analyzer;
pub mod error;
pub mod llm;
pub mod parse;
pub mod templates;
pub mod types;

pub use analyzer::{AnalysisOutcome, Analyzer};
pub use error::AnalysisError;
pub use llm::{CompletionClient, MediaAttachment};
pub use parse::{parse, parse_analysis_only, parse_strategy_script};
pub use templates::{build_prompt, TemplateKind};
pub use types::ExtractionFields;
