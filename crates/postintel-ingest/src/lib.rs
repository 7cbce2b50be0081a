pub mod error;
pub mod fetcher;
pub mod materialize;
pub mod pipeline;
pub mod traits;
pub mod translate;

pub use error::IngestError;
pub use fetcher::{FetchOutcome, IncrementalFetcher, StopReason, DEFAULT_MAX_ITERATIONS};
pub use materialize::materialize_post;
pub use pipeline::{IngestPipeline, JobReport, RefreshReport, ScrapeReport, SearchReport};
pub use traits::{DedupOracle, PostSink, PostSource, Translator};
pub use translate::{build_post_translations, HttpTranslator, NoopTranslator};
