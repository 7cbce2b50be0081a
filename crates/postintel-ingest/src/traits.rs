//! Seams of the incremental ingestion loop.
//!
//! The fetcher is generic over these traits so its stop/continue decisions
//! can be tested against scripted fakes without a database or network.

use async_trait::async_trait;
use postintel_scraper::RawPost;

use crate::error::IngestError;

/// A paginated upstream feed, consumed one unit at a time in
/// most-recent-first order.
#[async_trait]
pub trait PostSource {
    /// Returns the next unit, or `None` when the feed is exhausted.
    async fn fetch_next(&mut self) -> Result<Option<RawPost>, IngestError>;
}

/// Answers whether an external id has already been ingested.
#[async_trait]
pub trait DedupOracle {
    /// Pure read; must not mutate any state.
    async fn exists(&self, external_id: &str) -> Result<bool, IngestError>;
}

/// Persists one raw unit, classifying and materializing it on the way in.
///
/// Ingesting an already-known id is a full overwrite, not an error.
#[async_trait]
pub trait PostSink {
    async fn ingest(&self, raw: RawPost) -> Result<(), IngestError>;
}

/// Best-effort text translation.
///
/// Implementations must degrade, never fail: any problem — missing API key,
/// network error, unexpected response — returns the input unchanged. Empty
/// input yields empty output without a request.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str) -> String;
}
