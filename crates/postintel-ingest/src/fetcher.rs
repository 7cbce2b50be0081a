//! Incremental dedup-aware fetch loop.
//!
//! Per iteration: request exactly one unit from the source, most recent
//! first, and consult the dedup oracle on its external id.
//!
//! - unknown id: ingest as new and keep going
//! - known id: ingest anyway (full overwrite, so edited counters are picked
//!   up) and stop — everything older is already in the store
//! - empty page: stop
//!
//! A hard iteration cap bounds the loop even when the upstream never
//! repeats. Stops always land after a completed ingest, never mid-unit.

use crate::error::IngestError;
use crate::traits::{DedupOracle, PostSink, PostSource};

/// Default iteration cap for one refresh run.
pub const DEFAULT_MAX_ITERATIONS: u32 = 50;

/// Why the loop terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The source returned an empty page.
    SourceExhausted,
    /// A known id was seen; it was overwritten and the loop stopped.
    KnownIdOverwritten,
    /// The iteration cap was hit before the feed repeated or emptied.
    IterationCapReached,
}

/// Tally of one fetch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub new_posts: u32,
    pub updated_posts: u32,
    /// Units dropped for lacking an external id; the loop continues past
    /// them since dedup is impossible without a key.
    pub failed_units: u32,
    pub stop: StopReason,
}

/// Drives a [`PostSource`] until a stop condition is reached.
#[derive(Debug, Clone, Copy)]
pub struct IncrementalFetcher {
    max_iterations: u32,
}

impl IncrementalFetcher {
    #[must_use]
    pub fn new(max_iterations: u32) -> Self {
        Self { max_iterations }
    }

    /// Runs the fetch loop to completion.
    ///
    /// # Errors
    ///
    /// Propagates the first source, oracle, or sink error; per-unit
    /// tolerance applies only to units the loop can safely skip (missing
    /// external id).
    pub async fn run<S, O, K>(
        &self,
        source: &mut S,
        oracle: &O,
        sink: &K,
    ) -> Result<FetchOutcome, IngestError>
    where
        S: PostSource + Send,
        O: DedupOracle + Sync,
        K: PostSink + Sync,
    {
        let mut outcome = FetchOutcome {
            new_posts: 0,
            updated_posts: 0,
            failed_units: 0,
            stop: StopReason::IterationCapReached,
        };

        for iteration in 0..self.max_iterations {
            let Some(raw) = source.fetch_next().await? else {
                outcome.stop = StopReason::SourceExhausted;
                break;
            };

            let Some(external_id) = raw.id.clone() else {
                tracing::warn!(iteration, "unit has no external id, skipping");
                outcome.failed_units += 1;
                continue;
            };

            if oracle.exists(&external_id).await? {
                tracing::debug!(external_id, iteration, "known id, overwriting and stopping");
                sink.ingest(raw).await?;
                outcome.updated_posts += 1;
                outcome.stop = StopReason::KnownIdOverwritten;
                break;
            }

            tracing::debug!(external_id, iteration, "new post, ingesting");
            sink.ingest(raw).await?;
            outcome.new_posts += 1;
        }

        Ok(outcome)
    }
}

#[cfg(test)]
#[path = "fetcher_test.rs"]
mod tests;
