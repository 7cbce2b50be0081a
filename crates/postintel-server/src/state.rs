use std::sync::Arc;

use sqlx::PgPool;

use postintel_analysis::Analyzer;
use postintel_core::{AppConfig, KeyStore};
use postintel_ingest::{IngestError, IngestPipeline};

/// Shared server state. Cheap to clone; the key store is shared so a config
/// update is visible to every job built afterwards.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    pub keys: Arc<KeyStore>,
}

impl AppState {
    /// Builds an ingest pipeline from the current key snapshot. Jobs hold
    /// the snapshot they were built with; key updates apply to later jobs.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Scraper`] if an HTTP client cannot be built.
    pub fn build_pipeline(&self) -> Result<IngestPipeline, IngestError> {
        IngestPipeline::from_config(self.pool.clone(), &self.config, &self.keys.current())
    }

    /// Builds an analyzer from the current key snapshot.
    #[must_use]
    pub fn build_analyzer(&self) -> Analyzer {
        Analyzer::from_config(self.pool.clone(), &self.config, &self.keys.current())
    }
}
