//! Production wiring of the ingestion loop plus the two job entry points:
//! competitor refresh (incremental) and keyword search (bulk).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use postintel_core::{ApiKeys, AppConfig, PostOrigin};
use postintel_db::{CompetitorProfileUpdate, NewCompetitor};
use postintel_scraper::{
    normalize_profile, MediaKind, MediaMaterializer, RawPost, SourceClient,
};
use sqlx::PgPool;

use crate::error::IngestError;
use crate::fetcher::{FetchOutcome, IncrementalFetcher, StopReason};
use crate::materialize::materialize_post;
use crate::traits::{DedupOracle, PostSink, PostSource, Translator};
use crate::translate::{build_post_translations, HttpTranslator};

/// Pause between competitors in a bulk refresh, to avoid hammering the
/// collector platform.
const INTER_TARGET_DELAY: Duration = Duration::from_secs(5);

/// Outcome of one competitor refresh.
#[derive(Debug, Clone)]
pub struct RefreshReport {
    pub username: String,
    pub new_posts: u32,
    pub updated_posts: u32,
    pub failed_units: u32,
    pub stop: StopReason,
}

/// Outcome of one bulk competitor scrape.
#[derive(Debug, Clone)]
pub struct ScrapeReport {
    pub username: String,
    pub requested: u32,
    pub new_posts: u32,
    pub updated_posts: u32,
    pub failed_units: u32,
}

/// Outcome of one keyword search run.
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub keyword: String,
    pub search_id: i64,
    /// Lifetime count of runs for this keyword, including this one.
    pub search_count: i64,
    pub ingested: u32,
    pub failed: u32,
    /// Recomputed total of stored posts under this keyword.
    pub total_posts: i64,
}

/// Aggregate outcome of refreshing every registered competitor.
#[derive(Debug, Clone, Default)]
pub struct JobReport {
    pub succeeded: u32,
    pub failed: u32,
    pub new_posts: u32,
    pub updated_posts: u32,
}

// ---------------------------------------------------------------------------
// Production trait implementations
// ---------------------------------------------------------------------------

/// Dedup oracle backed by the posts table.
pub struct PgDedupOracle {
    pool: PgPool,
}

#[async_trait]
impl DedupOracle for PgDedupOracle {
    async fn exists(&self, external_id: &str) -> Result<bool, IngestError> {
        Ok(postintel_db::post_exists(&self.pool, external_id).await?)
    }
}

/// Sink that materializes a unit, upserts it under a fixed origin, and
/// writes the best-effort field translations in a second pass.
pub struct PgPostSink<'a> {
    pool: &'a PgPool,
    materializer: &'a MediaMaterializer,
    translator: &'a dyn Translator,
    origin: PostOrigin,
    child_fetch_concurrency: usize,
}

#[async_trait]
impl PostSink for PgPostSink<'_> {
    async fn ingest(&self, raw: RawPost) -> Result<(), IngestError> {
        let post = materialize_post(self.materializer, raw, self.child_fetch_concurrency).await?;
        let post_id = postintel_db::upsert_post(self.pool, self.origin, &post).await?;
        let translations = build_post_translations(self.translator, &post).await;
        postintel_db::set_post_translations(self.pool, post_id, &translations).await?;
        Ok(())
    }
}

/// Feed adapter over the collector: each pull requests the single most
/// recent post. The dedup stop condition, not a cursor, is what bounds the
/// walk.
pub struct ScrapedPostSource<'a> {
    client: &'a SourceClient,
    username: String,
}

#[async_trait]
impl PostSource for ScrapedPostSource<'_> {
    async fn fetch_next(&mut self) -> Result<Option<RawPost>, IngestError> {
        let mut posts = self.client.fetch_recent(&self.username, 1).await?;
        if posts.is_empty() {
            return Ok(None);
        }
        Ok(Some(posts.swap_remove(0)))
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Owns the collaborators shared by all ingestion jobs.
pub struct IngestPipeline {
    pool: PgPool,
    client: SourceClient,
    materializer: MediaMaterializer,
    translator: Arc<dyn Translator>,
    child_fetch_concurrency: usize,
    max_iterations: u32,
}

impl IngestPipeline {
    #[must_use]
    pub fn new(
        pool: PgPool,
        client: SourceClient,
        materializer: MediaMaterializer,
        translator: Arc<dyn Translator>,
        child_fetch_concurrency: usize,
        max_iterations: u32,
    ) -> Self {
        Self {
            pool,
            client,
            materializer,
            translator,
            child_fetch_concurrency,
            max_iterations,
        }
    }

    /// Builds the production pipeline from configuration and a key
    /// snapshot. A pipeline keeps the snapshot it was built with; callers
    /// rebuild after a key update.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Scraper`] if an HTTP client cannot be built.
    pub fn from_config(
        pool: PgPool,
        config: &AppConfig,
        keys: &ApiKeys,
    ) -> Result<Self, IngestError> {
        let client = SourceClient::new(
            &config.source_base_url,
            &keys.source_api_token,
            config.source_request_timeout_secs,
            config.source_max_retries,
            config.source_retry_backoff_base_secs,
        )?;
        let materializer = MediaMaterializer::new(
            config.image_fetch_timeout_secs,
            config.video_fetch_timeout_secs,
            usize::try_from(config.video_max_bytes).unwrap_or(usize::MAX),
        )?;
        let translator: Arc<dyn Translator> = Arc::new(HttpTranslator::new(
            &config.llm_base_url,
            &keys.translation_api_key,
            &config.translation_model,
        ));
        Ok(Self::new(
            pool,
            client,
            materializer,
            translator,
            config.child_fetch_concurrency,
            config.max_refresh_iterations,
        ))
    }

    /// Refreshes one competitor: registers it on first sight (profile
    /// scrape, avatar materialization, best-effort translation), then runs
    /// the incremental fetch loop over its feed.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError`] if the profile scrape, a database write, or
    /// the fetch loop fails. Media and translation failures degrade and do
    /// not error.
    pub async fn refresh_competitor(&self, username: &str) -> Result<RefreshReport, IngestError> {
        let competitor_id = match postintel_db::get_competitor_by_username(&self.pool, username)
            .await?
        {
            Some(row) => row.id,
            None => self.register_competitor(username).await?,
        };

        let outcome = self
            .run_fetch_loop(username, PostOrigin::Competitor { competitor_id })
            .await?;

        tracing::info!(
            username,
            new_posts = outcome.new_posts,
            updated_posts = outcome.updated_posts,
            stop = ?outcome.stop,
            "competitor refresh finished"
        );

        Ok(RefreshReport {
            username: username.to_owned(),
            new_posts: outcome.new_posts,
            updated_posts: outcome.updated_posts,
            failed_units: outcome.failed_units,
            stop: outcome.stop,
        })
    }

    /// Bulk-scrapes a competitor's most recent posts without the dedup stop
    /// condition: every fetched post is ingested (known ids are
    /// overwritten). Used for manual backfills; the scheduled path is
    /// [`Self::refresh_competitor`].
    ///
    /// # Errors
    ///
    /// Returns [`IngestError`] if registration, the feed fetch, or the
    /// dedup check fails; per-post ingest failures are counted and skipped.
    pub async fn scrape_competitor(
        &self,
        username: &str,
        count: u32,
    ) -> Result<ScrapeReport, IngestError> {
        let competitor_id = match postintel_db::get_competitor_by_username(&self.pool, username)
            .await?
        {
            Some(row) => row.id,
            None => self.register_competitor(username).await?,
        };

        let posts = self.client.fetch_recent(username, count).await?;
        tracing::info!(username, fetched = posts.len(), "bulk scrape fetched feed");

        let origin = PostOrigin::Competitor { competitor_id };
        let mut report = ScrapeReport {
            username: username.to_owned(),
            requested: count,
            new_posts: 0,
            updated_posts: 0,
            failed_units: 0,
        };
        for raw in posts {
            let Some(external_id) = raw.id.clone() else {
                report.failed_units += 1;
                continue;
            };
            let known = postintel_db::post_exists(&self.pool, &external_id).await?;
            match self.ingest_one(raw, origin).await {
                Ok(()) if known => report.updated_posts += 1,
                Ok(()) => report.new_posts += 1,
                Err(err) => {
                    report.failed_units += 1;
                    tracing::warn!(
                        username,
                        external_id,
                        error = %err,
                        "post ingest failed, continuing with next"
                    );
                }
            }
        }

        tracing::info!(
            username,
            new_posts = report.new_posts,
            updated_posts = report.updated_posts,
            failed_units = report.failed_units,
            "bulk scrape finished"
        );
        Ok(report)
    }

    /// Refreshes every registered competitor in turn, isolating failures
    /// per target. Partial success is the expected common case.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError`] only if the competitor list itself cannot be
    /// read; individual refresh failures are counted, logged, and skipped.
    pub async fn refresh_all_competitors(&self) -> Result<JobReport, IngestError> {
        let competitors = postintel_db::list_competitors(&self.pool).await?;
        tracing::info!(count = competitors.len(), "starting bulk competitor refresh");

        let mut report = JobReport::default();
        let total = competitors.len();
        for (position, competitor) in competitors.into_iter().enumerate() {
            match self.refresh_competitor(&competitor.username).await {
                Ok(refresh) => {
                    report.succeeded += 1;
                    report.new_posts += refresh.new_posts;
                    report.updated_posts += refresh.updated_posts;
                }
                Err(err) => {
                    report.failed += 1;
                    tracing::error!(
                        username = %competitor.username,
                        error = %err,
                        "competitor refresh failed, continuing with next"
                    );
                }
            }
            if position + 1 < total {
                tokio::time::sleep(INTER_TARGET_DELAY).await;
            }
        }

        tracing::info!(
            succeeded = report.succeeded,
            failed = report.failed,
            new_posts = report.new_posts,
            updated_posts = report.updated_posts,
            "bulk competitor refresh finished"
        );
        Ok(report)
    }

    /// Runs one keyword search: bumps the search term, discovers post URLs
    /// under the keyword, resolves their details, and ingests each with
    /// per-unit error isolation. `total_posts` is recomputed from the store
    /// afterwards rather than accumulated.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError`] if the search-term bookkeeping or either
    /// collector pass fails; per-post ingest failures are counted and
    /// skipped.
    pub async fn run_keyword_search(
        &self,
        keyword: &str,
        count: u32,
    ) -> Result<SearchReport, IngestError> {
        let term = postintel_db::bump_search_term(&self.pool, keyword).await?;
        if term.keyword_translated.is_none() {
            let translated = self.translator.translate(keyword).await;
            postintel_db::set_search_keyword_translation(&self.pool, term.id, &translated).await?;
        }

        let urls = self.client.fetch_hashtag_urls(keyword, count).await?;
        tracing::info!(keyword, urls = urls.len(), "keyword discovery finished");
        let posts = self.client.fetch_details_by_urls(&urls).await?;

        let origin = PostOrigin::Search { search_id: term.id };
        let mut ingested = 0u32;
        let mut failed = 0u32;
        for raw in posts {
            let external_id = raw.id.clone().unwrap_or_default();
            match self.ingest_one(raw, origin).await {
                Ok(()) => ingested += 1,
                Err(err) => {
                    failed += 1;
                    tracing::warn!(
                        keyword,
                        external_id,
                        error = %err,
                        "post ingest failed, continuing with next"
                    );
                }
            }
        }

        let total_posts = postintel_db::recount_search_posts(&self.pool, term.id).await?;

        tracing::info!(keyword, ingested, failed, total_posts, "keyword search finished");
        Ok(SearchReport {
            keyword: keyword.to_owned(),
            search_id: term.id,
            search_count: term.search_count,
            ingested,
            failed,
            total_posts,
        })
    }

    async fn register_competitor(&self, username: &str) -> Result<i64, IngestError> {
        tracing::info!(username, "first sight, scraping profile");
        let profile = normalize_profile(self.client.fetch_profile(username).await?);

        let row = postintel_db::insert_competitor(
            &self.pool,
            &NewCompetitor {
                username: username.to_owned(),
                input_url: profile.url.clone(),
            },
        )
        .await?;

        let profile_pic_blob = match profile.profile_pic_url.as_deref() {
            Some(url) => self.materializer.materialize(url, MediaKind::Image).await,
            None => postintel_core::MediaBlob::Unavailable,
        };

        postintel_db::update_competitor_profile(
            &self.pool,
            row.id,
            &CompetitorProfileUpdate {
                external_id: profile.external_id,
                url: profile.url,
                full_name: profile.full_name.clone(),
                biography: profile.biography.clone(),
                profile_pic_url: profile.profile_pic_url,
                profile_pic_blob,
                external_urls: profile.external_urls,
                followers_count: profile.followers_count,
                follows_count: profile.follows_count,
                posts_count: profile.posts_count,
                highlight_reel_count: profile.highlight_reel_count,
                has_channel: profile.has_channel,
            },
        )
        .await?;

        let full_name_translated = match profile.full_name.as_deref() {
            Some(name) => Some(self.translator.translate(name).await),
            None => None,
        };
        let biography_translated = match profile.biography.as_deref() {
            Some(bio) => Some(self.translator.translate(bio).await),
            None => None,
        };
        postintel_db::set_competitor_translations(
            &self.pool,
            row.id,
            full_name_translated.as_deref(),
            biography_translated.as_deref(),
        )
        .await?;

        Ok(row.id)
    }

    async fn run_fetch_loop(
        &self,
        username: &str,
        origin: PostOrigin,
    ) -> Result<FetchOutcome, IngestError> {
        let mut source = ScrapedPostSource {
            client: &self.client,
            username: username.to_owned(),
        };
        let oracle = PgDedupOracle {
            pool: self.pool.clone(),
        };
        let sink = PgPostSink {
            pool: &self.pool,
            materializer: &self.materializer,
            translator: self.translator.as_ref(),
            origin,
            child_fetch_concurrency: self.child_fetch_concurrency,
        };

        IncrementalFetcher::new(self.max_iterations)
            .run(&mut source, &oracle, &sink)
            .await
    }

    async fn ingest_one(&self, raw: RawPost, origin: PostOrigin) -> Result<(), IngestError> {
        let post = materialize_post(&self.materializer, raw, self.child_fetch_concurrency).await?;
        let post_id = postintel_db::upsert_post(&self.pool, origin, &post).await?;
        let translations = build_post_translations(self.translator.as_ref(), &post).await;
        postintel_db::set_post_translations(&self.pool, post_id, &translations).await?;
        Ok(())
    }
}
