//! Command handlers for the CLI.
//!
//! These are called from `main` after the database pool, config, and key
//! snapshot are established. Per-target failures inside bulk runs are
//! logged and skipped rather than propagated so a single bad target does
//! not abort the full run.

use sqlx::PgPool;

use postintel_analysis::{Analyzer, TemplateKind};
use postintel_core::{AppConfig, KeyStore};
use postintel_ingest::IngestPipeline;

fn build_pipeline(
    pool: &PgPool,
    config: &AppConfig,
    keys: &KeyStore,
) -> anyhow::Result<IngestPipeline> {
    IngestPipeline::from_config(pool.clone(), config, &keys.current())
        .map_err(|e| anyhow::anyhow!("failed to build ingest pipeline: {e}"))
}

/// Bulk-scrape a competitor's most recent posts.
///
/// # Errors
///
/// Returns an error if the pipeline cannot be built or the scrape job
/// itself fails; per-post ingest failures are counted in the summary.
pub(crate) async fn run_scrape(
    pool: &PgPool,
    config: &AppConfig,
    keys: &KeyStore,
    username: &str,
    count: u32,
) -> anyhow::Result<()> {
    let pipeline = build_pipeline(pool, config, keys)?;
    let report = pipeline.scrape_competitor(username, count).await?;
    println!(
        "scrape {}: {} new, {} updated, {} failed (requested {})",
        report.username, report.new_posts, report.updated_posts, report.failed_units, report.requested
    );
    Ok(())
}

/// Run one keyword search and ingest the discovered posts.
///
/// # Errors
///
/// Returns an error if the pipeline cannot be built or the search job
/// fails; per-post ingest failures are counted in the summary.
pub(crate) async fn run_search(
    pool: &PgPool,
    config: &AppConfig,
    keys: &KeyStore,
    keyword: &str,
    count: u32,
) -> anyhow::Result<()> {
    let pipeline = build_pipeline(pool, config, keys)?;
    let report = pipeline.run_keyword_search(keyword, count).await?;
    println!(
        "search \"{}\" (run #{}): {} ingested, {} failed, {} posts stored",
        report.keyword, report.search_count, report.ingested, report.failed, report.total_posts
    );
    Ok(())
}

/// Incrementally refresh one competitor, or every registered one.
///
/// # Errors
///
/// Returns an error if the pipeline cannot be built, the single-target
/// refresh fails, or the competitor list cannot be read. In the
/// all-competitors case individual refresh failures are counted and
/// skipped.
pub(crate) async fn run_refresh(
    pool: &PgPool,
    config: &AppConfig,
    keys: &KeyStore,
    username: Option<&str>,
) -> anyhow::Result<()> {
    let pipeline = build_pipeline(pool, config, keys)?;

    match username {
        Some(username) => {
            let report = pipeline.refresh_competitor(username).await?;
            println!(
                "refresh {}: {} new, {} updated, {} failed, stopped: {:?}",
                report.username, report.new_posts, report.updated_posts, report.failed_units, report.stop
            );
        }
        None => {
            let report = pipeline.refresh_all_competitors().await?;
            println!(
                "refresh all: {} succeeded, {} failed, {} new posts, {} updated posts",
                report.succeeded, report.failed, report.new_posts, report.updated_posts
            );
        }
    }
    Ok(())
}

/// Analyze one stored post and persist the extraction.
///
/// # Errors
///
/// Returns an error if the post is unknown, its kind is unsupported, its
/// media is missing, or the completion/persistence fails.
pub(crate) async fn run_analyze(
    pool: &PgPool,
    config: &AppConfig,
    keys: &KeyStore,
    external_id: &str,
    user_id: i64,
) -> anyhow::Result<()> {
    let analyzer = Analyzer::from_config(pool.clone(), config, &keys.current());
    let outcome = analyzer.analyze_post(user_id, external_id).await?;
    let template = match outcome.template {
        TemplateKind::StrategyScript => "strategy script",
        TemplateKind::AnalysisOnly => "analysis only",
    };
    println!(
        "analyzed {} ({}, {} template): extraction #{}",
        outcome.external_id, outcome.kind, template, outcome.extraction_id
    );
    Ok(())
}
