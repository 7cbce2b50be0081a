//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the daily
//! competitor refresh.

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::state::AppState;

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process — dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the refresh job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(state: AppState) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    register_daily_refresh_job(&scheduler, state).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

/// Registers the daily incremental refresh over every registered
/// competitor. The cron expression comes from the configuration
/// (`refresh_cron`, 16:30 daily by default).
async fn register_daily_refresh_job(
    scheduler: &JobScheduler,
    state: AppState,
) -> Result<(), JobSchedulerError> {
    let cron = state.config.refresh_cron.clone();

    let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
        let state = state.clone();

        Box::pin(async move {
            tracing::info!("scheduler: starting daily competitor refresh");
            run_refresh_job(&state).await;
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron = %cron, "scheduler: daily competitor refresh registered");
    Ok(())
}

/// Drives one full refresh pass. Pipeline construction reads the key
/// snapshot current at run time, so key updates apply without a restart.
async fn run_refresh_job(state: &AppState) {
    let pipeline = match state.build_pipeline() {
        Ok(pipeline) => pipeline,
        Err(err) => {
            tracing::error!(error = %err, "scheduler: failed to build refresh pipeline");
            return;
        }
    };

    match pipeline.refresh_all_competitors().await {
        Ok(report) => {
            tracing::info!(
                succeeded = report.succeeded,
                failed = report.failed,
                new_posts = report.new_posts,
                updated_posts = report.updated_posts,
                "scheduler: daily competitor refresh complete"
            );
        }
        Err(err) => {
            tracing::error!(error = %err, "scheduler: daily competitor refresh failed");
        }
    }
}
