//! Background job scheduler.
//!
//! Registers the recurring achievements refresh when a cron expression is
//! configured.

use std::sync::Arc;

use folio_core::PlatformsFile;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::store::AchievementsStore;

/// Builds and starts the background job scheduler.
///
/// The returned [`JobScheduler`] must be kept alive for the lifetime of the
/// process; dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised, the
/// cron expression is rejected, or the scheduler fails to start.
pub async fn build_scheduler(
    refresh_cron: Option<&str>,
    store: Arc<AchievementsStore>,
    registry: Arc<PlatformsFile>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    match refresh_cron {
        Some(cron) => register_refresh_job(&scheduler, cron, store, registry).await?,
        None => tracing::info!("scheduler: FOLIO_REFRESH_CRON unset; periodic refresh disabled"),
    }

    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_refresh_job(
    scheduler: &JobScheduler,
    cron: &str,
    store: Arc<AchievementsStore>,
    registry: Arc<PlatformsFile>,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(cron, move |_uuid, _lock| {
        let store = Arc::clone(&store);
        let registry = Arc::clone(&registry);

        Box::pin(async move {
            let Some(guard) = store.try_begin() else {
                tracing::info!("scheduler: refresh already running; skipping tick");
                return;
            };
            tracing::info!("scheduler: starting achievements refresh");
            let snapshot = guard.run(&registry).await;
            tracing::info!(
                platforms = snapshot.stats.len(),
                failed = snapshot.stats.error_count(),
                "scheduler: achievements refresh complete"
            );
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron, "scheduler: registered achievements refresh job");
    Ok(())
}
