//! Background job scheduler.
//!
//! Registers the recurring snapshot refresh at server startup.

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::{api::AppState, refresh::refresh_snapshot};

/// Builds and starts the background job scheduler.
///
/// `cron` is a six-field expression (seconds first) evaluated in UTC; `None`
/// leaves the scheduler running with no jobs. Returns the running
/// [`JobScheduler`] handle, which must be kept alive for the lifetime of the
/// process. Dropping it shuts down all scheduled jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the cron expression is invalid, or the scheduler fails to start.
pub async fn build_scheduler(
    state: AppState,
    cron: Option<&str>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    match cron {
        Some(expr) => register_refresh_job(&scheduler, state, expr).await?,
        None => tracing::info!("scheduler: scheduled refresh disabled"),
    }

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the periodic snapshot refresh.
///
/// Failures are logged and dropped; the next tick tries again.
async fn register_refresh_job(
    scheduler: &JobScheduler,
    state: AppState,
    expr: &str,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(expr, move |_uuid, _lock| {
        let state = state.clone();

        Box::pin(async move {
            tracing::info!("scheduler: starting snapshot refresh");
            match refresh_snapshot(&state).await {
                Ok(snapshot) => tracing::info!(
                    rows = snapshot.rows.len(),
                    priced = snapshot.priced_count(),
                    "scheduler: snapshot refresh complete"
                ),
                Err(e) => tracing::error!(error = %e, "scheduler: snapshot refresh failed"),
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron = expr, "scheduler: registered snapshot refresh job");
    Ok(())
}
