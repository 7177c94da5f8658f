use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::manifest::runner;
use crate::AppState;

/// Hourly tick a few minutes past the hour. The hour-granularity trigger in
/// the runner decides which users actually fire.
const HOURLY_SCHEDULE: &str = "0 5 * * * *";

pub async fn start_scheduler(state: Arc<AppState>) {
    let scheduler = match JobScheduler::new().await {
        Ok(scheduler) => scheduler,
        Err(e) => {
            tracing::error!("Failed to create job scheduler: {}", e);
            return;
        }
    };

    let job_state = state.clone();
    let job = Job::new_async(HOURLY_SCHEDULE, move |_uuid, _lock| {
        let state = job_state.clone();
        Box::pin(async move {
            tracing::info!("Running scheduled manifest generation");
            match runner::run_invocation(
                &state.repository,
                state.speech.as_ref(),
                state.store.as_ref(),
                None,
                chrono::Utc::now(),
            )
            .await
            {
                Ok(report) => {
                    tracing::info!("Scheduled run published {} manifests", report.processed)
                }
                Err(e) => tracing::error!("Scheduled run failed: {}", e),
            }
        })
    });

    match job {
        Ok(job) => {
            if let Err(e) = scheduler.add(job).await {
                tracing::error!("Failed to add manifest job: {}", e);
                return;
            }
        }
        Err(e) => {
            tracing::error!("Failed to create manifest job: {}", e);
            return;
        }
    }

    if let Err(e) = scheduler.start().await {
        tracing::error!("Failed to start scheduler: {}", e);
    }
}
