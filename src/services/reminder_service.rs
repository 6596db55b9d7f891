use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::error::{Error, Result};
use crate::services::interview_service::InterviewService;

fn scheduler_error(e: JobSchedulerError) -> Error {
    Error::Internal(format!("reminder scheduler: {:?}", e))
}

/// Starts the cron-driven reminder sweep. Keep the returned scheduler alive
/// for as long as reminders should fire.
pub async fn start_reminder_job(service: InterviewService, cron: &str) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await.map_err(scheduler_error)?;

    let job = Job::new_async(cron, move |_id, _scheduler| {
        let service = service.clone();
        Box::pin(async move {
            match service.notify_upcoming_interviews().await {
                Ok(0) => {}
                Ok(count) => tracing::debug!(count, "Reminder sweep finished"),
                Err(e) => tracing::error!(error = %e, "Reminder sweep failed"),
            }
        })
    })
    .map_err(scheduler_error)?;

    scheduler.add(job).await.map_err(scheduler_error)?;
    scheduler.start().await.map_err(scheduler_error)?;
    tracing::info!(cron, "Interview reminder job started");
    Ok(scheduler)
}
