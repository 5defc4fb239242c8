//! Recurring scrape trigger
//!
//! A single job on `tokio-cron-scheduler` fires the pipeline either on a
//! fixed period or on a cron expression. Each firing runs exactly one cycle
//! on its own task; a slow cycle may overlap the next one.

use anyhow::{Context, Result};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::info;

use crate::pipeline::ScrapePipeline;

/// When to run the scrape cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schedule {
    /// Fixed polling period, first firing one period after start
    Every(Duration),
    /// Six-field cron expression (with seconds), evaluated in UTC,
    /// e.g. `0 0 16 * * *` for daily at 16:00
    Cron(String),
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schedule::Every(period) => write!(f, "every {}s", period.as_secs_f64()),
            Schedule::Cron(expr) => write!(f, "cron '{}'", expr),
        }
    }
}

/// Running scheduler. Dropping it does not stop the job; call [`stop`].
///
/// [`stop`]: SchedulerHandle::stop
pub struct SchedulerHandle {
    scheduler: JobScheduler,
    schedule: Schedule,
}

impl SchedulerHandle {
    /// Register the scrape job and start firing it.
    ///
    /// # Errors
    /// Returns an error if the cron expression is invalid or the scheduler
    /// fails to start.
    pub async fn start(schedule: Schedule, pipeline: Arc<ScrapePipeline>) -> Result<Self> {
        info!("Starting scrape scheduler ({})", schedule);

        let scheduler = JobScheduler::new()
            .await
            .context("Failed to create job scheduler")?;

        let job = match &schedule {
            Schedule::Every(period) => Job::new_repeated_async(*period, move |_uuid, _lock| {
                let pipeline = pipeline.clone();
                Box::pin(async move {
                    pipeline.run_logged().await;
                })
            })
            .context("Failed to create interval job")?,
            Schedule::Cron(expr) => Job::new_async(expr.as_str(), move |_uuid, _lock| {
                let pipeline = pipeline.clone();
                Box::pin(async move {
                    pipeline.run_logged().await;
                })
            })
            .with_context(|| format!("Invalid cron expression: {}", expr))?,
        };

        scheduler.add(job).await.context("Failed to add scrape job")?;
        scheduler
            .start()
            .await
            .context("Failed to start job scheduler")?;

        Ok(Self {
            scheduler,
            schedule,
        })
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Stop firing. Cycles already running are not cancelled.
    pub async fn stop(mut self) -> Result<()> {
        self.scheduler
            .shutdown()
            .await
            .context("Failed to shut down job scheduler")?;
        info!("Scrape scheduler stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_display_is_readable() {
        assert_eq!(Schedule::Every(Duration::from_secs(60)).to_string(), "every 60s");
        assert_eq!(
            Schedule::Cron("0 0 16 * * *".to_string()).to_string(),
            "cron '0 0 16 * * *'"
        );
    }
}
