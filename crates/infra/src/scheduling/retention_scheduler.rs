//! Cron-driven execution log retention.
//!
//! Runs [`LogRetentionService::cleanup_old_logs`] on a schedule. A failed or
//! timed-out pass is logged and the next tick tries again; nothing is
//! propagated to request handling.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use orbu_core::LogRetentionService;
use orbu_domain::constants::DEFAULT_RETENTION_CRON;
use orbu_domain::RetentionConfig;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Configuration for the retention scheduler.
#[derive(Debug, Clone)]
pub struct RetentionSchedulerConfig {
    /// Six-field cron expression (seconds first).
    pub cron_expression: String,
    /// Upper bound for one cleanup pass.
    pub job_timeout: Duration,
    pub start_timeout: Duration,
    pub stop_timeout: Duration,
    /// Timeout for awaiting the monitor task join handle.
    pub join_timeout: Duration,
}

impl Default for RetentionSchedulerConfig {
    fn default() -> Self {
        Self {
            cron_expression: DEFAULT_RETENTION_CRON.into(),
            job_timeout: Duration::from_secs(300),
            start_timeout: Duration::from_secs(5),
            stop_timeout: Duration::from_secs(5),
            join_timeout: Duration::from_secs(5),
        }
    }
}

impl From<&RetentionConfig> for RetentionSchedulerConfig {
    fn from(settings: &RetentionConfig) -> Self {
        Self {
            cron_expression: settings.cron_expression.clone(),
            job_timeout: Duration::from_secs(settings.job_timeout_secs),
            ..Self::default()
        }
    }
}

/// Outcome counters for the passes run since the scheduler last started.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionPassStats {
    pub passes: u64,
    /// Passes that errored or timed out.
    pub failures: u64,
    pub total_deleted: u64,
    pub last_finished_at: Option<DateTime<Utc>>,
}

/// Retention scheduler with explicit lifecycle management.
pub struct RetentionScheduler {
    scheduler: Option<JobScheduler>,
    config: RetentionSchedulerConfig,
    monitor_handle: Option<JoinHandle<()>>,
    cancellation: CancellationToken,
    retention: Arc<LogRetentionService>,
    stats: Arc<Mutex<RetentionPassStats>>,
}

impl RetentionScheduler {
    pub fn new(config: RetentionSchedulerConfig, retention: Arc<LogRetentionService>) -> Self {
        Self {
            scheduler: None,
            config,
            monitor_handle: None,
            cancellation: CancellationToken::new(),
            retention,
            stats: Arc::new(Mutex::new(RetentionPassStats::default())),
        }
    }

    /// Register the cleanup job and start ticking.
    #[instrument(skip(self), fields(cron = %self.config.cron_expression))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        self.cancellation = CancellationToken::new();
        *self.stats.lock() = RetentionPassStats::default();

        let scheduler = self.build_scheduler().await?;
        let start_timeout = self.config.start_timeout;
        tokio::time::timeout(start_timeout, scheduler.start())
            .await
            .map_err(|source| SchedulerError::Timeout { duration: start_timeout, source })?
            .map_err(|source| SchedulerError::StartFailed { source })?;

        self.scheduler = Some(scheduler);

        let cancel = self.cancellation.clone();
        let stats = Arc::clone(&self.stats);
        self.monitor_handle = Some(tokio::spawn(monitor_task(cancel, stats)));

        info!(scheduler = "retention", event = "start", "Retention scheduler started");
        Ok(())
    }

    /// Shut the job scheduler down and wait for the monitor task.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        let Some(mut scheduler) = self.scheduler.take() else {
            return Err(SchedulerError::NotRunning);
        };

        self.cancellation.cancel();

        let stop_timeout = self.config.stop_timeout;
        tokio::time::timeout(stop_timeout, scheduler.shutdown())
            .await
            .map_err(|source| SchedulerError::Timeout { duration: stop_timeout, source })?
            .map_err(|source| SchedulerError::StopFailed { source })?;

        if let Some(handle) = self.monitor_handle.take() {
            let join_timeout = self.config.join_timeout;
            tokio::time::timeout(join_timeout, handle)
                .await
                .map_err(|source| SchedulerError::Timeout { duration: join_timeout, source })??;
        }

        info!(scheduler = "retention", event = "stop", "Retention scheduler stopped");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_some()
    }

    /// Snapshot of the pass counters.
    pub fn pass_stats(&self) -> RetentionPassStats {
        self.stats.lock().clone()
    }

    async fn build_scheduler(&self) -> SchedulerResult<JobScheduler> {
        let scheduler =
            JobScheduler::new().await.map_err(|source| SchedulerError::CreationFailed { source })?;

        let retention = Arc::clone(&self.retention);
        let stats = Arc::clone(&self.stats);
        let job_timeout = self.config.job_timeout;

        let job = Job::new_async(self.config.cron_expression.as_str(), move |_id, _lock| {
            let retention = Arc::clone(&retention);
            let stats = Arc::clone(&stats);
            Box::pin(async move { run_pass(&retention, &stats, job_timeout).await })
        })
        .map_err(|source| SchedulerError::JobRegistrationFailed { source })?;

        let job_id = job.guid();
        scheduler
            .add(job)
            .await
            .map_err(|source| SchedulerError::JobRegistrationFailed { source })?;

        debug!(cron = %self.config.cron_expression, job_id = %job_id, "Registered retention job");
        Ok(scheduler)
    }
}

async fn run_pass(
    retention: &LogRetentionService,
    stats: &Mutex<RetentionPassStats>,
    job_timeout: Duration,
) {
    let started = Instant::now();
    let outcome = tokio::time::timeout(job_timeout, retention.cleanup_old_logs()).await;

    let mut deleted = 0;
    match &outcome {
        Ok(Ok(report)) => {
            deleted = report.total_deleted;
            info!(
                scheduler = "retention",
                total_deleted = report.total_deleted,
                endpoints_processed = report.endpoints_processed,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Retention pass finished"
            );
        }
        Ok(Err(err)) => error!(
            scheduler = "retention",
            error = %err,
            error_kind = err.kind(),
            "Retention pass failed"
        ),
        Err(_) => warn!(
            scheduler = "retention",
            event = "job_timeout",
            timeout_secs = job_timeout.as_secs(),
            "Retention pass timed out"
        ),
    }

    let mut stats = stats.lock();
    stats.passes += 1;
    if !matches!(outcome, Ok(Ok(_))) {
        stats.failures += 1;
    }
    stats.total_deleted += deleted as u64;
    stats.last_finished_at = Some(Utc::now());
}

/// Waits for cancellation, then logs what ran while the scheduler was up.
async fn monitor_task(cancel: CancellationToken, stats: Arc<Mutex<RetentionPassStats>>) {
    cancel.cancelled().await;

    let summary = stats.lock().clone();
    info!(
        scheduler = "retention",
        event = "monitor_exit",
        passes = summary.passes,
        failures = summary.failures,
        total_deleted = summary.total_deleted,
        last_finished_at = ?summary.last_finished_at,
        "Retention monitor exiting"
    );
}

impl Drop for RetentionScheduler {
    fn drop(&mut self) {
        if self.is_running() {
            warn!(
                scheduler = "retention",
                event = "drop_cancel",
                "RetentionScheduler dropped while running; cancelling tasks"
            );
            self.cancellation.cancel();
        }
    }
}
