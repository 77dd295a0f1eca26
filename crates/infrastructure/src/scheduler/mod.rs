//! Cron-based scheduler for company maintenance
//!
//! Runs the periodic sweeps that keep companies consistent with the world
//! when change notifications were missed:
//! - Headquarters and citizenship desync checks
//! - Legal identity online state and play time
//!
//! Uses `tokio-cron-scheduler` for cron-based scheduling. Every task can also
//! be triggered by name, which is how the startup sweep runs.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
};

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use parking_lot::RwLock;
use thiserror::Error;
use tokio::sync::Mutex as AsyncMutex;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use tracing::{debug, error, info, instrument};

/// Scheduler errors
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Invalid cron expression
    #[error("Invalid cron expression: {0}")]
    InvalidCronExpression(String),

    /// Task not found
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    /// A task with this name is already scheduled
    #[error("Task already scheduled: {0}")]
    DuplicateTask(String),

    /// A triggered run failed
    #[error("Task execution failed: {0}")]
    ExecutionFailed(String),

    /// Internal scheduler error
    #[error("Internal scheduler error: {0}")]
    Internal(String),
}

impl From<JobSchedulerError> for SchedulerError {
    fn from(err: JobSchedulerError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A maintenance sweep the scheduler can run
pub type MaintenanceTask = Arc<dyn Fn() -> BoxFuture<'static, Result<(), String>> + Send + Sync>;

/// Statistics for a scheduled task
#[derive(Debug, Clone)]
pub struct TaskStats {
    pub name: String,
    pub cron_expression: String,
    pub success_count: u64,
    pub failure_count: u64,
    pub last_run: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    /// Average execution duration in milliseconds
    pub avg_duration_ms: u64,
}

struct ScheduledTask {
    name: String,
    cron_expression: String,
    run: MaintenanceTask,
    success_count: AtomicU64,
    failure_count: AtomicU64,
    total_duration_ms: AtomicU64,
    last_run: RwLock<Option<DateTime<Utc>>>,
    last_error: RwLock<Option<String>>,
}

impl ScheduledTask {
    fn stats(&self) -> TaskStats {
        let success = self.success_count.load(Ordering::Relaxed);
        let failure = self.failure_count.load(Ordering::Relaxed);
        let total = success + failure;
        TaskStats {
            name: self.name.clone(),
            cron_expression: self.cron_expression.clone(),
            success_count: success,
            failure_count: failure,
            last_run: *self.last_run.read(),
            last_error: self.last_error.read().clone(),
            avg_duration_ms: if total > 0 {
                self.total_duration_ms.load(Ordering::Relaxed) / total
            } else {
                0
            },
        }
    }

    /// Run once and record the outcome
    async fn execute(&self) -> Result<(), String> {
        debug!(task = %self.name, "Starting maintenance task");
        let start = std::time::Instant::now();
        let result = (self.run)().await;
        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        let now = Utc::now();
        self.total_duration_ms
            .fetch_add(duration_ms, Ordering::Relaxed);
        *self.last_run.write() = Some(now);
        match &result {
            Ok(()) => {
                self.success_count.fetch_add(1, Ordering::Relaxed);
                info!(task = %self.name, duration_ms, "Maintenance task completed");
            },
            Err(e) => {
                self.failure_count.fetch_add(1, Ordering::Relaxed);
                *self.last_error.write() = Some(e.clone());
                error!(task = %self.name, error = %e, duration_ms, "Maintenance task failed");
            },
        }
        result
    }
}

/// Scheduler configuration
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Whether to start the scheduler immediately
    pub auto_start: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { auto_start: true }
    }
}

/// Predefined cron expressions for common schedules
pub mod schedules {
    /// Every second
    pub const EVERY_SECOND: &str = "* * * * * *";
    /// Every 15 minutes
    pub const EVERY_15_MINUTES: &str = "0 */15 * * * *";
    /// Every hour
    pub const HOURLY: &str = "0 0 * * * *";
}

/// Scheduler for recurring maintenance sweeps
pub struct TaskScheduler {
    scheduler: AsyncMutex<JobScheduler>,
    tasks: Arc<RwLock<HashMap<String, Arc<ScheduledTask>>>>,
    running: AtomicBool,
}

impl std::fmt::Debug for TaskScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskScheduler")
            .field("running", &self.running.load(Ordering::Relaxed))
            .field("task_count", &self.tasks.read().len())
            .finish_non_exhaustive()
    }
}

impl TaskScheduler {
    /// Create a new task scheduler
    #[instrument(skip_all)]
    pub async fn new(config: SchedulerConfig) -> Result<Self, SchedulerError> {
        let scheduler = JobScheduler::new().await?;

        let instance = Self {
            scheduler: AsyncMutex::new(scheduler),
            tasks: Arc::new(RwLock::new(HashMap::new())),
            running: AtomicBool::new(false),
        };

        if config.auto_start {
            instance.start().await?;
        }

        info!("Maintenance scheduler initialized");
        Ok(instance)
    }

    /// Start the scheduler
    #[instrument(skip(self))]
    pub async fn start(&self) -> Result<(), SchedulerError> {
        if self.running.load(Ordering::Relaxed) {
            debug!("Scheduler already running");
            return Ok(());
        }

        self.scheduler.lock().await.start().await?;
        self.running.store(true, Ordering::Relaxed);
        info!("Maintenance scheduler started");
        Ok(())
    }

    /// Stop the scheduler gracefully
    ///
    /// `tokio-cron-scheduler` cannot restart after a shutdown; build a new
    /// scheduler instead.
    #[instrument(skip(self))]
    pub async fn stop(&self) -> Result<(), SchedulerError> {
        if !self.running.load(Ordering::Relaxed) {
            debug!("Scheduler already stopped");
            return Ok(());
        }

        self.scheduler.lock().await.shutdown().await?;
        self.running.store(false, Ordering::Relaxed);
        info!("Maintenance scheduler stopped");
        Ok(())
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Schedule `task` under a unique `name`
    ///
    /// Cron expressions have six fields: second, minute, hour, day of month,
    /// month and day of week.
    #[instrument(skip(self, task))]
    pub async fn add_task<F>(
        &self,
        name: &str,
        cron_expression: &str,
        task: F,
    ) -> Result<(), SchedulerError>
    where
        F: Fn() -> BoxFuture<'static, Result<(), String>> + Send + Sync + 'static,
    {
        cron_expression.parse::<cron::Schedule>().map_err(|e| {
            SchedulerError::InvalidCronExpression(format!("{cron_expression}: {e}"))
        })?;
        if self.tasks.read().contains_key(name) {
            return Err(SchedulerError::DuplicateTask(name.to_string()));
        }

        let job_name = name.to_string();
        let tasks = Arc::clone(&self.tasks);
        let job = Job::new_async(cron_expression, move |_uuid, _lock| {
            let entry = tasks.read().get(&job_name).cloned();
            Box::pin(async move {
                if let Some(entry) = entry {
                    let _ = entry.execute().await;
                }
            })
        })
        .map_err(|e| SchedulerError::InvalidCronExpression(e.to_string()))?;

        // registered before the job so the first tick finds it
        self.tasks.write().insert(
            name.to_string(),
            Arc::new(ScheduledTask {
                name: name.to_string(),
                cron_expression: cron_expression.to_string(),
                run: Arc::new(task),
                success_count: AtomicU64::new(0),
                failure_count: AtomicU64::new(0),
                total_duration_ms: AtomicU64::new(0),
                last_run: RwLock::new(None),
                last_error: RwLock::new(None),
            }),
        );
        if let Err(e) = self.scheduler.lock().await.add(job).await {
            self.tasks.write().remove(name);
            return Err(e.into());
        }

        info!(task = %name, cron = %cron_expression, "Maintenance task scheduled");
        Ok(())
    }

    /// Run a task right now, outside its schedule
    #[instrument(skip(self))]
    pub async fn trigger(&self, name: &str) -> Result<(), SchedulerError> {
        let entry = self
            .tasks
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| SchedulerError::TaskNotFound(name.to_string()))?;
        entry
            .execute()
            .await
            .map_err(SchedulerError::ExecutionFailed)
    }

    #[must_use]
    pub fn get_task_stats(&self, name: &str) -> Option<TaskStats> {
        self.tasks.read().get(name).map(|t| t.stats())
    }

    /// Names of all scheduled tasks, sorted
    #[must_use]
    pub fn list_tasks(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tasks.read().keys().cloned().collect();
        names.sort();
        names
    }

    #[must_use]
    pub fn task_count(&self) -> usize {
        self.tasks.read().len()
    }
}
