//! Wiring of the company service onto the in-memory world
//!
//! Builds the port set from the adapters, starts the service and, when
//! enabled, the maintenance scheduler.

use std::sync::Arc;

use application::{
    ApplicationError, CompanyPolicy, CompanyService,
    ports::{ActionPipelinePort, CompanyPorts, CompanyRegistryPort},
};
use thiserror::Error;
use tracing::info;

use crate::{
    adapters::{InMemoryWorld, TokioDeferredTasks, ValidatingActionPipeline},
    config::{AppConfig, SchedulerAppConfig},
    scheduled_tasks::{
        DESYNC_CHECK_TASK, PLAY_TIME_TASK, create_desync_check_task, create_play_time_task,
    },
    scheduler::{SchedulerConfig, SchedulerError, TaskScheduler},
};

/// Errors raised while bringing the runtime up or down
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Company service error: {0}")]
    Service(#[from] ApplicationError),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),
}

/// Build the port set with `world` serving every world-facing port
pub fn world_ports(
    world: &InMemoryWorld,
    pipeline: Arc<dyn ActionPipelinePort>,
    deferred: &TokioDeferredTasks,
) -> CompanyPorts {
    let world = Arc::new(world.clone());
    CompanyPorts {
        registry: world.clone(),
        pipeline,
        properties: world.clone(),
        accounts: world.clone(),
        members: world.clone(),
        settlements: world.clone(),
        reputation: world.clone(),
        messaging: world.clone(),
        display: world.clone(),
        feed: world.clone(),
        deferred: Arc::new(deferred.clone()),
        provisioning: world.clone(),
        clock: world.clone(),
        storages: world,
    }
}

/// A company service running against the in-memory world
#[derive(Debug, Clone)]
pub struct CompanyRuntime {
    pub world: InMemoryWorld,
    pub pipeline: ValidatingActionPipeline,
    pub deferred: TokioDeferredTasks,
    pub service: Arc<CompanyService>,
}

impl CompanyRuntime {
    /// Wire a fresh world with the validating pipeline
    #[must_use]
    pub fn in_memory(policy: CompanyPolicy) -> Self {
        let pipeline = ValidatingActionPipeline::new();
        let mut runtime = Self::with_pipeline(policy, Arc::new(pipeline.clone()));
        runtime.pipeline = pipeline;
        runtime
    }

    /// Wire a fresh world with a caller-supplied pipeline
    ///
    /// Actions go to `pipeline`; the runtime's own validating pipeline stays empty.
    #[must_use]
    pub fn with_pipeline(policy: CompanyPolicy, pipeline: Arc<dyn ActionPipelinePort>) -> Self {
        let world = InMemoryWorld::new();
        let deferred = TokioDeferredTasks::new();
        let service = CompanyService::new(world_ports(&world, pipeline, &deferred), policy);
        Self {
            world,
            pipeline: ValidatingActionPipeline::new(),
            deferred,
            service,
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::in_memory(config.policy.to_policy())
    }

    fn registry(&self) -> Arc<dyn CompanyRegistryPort> {
        Arc::new(self.world.clone())
    }

    /// Start the service and, if enabled, the maintenance sweeps
    ///
    /// The desync check runs once right away so a world loaded out of sync
    /// is repaired before the first tick.
    pub async fn start(
        &self,
        scheduler: &SchedulerAppConfig,
    ) -> Result<Option<TaskScheduler>, BootstrapError> {
        self.service.start().await?;
        if !scheduler.enabled {
            info!("Maintenance sweeps disabled");
            return Ok(None);
        }

        let tasks = TaskScheduler::new(SchedulerConfig::default()).await?;
        tasks
            .add_task(
                DESYNC_CHECK_TASK,
                &scheduler.desync_check_cron,
                create_desync_check_task(Arc::clone(&self.service), self.registry()),
            )
            .await?;
        tasks
            .add_task(
                PLAY_TIME_TASK,
                &scheduler.play_time_cron,
                create_play_time_task(Arc::clone(&self.service), self.registry()),
            )
            .await?;
        tasks.trigger(DESYNC_CHECK_TASK).await?;
        info!(tasks = tasks.task_count(), "Company runtime started");
        Ok(Some(tasks))
    }

    /// Stop the sweeps, release subscriptions and abort pending deferred work
    pub async fn shutdown(&self, scheduler: Option<TaskScheduler>) -> Result<(), BootstrapError> {
        if let Some(scheduler) = scheduler {
            scheduler.stop().await?;
        }
        self.service.stop().await?;
        let aborted = self.deferred.shutdown();
        info!(aborted, "Company runtime stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use application::ports::WatchTarget;

    use super::*;

    fn disabled() -> SchedulerAppConfig {
        SchedulerAppConfig {
            enabled: false,
            ..SchedulerAppConfig::default()
        }
    }

    #[tokio::test]
    async fn start_subscribes_to_acquisitions() {
        let runtime = CompanyRuntime::in_memory(CompanyPolicy::default());

        let scheduler = runtime.start(&disabled()).await.unwrap();

        assert!(scheduler.is_none());
        assert_eq!(runtime.world.watcher_count(WatchTarget::Acquisitions), 1);
        runtime.shutdown(scheduler).await.unwrap();
        assert_eq!(runtime.world.watcher_count(WatchTarget::Acquisitions), 0);
    }

    #[tokio::test]
    async fn start_schedules_both_sweeps() {
        let runtime = CompanyRuntime::in_memory(CompanyPolicy::default());

        let scheduler = runtime
            .start(&SchedulerAppConfig::default())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            scheduler.list_tasks(),
            vec![DESYNC_CHECK_TASK.to_string(), PLAY_TIME_TASK.to_string()]
        );
        assert_eq!(
            scheduler.get_task_stats(DESYNC_CHECK_TASK).unwrap().success_count,
            1
        );
        runtime.shutdown(Some(scheduler)).await.unwrap();
    }

    #[tokio::test]
    async fn invalid_cron_fails_start() {
        let runtime = CompanyRuntime::in_memory(CompanyPolicy::default());
        let config = SchedulerAppConfig {
            play_time_cron: "hourly".into(),
            ..SchedulerAppConfig::default()
        };

        let result = runtime.start(&config).await;

        assert!(matches!(
            result,
            Err(BootstrapError::Scheduler(SchedulerError::InvalidCronExpression(_)))
        ));
    }

    #[tokio::test]
    async fn in_memory_runtime_shares_one_world() {
        let runtime = CompanyRuntime::in_memory(CompanyPolicy::default());
        let founder = runtime.world.add_member("Founder");

        let company = runtime.service.found_company(founder, "Acme").await.unwrap();

        let stored = runtime.world.company_record(company.id).unwrap();
        assert_eq!(stored.leader(), Some(founder));
        assert!(runtime.world.member_record(company.legal_identity()).is_some());
        assert_eq!(
            runtime.service.employer_of(founder).await.unwrap().map(|c| c.id),
            Some(company.id)
        );
    }
}
