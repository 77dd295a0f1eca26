//! Tokio-backed deferred tasks
//!
//! Each task sleeps for its delay on the runtime, then runs. A task keyed
//! like a pending one aborts the pending one. Cancelling a company aborts
//! every task it still has pending.

use std::{
    collections::HashMap,
    sync::Arc,
    time::Duration,
};

use application::ports::{DeferredTaskPort, TaskKey};
use domain::CompanyId;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

struct PendingTask {
    generation: u64,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct PendingTable {
    next_generation: u64,
    tasks: HashMap<TaskKey, PendingTask>,
}

/// Deferred task scheduler running on the ambient tokio runtime
#[derive(Clone, Default)]
pub struct TokioDeferredTasks {
    pending: Arc<Mutex<PendingTable>>,
}

impl std::fmt::Debug for TokioDeferredTasks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokioDeferredTasks")
            .field("pending", &self.pending_count())
            .finish()
    }
}

impl TokioDeferredTasks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tasks scheduled but not yet finished
    pub fn pending_count(&self) -> usize {
        self.pending.lock().tasks.len()
    }

    pub fn is_pending(&self, key: &TaskKey) -> bool {
        self.pending.lock().tasks.contains_key(key)
    }

    /// Abort everything still pending
    pub fn shutdown(&self) -> usize {
        let drained: Vec<PendingTask> = self.pending.lock().tasks.drain().map(|(_, t)| t).collect();
        for task in &drained {
            task.handle.abort();
        }
        if !drained.is_empty() {
            info!(cancelled = drained.len(), "Deferred tasks aborted");
        }
        drained.len()
    }
}

impl DeferredTaskPort for TokioDeferredTasks {
    fn schedule(&self, key: TaskKey, delay: Duration, task: BoxFuture<'static, ()>) {
        let mut table = self.pending.lock();
        table.next_generation += 1;
        let generation = table.next_generation;

        let pending = Arc::clone(&self.pending);
        // the table lock is held until the handle is stored, so the task
        // cannot finish and deregister before it was registered
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
            let mut table = pending.lock();
            if table
                .tasks
                .get(&key)
                .is_some_and(|t| t.generation == generation)
            {
                table.tasks.remove(&key);
            }
        });

        if let Some(replaced) = table.tasks.insert(key, PendingTask { generation, handle }) {
            replaced.handle.abort();
            debug!(company = %key.company, kind = ?key.kind, "Pending task replaced");
        }
    }

    fn cancel_company(&self, company: CompanyId) -> usize {
        let cancelled: Vec<PendingTask> = {
            let mut table = self.pending.lock();
            let keys: Vec<TaskKey> = table
                .tasks
                .keys()
                .filter(|k| k.company == company)
                .copied()
                .collect();
            keys.iter().filter_map(|k| table.tasks.remove(k)).collect()
        };
        for task in &cancelled {
            task.handle.abort();
        }
        if !cancelled.is_empty() {
            debug!(company = %company, cancelled = cancelled.len(), "Deferred tasks cancelled");
        }
        cancelled.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use application::ports::TaskKind;
    use domain::AccountId;

    use super::*;

    fn counting(counter: &Arc<AtomicUsize>) -> BoxFuture<'static, ()> {
        let counter = Arc::clone(counter);
        Box::pin(async move {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn task_runs_after_delay() {
        let tasks = TokioDeferredTasks::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let key = TaskKey::new(CompanyId::new(), TaskKind::ReputationRefresh);

        tasks.schedule(key, Duration::from_secs(1), counting(&counter));
        assert!(tasks.is_pending(&key));

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(!tasks.is_pending(&key));
    }

    #[tokio::test(start_paused = true)]
    async fn same_key_replaces_pending_task() {
        let tasks = TokioDeferredTasks::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let key = TaskKey::new(CompanyId::new(), TaskKind::WealthChange(AccountId::new()));

        for _ in 0..3 {
            tasks.schedule(key, Duration::from_secs(5), counting(&counter));
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(tasks.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_company_aborts_only_its_tasks() {
        let tasks = TokioDeferredTasks::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let doomed = CompanyId::new();
        let kept = CompanyId::new();

        tasks.schedule(
            TaskKey::new(doomed, TaskKind::ReputationRefresh),
            Duration::from_secs(1),
            counting(&counter),
        );
        tasks.schedule(
            TaskKey::new(doomed, TaskKind::WealthChange(AccountId::new())),
            Duration::from_secs(1),
            counting(&counter),
        );
        tasks.schedule(
            TaskKey::new(kept, TaskKind::ReputationRefresh),
            Duration::from_secs(1),
            counting(&counter),
        );

        assert_eq!(tasks.cancel_company(doomed), 2);
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_aborts_everything() {
        let tasks = TokioDeferredTasks::new();
        let counter = Arc::new(AtomicUsize::new(0));
        tasks.schedule(
            TaskKey::new(CompanyId::new(), TaskKind::ReputationRefresh),
            Duration::from_secs(1),
            counting(&counter),
        );

        assert_eq!(tasks.shutdown(), 1);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
