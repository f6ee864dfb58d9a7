//! Background Task Execution and Registration Implementation

use async_trait::async_trait;
use bridge_traits::{
    background::{BackgroundExecutor, BackgroundTask, TaskId, TaskStatus, WorkerRegistration},
    error::{BridgeError, Result},
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, warn};
use uuid::Uuid;

struct TaskInfo {
    status: TaskStatus,
    handle: Option<JoinHandle<()>>,
}

/// Tokio-based background executor for desktop.
///
/// Finished tasks stay queryable until the next `schedule_once`, which drops
/// them before registering the new task.
#[derive(Clone, Default)]
pub struct TokioBackgroundExecutor {
    tasks: Arc<RwLock<HashMap<TaskId, TaskInfo>>>,
}

impl TokioBackgroundExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every completed, failed or cancelled task. Returns how many went.
    pub async fn prune_finished(&self) -> usize {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|_, info| !info.status.is_finished());
        before - tasks.len()
    }

    async fn set_status(tasks: &RwLock<HashMap<TaskId, TaskInfo>>, id: &TaskId, status: TaskStatus) {
        let mut tasks = tasks.write().await;
        if let Some(info) = tasks.get_mut(id) {
            // A cancelled task never comes back to life.
            if info.status != TaskStatus::Cancelled {
                info.status = status;
            }
        }
    }
}

#[async_trait]
impl BackgroundExecutor for TokioBackgroundExecutor {
    async fn schedule_once(
        &self,
        task_id: &str,
        delay: Duration,
        task: BackgroundTask,
    ) -> Result<TaskId> {
        let handle = Handle::try_current().map_err(|_| {
            BridgeError::NotAvailable("No Tokio runtime to schedule background work on".into())
        })?;

        let id = TaskId::new(format!("{}-{}", task_id, Uuid::new_v4()));
        debug!(task = %id.as_str(), delay_ms = delay.as_millis() as u64, "Scheduling one-off task");

        // Register before spawning so status updates always find the entry.
        let mut tasks = self.tasks.write().await;
        tasks.retain(|_, info| !info.status.is_finished());
        tasks.insert(
            id.clone(),
            TaskInfo {
                status: TaskStatus::Scheduled,
                handle: None,
            },
        );

        let registry = Arc::clone(&self.tasks);
        let spawned_id = id.clone();
        let join = handle.spawn(async move {
            sleep(delay).await;
            Self::set_status(&registry, &spawned_id, TaskStatus::Running).await;

            let status = match task.await {
                Ok(()) => TaskStatus::Completed,
                Err(err) => {
                    warn!(task = %spawned_id.as_str(), error = %err, "Background task failed");
                    TaskStatus::Failed(err.to_string())
                }
            };
            Self::set_status(&registry, &spawned_id, status).await;
        });

        if let Some(info) = tasks.get_mut(&id) {
            info.handle = Some(join);
        }

        Ok(id)
    }

    async fn cancel_task(&self, task_id: &TaskId) -> Result<()> {
        let mut tasks = self.tasks.write().await;
        let info = tasks
            .get_mut(task_id)
            .ok_or_else(|| BridgeError::OperationFailed(format!("Unknown task: {}", task_id.as_str())))?;

        if let Some(handle) = info.handle.take() {
            handle.abort();
        }
        if !info.status.is_finished() {
            info.status = TaskStatus::Cancelled;
        }
        Ok(())
    }

    async fn get_task_status(&self, task_id: &TaskId) -> Result<TaskStatus> {
        let tasks = self.tasks.read().await;
        tasks
            .get(task_id)
            .map(|info| info.status.clone())
            .ok_or_else(|| BridgeError::OperationFailed(format!("Unknown task: {}", task_id.as_str())))
    }

    async fn list_tasks(&self) -> Result<Vec<TaskId>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.keys().cloned().collect())
    }
}

/// Registration handle for a natively hosted agent.
///
/// There is never an older worker to displace, so skip-waiting only counts
/// the requests.
#[derive(Debug, Default)]
pub struct DesktopRegistration {
    skip_waiting_requests: AtomicUsize,
}

impl DesktopRegistration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip_waiting_requests(&self) -> usize {
        self.skip_waiting_requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WorkerRegistration for DesktopRegistration {
    async fn skip_waiting(&self) -> Result<()> {
        self.skip_waiting_requests.fetch_add(1, Ordering::SeqCst);
        debug!("Skip-waiting requested");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::platform::boxed;
    use std::sync::atomic::AtomicBool;

    #[tokio::test]
    async fn test_schedule_once_runs_task() {
        let executor = TokioBackgroundExecutor::new();
        let flag = Arc::new(AtomicBool::new(false));
        let flag_clone = Arc::clone(&flag);

        let task_id = executor
            .schedule_once(
                "once",
                Duration::from_millis(20),
                boxed(async move {
                    flag_clone.store(true, Ordering::SeqCst);
                    Ok(())
                }),
            )
            .await
            .unwrap();

        assert!(task_id.as_str().starts_with("once-"));
        sleep(Duration::from_millis(150)).await;

        assert_eq!(
            executor.get_task_status(&task_id).await.unwrap(),
            TaskStatus::Completed
        );
        assert!(flag.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_failed_task_status() {
        let executor = TokioBackgroundExecutor::new();
        let task_id = executor
            .schedule_once(
                "failing",
                Duration::from_millis(5),
                boxed(async { Err(BridgeError::OperationFailed("boom".into())) }),
            )
            .await
            .unwrap();

        sleep(Duration::from_millis(100)).await;
        assert!(matches!(
            executor.get_task_status(&task_id).await.unwrap(),
            TaskStatus::Failed(_)
        ));
    }

    #[tokio::test]
    async fn test_cancel_task() {
        let executor = TokioBackgroundExecutor::new();
        let flag = Arc::new(AtomicBool::new(false));
        let flag_clone = Arc::clone(&flag);

        let task_id = executor
            .schedule_once(
                "cancel",
                Duration::from_secs(60),
                boxed(async move {
                    flag_clone.store(true, Ordering::SeqCst);
                    Ok(())
                }),
            )
            .await
            .unwrap();

        executor.cancel_task(&task_id).await.unwrap();
        assert_eq!(
            executor.get_task_status(&task_id).await.unwrap(),
            TaskStatus::Cancelled
        );
        assert!(!flag.load(Ordering::SeqCst));
        assert_eq!(executor.list_tasks().await.unwrap(), vec![task_id]);
    }

    #[tokio::test]
    async fn test_finished_tasks_are_pruned() {
        let executor = TokioBackgroundExecutor::new();
        let done = executor
            .schedule_once("done", Duration::from_millis(5), boxed(async { Ok(()) }))
            .await
            .unwrap();
        let cancelled = executor
            .schedule_once("cancelled", Duration::from_secs(60), boxed(async { Ok(()) }))
            .await
            .unwrap();
        executor.cancel_task(&cancelled).await.unwrap();
        sleep(Duration::from_millis(100)).await;
        assert_eq!(executor.list_tasks().await.unwrap().len(), 2);

        let pending = executor
            .schedule_once("pending", Duration::from_secs(60), boxed(async { Ok(()) }))
            .await
            .unwrap();

        assert_eq!(executor.list_tasks().await.unwrap(), vec![pending.clone()]);
        assert!(executor.get_task_status(&done).await.is_err());

        executor.cancel_task(&pending).await.unwrap();
        assert_eq!(executor.prune_finished().await, 1);
        assert!(executor.list_tasks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_task() {
        let executor = TokioBackgroundExecutor::new();
        assert!(executor.get_task_status(&TaskId::new("missing")).await.is_err());
        assert!(executor.cancel_task(&TaskId::new("missing")).await.is_err());
    }

    #[tokio::test]
    async fn test_registration_counts_skip_waiting() {
        let registration = DesktopRegistration::new();
        registration.skip_waiting().await.unwrap();
        registration.skip_waiting().await.unwrap();
        assert_eq!(registration.skip_waiting_requests(), 2);
    }
}
