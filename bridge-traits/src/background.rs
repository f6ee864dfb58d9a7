//! Background Execution and Worker Registration
//!
//! Provides deferred task scheduling and the registration handle the worker uses
//! to hurry its own activation.

use std::time::Duration;

use crate::{
    error::Result,
    platform::{PlatformBoxFuture, PlatformSendSync},
};

/// Work handed to a [`BackgroundExecutor`]
pub type BackgroundTask = PlatformBoxFuture<'static, Result<()>>;

/// Scheduled task identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Task execution status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    /// Task is scheduled but not yet running
    Scheduled,
    /// Task is currently executing
    Running,
    /// Task completed successfully
    Completed,
    /// Task failed
    Failed(String),
    /// Task was cancelled
    Cancelled,
}

impl TaskStatus {
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed(_) | TaskStatus::Cancelled
        )
    }
}

/// Background task executor trait
///
/// Runs one-off work after a delay, outside the event that requested it:
/// - **Web**: `setTimeout` inside the worker (lost if the worker is torn down)
/// - **Desktop**: a Tokio task
///
/// # Example
///
/// ```ignore
/// use bridge_traits::background::BackgroundExecutor;
/// use bridge_traits::platform::boxed;
/// use std::time::Duration;
///
/// async fn remind_later(executor: &dyn BackgroundExecutor) -> Result<()> {
///     executor
///         .schedule_once("snooze-reminder", Duration::from_secs(3600), boxed(async { Ok(()) }))
///         .await?;
///     Ok(())
/// }
/// ```
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait BackgroundExecutor: PlatformSendSync {
    /// Run `task` once after `delay`
    ///
    /// `task_id` names the kind of work; the returned [`TaskId`] identifies this
    /// particular scheduling.
    async fn schedule_once(
        &self,
        task_id: &str,
        delay: Duration,
        task: BackgroundTask,
    ) -> Result<TaskId>;

    /// Cancel a scheduled task
    async fn cancel_task(&self, task_id: &TaskId) -> Result<()>;

    /// Get status of a task
    async fn get_task_status(&self, task_id: &TaskId) -> Result<TaskStatus>;

    /// List all known tasks
    async fn list_tasks(&self) -> Result<Vec<TaskId>>;
}

/// Registration handle of the running worker
///
/// - **Web**: `self.skipWaiting()`
/// - **Desktop**: records the request; there is no previous worker to replace
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait WorkerRegistration: PlatformSendSync {
    /// Ask the host to activate this worker without waiting for old pages to close
    async fn skip_waiting(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_id() {
        let id1 = TaskId::new("snooze-reminder");
        let id2 = TaskId::new("snooze-reminder");

        assert_eq!(id1, id2);
        assert_eq!(id1.as_str(), "snooze-reminder");
    }

    #[test]
    fn test_task_status_finished() {
        assert!(TaskStatus::Completed.is_finished());
        assert!(TaskStatus::Failed("boom".into()).is_finished());
        assert!(TaskStatus::Cancelled.is_finished());
        assert!(!TaskStatus::Scheduled.is_finished());
        assert!(!TaskStatus::Running.is_finished());
    }
}
