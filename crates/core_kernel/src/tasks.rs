//! Task Supervisor
//!
//! Process-wide registry of long-lived background operations. The supervisor
//! starts units of work as tokio tasks, tracks their completion, and cancels
//! all outstanding ones on shutdown.
//!
//! # Lifecycle
//!
//! Every unit of work is wrapped so that, when it finishes, it removes itself
//! from the tracked set exactly once. A failure other than cancellation is
//! logged and forwarded on the supervisor's failure channel so operators are
//! notified; cancellation itself is never treated as an error.
//!
//! Once [`TaskSupervisor::cancel_all`] has been invoked the supervisor stays
//! permanently shut down: later [`TaskSupervisor::spawn`] calls fail with
//! [`SupervisorError::ShutdownInProgress`] and no work is scheduled. There is
//! deliberately no restart API.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Errors raised by the task supervisor
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("cannot register new tasks while shutdown is in progress")]
    ShutdownInProgress,
}

/// Opaque identifier of one supervised task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TSK-{}", self.0)
    }
}

/// Report of a managed task that finished with an error other than cancellation
#[derive(Debug, Clone)]
pub struct TaskFailure {
    pub task: TaskId,
    pub name: String,
    pub error: String,
}

/// Handle to one supervised background operation
#[derive(Debug, Clone)]
pub struct ManagedTask {
    id: TaskId,
    name: String,
    finished: Arc<AtomicBool>,
}

impl ManagedTask {
    /// Returns the task identifier
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the name the task was registered under
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true once the underlying unit of work has completed
    /// (normally or by error; cancellation leaves the flag unset)
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}

struct Registry {
    shutting_down: bool,
    next_id: u64,
    tasks: HashMap<TaskId, JoinHandle<()>>,
}

/// Process-wide supervisor for background operations
///
/// One instance owns the lifetime of every background task it spawns;
/// the instance itself is owned by the application context rather than a
/// global, preserving single-instance-per-process semantics without hidden
/// singleton state.
pub struct TaskSupervisor {
    registry: Arc<Mutex<Registry>>,
    failures_tx: mpsc::UnboundedSender<TaskFailure>,
    failures_rx: Mutex<Option<mpsc::UnboundedReceiver<TaskFailure>>>,
    drained_tx: watch::Sender<bool>,
    drained_rx: watch::Receiver<bool>,
}

impl TaskSupervisor {
    /// Creates a new supervisor with no tracked tasks
    pub fn new() -> Self {
        let (failures_tx, failures_rx) = mpsc::unbounded_channel();
        let (drained_tx, drained_rx) = watch::channel(false);
        Self {
            registry: Arc::new(Mutex::new(Registry {
                shutting_down: false,
                next_id: 0,
                tasks: HashMap::new(),
            })),
            failures_tx,
            failures_rx: Mutex::new(Some(failures_rx)),
            drained_tx,
            drained_rx,
        }
    }

    /// Schedules a unit of work for concurrent execution
    ///
    /// # Arguments
    ///
    /// * `name` - Human-readable task name used in logs and failure reports
    /// * `work` - The asynchronous unit of work to supervise
    ///
    /// # Errors
    ///
    /// Fails with [`SupervisorError::ShutdownInProgress`] once `cancel_all`
    /// has been invoked; in that case the work is dropped unexecuted.
    pub fn spawn<F>(&self, name: &str, work: F) -> Result<ManagedTask, SupervisorError>
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let mut registry = self.registry.lock().expect("supervisor registry poisoned");
        if registry.shutting_down {
            return Err(SupervisorError::ShutdownInProgress);
        }

        let id = TaskId(registry.next_id);
        registry.next_id += 1;

        let finished = Arc::new(AtomicBool::new(false));
        let task = ManagedTask {
            id,
            name: name.to_string(),
            finished: Arc::clone(&finished),
        };

        let shared = Arc::clone(&self.registry);
        let failures = self.failures_tx.clone();
        let task_name = name.to_string();

        let handle = tokio::spawn(async move {
            let outcome = work.await;
            finished.store(true, Ordering::SeqCst);
            shared
                .lock()
                .expect("supervisor registry poisoned")
                .tasks
                .remove(&id);
            if let Err(error) = outcome {
                tracing::error!(task = %task_name, %error, "background task failed");
                let _ = failures.send(TaskFailure {
                    task: id,
                    name: task_name,
                    error: format!("{error:#}"),
                });
            }
        });

        registry.tasks.insert(id, handle);
        tracing::debug!(task = %name, %id, "background task registered");
        Ok(task)
    }

    /// Requests cancellation of every currently tracked task and waits for
    /// each of them to settle before returning
    ///
    /// Idempotent: a second call after the first returns has no further side
    /// effects, and a concurrent call waits for the in-flight drain to
    /// finish.
    pub async fn cancel_all(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut registry = self.registry.lock().expect("supervisor registry poisoned");
            if registry.shutting_down {
                drop(registry);
                let mut drained = self.drained_rx.clone();
                let _ = drained.wait_for(|settled| *settled).await;
                return;
            }
            registry.shutting_down = true;
            registry.tasks.drain().map(|(_, handle)| handle).collect()
        };

        tracing::info!(count = handles.len(), "cancelling background tasks");
        for handle in &handles {
            handle.abort();
        }
        for handle in handles {
            match handle.await {
                Ok(()) => {}
                Err(join_error) if join_error.is_cancelled() => {}
                Err(join_error) => {
                    tracing::error!(%join_error, "background task panicked during shutdown");
                }
            }
        }
        self.drained_tx.send_replace(true);
        tracing::info!("all background tasks settled");
    }

    /// Takes the receiving end of the failure channel
    ///
    /// Returns `None` after the first call; there is a single consumer.
    pub fn failures(&self) -> Option<mpsc::UnboundedReceiver<TaskFailure>> {
        self.failures_rx
            .lock()
            .expect("supervisor failure channel poisoned")
            .take()
    }

    /// Number of tasks currently tracked as running
    pub fn active_count(&self) -> usize {
        self.registry
            .lock()
            .expect("supervisor registry poisoned")
            .tasks
            .len()
    }

    /// Returns true once shutdown has begun
    pub fn is_shutting_down(&self) -> bool {
        self.registry
            .lock()
            .expect("supervisor registry poisoned")
            .shutting_down
    }
}

impl Default for TaskSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        for _ in 0..200 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached in time");
    }

    #[tokio::test]
    async fn test_spawn_runs_work_to_completion() {
        let supervisor = TaskSupervisor::new();
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);

        let task = supervisor
            .spawn("unit", async move {
                flag.store(true, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();

        wait_until(|| task.is_finished()).await;
        assert!(ran.load(Ordering::SeqCst));
        wait_until(|| supervisor.active_count() == 0).await;
    }

    #[tokio::test]
    async fn test_spawn_after_cancel_all_fails_and_never_runs() {
        let supervisor = TaskSupervisor::new();
        supervisor.cancel_all().await;

        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        let result = supervisor.spawn("late", async move {
            flag.store(true, Ordering::SeqCst);
            Ok(())
        });

        assert!(matches!(result, Err(SupervisorError::ShutdownInProgress)));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_cancel_all_stops_long_running_tasks() {
        let supervisor = TaskSupervisor::new();
        let completions = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let completions = Arc::clone(&completions);
            supervisor
                .spawn("sleeper", async move {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    completions.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
                .unwrap();
        }

        assert_eq!(supervisor.active_count(), 3);
        supervisor.cancel_all().await;
        assert_eq!(supervisor.active_count(), 0);
        // cancelled tasks never reached their completion point
        assert_eq!(completions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancel_all_is_idempotent() {
        let supervisor = TaskSupervisor::new();
        supervisor
            .spawn("sleeper", async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            })
            .unwrap();

        supervisor.cancel_all().await;
        supervisor.cancel_all().await;
        assert!(supervisor.is_shutting_down());
        assert_eq!(supervisor.active_count(), 0);
    }

    #[tokio::test]
    async fn test_failure_is_reported_on_the_failure_channel() {
        let supervisor = TaskSupervisor::new();
        let mut failures = supervisor.failures().expect("first take");

        supervisor
            .spawn("broken", async { Err(anyhow::anyhow!("boom")) })
            .unwrap();

        let failure = failures.recv().await.expect("failure report");
        assert_eq!(failure.name, "broken");
        assert!(failure.error.contains("boom"));
        // single consumer
        assert!(supervisor.failures().is_none());
    }

    #[tokio::test]
    async fn test_cancellation_is_not_reported_as_failure() {
        let supervisor = TaskSupervisor::new();
        let mut failures = supervisor.failures().expect("first take");

        supervisor
            .spawn("sleeper", async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            })
            .unwrap();

        supervisor.cancel_all().await;
        assert!(failures.try_recv().is_err());
    }
}
