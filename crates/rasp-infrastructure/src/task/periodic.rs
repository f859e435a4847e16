//! Periodic task implementation

use async_trait::async_trait;
use futures::FutureExt;
use rasp_domain::error::{Error, Result};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Work executed on every tick
#[async_trait]
pub trait TaskAction: Send + Sync + 'static {
    /// Name used in log records
    fn name(&self) -> &str;

    /// Run one tick
    async fn execute(&self) -> Result<()>;

    /// Called with the error of a failed tick
    async fn handle_error(&self, error: &Error) {
        tracing::warn!("[TASK] {} failed: {}", self.name(), error);
    }
}

/// Lifecycle state of a [`PeriodicTask`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Ticking and executing the action
    Running,
    /// Worker alive but parked until resumed or stopped
    Suspended,
    /// Not started yet, or stopped for good
    Stopped,
}

/// Counters exposed for monitoring and tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    /// Completed action runs, failed ones included
    pub executions: u64,
    /// Runs that returned an error or panicked
    pub failures: u64,
}

#[derive(Default)]
struct AtomicTaskStats {
    executions: AtomicU64,
    failures: AtomicU64,
}

/// Fixed-delay background worker
///
/// `start` spawns exactly one worker on the current tokio runtime. `stop` is
/// cooperative and terminal: an in-flight action and the sleep after it still
/// complete, then the worker exits. A stopped task cannot be restarted.
pub struct PeriodicTask {
    interval: Duration,
    action: Arc<dyn TaskAction>,
    state: watch::Sender<TaskState>,
    started: AtomicBool,
    stats: Arc<AtomicTaskStats>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl PeriodicTask {
    /// Create a stopped task
    pub fn new(action: Arc<dyn TaskAction>, interval: Duration) -> Self {
        let (state, _) = watch::channel(TaskState::Stopped);
        Self {
            interval,
            action,
            state,
            started: AtomicBool::new(false),
            stats: Arc::new(AtomicTaskStats::default()),
            handle: Mutex::new(None),
        }
    }

    /// Spawn the worker
    ///
    /// Fails if the task was already started or no tokio runtime is running.
    pub fn start(&self) -> Result<()> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(Error::internal(format!(
                "task {} was already started",
                self.action.name()
            )));
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            self.started.store(false, Ordering::SeqCst);
            Error::internal(format!("no tokio runtime to start {}: {}", self.action.name(), e))
        })?;

        self.state.send_replace(TaskState::Running);
        let rx = self.state.subscribe();
        let action = Arc::clone(&self.action);
        let stats = Arc::clone(&self.stats);
        let interval = self.interval;

        tracing::info!(
            "[TASK] Starting {} with interval {:?}",
            action.name(),
            interval
        );
        let handle = runtime.spawn(run_loop(action, interval, rx, stats));
        *self.handle.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        Ok(())
    }

    /// Ask the worker to exit after its current iteration
    pub fn stop(&self) {
        let previous = self.state.send_replace(TaskState::Stopped);
        if previous != TaskState::Stopped {
            tracing::info!("[TASK] Stop signal sent to {}", self.action.name());
        }
    }

    /// Park the worker without ending it
    pub fn suspend(&self) {
        self.state.send_if_modified(|state| {
            if *state == TaskState::Running {
                *state = TaskState::Suspended;
                true
            } else {
                false
            }
        });
    }

    /// Wake a suspended worker
    pub fn resume(&self) {
        self.state.send_if_modified(|state| {
            if *state == TaskState::Suspended {
                *state = TaskState::Running;
                true
            } else {
                false
            }
        });
    }

    /// Current lifecycle state
    pub fn state(&self) -> TaskState {
        *self.state.borrow()
    }

    /// Whether the task is started and not stopped
    pub fn is_alive(&self) -> bool {
        self.state() != TaskState::Stopped
    }

    /// Snapshot of the task counters
    pub fn stats(&self) -> TaskStats {
        TaskStats {
            executions: self.stats.executions.load(Ordering::Relaxed),
            failures: self.stats.failures.load(Ordering::Relaxed),
        }
    }

    /// Wait for the worker to exit
    ///
    /// Returns immediately if the task never started or was already joined.
    pub async fn join(&self) {
        let handle = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle
            && let Err(e) = handle.await
        {
            tracing::error!("[TASK] {} worker ended abnormally: {}", self.action.name(), e);
        }
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for PeriodicTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeriodicTask")
            .field("name", &self.action.name())
            .field("interval", &self.interval)
            .field("state", &self.state())
            .finish()
    }
}

async fn run_loop(
    action: Arc<dyn TaskAction>,
    interval: Duration,
    mut rx: watch::Receiver<TaskState>,
    stats: Arc<AtomicTaskStats>,
) {
    loop {
        let state = *rx.borrow_and_update();
        match state {
            TaskState::Stopped => break,
            TaskState::Suspended => {
                // Parked until the state changes; a closed channel means the
                // task handle is gone
                if rx.changed().await.is_err() {
                    break;
                }
                continue;
            }
            TaskState::Running => {}
        }

        run_once(action.as_ref(), &stats).await;
        tokio::time::sleep(interval).await;
    }
    tracing::info!("[TASK] {} stopped", action.name());
}

// Failures and panics from the action or its error handler end here
async fn run_once(action: &dyn TaskAction, stats: &AtomicTaskStats) {
    let outcome = AssertUnwindSafe(action.execute()).catch_unwind().await;
    stats.executions.fetch_add(1, Ordering::Relaxed);

    let error = match outcome {
        Ok(Ok(())) => return,
        Ok(Err(e)) => e,
        Err(panic) => Error::internal(format!("action panicked: {}", panic_message(&*panic))),
    };
    stats.failures.fetch_add(1, Ordering::Relaxed);

    if let Err(panic) = AssertUnwindSafe(action.handle_error(&error))
        .catch_unwind()
        .await
    {
        tracing::error!(
            "[TASK] {} error handler panicked: {}",
            action.name(),
            panic_message(&*panic)
        );
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
