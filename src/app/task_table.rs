// Task table - Task status tracking over watch channels

use std::collections::HashMap;
use std::fmt::Display;
use std::sync::{PoisonError, RwLock};

use chrono::{Duration, Utc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::domain::model::*;

/// Process-wide view of every accepted task
///
/// Each task's state lives in its own watch channel. Status reads clone
/// the latest value and never wait for the worker. Finished tasks stay
/// visible for a retention window and are dropped on the next `create`.
pub struct TaskTable {
    tasks: RwLock<HashMap<TaskId, watch::Receiver<Task>>>,
    retention: Duration,
}

impl Default for TaskTable {
    fn default() -> Self {
        Self::with_retention(Duration::hours(1))
    }
}

impl TaskTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retention(retention: Duration) -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
            retention,
        }
    }

    /// Register a new task in `processing` and hand out its only writer
    pub fn create(&self) -> TaskReporter {
        self.prune_finished();
        let id = TaskId::new();
        let (sender, receiver) = watch::channel(Task::new(id));
        self.tasks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, receiver);

        TaskReporter {
            id,
            sender,
            finished: false,
        }
    }

    pub fn get(&self, id: &TaskId) -> Option<Task> {
        self.tasks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .map(|rx| rx.borrow().clone())
    }

    pub fn subscribe(&self, id: &TaskId) -> Option<watch::Receiver<Task>> {
        self.tasks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Resolve once the task reaches `completed` or `failed`
    pub async fn wait_terminal(&self, id: &TaskId) -> Option<Task> {
        let mut rx = self.subscribe(id)?;
        loop {
            {
                let task = rx.borrow_and_update();
                if task.status.is_terminal() {
                    return Some(task.clone());
                }
            }
            if rx.changed().await.is_err() {
                // Writer gone; whatever it left is final
                return Some(rx.borrow().clone());
            }
        }
    }

    /// Snapshot of all tasks, oldest first
    pub fn list(&self) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .tasks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|rx| rx.borrow().clone())
            .collect();
        tasks.sort_by_key(|t| t.created_at);
        tasks
    }

    /// Drop terminal tasks last updated before the retention window
    pub fn prune_finished(&self) -> usize {
        let cutoff = Utc::now() - self.retention;
        let mut tasks = self.tasks.write().unwrap_or_else(PoisonError::into_inner);
        let before = tasks.len();
        tasks.retain(|_, rx| {
            let task = rx.borrow();
            !(task.status.is_terminal() && task.updated_at <= cutoff)
        });

        let pruned = before - tasks.len();
        if pruned > 0 {
            debug!("Pruned {} finished tasks", pruned);
        }
        pruned
    }
}

/// Sole writer of one task's state
///
/// Terminal transitions consume the reporter, so a finished task can
/// never be mutated again. Dropping an unfinished reporter fails the task.
pub struct TaskReporter {
    id: TaskId,
    sender: watch::Sender<Task>,
    finished: bool,
}

impl TaskReporter {
    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn set_total_steps(&self, total: usize) {
        self.update(|task| task.total_steps = Some(total));
    }

    /// Status becomes `step_{index}`
    pub fn enter_step(&self, index: usize) {
        self.update(|task| {
            task.status = TaskStatus::Step(index);
            task.current_step = Some(index);
        });
    }

    pub fn record_result(&self, descriptor: ArtifactDescriptor) {
        self.update(|task| {
            task.result = Some(descriptor.clone());
            task.results.push(descriptor);
        });
    }

    pub fn complete(mut self) {
        self.finished = true;
        self.update(|task| task.status = TaskStatus::Completed);
        info!(task_id = %self.id, "Task completed");
    }

    pub fn fail(mut self, error: impl Display) {
        self.finished = true;
        let message = error.to_string();
        warn!(task_id = %self.id, "Task failed: {}", message);
        self.update(|task| {
            task.status = TaskStatus::Failed;
            task.error = Some(message);
        });
    }

    fn update(&self, apply: impl FnOnce(&mut Task)) {
        self.sender.send_modify(|task| {
            apply(task);
            task.updated_at = Utc::now();
        });
    }
}

impl Drop for TaskReporter {
    fn drop(&mut self) {
        if !self.finished {
            warn!(task_id = %self.id, "Task abandoned before reaching a terminal state");
            self.update(|task| {
                task.status = TaskStatus::Failed;
                task.error = Some("Task aborted before completion".to_string());
            });
        }
    }
}
