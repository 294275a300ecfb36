// Task dispatcher - One background unit of work per accepted edit

use std::sync::Arc;

use tracing::info;

use crate::app::task_table::TaskTable;
use crate::domain::model::*;
use crate::planner::{EditJob, PlanExecutor};

pub struct TaskDispatcher {
    tasks: Arc<TaskTable>,
    executor: Arc<PlanExecutor>,
}

impl TaskDispatcher {
    pub fn new(tasks: Arc<TaskTable>, executor: Arc<PlanExecutor>) -> Self {
        Self { tasks, executor }
    }

    pub fn tasks(&self) -> &Arc<TaskTable> {
        &self.tasks
    }

    /// Register a task and start it on the runtime; returns immediately
    pub fn submit(&self, job: EditJob) -> TaskId {
        let reporter = self.tasks.create();
        let task_id = reporter.id();
        let executor = Arc::clone(&self.executor);

        info!(task_id = %task_id, file_id = %job.file_id, "Task accepted");
        tokio::spawn(async move {
            executor.execute(job, reporter).await;
        });
        task_id
    }

    /// Current state of `task_id`
    pub fn status(&self, task_id: &TaskId) -> Option<Task> {
        self.tasks.get(task_id)
    }

    /// Wait for `task_id` to reach `completed` or `failed`
    pub async fn wait(&self, task_id: &TaskId) -> Option<Task> {
        self.tasks.wait_terminal(task_id).await
    }
}
