//! Plan executor state machine
//!
//! `Planning -> Executing(0) -> ... -> Executing(n) -> Completed`, with any
//! error at any point moving to `Failed`. One transition per loop turn; the
//! task yields between transitions so sibling tasks make progress.

use std::sync::Arc;

use tracing::{error, info};

use crate::app::registry::ToolRegistry;
use crate::app::step_runner::StepRunner;
use crate::app::task_table::TaskReporter;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::planner::{EditJob, ExecutorState, PlanRun};
use crate::ports::PlannerPort;

pub struct PlanExecutor {
    registry: Arc<ToolRegistry>,
    runner: Arc<StepRunner>,
    planner: Arc<dyn PlannerPort>,
    default_style: String,
    default_format: String,
}

impl PlanExecutor {
    pub fn new(
        registry: Arc<ToolRegistry>,
        runner: Arc<StepRunner>,
        planner: Arc<dyn PlannerPort>,
        default_style: impl Into<String>,
        default_format: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            runner,
            planner,
            default_style: default_style.into(),
            default_format: default_format.into(),
        }
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Drive `job` to a terminal state, publishing progress through `reporter`
    pub async fn execute(&self, job: EditJob, reporter: TaskReporter) -> PlanRun {
        let mut run = PlanRun {
            plan: Vec::new(),
            results: Vec::new(),
            state: ExecutorState::Planning,
        };

        while !run.state.is_terminal() {
            run.state = match self.advance(&job, &mut run, &reporter).await {
                Ok(next) => next,
                Err(e) => ExecutorState::Failed(e.to_string()),
            };
            tokio::task::yield_now().await;
        }

        match &run.state {
            ExecutorState::Failed(message) => {
                error!(task_id = %reporter.id(), file_id = %job.file_id, "Task failed: {}", message);
                reporter.fail(message);
            }
            _ => {
                info!(
                    task_id = %reporter.id(),
                    file_id = %job.file_id,
                    "Task completed with {} steps",
                    run.results.len()
                );
                reporter.complete();
            }
        }
        run
    }

    async fn advance(
        &self,
        job: &EditJob,
        run: &mut PlanRun,
        reporter: &TaskReporter,
    ) -> Result<ExecutorState, DomainError> {
        match run.state {
            ExecutorState::Planning => {
                let mut plan = self.resolve_plan(job).await?;
                for step in &mut plan {
                    job.context.augment(&mut step.args);
                }
                info!(
                    task_id = %reporter.id(),
                    "Plan: {}",
                    plan.iter().map(|s| s.name.as_str()).collect::<Vec<_>>().join(" -> ")
                );
                reporter.set_total_steps(plan.len());
                run.plan = plan;
                Ok(ExecutorState::Executing(0))
            }
            ExecutorState::Executing(index) if index >= run.plan.len() => Ok(ExecutorState::Completed),
            ExecutorState::Executing(index) => {
                reporter.enter_step(index);
                let step = &run.plan[index];
                let tool = self.registry.lookup(&step.name)?;
                let descriptor = self
                    .runner
                    .invoke(tool.as_ref(), reporter, &job.file_id, &step.args)
                    .await?;
                run.results.push(descriptor);
                Ok(ExecutorState::Executing(index + 1))
            }
            ExecutorState::Completed | ExecutorState::Failed(_) => Ok(run.state.clone()),
        }
    }

    async fn resolve_plan(&self, job: &EditJob) -> Result<Plan, DomainError> {
        if let Some(plan) = job.plan.as_ref().filter(|p| !p.is_empty()) {
            return Ok(plan.clone());
        }

        let request = PlanRequest {
            instruction: job.instruction.clone(),
            available_tools: self.registry.names(),
            style_preference: job
                .style_preference
                .clone()
                .unwrap_or_else(|| self.default_style.clone()),
            output_format: job
                .output_format
                .clone()
                .unwrap_or_else(|| self.default_format.clone()),
        };
        let plan = self.planner.plan(&request).await?;
        if plan.is_empty() {
            return Err(DomainError::Planner("Planner returned an empty plan".to_string()));
        }
        Ok(plan)
    }
}
