//! Plan execution
//!
//! An [`EditJob`] carries a natural-language instruction (and optionally an
//! explicit plan) for one uploaded file. The [`executor::PlanExecutor`]
//! turns it into tool invocations one step at a time.

use serde::{Deserialize, Serialize};

use crate::domain::model::*;

pub mod executor;

pub use executor::PlanExecutor;

/// Executor state; `Completed` and `Failed` are terminal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExecutorState {
    Planning,
    Executing(usize),
    Completed,
    Failed(String),
}

impl ExecutorState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExecutorState::Completed | ExecutorState::Failed(_))
    }
}

/// Out-of-band values the planner cannot know, injected into every step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarryContext {
    pub filename: Option<String>,
    pub music_file_id: Option<String>,
    pub music_filename: Option<String>,
}

impl CarryContext {
    /// Overwrite `args` with every context value that is set
    pub fn augment(&self, args: &mut StepArgs) {
        let values = [
            ("filename", &self.filename),
            ("music_file_id", &self.music_file_id),
            ("music_filename", &self.music_filename),
        ];
        for (key, value) in values {
            if let Some(value) = value {
                args.insert(key, value.clone());
            }
        }
    }
}

/// Everything needed to run one edit to completion
#[derive(Debug, Clone, PartialEq)]
pub struct EditJob {
    pub file_id: String,
    pub instruction: String,
    /// Explicit plan; `None` or empty asks the planner
    pub plan: Option<Plan>,
    pub context: CarryContext,
    pub style_preference: Option<String>,
    pub output_format: Option<String>,
}

impl EditJob {
    /// A job that skips the planner and runs `plan` as given
    pub fn with_plan(file_id: impl Into<String>, plan: Plan, context: CarryContext) -> Self {
        Self {
            file_id: file_id.into(),
            instruction: String::new(),
            plan: Some(plan),
            context,
            style_preference: None,
            output_format: None,
        }
    }
}

impl From<EditRequest> for EditJob {
    fn from(request: EditRequest) -> Self {
        Self {
            file_id: request.file_id,
            instruction: request.instruction,
            plan: None,
            context: CarryContext {
                filename: request.filename,
                music_file_id: request.music_file_id,
                music_filename: request.music_filename,
            },
            style_preference: request.style_preference,
            output_format: request.output_format,
        }
    }
}

/// Outcome of one executor run
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRun {
    pub plan: Plan,
    pub results: Vec<ArtifactDescriptor>,
    pub state: ExecutorState,
}
