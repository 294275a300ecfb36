//! Command implementations

use anyhow::{bail, Context, Result};
use tracing::{error, info};

use crate::app::{AppContainer, FileVersionCache};
use crate::cli::args::{ContextArgs, EditArgs, ImportArgs, PlanArgs, RunArgs, StatusArgs};
use crate::domain::model::*;
use crate::planner::{CarryContext, EditJob};

impl From<ContextArgs> for CarryContext {
    fn from(args: ContextArgs) -> Self {
        Self {
            filename: args.filename,
            music_file_id: args.music_file_id,
            music_filename: args.music_filename,
        }
    }
}

/// Execute the import command
pub async fn import(container: &dyn AppContainer, args: ImportArgs) -> Result<()> {
    let importer = container.import_interactor();
    let result = if args.music {
        importer.import_music(&args.path).await
    } else {
        importer.import_video(&args.path).await
    };
    let imported = result.with_context(|| format!("Failed to import {}", args.path.display()))?;

    print_json(&imported)
}

/// Execute the edit command
pub async fn edit(container: &dyn AppContainer, args: EditArgs) -> Result<()> {
    let request = EditRequest {
        instruction: args.instruction,
        file_id: args.file_id,
        filename: args.context.filename,
        music_file_id: args.context.music_file_id,
        music_filename: args.context.music_filename,
        style_preference: args.style,
        output_format: args.format,
    };
    request.validate().context("Invalid edit request")?;

    info!("Planning edit for {}: {}", request.file_id, request.instruction);
    run_job(container, EditJob::from(request)).await
}

/// Execute the run command
pub async fn run(container: &dyn AppContainer, args: RunArgs) -> Result<()> {
    let mut step_args = StepArgs::new();
    for (key, value) in args.args {
        step_args.insert(key, value);
    }

    let plan = vec![PlannedStep::new(args.step, step_args)];
    run_job(container, EditJob::with_plan(args.file_id, plan, args.context.into())).await
}

/// Execute the plan command
pub async fn plan(container: &dyn AppContainer, args: PlanArgs) -> Result<()> {
    let plan: Plan = match &args.plan_file {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read plan file {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Plan file {} is not a JSON array of steps", path.display()))?
        }
        None => args
            .steps
            .iter()
            .map(|name| PlannedStep::new(name.trim(), StepArgs::new()))
            .collect(),
    };
    if plan.is_empty() {
        bail!("Plan has no steps");
    }

    run_job(container, EditJob::with_plan(args.file_id, plan, args.context.into())).await
}

/// Execute the tools command
pub fn tools(container: &dyn AppContainer) -> Result<()> {
    for tool in container.registry().catalog() {
        println!("{:<18} {}", tool.name, tool.description);
    }
    Ok(())
}

/// Execute the status command
pub fn status(container: &dyn AppContainer, args: StatusArgs) -> Result<()> {
    let cache = container.version_cache();
    let records: Vec<FileVersionRecord> = match &args.file_id {
        Some(file_id) => cache.get_latest(file_id).into_iter().collect(),
        None => all_records(&cache),
    };

    if records.is_empty() {
        match &args.file_id {
            Some(file_id) => bail!("No processed versions recorded for {}", file_id),
            None => println!("No processed files yet"),
        }
        return Ok(());
    }
    print_json(&records)
}

fn all_records(cache: &FileVersionCache) -> Vec<FileVersionRecord> {
    cache
        .file_ids()
        .iter()
        .filter_map(|id| cache.get_latest(id))
        .collect()
}

/// Submit `job`, wait for it to finish and print the final task
async fn run_job(container: &dyn AppContainer, job: EditJob) -> Result<()> {
    let dispatcher = container.dispatcher();
    let task_id = dispatcher.submit(job);
    info!("Task {} accepted", task_id);

    let task = dispatcher
        .wait(&task_id)
        .await
        .with_context(|| format!("Task {} disappeared", task_id))?;
    print_json(&task)?;

    if task.status == TaskStatus::Failed {
        let message = task.error.unwrap_or_else(|| "unknown error".to_string());
        error!("Task {} failed: {}", task_id, message);
        bail!("Task failed: {}", message);
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output to JSON")?;
    println!("{}", json);
    Ok(())
}
