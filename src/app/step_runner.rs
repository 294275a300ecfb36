// Step runner - Cache check, execute, cache update and status update around every tool

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::app::registry::Tool;
use crate::app::task_table::TaskReporter;
use crate::app::version_cache::FileVersionCache;
use crate::domain::errors::*;
use crate::domain::model::*;

/// Everything a tool needs to produce its artifact
#[derive(Debug, Clone)]
pub struct StepInput {
    pub task_id: TaskId,
    pub file_id: String,
    pub args: StepArgs,
    /// Latest artifact for the file, or the original upload
    pub video: PathBuf,
    /// Segment sidecar recorded by an earlier step, if any
    pub segments_path: Option<PathBuf>,
    pub output_dir: PathBuf,
    /// Stem of the original upload, used to name derived files
    pub stem: String,
}

impl StepInput {
    /// `{processed}/{file_id}/processed_{stem}_{step}.mp4`
    pub fn output_path(&self, step: ToolKind) -> PathBuf {
        self.output_dir
            .join(format!("processed_{}_{}.mp4", self.stem, step))
    }

    /// `{processed}/{file_id}/{stem}_segments.json`
    pub fn sidecar_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}_segments.json", self.stem))
    }
}

/// Uniform middleware applied to every capability invocation
pub struct StepRunner {
    cache: Arc<FileVersionCache>,
    upload_dir: PathBuf,
    processed_dir: PathBuf,
}

impl StepRunner {
    pub fn new(cache: Arc<FileVersionCache>, upload_dir: impl Into<PathBuf>, processed_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache,
            upload_dir: upload_dir.into(),
            processed_dir: processed_dir.into(),
        }
    }

    pub fn cache(&self) -> &Arc<FileVersionCache> {
        &self.cache
    }

    /// Run `tool` for `file_id`, or return the cached artifact if it already ran
    ///
    /// Holds the file's writer lock for the whole call. A failing tool
    /// leaves the version record untouched.
    pub async fn invoke(
        &self,
        tool: &dyn Tool,
        reporter: &TaskReporter,
        file_id: &str,
        args: &StepArgs,
    ) -> Result<ArtifactDescriptor, DomainError> {
        let step = tool.kind();
        let file_id = path_component("file_id", file_id)?;
        let _writer = self.cache.lock_file(file_id).await;
        let latest = self.cache.get_latest(file_id);

        if let Some(record) = latest.as_ref().filter(|r| r.has_applied(step)) {
            info!(task_id = %reporter.id(), file_id, %step, "Step already applied, using cached artifact");
            let descriptor = ArtifactDescriptor::new(
                file_id,
                step,
                &record.latest_artifact_path,
                record.applied_steps.clone(),
                true,
            );
            reporter.record_result(descriptor.clone());
            return Ok(descriptor);
        }

        let filename = args
            .str("filename")
            .map(|name| path_component("filename", name))
            .transpose()?;

        let video = match &latest {
            Some(record) => record.latest_artifact_path.clone(),
            None => {
                let filename = filename.ok_or_else(|| {
                    DomainError::MissingInput(format!(
                        "filename is required for {} (no processed version of {} yet)",
                        step, file_id
                    ))
                })?;
                self.upload_dir.join(file_id).join(filename)
            }
        };
        if !video.exists() {
            return Err(DomainError::asset_not_found(&video));
        }

        let stem = filename
            .and_then(|name| Path::new(name).file_stem())
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| file_id.to_string());

        let input = StepInput {
            task_id: reporter.id(),
            file_id: file_id.to_string(),
            args: args.clone(),
            video,
            segments_path: latest.as_ref().and_then(|r| r.derived_segments_path.clone()),
            output_dir: self.processed_dir.join(file_id),
            stem,
        };

        let started = Instant::now();
        info!(task_id = %input.task_id, file_id, %step, "Running {} on {}", step, input.video.display());
        let output = tool.apply(&input).await?;

        let record = self.cache.record_step(
            file_id,
            step,
            &output.output_path,
            output.segments_path.as_deref(),
        )?;
        info!(
            task_id = %input.task_id,
            file_id,
            %step,
            "{} finished in {:.2}s",
            step.title(),
            started.elapsed().as_secs_f64()
        );

        let descriptor = ArtifactDescriptor::new(
            file_id,
            step,
            &record.latest_artifact_path,
            record.applied_steps,
            false,
        );
        reporter.record_result(descriptor.clone());
        Ok(descriptor)
    }
}

/// Reject identifiers that would escape their storage root
pub fn path_component<'a>(field: &str, value: &'a str) -> Result<&'a str, DomainError> {
    let value = value.trim();
    let single = Path::new(value).file_name().map(|n| n == value).unwrap_or(false);
    if value.is_empty() || !single || value == ".." {
        return Err(DomainError::InvalidRequest(format!(
            "{} must be a plain name, got '{}'",
            field, value
        )));
    }
    Ok(value)
}
