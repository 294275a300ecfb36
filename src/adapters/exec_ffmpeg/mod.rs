//! FFmpeg execution adapter
//!
//! Runs the jobs described by the engine through the ffmpeg CLI. Every
//! output is rendered into a temporary sibling file and renamed into place
//! only after ffmpeg exits cleanly.

use std::path::{Path, PathBuf};
use std::time::Instant;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::engine::{self, EncodeSettings, FfmpegJob};
use crate::ports::*;

/// Lines of ffmpeg stderr kept in error messages
const STDERR_TAIL_LINES: usize = 12;

/// FFmpeg-based media adapter
pub struct FFmpegAdapter {
    binary: PathBuf,
    encode: EncodeSettings,
    caption_font: String,
}

impl FFmpegAdapter {
    /// Create new FFmpeg adapter
    pub fn new(binary: impl Into<PathBuf>, encode: EncodeSettings, caption_font: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            encode,
            caption_font: caption_font.into(),
        }
    }

    /// Materialize and run a job, then move the result to `output`
    async fn run<F>(&self, label: &str, output: &Path, build: F) -> Result<(), DomainError>
    where
        F: FnOnce(&Path) -> FfmpegJob,
    {
        let started = Instant::now();
        let parent = match output.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        tokio::fs::create_dir_all(&parent).await?;

        let scratch = tempfile::tempdir()?;
        let job = build(scratch.path());

        for file in &job.scratch_files {
            tokio::fs::write(&file.path, &file.contents).await?;
        }
        let script = match &job.filter_graph {
            Some(graph) => {
                let path = scratch.path().join("filter_complex.txt");
                tokio::fs::write(&path, graph).await?;
                debug!("{} filter graph:\n{}", label, graph);
                Some(path)
            }
            None => None,
        };

        let suffix = output
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_else(|| ".mp4".to_string());
        let partial = tempfile::Builder::new()
            .prefix(".partial_")
            .suffix(&suffix)
            .tempfile_in(&parent)?
            .into_temp_path();

        let args = job.args(script.as_deref(), &partial);
        debug!("Running {} {}", self.binary.display(), args.join(" "));

        let result = Command::new(&self.binary)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                DomainError::Transform(format!(
                    "Failed to launch {}: {}",
                    self.binary.display(),
                    e
                ))
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            warn!("{} failed with {}", label, result.status);
            return Err(DomainError::Transform(format!(
                "{} failed ({}): {}",
                label,
                result.status,
                stderr_tail(&stderr)
            )));
        }

        partial
            .persist(output)
            .map_err(|e| DomainError::Io(e.error))?;

        info!(
            "{} wrote {} in {:.2}s",
            label,
            output.display(),
            started.elapsed().as_secs_f64()
        );
        Ok(())
    }
}

#[async_trait]
impl MediaPort for FFmpegAdapter {
    async fn cut_segments(
        &self,
        input: &Path,
        segments: &[Segment],
        has_audio: bool,
        output: &Path,
    ) -> Result<(), DomainError> {
        if segments.is_empty() {
            return Err(DomainError::Transform("No segments to keep".to_string()));
        }
        self.run("Segment cut", output, |_| {
            engine::concat::cut_job(input, segments, has_audio, &self.encode)
        })
        .await
    }

    async fn burn_captions(
        &self,
        input: &Path,
        overlays: &[CaptionOverlay],
        probe: &MediaProbe,
        output: &Path,
    ) -> Result<(), DomainError> {
        self.run("Caption burn-in", output, |scratch| {
            engine::captions::burn_job(input, overlays, probe, &self.caption_font, scratch, &self.encode)
        })
        .await
    }

    async fn mix_music(&self, input: &Path, mix: &MusicMix, output: &Path) -> Result<(), DomainError> {
        self.run("Music mix", output, |_| engine::music::mix_job(input, mix, &self.encode))
            .await
    }

    async fn composite_broll(
        &self,
        input: &Path,
        placements: &[BrollPlacement],
        output: &Path,
    ) -> Result<(), DomainError> {
        self.run("B-roll composite", output, |_| {
            engine::broll::composite_job(input, placements, &self.encode)
        })
        .await
    }
}

/// Last few non-empty lines of ffmpeg's stderr
pub fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().filter(|line| !line.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}
