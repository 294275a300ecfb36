// Dedupe interactor - Cut repeated takes out of the video

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::app::registry::Tool;
use crate::app::sidecar;
use crate::app::step_runner::StepInput;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::ports::*;

/// `remove_duplicates`: transcribe, collapse duplicate groups, keep only the surviving segments
pub struct DedupeInteractor {
    transcripts: Arc<dyn TranscriptPort>,
    probe_port: Arc<dyn ProbePort>,
    media_port: Arc<dyn MediaPort>,
    default_threshold: f64,
}

impl DedupeInteractor {
    pub fn new(
        transcripts: Arc<dyn TranscriptPort>,
        probe_port: Arc<dyn ProbePort>,
        media_port: Arc<dyn MediaPort>,
        default_threshold: f64,
    ) -> Self {
        Self {
            transcripts,
            probe_port,
            media_port,
            default_threshold,
        }
    }

    fn threshold(&self, args: &StepArgs) -> Result<f64, DomainError> {
        let threshold = args
            .nonzero_f64("dedupe_threshold")
            .or_else(|| args.nonzero_f64("threshold"))
            .unwrap_or(self.default_threshold);

        if !(0.0..=1.0).contains(&threshold) {
            return Err(DomainError::InvalidRequest(format!(
                "dedupe_threshold must be within [0, 1], got {}",
                threshold
            )));
        }
        Ok(threshold)
    }
}

#[async_trait]
impl Tool for DedupeInteractor {
    fn kind(&self) -> ToolKind {
        ToolKind::RemoveDuplicates
    }

    fn description(&self) -> &'static str {
        "Removes repeated takes of the same sentence, keeping the last take"
    }

    async fn apply(&self, input: &StepInput) -> Result<StepOutput, DomainError> {
        let threshold = self.threshold(&input.args)?;
        let transcript = self.transcripts.transcribe(&input.video).await?;
        if transcript.segments.is_empty() {
            return Err(DomainError::Transform(format!(
                "No speech found in {}",
                input.video.display()
            )));
        }

        let total = transcript.segments.len();
        let segments = transcript.segments;
        let kept = tokio::task::spawn_blocking(move || dedupe(&segments, threshold))
            .await
            .map_err(|e| DomainError::Transform(format!("Dedupe worker failed: {}", e)))?;
        info!(
            task_id = %input.task_id,
            "Kept {} of {} segments (threshold {:.2})",
            kept.len(),
            total,
            threshold
        );
        for segment in &kept {
            debug!("  kept [{:.2}-{:.2}] {}", segment.start, segment.end, segment.text.trim());
        }

        let probe = self.probe_port.probe(&input.video).await?;
        let output_path = input.output_path(self.kind());
        self.media_port
            .cut_segments(&input.video, &kept, probe.has_audio, &output_path)
            .await?;

        let segments_path = input.sidecar_path();
        sidecar::write_sidecar(
            &segments_path,
            &SegmentSidecar {
                timeline: Timeline::Cut,
                segments: kept,
            },
        )?;

        Ok(StepOutput {
            output_path,
            segments_path: Some(segments_path),
            processing_step: self.kind(),
        })
    }
}
