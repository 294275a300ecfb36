// Caption interactor - Burn transcript captions onto the current artifact

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::app::registry::Tool;
use crate::app::sidecar;
use crate::app::step_runner::StepInput;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::ports::*;

/// `add_captions`
///
/// Reuses the segment sidecar of an earlier cut so captions follow the cut
/// timeline; without one the current artifact is transcribed and its own
/// timestamps are used.
pub struct CaptionInteractor {
    transcripts: Arc<dyn TranscriptPort>,
    probe_port: Arc<dyn ProbePort>,
    media_port: Arc<dyn MediaPort>,
    default_font_size: u32,
}

impl CaptionInteractor {
    pub fn new(
        transcripts: Arc<dyn TranscriptPort>,
        probe_port: Arc<dyn ProbePort>,
        media_port: Arc<dyn MediaPort>,
        default_font_size: u32,
    ) -> Self {
        Self {
            transcripts,
            probe_port,
            media_port,
            default_font_size,
        }
    }

    /// Segments plus the sidecar path to record, if a new one was written
    async fn segments_for(&self, input: &StepInput) -> Result<(SegmentSidecar, Option<PathBuf>), DomainError> {
        if let Some(path) = input.segments_path.as_ref().filter(|p| p.exists()) {
            match sidecar::read_sidecar(path) {
                Ok(existing) => return Ok((existing, None)),
                Err(e) => warn!("Ignoring unreadable segment sidecar {}: {}", path.display(), e),
            }
        }

        let transcript = self.transcripts.transcribe(&input.video).await?;
        let fresh = SegmentSidecar {
            timeline: Timeline::Source,
            segments: transcript.segments,
        };
        let path = input.sidecar_path();
        sidecar::write_sidecar(&path, &fresh)?;
        Ok((fresh, Some(path)))
    }
}

#[async_trait]
impl Tool for CaptionInteractor {
    fn kind(&self) -> ToolKind {
        ToolKind::AddCaptions
    }

    fn description(&self) -> &'static str {
        "Adds captions to the video based on its transcript"
    }

    async fn apply(&self, input: &StepInput) -> Result<StepOutput, DomainError> {
        let font_size = input.args.u32("font_size").unwrap_or(self.default_font_size);
        let (timeline, segments_path) = self.segments_for(input).await?;

        let starts = match timeline.timeline {
            Timeline::Cut => cumulative_starts(&timeline.segments),
            Timeline::Source => timeline.segments.iter().map(|s| s.start).collect(),
        };
        let overlays = build_captions(&timeline.segments, &starts, font_size);
        info!(
            task_id = %input.task_id,
            "Placing {} captions at {}pt on the {:?} timeline",
            overlays.len(),
            font_size,
            timeline.timeline
        );

        let probe = self.probe_port.probe(&input.video).await?;
        let output_path = input.output_path(self.kind());
        self.media_port
            .burn_captions(&input.video, &overlays, &probe, &output_path)
            .await?;

        Ok(StepOutput {
            output_path,
            segments_path,
            processing_step: self.kind(),
        })
    }
}
