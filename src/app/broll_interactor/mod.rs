// B-roll interactor - Cut away to matching footage where keywords are spoken

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::app::registry::Tool;
use crate::app::step_runner::StepInput;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::ports::*;

/// `add_broll`
pub struct BrollInteractor {
    transcripts: Arc<dyn TranscriptPort>,
    probe_port: Arc<dyn ProbePort>,
    media_port: Arc<dyn MediaPort>,
    library: Arc<dyn BrollLibraryPort>,
    clip_seconds: f64,
    fade_seconds: f64,
}

impl BrollInteractor {
    pub fn new(
        transcripts: Arc<dyn TranscriptPort>,
        probe_port: Arc<dyn ProbePort>,
        media_port: Arc<dyn MediaPort>,
        library: Arc<dyn BrollLibraryPort>,
        clip_seconds: f64,
        fade_seconds: f64,
    ) -> Self {
        Self {
            transcripts,
            probe_port,
            media_port,
            library,
            clip_seconds,
            fade_seconds,
        }
    }

    /// Resolve one split point to a placement, or `None` to skip it
    async fn place(&self, point: &SplitPoint, main: &MediaProbe) -> Result<Option<BrollPlacement>, DomainError> {
        if main.duration > 0.0 && point.split_time >= main.duration {
            warn!("'{}' at {:.2}s is past the end of the video, skipping", point.keyword, point.split_time);
            return Ok(None);
        }

        let Some(clip_path) = self.library.find_broll(&point.keyword).await? else {
            warn!("No B-roll found for '{}', skipping", point.keyword);
            return Ok(None);
        };

        let clip = match self.probe_port.probe(&clip_path).await {
            Ok(clip) => clip,
            Err(e) => {
                warn!("Unreadable B-roll {} ({}), skipping", clip_path.display(), e);
                return Ok(None);
            }
        };

        let duration = if clip.duration > 0.0 {
            self.clip_seconds.min(clip.duration)
        } else {
            self.clip_seconds
        };
        let fitted = fit_within_frame(clip.frame, main.frame);
        debug!(
            "'{}': main={} broll={} fitted={}",
            point.keyword, main.frame, clip.frame, fitted
        );

        Ok(Some(BrollPlacement {
            keyword: point.keyword.clone(),
            clip_path,
            start_time: point.split_time,
            duration,
            fitted,
            frame: main.frame,
            fade: self.fade_seconds,
        }))
    }
}

#[async_trait]
impl Tool for BrollInteractor {
    fn kind(&self) -> ToolKind {
        ToolKind::AddBroll
    }

    fn description(&self) -> &'static str {
        "Adds B-roll footage where the given keywords are spoken"
    }

    async fn apply(&self, input: &StepInput) -> Result<StepOutput, DomainError> {
        let keywords = input.args.string_list("keywords");
        if keywords.is_empty() {
            return Err(DomainError::MissingInput(
                "keywords are required for add_broll".to_string(),
            ));
        }

        let transcript = self.transcripts.transcribe(&input.video).await?;
        let points = find_split_points(&transcript.segments, &keywords);
        let main = self.probe_port.probe(&input.video).await?;

        let mut placements = Vec::with_capacity(points.len());
        for point in &points {
            if let Some(placement) = self.place(point, &main).await? {
                placements.push(placement);
            }
        }
        info!(
            task_id = %input.task_id,
            "{} split points for {:?}, {} cutaways placed",
            points.len(),
            keywords,
            placements.len()
        );

        let output_path = input.output_path(self.kind());
        self.media_port
            .composite_broll(&input.video, &placements, &output_path)
            .await?;

        Ok(StepOutput {
            output_path,
            segments_path: None,
            processing_step: self.kind(),
        })
    }
}
