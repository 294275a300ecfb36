// Music interactor - Mix a background track under the video

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::app::registry::Tool;
use crate::app::step_runner::{path_component, StepInput};
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// `add_music`
///
/// Looping and volume problems degrade to the unmodified track with a warning.
pub struct MusicInteractor {
    probe_port: Arc<dyn ProbePort>,
    media_port: Arc<dyn MediaPort>,
    music_dir: PathBuf,
    default_volume: f64,
}

impl MusicInteractor {
    pub fn new(
        probe_port: Arc<dyn ProbePort>,
        media_port: Arc<dyn MediaPort>,
        music_dir: impl Into<PathBuf>,
        default_volume: f64,
    ) -> Self {
        Self {
            probe_port,
            media_port,
            music_dir: music_dir.into(),
            default_volume,
        }
    }

    fn music_path(&self, args: &StepArgs) -> Result<PathBuf, DomainError> {
        let (id, name) = match (args.str("music_file_id"), args.str("music_filename")) {
            (Some(id), Some(name)) => (id, name),
            _ => {
                return Err(DomainError::MissingInput(
                    "music_file_id and music_filename are required".to_string(),
                ))
            }
        };
        let path = self
            .music_dir
            .join(path_component("music_file_id", id)?)
            .join(path_component("music_filename", name)?);

        if !path.exists() {
            return Err(DomainError::asset_not_found(&path));
        }
        Ok(path)
    }

    fn volume(&self, args: &StepArgs) -> Option<f64> {
        if args.get("music_volume").map_or(true, |v| v.is_null()) {
            return Some(self.default_volume);
        }
        match args.f64("music_volume") {
            Some(volume) if volume.is_finite() && volume >= 0.0 => Some(volume),
            _ => {
                warn!(
                    "Unusable music_volume {:?}, keeping the track at its own level",
                    args.get("music_volume")
                );
                None
            }
        }
    }
}

#[async_trait]
impl Tool for MusicInteractor {
    fn kind(&self) -> ToolKind {
        ToolKind::AddMusic
    }

    fn description(&self) -> &'static str {
        "Adds background music to the video"
    }

    async fn apply(&self, input: &StepInput) -> Result<StepOutput, DomainError> {
        let music_path = self.music_path(&input.args)?;
        let volume = self.volume(&input.args);

        let (loop_to, video_has_audio) = match self.probe_port.probe(&input.video).await {
            Ok(probe) if probe.duration > 0.0 => (Some(probe.duration), probe.has_audio),
            Ok(probe) => {
                warn!("Video duration unknown, music will play once");
                (None, probe.has_audio)
            }
            Err(e) => {
                warn!("Could not probe {} ({}), music will play once", input.video.display(), e);
                (None, true)
            }
        };

        let mix = MusicMix {
            music_path,
            volume,
            loop_to,
            video_has_audio,
        };
        info!(
            task_id = %input.task_id,
            "Mixing {} (volume {:?}, loop to {:?})",
            mix.music_path.display(),
            mix.volume,
            mix.loop_to
        );

        let output_path = input.output_path(self.kind());
        self.media_port
            .mix_music(&input.video, &mix, &output_path)
            .await?;

        Ok(StepOutput {
            output_path,
            segments_path: None,
            processing_step: self.kind(),
        })
    }
}
