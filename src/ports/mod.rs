// Ports - Interface definitions (contracts)

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Port for speech transcription
#[async_trait]
pub trait TranscriptPort: Send + Sync {
    /// Transcribe the audio track of a media file, with word timings when available
    async fn transcribe(&self, media_path: &Path) -> Result<Transcript, DomainError>;
}

/// Port for the natural-language planner oracle
#[async_trait]
pub trait PlannerPort: Send + Sync {
    /// Turn an instruction into an ordered list of steps drawn from `available_tools`
    async fn plan(&self, request: &PlanRequest) -> Result<Plan, DomainError>;
}

/// Port for media file probing
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Frame size, duration and audio presence of a media file
    async fn probe(&self, media_path: &Path) -> Result<MediaProbe, DomainError>;
}

/// Port for media transforms
///
/// Every operation writes a complete file at `output` or fails; partial
/// outputs are never left behind.
#[async_trait]
pub trait MediaPort: Send + Sync {
    /// Keep only the given segments, concatenated in order
    async fn cut_segments(
        &self,
        input: &Path,
        segments: &[Segment],
        has_audio: bool,
        output: &Path,
    ) -> Result<(), DomainError>;

    /// Burn caption overlays into the video
    async fn burn_captions(
        &self,
        input: &Path,
        overlays: &[CaptionOverlay],
        probe: &MediaProbe,
        output: &Path,
    ) -> Result<(), DomainError>;

    /// Lay a music track under the existing audio
    async fn mix_music(&self, input: &Path, mix: &MusicMix, output: &Path) -> Result<(), DomainError>;

    /// Composite cutaway clips over the main track
    async fn composite_broll(
        &self,
        input: &Path,
        placements: &[BrollPlacement],
        output: &Path,
    ) -> Result<(), DomainError>;
}

/// Port for the cutaway footage library
#[async_trait]
pub trait BrollLibraryPort: Send + Sync {
    /// First clip matching the keyword, if any
    async fn find_broll(&self, keyword: &str) -> Result<Option<PathBuf>, DomainError>;
}
