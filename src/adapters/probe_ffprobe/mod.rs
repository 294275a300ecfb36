//! FFprobe adapter for media file probing
//!
//! Reads frame size, duration and audio presence from `ffprobe -print_format json`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// FFprobe-based probe adapter
pub struct FFprobeAdapter {
    binary: PathBuf,
}

impl FFprobeAdapter {
    /// Create new FFprobe adapter
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    #[serde(default)]
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Parse ffprobe's JSON report
pub fn parse_probe_json(json: &str) -> Result<MediaProbe, DomainError> {
    let output: ProbeOutput = serde_json::from_str(json)?;

    let video = output
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| DomainError::Transform("No video stream found".to_string()))?;

    let (width, height) = match (video.width, video.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => {
            return Err(DomainError::Transform(
                "Video stream has no frame size".to_string(),
            ))
        }
    };

    let duration = output
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .or(video.duration.as_deref())
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    let has_audio = output
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    Ok(MediaProbe {
        frame: FrameSize::new(width, height),
        duration,
        has_audio,
    })
}

#[async_trait]
impl ProbePort for FFprobeAdapter {
    async fn probe(&self, media_path: &Path) -> Result<MediaProbe, DomainError> {
        if !media_path.exists() {
            return Err(DomainError::asset_not_found(media_path));
        }

        let output = Command::new(&self.binary)
            .args(["-v", "error", "-print_format", "json", "-show_streams", "-show_format"])
            .arg(media_path)
            .output()
            .await
            .map_err(|e| {
                DomainError::Transform(format!("Failed to launch {}: {}", self.binary.display(), e))
            })?;

        if !output.status.success() {
            return Err(DomainError::Transform(format!(
                "ffprobe failed for {}: {}",
                media_path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let probe = parse_probe_json(&String::from_utf8_lossy(&output.stdout))?;
        debug!(
            "Probed {}: {} {:.2}s audio={}",
            media_path.display(),
            probe.frame,
            probe.duration,
            probe.has_audio
        );
        Ok(probe)
    }
}
