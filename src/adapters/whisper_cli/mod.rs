//! Whisper CLI transcription adapter
//!
//! Runs the `whisper` command line with word timestamps enabled and reads
//! the JSON transcript it leaves in a scratch directory.

use std::path::{Path, PathBuf};
use std::time::Instant;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::info;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Whisper CLI adapter
pub struct WhisperCliAdapter {
    binary: PathBuf,
    model: String,
    language: Option<String>,
}

impl WhisperCliAdapter {
    pub fn new(binary: impl Into<PathBuf>, model: impl Into<String>, language: Option<String>) -> Self {
        Self {
            binary: binary.into(),
            model: model.into(),
            language,
        }
    }

    fn command_args(&self, media_path: &Path, output_dir: &Path) -> Vec<String> {
        let mut args = vec![
            media_path.to_string_lossy().to_string(),
            "--model".to_string(),
            self.model.clone(),
            "--word_timestamps".to_string(),
            "True".to_string(),
            "--output_format".to_string(),
            "json".to_string(),
            "--output_dir".to_string(),
            output_dir.to_string_lossy().to_string(),
            "--verbose".to_string(),
            "False".to_string(),
        ];
        if let Some(language) = &self.language {
            args.push("--language".to_string());
            args.push(language.clone());
        }
        args
    }
}

/// Parse whisper's JSON output; extra fields are ignored
pub fn parse_transcript_json(json: &str) -> Result<Transcript, DomainError> {
    Ok(serde_json::from_str(json)?)
}

#[async_trait]
impl TranscriptPort for WhisperCliAdapter {
    async fn transcribe(&self, media_path: &Path) -> Result<Transcript, DomainError> {
        if !media_path.exists() {
            return Err(DomainError::asset_not_found(media_path));
        }

        let started = Instant::now();
        let output_dir = tempfile::tempdir()?;
        let output = Command::new(&self.binary)
            .args(self.command_args(media_path, output_dir.path()))
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                DomainError::Transform(format!("Failed to launch {}: {}", self.binary.display(), e))
            })?;

        if !output.status.success() {
            return Err(DomainError::Transform(format!(
                "Transcription failed for {}: {}",
                media_path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let stem = media_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let json_path = output_dir.path().join(format!("{}.json", stem));
        let json = tokio::fs::read_to_string(&json_path).await.map_err(|e| {
            DomainError::Transform(format!(
                "Transcript not produced at {}: {}",
                json_path.display(),
                e
            ))
        })?;

        let transcript = parse_transcript_json(&json)?;
        info!(
            "Transcribed {} into {} segments in {:.2}s",
            media_path.display(),
            transcript.segments.len(),
            started.elapsed().as_secs_f64()
        );
        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transcript_json() {
        let json = r#"{
            "text": " Hello there. Hello there!",
            "language": "en",
            "segments": [
                {"id": 0, "seek": 0, "start": 0.0, "end": 1.2, "text": " Hello there.",
                 "avg_logprob": -0.31, "no_speech_prob": 0.01,
                 "words": [{"word": " Hello", "start": 0.0, "end": 0.5, "probability": 0.9},
                           {"word": " there.", "start": 0.5, "end": 1.2, "probability": 0.8}]},
                {"id": 1, "seek": 0, "start": 1.4, "end": 2.6, "text": " Hello there!", "avg_logprob": -0.2}
            ]
        }"#;
        let transcript = parse_transcript_json(json).unwrap();
        assert_eq!(transcript.language.as_deref(), Some("en"));
        assert_eq!(transcript.segments.len(), 2);
        assert_eq!(transcript.segments[0].word_timings().unwrap()[1].word, " there.");
        assert_eq!(transcript.segments[1].confidence, Some(-0.2));
        assert!(transcript.segments[1].words.is_none());
    }

    #[test]
    fn test_command_args() {
        let adapter = WhisperCliAdapter::new("whisper", "small", Some("en".to_string()));
        let args = adapter.command_args(Path::new("a/b.mp4"), Path::new("/tmp/out"));
        assert_eq!(args[0], "a/b.mp4");
        let joined = args.join(" ");
        assert!(joined.contains("--model small"));
        assert!(joined.contains("--word_timestamps True"));
        assert!(joined.contains("--output_format json"));
        assert!(joined.ends_with("--language en"));
    }

    #[tokio::test]
    async fn test_transcribe_missing_file() {
        let adapter = WhisperCliAdapter::new("whisper", "base", None);
        let err = adapter.transcribe(Path::new("/no/such.mp4")).await.unwrap_err();
        assert!(matches!(err, DomainError::AssetNotFound { .. }));
    }
}
