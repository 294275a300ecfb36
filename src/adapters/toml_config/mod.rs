// TOML config adapter - Settings loading with file, environment and default layers

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::errors::*;
use crate::domain::rules::{DEFAULT_DUP_THRESHOLD, DEFAULT_FONT_SIZE, DEFAULT_MUSIC_VOLUME};
use crate::engine::EncodeSettings;

/// Config files probed when no explicit path is given, in order
pub const DEFAULT_CONFIG_PATHS: [&str; 2] = ["reelcraft.toml", "config/reelcraft.toml"];

/// Prefix of every environment override
pub const ENV_PREFIX: &str = "REELCRAFT_";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Top-level settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub paths: PathSettings,
    pub transcription: TranscriptionSettings,
    pub planner: PlannerSettings,
    pub editing: EditingSettings,
    pub encoding: EncodingSettings,
    pub logging: LoggingSettings,
}

/// Storage roots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    pub upload_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub music_dir: PathBuf,
    pub broll_dir: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            processed_dir: PathBuf::from("processed"),
            music_dir: PathBuf::from("bg_music"),
            broll_dir: PathBuf::from("brolls"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    pub whisper_bin: String,
    pub whisper_model: String,
    pub language: Option<String>,
    /// Transcripts kept in memory, keyed by media path
    pub cache_capacity: usize,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            whisper_bin: "whisper".to_string(),
            whisper_model: "base".to_string(),
            language: None,
            cache_capacity: 32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model_name: String,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub style_preference: String,
    pub output_format: String,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.deepseek.com".to_string(),
            model_name: "deepseek-chat".to_string(),
            temperature: 0.2,
            timeout_secs: 120,
            style_preference: "cinematic".to_string(),
            output_format: "mp4".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditingSettings {
    pub dedupe_threshold: f64,
    pub font_size: u32,
    pub caption_font: String,
    pub music_volume: f64,
    pub broll_duration: f64,
    pub broll_fade: f64,
    pub allowed_extensions: Vec<String>,
}

impl Default for EditingSettings {
    fn default() -> Self {
        Self {
            dedupe_threshold: DEFAULT_DUP_THRESHOLD,
            font_size: DEFAULT_FONT_SIZE,
            caption_font: "Arial".to_string(),
            music_volume: DEFAULT_MUSIC_VOLUME,
            broll_duration: crate::domain::rules::BROLL_CLIP_SECONDS,
            broll_fade: crate::domain::rules::BROLL_FADE_SECONDS,
            allowed_extensions: vec!["mp4".to_string(), "mov".to_string(), "avi".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingSettings {
    pub ffmpeg_bin: String,
    pub ffprobe_bin: String,
    #[serde(flatten)]
    pub output: EncodeSettings,
}

impl Default for EncodingSettings {
    fn default() -> Self {
        Self {
            ffmpeg_bin: "ffmpeg".to_string(),
            ffprobe_bin: "ffprobe".to_string(),
            output: EncodeSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Settings {
    /// Load settings: TOML file (if any) over defaults, then environment overrides
    pub fn load(explicit: Option<&Path>) -> Result<Self, DomainError> {
        let mut settings = match Self::locate(explicit)? {
            Some(path) => {
                info!("Loading configuration from: {}", path.display());
                Self::from_file(&path)?
            }
            None => {
                debug!("No configuration file found, using defaults");
                Settings::default()
            }
        };

        let applied = settings.apply_env(|key| std::env::var(key).ok())?;
        if applied > 0 {
            info!("Applied {} environment variable overrides", applied);
        }

        settings.validate()?;
        Ok(settings)
    }

    fn locate(explicit: Option<&Path>) -> Result<Option<PathBuf>, DomainError> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(DomainError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return Ok(Some(path.to_path_buf()));
        }

        Ok(DEFAULT_CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists()))
    }

    pub fn from_file(path: &Path) -> Result<Self, DomainError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, DomainError> {
        toml::from_str(content)
            .map_err(|e| DomainError::Config(format!("Failed to parse TOML config: {}", e)))
    }

    /// Apply `REELCRAFT_*` overrides read through `lookup`; returns how many applied
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<usize, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut applied = 0;
        let mut get = |name: &str| {
            let value = lookup(&format!("{}{}", ENV_PREFIX, name));
            if value.is_some() {
                applied += 1;
            }
            value
        };

        if let Some(v) = get("UPLOAD_DIR") {
            self.paths.upload_dir = v.into();
        }
        if let Some(v) = get("PROCESSED_DIR") {
            self.paths.processed_dir = v.into();
        }
        if let Some(v) = get("MUSIC_DIR") {
            self.paths.music_dir = v.into();
        }
        if let Some(v) = get("BROLL_DIR") {
            self.paths.broll_dir = v.into();
        }
        if let Some(v) = get("WHISPER_BIN") {
            self.transcription.whisper_bin = v;
        }
        if let Some(v) = get("WHISPER_MODEL") {
            self.transcription.whisper_model = v;
        }
        if let Some(v) = get("API_KEY") {
            self.planner.api_key = Some(v);
        }
        if let Some(v) = get("BASE_URL") {
            self.planner.base_url = v;
        }
        if let Some(v) = get("MODEL_NAME") {
            self.planner.model_name = v;
        }
        if let Some(v) = get("DEDUPE_THRESHOLD") {
            self.editing.dedupe_threshold = parse_env("DEDUPE_THRESHOLD", &v)?;
        }
        if let Some(v) = get("FONT_SIZE") {
            self.editing.font_size = parse_env("FONT_SIZE", &v)?;
        }
        if let Some(v) = get("FFMPEG_BIN") {
            self.encoding.ffmpeg_bin = v;
        }
        if let Some(v) = get("FFPROBE_BIN") {
            self.encoding.ffprobe_bin = v;
        }
        if let Some(v) = get("CRF") {
            self.encoding.output.crf = parse_env("CRF", &v)?;
        }
        if let Some(v) = get("PRESET") {
            self.encoding.output.preset = v;
        }
        if let Some(v) = get("THREADS") {
            self.encoding.output.threads = Some(parse_env("THREADS", &v)?);
        }
        if let Some(v) = get("LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = get("JSON_LOGS") {
            self.logging.json = parse_env("JSON_LOGS", &v)?;
        }

        Ok(applied)
    }

    /// Reject values no run could succeed with
    pub fn validate(&self) -> Result<(), DomainError> {
        let threshold = self.editing.dedupe_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(DomainError::Config(format!(
                "dedupe_threshold must be within [0, 1], got {}",
                threshold
            )));
        }
        if self.editing.font_size == 0 {
            return Err(DomainError::Config("font_size must be positive".to_string()));
        }
        if self.editing.broll_duration <= 0.0 {
            return Err(DomainError::Config(format!(
                "broll_duration must be positive, got {}",
                self.editing.broll_duration
            )));
        }
        if self.editing.broll_fade < 0.0 {
            return Err(DomainError::Config("broll_fade cannot be negative".to_string()));
        }
        if self.encoding.output.crf > 51 {
            return Err(DomainError::Config(format!(
                "crf must be within [0, 51], got {}",
                self.encoding.output.crf
            )));
        }
        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(DomainError::Config(format!(
                "Unknown log level '{}'",
                self.logging.level
            )));
        }
        if self.transcription.cache_capacity == 0 {
            return Err(DomainError::Config("cache_capacity must be positive".to_string()));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, DomainError>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| {
        DomainError::Config(format!("Invalid {}{}='{}': {}", ENV_PREFIX, name, value, e))
    })
}
