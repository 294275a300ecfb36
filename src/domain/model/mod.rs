// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::domain::errors::DomainError;

/// Word-level timestamp inside a transcript segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTiming {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

/// Timestamped unit of transcribed speech
///
/// Produced by the transcript source and never mutated afterwards; the
/// deduplicator, caption builder and keyword resolver all read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub start: f64,
    pub end: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<WordTiming>>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "avg_logprob")]
    pub confidence: Option<f64>,
}

impl Segment {
    /// Create a segment without word-level timings
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
            words: None,
            confidence: None,
        }
    }

    /// Attach word-level timings
    pub fn with_words(mut self, words: Vec<WordTiming>) -> Self {
        self.words = Some(words);
        self
    }

    /// Length of the spoken segment in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Word timings, if the transcript source produced any
    pub fn word_timings(&self) -> Option<&[WordTiming]> {
        self.words.as_deref().filter(|words| !words.is_empty())
    }
}

/// Output of the transcript source for one media file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    #[serde(default)]
    pub segments: Vec<Segment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Processing capabilities known to the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    RemoveDuplicates,
    AddCaptions,
    AddMusic,
    AddBroll,
}

impl ToolKind {
    /// Every capability, in the order a typical edit applies them
    pub const ALL: [ToolKind; 4] = [
        ToolKind::RemoveDuplicates,
        ToolKind::AddCaptions,
        ToolKind::AddMusic,
        ToolKind::AddBroll,
    ];

    /// Wire name used by plans and the planner catalog
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::RemoveDuplicates => "remove_duplicates",
            ToolKind::AddCaptions => "add_captions",
            ToolKind::AddMusic => "add_music",
            ToolKind::AddBroll => "add_broll",
        }
    }

    /// Human readable name, e.g. "Add Captions"
    pub fn title(&self) -> String {
        self.as_str()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolKind {
    type Err = DomainError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        ToolKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == name.trim())
            .ok_or_else(|| DomainError::UnknownTool {
                name: name.to_string(),
            })
    }
}

/// Free-form step arguments (`name -> JSON value`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepArgs(Map<String, Value>);

impl StepArgs {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Non-empty string value
    pub fn str(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// Numeric value; numeric strings are accepted
    pub fn f64(&self, key: &str) -> Option<f64> {
        match self.0.get(key)? {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    /// Numeric value treating zero, null and garbage as "not provided"
    pub fn nonzero_f64(&self, key: &str) -> Option<f64> {
        self.f64(key).filter(|value| *value != 0.0 && value.is_finite())
    }

    /// Positive integer value
    pub fn u32(&self, key: &str) -> Option<u32> {
        self.f64(key)
            .filter(|value| *value >= 1.0 && *value <= u32::MAX as f64)
            .map(|value| value as u32)
    }

    /// List of strings; accepts a JSON array or a comma separated string
    pub fn string_list(&self, key: &str) -> Vec<String> {
        let raw: Vec<String> = match self.0.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            Some(Value::String(text)) => text.split(',').map(str::to_string).collect(),
            _ => Vec::new(),
        };

        let mut seen = Vec::new();
        for item in raw {
            let item = item.trim().to_string();
            if !item.is_empty() && !seen.contains(&item) {
                seen.push(item);
            }
        }
        seen
    }
}

impl From<Map<String, Value>> for StepArgs {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// A step as produced by the planner or a caller, before its name is resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedStep {
    pub name: String,
    #[serde(default)]
    pub args: StepArgs,
}

impl PlannedStep {
    pub fn new(name: impl Into<String>, args: StepArgs) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

/// A step whose capability has been resolved
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingStep {
    pub tool: ToolKind,
    pub args: StepArgs,
}

impl ProcessingStep {
    pub fn new(tool: ToolKind, args: StepArgs) -> Self {
        Self { tool, args }
    }
}

impl From<ProcessingStep> for PlannedStep {
    fn from(step: ProcessingStep) -> Self {
        PlannedStep::new(step.tool.as_str(), step.args)
    }
}

/// Ordered list of steps; executed strictly in order
pub type Plan = Vec<PlannedStep>;

/// Opaque task identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TaskId {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value)
            .map(Self)
            .map_err(|e| DomainError::InvalidRequest(format!("Invalid task id '{}': {}", value, e)))
    }
}

/// Externally observed task status (`processing`, `step_N`, `completed`, `failed`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum TaskStatus {
    Processing,
    Step(usize),
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Processing => f.write_str("processing"),
            TaskStatus::Step(index) => write!(f, "step_{}", index),
            TaskStatus::Completed => f.write_str("completed"),
            TaskStatus::Failed => f.write_str("failed"),
        }
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        status.to_string()
    }
}

impl TryFrom<String> for TaskStatus {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "processing" => Ok(TaskStatus::Processing),
            "completed" => Ok(TaskStatus::Completed),
            "failed" => Ok(TaskStatus::Failed),
            other => other
                .strip_prefix("step_")
                .and_then(|index| index.parse().ok())
                .map(TaskStatus::Step)
                .ok_or_else(|| DomainError::InvalidRequest(format!("Unknown task status: {}", other))),
        }
    }
}

/// Descriptor of an artifact produced (or served from cache) by a step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactDescriptor {
    pub step: ToolKind,
    pub output_path: PathBuf,
    pub output_filename: String,
    pub download_url: String,
    pub message: String,
    pub output_type: String,
    pub processing_steps: Vec<ToolKind>,
    pub cached: bool,
}

impl ArtifactDescriptor {
    pub fn new(
        file_id: &str,
        step: ToolKind,
        output_path: &Path,
        processing_steps: Vec<ToolKind>,
        cached: bool,
    ) -> Self {
        let output_filename = output_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let message = if cached {
            format!("{} (cached)", step.title())
        } else {
            format!("{} completed", step.title())
        };

        Self {
            step,
            output_path: output_path.to_path_buf(),
            download_url: format!("/api/files/download/{}/{}", file_id, output_filename),
            output_filename,
            message,
            output_type: format!("{}_video", step),
            processing_steps,
            cached,
        }
    }
}

/// Processing task as seen by status observers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_step: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_steps: Option<usize>,
    #[serde(default)]
    pub results: Vec<ArtifactDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ArtifactDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Freshly accepted task
    pub fn new(id: TaskId) -> Self {
        let now = Utc::now();
        Self {
            id,
            status: TaskStatus::Processing,
            current_step: None,
            total_steps: None,
            results: Vec::new(),
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Per-file record of the derivation chain
///
/// `applied_steps` lists exactly the steps that produced
/// `latest_artifact_path`, in application order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileVersionRecord {
    pub source_file_id: String,
    pub latest_artifact_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived_segments_path: Option<PathBuf>,
    pub applied_steps: Vec<ToolKind>,
    pub updated_at: DateTime<Utc>,
}

impl FileVersionRecord {
    pub fn has_applied(&self, step: ToolKind) -> bool {
        self.applied_steps.contains(&step)
    }

    pub fn last_step(&self) -> Option<ToolKind> {
        self.applied_steps.last().copied()
    }
}

/// Instant inside a segment where a keyword is spoken
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitPoint {
    pub keyword: String,
    pub segment_start: f64,
    pub segment_end: f64,
    pub split_time: f64,
}

/// Pixel dimensions of a video frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for FrameSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Sizing guidance carried by every caption overlay
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaptionLayout {
    pub font_size: u32,
    /// Caption box width relative to the frame width
    pub width_ratio: f64,
    /// Gap between caption and bottom edge relative to the frame height
    pub bottom_margin_ratio: f64,
}

impl CaptionLayout {
    pub fn with_font_size(font_size: u32) -> Self {
        Self {
            font_size,
            ..Self::default()
        }
    }

    pub fn max_width(&self, frame: FrameSize) -> u32 {
        (frame.width as f64 * self.width_ratio) as u32
    }

    pub fn bottom_margin(&self, frame: FrameSize) -> u32 {
        (frame.height as f64 * self.bottom_margin_ratio) as u32
    }
}

impl Default for CaptionLayout {
    fn default() -> Self {
        Self {
            font_size: 28,
            width_ratio: 0.9,
            bottom_margin_ratio: 0.08,
        }
    }
}

/// One caption, positioned on the (possibly cut) output timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionOverlay {
    pub text: String,
    pub start_time: f64,
    pub duration: f64,
    pub layout: CaptionLayout,
}

impl CaptionOverlay {
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }
}

/// Stream facts needed by the media transforms
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MediaProbe {
    pub frame: FrameSize,
    pub duration: f64,
    pub has_audio: bool,
}

/// A cutaway clip resolved for one split point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrollPlacement {
    pub keyword: String,
    pub clip_path: PathBuf,
    pub start_time: f64,
    pub duration: f64,
    /// Clip size after aspect-preserving scaling
    pub fitted: FrameSize,
    /// Main video frame; the clip is padded out to this
    pub frame: FrameSize,
    pub fade: f64,
}

/// How background music is laid under the main audio track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicMix {
    pub music_path: PathBuf,
    /// Volume factor; `None` leaves the track unmodified
    pub volume: Option<f64>,
    /// Loop the music up to this many seconds; `None` plays it once
    pub loop_to: Option<f64>,
    pub video_has_audio: bool,
}

/// Which timeline the segments of a sidecar are expressed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeline {
    /// Video was cut to exactly the concatenation of the segments
    Cut,
    /// Segments carry timestamps of the artifact they were transcribed from
    Source,
}

/// JSON sidecar persisted next to derived artifacts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSidecar {
    pub timeline: Timeline,
    pub segments: Vec<Segment>,
}

/// What a capability hands back after a successful transform
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutput {
    pub output_path: PathBuf,
    pub segments_path: Option<PathBuf>,
    pub processing_step: ToolKind,
}

/// Request to the planner oracle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanRequest {
    pub instruction: String,
    pub available_tools: Vec<String>,
    pub style_preference: String,
    pub output_format: String,
}

/// Allowed style preferences for AI edits
pub const STYLE_PREFERENCES: [&str; 4] = ["cinematic", "social-media", "documentary", "vlog"];

/// Allowed output formats for AI edits
pub const OUTPUT_FORMATS: [&str; 3] = ["mp4", "mov", "webm"];

/// Natural-language edit request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditRequest {
    pub instruction: String,
    pub file_id: String,
    pub filename: Option<String>,
    pub music_file_id: Option<String>,
    pub music_filename: Option<String>,
    pub style_preference: Option<String>,
    pub output_format: Option<String>,
}

impl EditRequest {
    /// Check field bounds before a task is created
    pub fn validate(&self) -> Result<(), DomainError> {
        let instruction_len = self.instruction.trim().chars().count();
        if !(5..=500).contains(&instruction_len) {
            return Err(DomainError::InvalidRequest(format!(
                "instruction must be 5-500 characters, got {}",
                instruction_len
            )));
        }
        check_len("file_id", Some(&self.file_id), 64)?;
        check_len("filename", self.filename.as_ref(), 100)?;
        check_len("music_file_id", self.music_file_id.as_ref(), 64)?;
        check_len("music_filename", self.music_filename.as_ref(), 100)?;

        if let Some(style) = &self.style_preference {
            if !STYLE_PREFERENCES.contains(&style.as_str()) {
                return Err(DomainError::InvalidRequest(format!(
                    "style_preference must be one of {:?}, got '{}'",
                    STYLE_PREFERENCES, style
                )));
            }
        }
        if let Some(format) = &self.output_format {
            if !OUTPUT_FORMATS.contains(&format.as_str()) {
                return Err(DomainError::InvalidRequest(format!(
                    "output_format must be one of {:?}, got '{}'",
                    OUTPUT_FORMATS, format
                )));
            }
        }
        Ok(())
    }
}

fn check_len(field: &str, value: Option<&String>, max: usize) -> Result<(), DomainError> {
    if let Some(value) = value {
        let len = value.chars().count();
        if len == 0 || len > max {
            return Err(DomainError::InvalidRequest(format!(
                "{} must be 1-{} characters, got {}",
                field, max, len
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
