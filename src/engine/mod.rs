//! Media edit engine
//!
//! Pure builders that describe each transform as a single ffmpeg run.
//! Nothing in here touches the filesystem or spawns processes; the
//! `exec_ffmpeg` adapter materializes and runs the jobs.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub mod broll;
pub mod captions;
pub mod concat;
pub mod music;

/// Output encoding defaults shared by every transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeSettings {
    pub video_codec: String,
    pub audio_codec: String,
    pub preset: String,
    pub crf: u8,
    pub profile: String,
    pub level: String,
    pub pixel_format: String,
    pub audio_bitrate: String,
    pub audio_sample_rate: u32,
    /// Move the moov atom to the front for progressive playback
    pub faststart: bool,
    /// Encoder threads; unset means one per logical CPU
    pub threads: Option<usize>,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            preset: "fast".to_string(),
            crf: 23,
            profile: "main".to_string(),
            level: "4.0".to_string(),
            pixel_format: "yuv420p".to_string(),
            audio_bitrate: "192k".to_string(),
            audio_sample_rate: 44100,
            faststart: true,
            threads: None,
        }
    }
}

impl EncodeSettings {
    pub fn thread_count(&self) -> usize {
        self.threads.filter(|n| *n > 0).unwrap_or_else(num_cpus::get)
    }

    /// Video encoder arguments
    pub fn video_args(&self) -> Vec<String> {
        let mut args = strings(&[
            "-c:v",
            &self.video_codec,
            "-preset",
            &self.preset,
            "-crf",
            &self.crf.to_string(),
            "-profile:v",
            &self.profile,
            "-level",
            &self.level,
            "-pix_fmt",
            &self.pixel_format,
            "-threads",
            &self.thread_count().to_string(),
        ]);
        if self.faststart {
            args.extend(strings(&["-movflags", "+faststart"]));
        }
        args
    }

    /// Audio encoder arguments
    pub fn audio_args(&self) -> Vec<String> {
        strings(&[
            "-c:a",
            &self.audio_codec,
            "-b:a",
            &self.audio_bitrate,
            "-ar",
            &self.audio_sample_rate.to_string(),
        ])
    }

    /// Full re-encode of both tracks
    pub fn av_args(&self) -> Vec<String> {
        let mut args = self.video_args();
        args.extend(self.audio_args());
        args
    }
}

/// One `-i` input with the options that precede it
#[derive(Debug, Clone, PartialEq)]
pub struct JobInput {
    pub options: Vec<String>,
    pub path: PathBuf,
}

impl JobInput {
    pub fn plain(path: &Path) -> Self {
        Self {
            options: Vec::new(),
            path: path.to_path_buf(),
        }
    }

    pub fn with_options(path: &Path, options: Vec<String>) -> Self {
        Self {
            options,
            path: path.to_path_buf(),
        }
    }
}

/// Helper file the filter graph refers to
#[derive(Debug, Clone, PartialEq)]
pub struct ScratchFile {
    pub path: PathBuf,
    pub contents: String,
}

/// Complete description of one ffmpeg run, minus the output path
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FfmpegJob {
    pub inputs: Vec<JobInput>,
    pub filter_graph: Option<String>,
    pub output_args: Vec<String>,
    pub scratch_files: Vec<ScratchFile>,
}

impl FfmpegJob {
    /// Command-line arguments; the filter graph is read from `filter_script`
    pub fn args(&self, filter_script: Option<&Path>, output: &Path) -> Vec<String> {
        let mut args = strings(&["-y", "-hide_banner", "-nostdin", "-loglevel", "error"]);

        for input in &self.inputs {
            args.extend(input.options.iter().cloned());
            args.push("-i".to_string());
            args.push(input.path.to_string_lossy().to_string());
        }

        if let (Some(_), Some(script)) = (&self.filter_graph, filter_script) {
            args.push("-filter_complex_script".to_string());
            args.push(script.to_string_lossy().to_string());
        }

        args.extend(self.output_args.iter().cloned());
        args.push(output.to_string_lossy().to_string());
        args
    }
}

/// Seconds with millisecond precision, the form every filter expression uses
pub fn secs(value: f64) -> String {
    format!("{:.3}", value.max(0.0))
}

/// Escape a value for use as a filter option inside a filter graph
///
/// Two levels: the option parser (`\ ' :`) and then the graph parser
/// (`\ ' [ ] , ;`).
pub fn escape_filter_value(value: &str) -> String {
    let option_level = escape_chars(value, &['\\', '\'', ':']);
    escape_chars(&option_level, &['\\', '\'', '[', ']', ',', ';'])
}

fn escape_chars(value: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if special.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub(crate) fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
