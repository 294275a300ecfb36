// Adapters - External system implementations

pub mod broll_library;
pub mod exec_ffmpeg;
pub mod openai_planner;
pub mod probe_ffprobe;
pub mod toml_config;
pub mod tracing_log;
pub mod whisper_cli;

// Re-export adapters
pub use broll_library::BrollLibrary;
pub use exec_ffmpeg::FFmpegAdapter;
pub use openai_planner::OpenAiPlanner;
pub use probe_ffprobe::FFprobeAdapter;
pub use toml_config::Settings;
pub use whisper_cli::WhisperCliAdapter;
