use std::sync::Arc;
use std::time::Duration;

use crate::adapters::toml_config::Settings;
use crate::adapters::{BrollLibrary, FFmpegAdapter, FFprobeAdapter, OpenAiPlanner, WhisperCliAdapter};
use crate::app::{
    broll_interactor::BrollInteractor, caption_interactor::CaptionInteractor,
    dedupe_interactor::DedupeInteractor, dispatcher::TaskDispatcher,
    import_interactor::ImportInteractor, music_interactor::MusicInteractor,
    registry::ToolRegistry, step_runner::StepRunner, task_table::TaskTable,
    transcript_cache::CachedTranscriber, version_cache::FileVersionCache,
};
use crate::domain::errors::DomainError;
use crate::planner::PlanExecutor;
use crate::ports::{BrollLibraryPort, MediaPort, PlannerPort, ProbePort, TranscriptPort};

/// File the version cache is persisted to, inside the processed root
pub const VERSION_SNAPSHOT: &str = "versions.json";

pub trait AppContainer: Send + Sync {
    fn dispatcher(&self) -> Arc<TaskDispatcher>;
    fn registry(&self) -> Arc<ToolRegistry>;
    fn import_interactor(&self) -> Arc<ImportInteractor>;
    fn version_cache(&self) -> Arc<FileVersionCache>;
}

/// External collaborators the application is wired against
#[derive(Clone)]
pub struct Ports {
    pub transcripts: Arc<dyn TranscriptPort>,
    pub planner: Arc<dyn PlannerPort>,
    pub probe: Arc<dyn ProbePort>,
    pub media: Arc<dyn MediaPort>,
    pub broll_library: Arc<dyn BrollLibraryPort>,
}

impl Ports {
    /// Production adapters configured from `settings`
    pub fn from_settings(settings: &Settings) -> Result<Self, DomainError> {
        let planner = OpenAiPlanner::new(
            settings.planner.base_url.clone(),
            settings.planner.model_name.clone(),
            settings.planner.api_key.clone(),
            settings.planner.temperature,
            Duration::from_secs(settings.planner.timeout_secs),
        )?;

        Ok(Self {
            transcripts: Arc::new(WhisperCliAdapter::new(
                &settings.transcription.whisper_bin,
                settings.transcription.whisper_model.clone(),
                settings.transcription.language.clone(),
            )),
            planner: Arc::new(planner),
            probe: Arc::new(FFprobeAdapter::new(&settings.encoding.ffprobe_bin)),
            media: Arc::new(FFmpegAdapter::new(
                &settings.encoding.ffmpeg_bin,
                settings.encoding.output.clone(),
                settings.editing.caption_font.clone(),
            )),
            broll_library: Arc::new(BrollLibrary::new(settings.paths.broll_dir.clone())),
        })
    }
}

pub struct DefaultAppContainer {
    dispatcher: Arc<TaskDispatcher>,
    registry: Arc<ToolRegistry>,
    import_interactor: Arc<ImportInteractor>,
    version_cache: Arc<FileVersionCache>,
}

impl DefaultAppContainer {
    pub fn from_settings(settings: &Settings) -> Result<Self, DomainError> {
        Self::with_ports(settings, Ports::from_settings(settings)?)
    }

    /// Wire the application around the given ports
    pub fn with_ports(settings: &Settings, ports: Ports) -> Result<Self, DomainError> {
        let paths = &settings.paths;
        let editing = &settings.editing;

        let version_cache = Arc::new(FileVersionCache::with_snapshot(
            paths.processed_dir.join(VERSION_SNAPSHOT),
        )?);
        let transcripts: Arc<dyn TranscriptPort> = Arc::new(CachedTranscriber::new(
            Arc::clone(&ports.transcripts),
            settings.transcription.cache_capacity,
        ));

        let mut registry = ToolRegistry::new();
        registry
            .register(Arc::new(DedupeInteractor::new(
                Arc::clone(&transcripts),
                Arc::clone(&ports.probe),
                Arc::clone(&ports.media),
                editing.dedupe_threshold,
            )))
            .register(Arc::new(CaptionInteractor::new(
                Arc::clone(&transcripts),
                Arc::clone(&ports.probe),
                Arc::clone(&ports.media),
                editing.font_size,
            )))
            .register(Arc::new(MusicInteractor::new(
                Arc::clone(&ports.probe),
                Arc::clone(&ports.media),
                paths.music_dir.clone(),
                editing.music_volume,
            )))
            .register(Arc::new(BrollInteractor::new(
                Arc::clone(&transcripts),
                Arc::clone(&ports.probe),
                Arc::clone(&ports.media),
                Arc::clone(&ports.broll_library),
                editing.broll_duration,
                editing.broll_fade,
            )));
        let registry = Arc::new(registry);

        let runner = Arc::new(StepRunner::new(
            Arc::clone(&version_cache),
            paths.upload_dir.clone(),
            paths.processed_dir.clone(),
        ));
        let executor = Arc::new(PlanExecutor::new(
            Arc::clone(&registry),
            runner,
            Arc::clone(&ports.planner),
            settings.planner.style_preference.clone(),
            settings.planner.output_format.clone(),
        ));
        let dispatcher = Arc::new(TaskDispatcher::new(Arc::new(TaskTable::new()), executor));

        let import_interactor = Arc::new(ImportInteractor::new(
            paths.upload_dir.clone(),
            paths.music_dir.clone(),
            editing.allowed_extensions.clone(),
        ));

        Ok(Self {
            dispatcher,
            registry,
            import_interactor,
            version_cache,
        })
    }
}

impl AppContainer for DefaultAppContainer {
    fn dispatcher(&self) -> Arc<TaskDispatcher> {
        Arc::clone(&self.dispatcher)
    }

    fn registry(&self) -> Arc<ToolRegistry> {
        Arc::clone(&self.registry)
    }

    fn import_interactor(&self) -> Arc<ImportInteractor> {
        Arc::clone(&self.import_interactor)
    }

    fn version_cache(&self) -> Arc<FileVersionCache> {
        Arc::clone(&self.version_cache)
    }
}
