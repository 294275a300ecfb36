// Application layer - Use case interactors and orchestration state

pub mod broll_interactor;
pub mod caption_interactor;
pub mod container;
pub mod dedupe_interactor;
pub mod dispatcher;
pub mod import_interactor;
pub mod music_interactor;
pub mod registry;
pub mod sidecar;
pub mod step_runner;
pub mod task_table;
pub mod transcript_cache;
pub mod version_cache;

// Re-export interactors
pub use broll_interactor::BrollInteractor;
pub use caption_interactor::CaptionInteractor;
pub use dedupe_interactor::DedupeInteractor;
pub use import_interactor::{ImportInteractor, ImportedFile};
pub use music_interactor::MusicInteractor;

pub use container::{AppContainer, DefaultAppContainer, Ports};
pub use dispatcher::TaskDispatcher;
pub use registry::{Tool, ToolInfo, ToolRegistry};
pub use step_runner::{StepInput, StepRunner};
pub use task_table::{TaskReporter, TaskTable};
pub use transcript_cache::CachedTranscriber;
pub use version_cache::FileVersionCache;
