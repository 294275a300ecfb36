//! Reelcraft video editing pipeline library
//!
//! Turns a raw talking-head video into an edited one through composable
//! steps: repeated-take removal, captions, background music and B-roll
//! cutaways. Steps run one after another for a file, each consuming the
//! previous step's artifact, and can be chosen explicitly or planned from
//! a plain-language instruction.
//!
//! # Features
//!
//! - Fuzzy duplicate-take detection over transcript segments
//! - Caption retiming onto the cut timeline
//! - Keyword-driven B-roll placement with word-level precision
//! - Per-file version cache so repeated steps are free
//! - Background task execution with pollable status

pub mod adapters;
pub mod app;
pub mod cli;
pub mod domain;
pub mod engine;
pub mod planner;
pub mod ports;

// Re-export commonly used types
pub use domain::errors::DomainError;
pub use domain::model::{ArtifactDescriptor, Segment, Task, TaskId, TaskStatus, ToolKind};
pub use planner::{EditJob, PlanExecutor};
