//! CLI module for Reelcraft
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

pub use args::{EditArgs, ImportArgs, PlanArgs, RunArgs, StatusArgs};

/// Reelcraft video editing pipeline
///
/// Removes repeated takes, burns in captions, mixes background music and
/// cuts away to B-roll, either step by step or from a plain-language
/// instruction turned into a plan by a language model.
#[derive(Parser, Debug)]
#[command(name = "reelcraft")]
#[command(about = "Reelcraft - AI-planned video editing from the command line")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file (default: reelcraft.toml, then config/reelcraft.toml)
    #[arg(long, global = true, env = "REELCRAFT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging level (overrides the configured level)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Copy a local video or music file into the upload store
    Import(args::ImportArgs),
    /// Plan and run edits from a natural-language instruction
    Edit(args::EditArgs),
    /// Run a single processing step
    Run(args::RunArgs),
    /// Run an explicit multi-step plan
    Plan(args::PlanArgs),
    /// List available processing tools
    Tools,
    /// Show the derivation chain recorded for uploaded files
    Status(args::StatusArgs),
}
