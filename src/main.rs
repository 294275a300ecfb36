//! Reelcraft command-line entry point
//!
//! # Usage
//!
//! ```bash
//! reelcraft import talk.mp4
//! reelcraft run remove_duplicates --file-id <id> --filename talk.mp4
//! reelcraft run add_broll --file-id <id> --arg keywords=coffee,city
//! reelcraft edit --file-id <id> --filename talk.mp4 -i "cut the repeats and add captions"
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use reelcraft::adapters::{tracing_log, Settings};
use reelcraft::app::DefaultAppContainer;
use reelcraft::cli::{commands, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(level) = &cli.log_level {
        settings.logging.level = level.clone();
    }
    if cli.json_logs {
        settings.logging.json = true;
    }
    settings.validate().context("Invalid configuration")?;
    tracing_log::init(&settings.logging.level, settings.logging.json)?;

    info!("Starting Reelcraft");
    let container = DefaultAppContainer::from_settings(&settings).context("Failed to initialise application")?;

    match cli.command {
        Commands::Import(args) => commands::import(&container, args).await?,
        Commands::Edit(args) => commands::edit(&container, args).await?,
        Commands::Run(args) => commands::run(&container, args).await?,
        Commands::Plan(args) => commands::plan(&container, args).await?,
        Commands::Tools => commands::tools(&container)?,
        Commands::Status(args) => commands::status(&container, args)?,
    }

    Ok(())
}
