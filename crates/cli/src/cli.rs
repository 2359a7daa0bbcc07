// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{event_logger, scanner};
use anyhow::Result;
use clap::{command, ArgAction, Parser, Subcommand};
use evlog_config::{load_config, AppConfig};
use std::{path::Path, str::FromStr, sync::Arc};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "evlog")]
#[command(about = "Chain event logging and indexing toolkit", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,

    /// Raise the log level with repeated `-v` flags (up to trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all output except errors
    #[arg(
        short,
        long,
        action = ArgAction::SetTrue,
        conflicts_with = "verbose",
        global = true
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan the chain for contract logs and serve the log stream RPC
    EventLogger,
    /// Consume the log stream, decode events and index them
    Scanner {
        #[command(subcommand)]
        command: Option<ScannerCommands>,
    },
}

#[derive(Subcommand, Debug)]
enum ScannerCommands {
    /// Create the relational schema for decoded events
    Init,
}

impl Cli {
    fn log_level(&self, config: &AppConfig) -> Level {
        if self.quiet {
            return Level::ERROR;
        }
        match self.verbose {
            0 => Level::from_str(&config.log.level).unwrap_or(Level::INFO),
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }

    pub async fn execute(self) -> Result<()> {
        let config = load_config(self.config.as_deref().map(Path::new))?;
        setup_tracing(&config, self.log_level(&config))?;

        match &self.command {
            Commands::EventLogger => event_logger::run(config).await,
            Commands::Scanner { command } => match command {
                Some(ScannerCommands::Init) => scanner::init(config),
                None => scanner::run(config).await,
            },
        }
    }
}

fn setup_tracing(config: &AppConfig, level: Level) -> Result<()> {
    let registry = tracing_subscriber::registry()
        .with(tracing_subscriber::filter::LevelFilter::from_level(level));
    match &config.log.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(Arc::new(file))
                        .with_ansi(false),
                )
                .init();
        }
        None => {
            registry.with(tracing_subscriber::fmt::layer()).init();
        }
    }
    Ok(())
}
