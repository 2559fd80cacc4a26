// Copyright The Glide Authors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use duplex_wm::actor::wm::{Event, WindowManager};
use duplex_wm::actor::channel;
use duplex_wm::config::{self, Config};
use duplex_wm::log;
use duplex_wm::model::{Point, Rect, Size};
use tracing::info;

/// Offline tools for the duplex window manager engine.
#[derive(Parser)]
#[command(version, name = "duplex")]
struct Opt {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Clone)]
enum Command {
    #[command(subcommand)]
    Config(CmdConfig),
    Replay(CmdReplay),
}

/// Commands to inspect the config.
#[derive(Subcommand, Clone)]
enum CmdConfig {
    /// Loads and validates the config file.
    ///
    /// The config file lives at ~/.duplex.toml unless --config is given.
    Verify {
        /// Path to a custom config file.
        #[arg(long, short)]
        config: Option<PathBuf>,
    },
    /// Prints the built-in default config.
    PrintDefault,
}

/// Feeds a recorded list of events through the engine and prints the
/// resulting commands, one per line.
///
/// The file holds a RON list of events, like
/// `[WindowCreated(1), KeyPress("ALT", "m")]`.
#[derive(Parser, Clone)]
struct CmdReplay {
    file: PathBuf,

    /// Path to a custom config file.
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Size of the screen, like 1920x1080.
    #[arg(long, default_value = "1920x1080")]
    screen: Size,
}

#[derive(thiserror::Error, Debug)]
enum ReplayError {
    #[error("could not read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse events in {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

fn main() -> Result<(), anyhow::Error> {
    let opt: Opt = Parser::parse();
    log::init_logging()?;

    match opt.command {
        Command::Config(CmdConfig::Verify { config }) => {
            if config.is_none() && !config::config_path_default().is_some_and(|p| p.exists()) {
                eprintln!("Warning: config file missing; checking the defaults");
            }
            if let Err(e) = Config::load(config.as_deref()) {
                eprintln!("{e}");
                std::process::exit(1);
            }
            eprintln!("config ok");
        }
        Command::Config(CmdConfig::PrintDefault) => {
            print!("{}", config::DEFAULT_CONFIG);
        }
        Command::Replay(CmdReplay { file, config, screen }) => {
            let config = Config::load(config.as_deref())?;
            let events = read_events(&file)?;
            replay(config, screen, events)?;
        }
    }

    Ok(())
}

fn read_events(path: &Path) -> Result<Vec<Event>, ReplayError> {
    let text = std::fs::read_to_string(path).map_err(|source| ReplayError::Read {
        path: path.to_owned(),
        source,
    })?;
    ron::from_str(&text).map_err(|source| ReplayError::Parse { path: path.to_owned(), source })
}

fn replay(config: Config, screen: Size, events: Vec<Event>) -> anyhow::Result<()> {
    let wm = WindowManager::new(Arc::new(config), Rect::from_parts(Point::ZERO, screen));
    let (events_tx, events_rx) = channel();
    let (commands_tx, mut commands_rx) = channel();
    info!(count = events.len(), "replaying events");
    for event in events {
        events_tx.send(event);
    }
    drop(events_tx);

    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .context("starting runtime")?;
    rt.block_on(wm.run(events_rx, commands_tx));

    while let Ok((_span, command)) = commands_rx.try_recv() {
        println!("{}", ron::to_string(&command)?);
    }
    Ok(())
}

