//! CLI entry point for pgn
//!
//! With a script path the script is played directly, otherwise a menu lists
//! the script folders found under the novel directory.

use anyhow::Context;
use clap::Parser;
use pgn::config::EngineConfig;
use pgn::runtime::RunOutcome;
use std::path::PathBuf;

const DEFAULT_CONFIG: &str = "pgn.json";

#[derive(Parser)]
#[command(name = "pgn", about = "PGN visual novel script player", version)]
struct Args {
    /// Script to play; without one, a menu of script folders is shown
    script: Option<PathBuf>,

    /// Continue from the save slot if one exists
    #[arg(short, long)]
    resume: bool,

    /// Save slot name
    #[arg(long)]
    slot: Option<String>,

    /// JSON config file (default: pgn.json when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Folder holding <name>/<name>.pgn script folders
    #[arg(long)]
    novel_dir: Option<PathBuf>,

    /// Seed for `random`
    #[arg(long)]
    seed: Option<u64>,

    /// Allow the in-game debug console
    #[arg(short, long)]
    debug: bool,

    /// Write the log to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn load_config(args: &Args) -> anyhow::Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::load_or_default(DEFAULT_CONFIG)?,
    };

    if let Some(slot) = &args.slot {
        config = config.with_save_slot(slot.clone());
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if args.debug {
        config = config.with_debug_console(true);
    }
    if let Some(dir) = &args.novel_dir {
        config.novel_dir = dir.clone();
    }
    if let Some(file) = &args.log_file {
        config.log.file = Some(file.clone());
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;
    pgn::logging::init(&config.log).context("failed to set up logging")?;

    match &args.script {
        Some(script) => {
            let outcome = pgn::cli::play_script(&config, script, args.resume)
                .with_context(|| format!("failed to play {}", script.display()))?;
            if outcome == RunOutcome::ReturnToMenu {
                pgn::cli::menu::run(&config)?;
            }
        }
        None => pgn::cli::menu::run(&config)?,
    }

    Ok(())
}
